//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordHash, User, UserAccount, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already holds the username.
        UsernameTaken => "username is already taken",
        /// Another account already holds the email address.
        EmailTaken => "email is already taken",
    }
}

/// Storage for user accounts.
///
/// Adapters must enforce username and email uniqueness atomically in
/// [`UserRepository::insert`]; the `*_exists` lookups are advisory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, failing with `UsernameTaken` or `EmailTaken`
    /// when a unique constraint is violated.
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account with its password hash by exact username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account with its password hash by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError>;

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError>;
}
