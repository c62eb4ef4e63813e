//! Account use-cases: registration, login, and token introspection.
//!
//! [`AccountService`] implements the driving ports on top of the driven
//! ports, and is the only place where adapter errors become domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::ports::{
    AccountQuery, LoginService, PasswordHashError, PasswordHasher, RegistrationService,
    TokenError, TokenIssuer, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthToken, EmailAddress, Error, Field, LoginCredentials, Registration, User, UserAccount,
    UserId, Username,
};

/// Message returned for every failed login.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
/// Message returned for every rejected bearer token.
pub const INVALID_TOKEN: &str = "invalid token";

/// Account service implementing the driving ports.
pub struct AccountService<R, H, T> {
    users: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<R, H, T> Clone for AccountService<R, H, T> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<R, H, T> AccountService<R, H, T> {
    /// Create a new service from its driven ports.
    pub fn new(users: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

fn taken(field: Field) -> Error {
    let message = format!("{field} is already taken");
    Error::conflict(message.clone()).with_details(json!([{
        "field": field.as_str(),
        "code": "taken",
        "message": message,
    }]))
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::UsernameTaken => taken(Field::Username),
        UserPersistenceError::EmailTaken => taken(Field::Email),
    }
}

fn map_hash_error(error: &PasswordHashError) -> Error {
    error!(%error, "password hashing failed");
    Error::internal(error.to_string())
}

fn invalid_credentials() -> Error {
    Error::unauthorized(INVALID_CREDENTIALS)
}

fn invalid_token() -> Error {
    Error::unauthorized(INVALID_TOKEN)
}

impl<R, H, T> AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn ensure_available(&self, registration: &Registration) -> Result<(), Error> {
        if self
            .users
            .username_exists(registration.username())
            .await
            .map_err(map_persistence_error)?
        {
            return Err(taken(Field::Username));
        }
        if self
            .users
            .email_exists(registration.email())
            .await
            .map_err(map_persistence_error)?
        {
            return Err(taken(Field::Email));
        }
        Ok(())
    }

    /// Find the account an identifier refers to: username first, then email
    /// when the identifier is shaped like one.
    async fn resolve_account(&self, identifier: &str) -> Result<Option<UserAccount>, Error> {
        if let Ok(username) = Username::new(identifier) {
            let found = self
                .users
                .find_by_username(&username)
                .await
                .map_err(map_persistence_error)?;
            if found.is_some() {
                return Ok(found);
            }
        }

        if !EmailAddress::is_email_shaped(identifier) {
            return Ok(None);
        }
        match EmailAddress::new(identifier) {
            Ok(email) => self
                .users
                .find_by_email(&email)
                .await
                .map_err(map_persistence_error),
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl<R, H, T> RegistrationService for AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        self.ensure_available(&registration).await?;

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(|err| map_hash_error(&err))?;

        let user = User::builder(
            UserId::random(),
            registration.username().clone(),
            registration.email().clone(),
        )
        .name(registration.name().clone())
        .surname(registration.surname().clone())
        .phone(registration.phone().clone())
        .build()
        .map_err(|err| Error::internal(format!("registration produced an invalid user: {err}")))?;

        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(map_persistence_error)?;

        info!(user_id = %user.id(), username = %user.username(), "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<R, H, T> LoginService for AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let Some(account) = self.resolve_account(credentials.identifier()).await? else {
            if let Err(error) = self.hasher.verify_decoy(credentials.password()).await {
                error!(%error, "decoy password verification failed");
            }
            debug!("login rejected: unknown identifier");
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(|err| map_hash_error(&err))?;
        if !matches {
            debug!(user_id = %account.user.id(), "login rejected: password mismatch");
            return Err(invalid_credentials());
        }

        let token = self.tokens.issue(account.user.id()).map_err(|err| {
            error!(error = %err, "token issuance failed");
            Error::internal(err.to_string())
        })?;
        info!(user_id = %account.user.id(), "login succeeded");
        Ok(token)
    }
}

#[async_trait]
impl<R, H, T> AccountQuery for AccountService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn authenticated_user(&self, token: &str) -> Result<User, Error> {
        let user_id = self.tokens.verify(token).map_err(|err| match err {
            TokenError::Invalid { .. } | TokenError::Expired => {
                debug!(reason = %err, "bearer token rejected");
                invalid_token()
            }
            TokenError::Encoding { message } => Error::internal(message),
        })?;

        self.users
            .find_by_id(&user_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| {
                debug!(%user_id, "bearer token refers to a missing user");
                invalid_token()
            })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
