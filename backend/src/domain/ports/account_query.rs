//! Driving port for reading the authenticated account.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Resolves bearer tokens to users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Return the user a presented token belongs to.
    async fn authenticated_user(&self, token: &str) -> Result<User, Error>;
}
