//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to authenticate credentials without
//! importing the backing infrastructure, so HTTP handler tests can substitute
//! a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a token for the matching account.
    ///
    /// Every credential failure yields the same unauthorised error.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;
}
