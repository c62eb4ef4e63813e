//! Port for issuing and checking session tokens.
use crate::domain::{AuthToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token could not be produced.
        Encoding { message: String } => "token encoding failed: {message}",
        /// Signature, format, or claims are invalid.
        Invalid { message: String } => "token is invalid: {message}",
        /// The token is past its expiry.
        Expired => "token has expired",
    }
}

/// Issues opaque bearer tokens bound to a user id.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Produce a fresh token for `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<AuthToken, TokenError>;

    /// Check a presented token and return the user it was issued to.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
