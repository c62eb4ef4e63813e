//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (`UserRepository`, `PasswordHasher`, `TokenIssuer`) describe
//! what the domain needs from storage and credential primitives. Driving ports
//! (`RegistrationService`, `LoginService`, `AccountQuery`) are what inbound
//! adapters call. Each driven port exposes a typed error enum so adapters map
//! their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod account_query;
mod login_service;
mod password_hasher;
mod registration_service;
mod token_issuer;
mod user_repository;

#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use registration_service::MockRegistrationService;
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
