//! Domain primitives, services, and ports for the accounts service.
//!
//! Purpose: define strongly typed account entities and the use-cases that
//! operate on them. Nothing here knows about HTTP, SQL, or concrete crypto
//! libraries; adapters plug in through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`User`] and its validated components ([`UserId`], [`Username`],
//!   [`EmailAddress`], [`PersonName`], [`PhoneNumber`]).
//! - [`Registration`] and [`LoginCredentials`]: validated inbound commands.
//! - [`AccountService`]: implements the registration, login, and token
//!   introspection driving ports.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::account_service::{AccountService, INVALID_CREDENTIALS, INVALID_TOKEN};
pub use self::auth::{
    AuthToken, LoginCredentials, PasswordHash, Registration, RegistrationForm,
    PASSWORD_MIN_LENGTH,
};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, PersonName, PhoneNumber, User, UserAccount, UserId, UserValidationError,
    Username,
};
pub use self::validation::{Field, FieldViolation, ValidationErrors, Violation};

/// HTTP header carrying the per-request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
