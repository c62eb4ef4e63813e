//! User account model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use super::auth::PasswordHash;

/// Maximum length of a username.
pub const USERNAME_MAX: usize = 64;
/// Maximum length of an email address (RFC 5321 path limit).
pub const EMAIL_MAX: usize = 254;
/// Maximum length of a name or surname.
pub const PERSON_NAME_MAX: usize = 100;
/// Maximum length of a phone number.
pub const PHONE_MAX: usize = 32;

/// Validation errors raised by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUsername,
    UsernameTooLong { max: usize },
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    EmptyPersonName,
    PersonNameTooLong { max: usize },
    EmptyPhone,
    PhoneTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid email address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmptyPersonName => write!(f, "name must not be empty"),
            Self::PersonNameTooLong { max } => {
                write!(f, "name must be at most {max} characters")
            }
            Self::EmptyPhone => write!(f, "phone must not be empty"),
            Self::PhoneTooLong { max } => write!(f, "phone must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Trim `raw` and enforce non-emptiness and a maximum length in characters.
fn bounded_text(
    raw: &str,
    max: usize,
    empty: UserValidationError,
    too_long: UserValidationError,
) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Unique login handle.
///
/// ## Invariants
/// - Trimmed, non-empty, at most [`USERNAME_MAX`] characters.
/// - Compared exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        bounded_text(
            raw.as_ref(),
            USERNAME_MAX,
            UserValidationError::EmptyUsername,
            UserValidationError::UsernameTooLong { max: USERNAME_MAX },
        )
        .map(Self)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Local part of printable specials, then dot-separated DNS labels with
        // at least one dot so bare hosts such as `user@localhost` are refused.
        let pattern = concat!(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
            r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
            r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        );
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, normalised to lower case.
///
/// ## Invariants
/// - Trimmed, at most [`EMAIL_MAX`] characters, `local@domain.tld` shaped.
/// - Stored lower-cased so uniqueness is case-insensitive.
///
/// # Examples
/// ```
/// use accounts::domain::EmailAddress;
///
/// let email = EmailAddress::new(" Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// assert!(EmailAddress::new("ada-example").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = bounded_text(
            raw.as_ref(),
            EMAIL_MAX,
            UserValidationError::EmptyEmail,
            UserValidationError::EmailTooLong { max: EMAIL_MAX },
        )?;
        if !email_regex().is_match(&trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Whether `raw` looks like an email address at all.
    pub fn is_email_shaped(raw: &str) -> bool {
        email_regex().is_match(raw.trim())
    }
}

/// Given name or surname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        bounded_text(
            raw.as_ref(),
            PERSON_NAME_MAX,
            UserValidationError::EmptyPersonName,
            UserValidationError::PersonNameTooLong {
                max: PERSON_NAME_MAX,
            },
        )
        .map(Self)
    }
}

/// Free-form phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        bounded_text(
            raw.as_ref(),
            PHONE_MAX,
            UserValidationError::EmptyPhone,
            UserValidationError::PhoneTooLong { max: PHONE_MAX },
        )
        .map(Self)
    }
}

macro_rules! string_newtype_impls {
    ($($ty:ident),* $(,)?) => {
        $(
            impl AsRef<str> for $ty {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_ref())
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.0
                }
            }
        )*
    };
}

string_newtype_impls!(Username, EmailAddress, PersonName, PhoneNumber);

/// Registered user as exposed to clients. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    name: PersonName,
    surname: PersonName,
    phone: PhoneNumber,
    created_at: DateTime<Utc>,
}

impl User {
    /// Start building a user from validated components.
    pub fn builder(id: UserId, username: Username, email: EmailAddress) -> UserBuilder {
        UserBuilder {
            id,
            username,
            email,
            name: None,
            surname: None,
            phone: None,
            created_at: None,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn name(&self) -> &PersonName {
        &self.name
    }

    pub fn surname(&self) -> &PersonName {
        &self.surname
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builder for [`User`]; profile fields are required by [`UserBuilder::build`].
#[derive(Debug, Clone)]
pub struct UserBuilder {
    id: UserId,
    username: Username,
    email: EmailAddress,
    name: Option<PersonName>,
    surname: Option<PersonName>,
    phone: Option<PhoneNumber>,
    created_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    #[must_use]
    pub fn name(mut self, name: PersonName) -> Self {
        self.name = Some(name);
        self
    }

    #[must_use]
    pub fn surname(mut self, surname: PersonName) -> Self {
        self.surname = Some(surname);
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: PhoneNumber) -> Self {
        self.phone = Some(phone);
        self
    }

    /// Creation time; defaults to now.
    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Finish the user, failing when a profile field was never supplied.
    pub fn build(self) -> Result<User, UserValidationError> {
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            name: self.name.ok_or(UserValidationError::EmptyPersonName)?,
            surname: self.surname.ok_or(UserValidationError::EmptyPersonName)?,
            phone: self.phone.ok_or(UserValidationError::EmptyPhone)?,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// A user together with its stored password hash.
///
/// Only credential checks see this type; it never leaves the domain.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}
