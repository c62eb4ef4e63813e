//! Authentication commands and credential material.
//!
//! Inbound payload parsing stays outside the domain: adapters hand raw strings
//! to the constructors here, which validate them before a service touches a
//! port.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, PersonName, PhoneNumber, UserValidationError, Username};
use super::validation::{Field, FieldViolation, ValidationErrors, Violation};

/// Minimum password length, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Salted one-way password hash in PHC string format.
///
/// `Debug` is redacted so hashes do not end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a hasher or read from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Opaque bearer token issued after a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl From<AuthToken> for String {
    fn from(value: AuthToken) -> Self {
        value.0
    }
}

fn required(value: &str, field: Field, violations: &mut Vec<FieldViolation>) -> bool {
    present(value.trim(), field, violations)
}

/// Like [`required`] but without trimming; passwords are taken verbatim.
fn present(value: &str, field: Field, violations: &mut Vec<FieldViolation>) -> bool {
    if value.is_empty() {
        violations.push(FieldViolation::new(field, Violation::Required));
        false
    } else {
        true
    }
}

fn length_violation(error: &UserValidationError) -> Option<Violation> {
    match *error {
        UserValidationError::UsernameTooLong { max }
        | UserValidationError::EmailTooLong { max }
        | UserValidationError::PersonNameTooLong { max }
        | UserValidationError::PhoneTooLong { max } => Some(Violation::TooLong { max }),
        UserValidationError::InvalidEmail => Some(Violation::InvalidEmail),
        _ => None,
    }
}

/// Run a value constructor, recording its failure against `field`.
fn parse_field<T>(
    value: &str,
    field: Field,
    violations: &mut Vec<FieldViolation>,
    parse: impl FnOnce(&str) -> Result<T, UserValidationError>,
) -> Option<T> {
    if !required(value, field, violations) {
        return None;
    }
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            let violation = length_violation(&error).unwrap_or(Violation::Required);
            violations.push(FieldViolation::new(field, violation));
            None
        }
    }
}

/// Raw registration input as received from a client.
///
/// Absent fields are represented by empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
}

/// Validated registration command.
///
/// ## Invariants
/// - Every profile field is present and within its length bounds.
/// - `password` is at least [`PASSWORD_MIN_LENGTH`] characters and equalled
///   its confirmation exactly; it is kept verbatim (no trimming), so a
///   password made only of spaces is accepted when long enough.
pub struct Registration {
    username: Username,
    email: EmailAddress,
    name: PersonName,
    surname: PersonName,
    phone: PhoneNumber,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate a registration form, collecting every violation.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::{Field, Registration, RegistrationForm, Violation};
    ///
    /// let form = RegistrationForm {
    ///     username: "vbuterin".into(),
    ///     password: "123456".into(),
    ///     password_confirmation: "654321".into(),
    ///     name: "Vitalik".into(),
    ///     surname: "Buterin".into(),
    ///     email: "vitalik-buterin".into(),
    ///     phone: "5349546546387".into(),
    /// };
    /// let errors = Registration::try_from_form(&form).err().expect("invalid form");
    /// assert!(errors.contains(Field::Email, Violation::InvalidEmail));
    /// assert!(errors.contains(Field::PasswordConfirmation, Violation::PasswordMismatch));
    /// ```
    pub fn try_from_form(form: &RegistrationForm) -> Result<Self, ValidationErrors> {
        let mut violations = Vec::new();

        let username = parse_field(&form.username, Field::Username, &mut violations, |raw| {
            Username::new(raw)
        });
        let password = Self::check_password(form, &mut violations);
        let name = parse_field(&form.name, Field::Name, &mut violations, |raw| {
            PersonName::new(raw)
        });
        let surname = parse_field(&form.surname, Field::Surname, &mut violations, |raw| {
            PersonName::new(raw)
        });
        let email = parse_field(&form.email, Field::Email, &mut violations, |raw| {
            EmailAddress::new(raw)
        });
        let phone = parse_field(&form.phone, Field::Phone, &mut violations, |raw| {
            PhoneNumber::new(raw)
        });

        if let Some(errors) = ValidationErrors::from_violations(violations) {
            return Err(errors);
        }

        match (username, password, name, surname, email, phone) {
            (Some(username), Some(password), Some(name), Some(surname), Some(email), Some(phone)) => {
                Ok(Self {
                    username,
                    email,
                    name,
                    surname,
                    phone,
                    password,
                })
            }
            // Every `None` above recorded a violation, so this arm is never taken.
            _ => Err(ValidationErrors::single(FieldViolation::new(
                Field::Username,
                Violation::Required,
            ))),
        }
    }

    fn check_password(
        form: &RegistrationForm,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<Zeroizing<String>> {
        let password_present = present(&form.password, Field::Password, violations);
        let confirmation_present = present(
            &form.password_confirmation,
            Field::PasswordConfirmation,
            violations,
        );
        if !password_present {
            return None;
        }

        let mut valid = true;
        if form.password.chars().count() < PASSWORD_MIN_LENGTH {
            violations.push(FieldViolation::new(
                Field::Password,
                Violation::TooShort {
                    min: PASSWORD_MIN_LENGTH,
                },
            ));
            valid = false;
        }
        if confirmation_present && form.password != form.password_confirmation {
            violations.push(FieldViolation::new(
                Field::PasswordConfirmation,
                Violation::PasswordMismatch,
            ));
            valid = false;
        }
        (valid && confirmation_present).then(|| Zeroizing::new(form.password.clone()))
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

    /// Plaintext password; only ever handed to a hasher.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `identifier` is trimmed and non-empty. It may hold a username or an
///   email address.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use accounts::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" agustin ", "123456").unwrap();
/// assert_eq!(creds.identifier(), "agustin");
/// assert_eq!(creds.password(), "123456");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs, reporting every blank field.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, ValidationErrors> {
        let mut violations = Vec::new();
        let identifier = identifier.trim();
        if identifier.is_empty() {
            violations.push(FieldViolation::new(Field::Username, Violation::Required));
        }
        if password.is_empty() {
            violations.push(FieldViolation::new(Field::Password, Violation::Required));
        }
        if let Some(errors) = ValidationErrors::from_violations(violations) {
            return Err(errors);
        }

        Ok(Self {
            identifier: identifier.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username or email used to resolve the account.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}
