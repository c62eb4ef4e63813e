//! Field-level validation outcomes shared by registration and login.
//!
//! Validation collects every violation instead of stopping at the first so
//! clients can fix a form in one round trip.

use std::fmt;

/// Input field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Password,
    PasswordConfirmation,
    Name,
    Surname,
    Email,
    Phone,
}

impl Field {
    /// Canonical field name as submitted by clients.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::PasswordConfirmation => "password-confirmation",
            Self::Name => "name",
            Self::Surname => "surname",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Missing, or blank once trimmed.
    Required,
    /// Shorter than the allowed minimum.
    TooShort { min: usize },
    /// Longer than the allowed maximum.
    TooLong { max: usize },
    /// Not shaped like an email address.
    InvalidEmail,
    /// Does not match the password.
    PasswordMismatch,
}

impl Violation {
    /// Stable machine-readable code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::PasswordMismatch => "password_mismatch",
        }
    }
}

/// A violation attached to the field it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    field: Field,
    violation: Violation,
}

impl FieldViolation {
    pub const fn new(field: Field, violation: Violation) -> Self {
        Self { field, violation }
    }

    pub const fn field(&self) -> Field {
        self.field
    }

    pub const fn violation(&self) -> Violation {
        self.violation
    }

    /// Human-readable explanation.
    pub fn message(&self) -> String {
        let field = self.field;
        match self.violation {
            Violation::Required => format!("{field} is required"),
            Violation::TooShort { min } => {
                format!("{field} must be at least {min} characters")
            }
            Violation::TooLong { max } => format!("{field} must be at most {max} characters"),
            Violation::InvalidEmail => format!("{field} must be a valid email address"),
            Violation::PasswordMismatch => format!("{field} must match password"),
        }
    }
}

/// Non-empty list of violations produced by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// Wrap collected violations, returning `None` when there are none.
    pub fn from_violations(violations: Vec<FieldViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self(violations))
        }
    }

    /// Wrap exactly one violation.
    pub fn single(violation: FieldViolation) -> Self {
        Self(vec![violation])
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Whether `field` failed with `violation`.
    pub fn contains(&self, field: Field, violation: Violation) -> bool {
        self.0.contains(&FieldViolation::new(field, violation))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(FieldViolation::message).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
