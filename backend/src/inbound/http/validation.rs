//! Shared validation helpers for inbound HTTP adapters.
//!
//! Field violations from the domain and JSON extraction failures both become
//! `invalid_request` errors whose details are a list of
//! `{field, code, message}` objects, rendered as `errors` in the envelope.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{Error, FieldViolation, ValidationErrors};

/// Top-level message for field validation failures.
pub const VALIDATION_FAILED: &str = "validation failed";

/// Pseudo field name used when the request body as a whole is unusable.
const BODY_FIELD: &str = "body";

fn violation_detail(violation: &FieldViolation) -> Value {
    json!({
        "field": violation.field().as_str(),
        "code": violation.violation().code(),
        "message": violation.message(),
    })
}

/// Convert collected field violations into a domain error.
pub(crate) fn validation_error(errors: &ValidationErrors) -> Error {
    let details: Vec<Value> = errors.violations().iter().map(violation_detail).collect();
    Error::invalid_request(VALIDATION_FAILED).with_details(Value::Array(details))
}

/// Describe a JSON extraction failure without echoing parser internals.
pub(crate) fn body_error(err: &JsonPayloadError) -> Error {
    let (code, message) = match err {
        JsonPayloadError::ContentType => (
            "invalid_content_type",
            "request body must be sent as application/json",
        ),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            ("too_large", "request body is too large")
        }
        _ => ("invalid_json", "request body must be a JSON object"),
    };
    Error::invalid_request(message).with_details(json!([{
        "field": BODY_FIELD,
        "code": code,
        "message": message,
    }]))
}

/// JSON extractor configuration rendering failures as envelope errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, req: &HttpRequest| {
            debug!(error = %err, path = req.path(), "rejected request body");
            body_error(&err).into()
        })
}
