//! Error types shared across the crate.
//!
//! Internally everything is an `anyhow::Error` with context attached. At the boundaries that need
//! to react to the kind of failure (the HTTP server, mostly) the error is tagged with an
//! `ErrorType` using `IntoResult::pub_result`.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The broad category of a failure, used to pick an HTTP status or an exit message.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The input record (or request document) was malformed or out of range.
    Validation,
    /// The backing file could not be read or written.
    Storage,
    /// The home directory or its configuration files are missing or invalid.
    Config,
    /// A request to the expense server failed or returned an unexpected response.
    Request,
    /// The HTTP service could not be started or stopped abnormally.
    Service,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type. It carries an `ErrorType` along with the full `anyhow` context chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Returns the `ValidationError` at the root of this error, if there is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        self.inner.downcast_ref::<ValidationError>()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Alternate formatting prints the whole context chain on one line.
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Untagged errors default to `ErrorType::Service` so that `?` works on `anyhow` results in
/// top-level code.
impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        match value.downcast::<ValidationError>() {
            Ok(validation) => Error::new(ErrorType::Validation, validation),
            Err(other) => Error::new(ErrorType::Service, other),
        }
    }
}

/// Converts a private `anyhow` result into a public `Result` tagged with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for anyhow::Result<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

/// An input record failed validation. `field` names the offending field, or `body` when the
/// document as a whole could not be read.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ValidationError {
    field: String,
    reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid '{}': {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context_chain() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("disk is full"));
        let err = result
            .context("Unable to write expenses")
            .pub_result(ErrorType::Storage)
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert_eq!(err.to_string(), "Unable to write expenses: disk is full");
    }

    #[test]
    fn test_validation_error_is_recoverable() {
        let err = Error::new(
            ErrorType::Validation,
            ValidationError::new("amount", "must not be negative"),
        );
        let validation = err.validation().unwrap();
        assert_eq!(validation.field(), "amount");
        assert_eq!(err.to_string(), "invalid 'amount': must not be negative");
    }

    #[test]
    fn test_from_anyhow_detects_validation() {
        let err: Error = anyhow::Error::new(ValidationError::new("month", "empty")).into();
        assert_eq!(err.error_type(), ErrorType::Validation);
        let err: Error = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_type(), ErrorType::Service);
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Storage.to_string(), "storage");
        assert_eq!(
            "validation".parse::<ErrorType>().unwrap(),
            ErrorType::Validation
        );
    }
}
