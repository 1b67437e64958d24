use std::error::Error as StdError;
use std::fmt;

use super::codec::{self, DecodeError};
use super::codes::ErrorCode;
use super::validation::ValidationErrors;

/// An error that can be shown to API callers.
///
/// `public()` returns a short, stable code such as `not_found`. Every instance of
/// the same kind of failure must return the same code, and the code must not be
/// the full error message.
pub trait PublicError: StdError + Send + Sync + 'static {
    fn public(&self) -> &str;
}

/// Error carrying a public code, stored as `(prefix, code, message)`.
///
/// Displays as `"<prefix>: <code>, <message>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedError {
    prefix: String,
    code: String,
    message: String,
}

impl EncodedError {
    pub fn new(
        prefix: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let (prefix, code, message) = (prefix.into(), code.into(), message.into());
        debug_assert!(
            !prefix.contains(codec::PREFIX_DELIMITER),
            "error prefix {prefix:?} contains the delimiter"
        );
        debug_assert!(
            !code.is_empty() && !code.contains(codec::CODE_SEPARATOR),
            "error code {code:?} is empty or contains a comma"
        );
        Self {
            prefix,
            code,
            message,
        }
    }

    /// Build from existing error text such as `"handlers: not_found, resource not found"`.
    pub fn parse(prefix: &str, text: &str) -> Result<Self, DecodeError> {
        match codec::split(prefix, text) {
            Ok((code, message)) => Ok(Self::new(prefix, code, message)),
            Err(e) => {
                tracing::error!(prefix = %prefix, text = %text, error = %e, "Malformed encoded error");
                Err(e)
            }
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EncodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::encode(&self.prefix, &self.code, &self.message))
    }
}

impl StdError for EncodedError {}

impl PublicError for EncodedError {
    fn public(&self) -> &str {
        &self.code
    }
}

/// Query whether `err` exposes a public code.
///
/// Only the error itself is inspected, not its `source()` chain: wrapping a
/// public error with extra context turns it into an opaque one.
pub fn as_public<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a dyn PublicError> {
    if let Some(e) = err.downcast_ref::<ValidationErrors>() {
        return Some(e);
    }
    if let Some(e) = err.downcast_ref::<EncodedError>() {
        return Some(e);
    }
    if let Some(e) = err.downcast_ref::<ErrorCode>() {
        return Some(e);
    }
    None
}
