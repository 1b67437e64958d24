use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::codec;
use super::public::PublicError;

/// Prefix of errors raised by HTTP handlers
pub const HANDLERS_PREFIX: &str = "handlers";

/// Prefix of errors raised by the model layer
pub const MODELS_PREFIX: &str = "models";

/// Public errors returned by the service's handlers and models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Requested resource does not exist
    NotFound,

    /// Request body could not be parsed
    #[serde(rename = "invalid_form")]
    InvalidFormInput,

    /// Content-Type header is not supported
    ContentTypeNotAccepted,

    /// OAuth grant type is not supported
    #[serde(rename = "unsupported_grant_type")]
    GrantTypeNotAccepted,

    /// Stored contents are malformed
    #[serde(rename = "invalid_parse")]
    ParseError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 5] = [
        Self::NotFound,
        Self::InvalidFormInput,
        Self::ContentTypeNotAccepted,
        Self::GrantTypeNotAccepted,
        Self::ParseError,
    ];

    /// Package prefix of the encoded text
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::ParseError => MODELS_PREFIX,
            _ => HANDLERS_PREFIX,
        }
    }

    /// Public code shown to callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidFormInput => "invalid_form",
            Self::ContentTypeNotAccepted => "content_type_not_accepted",
            Self::GrantTypeNotAccepted => "unsupported_grant_type",
            Self::ParseError => "invalid_parse",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "resource not found",
            Self::InvalidFormInput => "provided input cannot be parsed",
            Self::ContentTypeNotAccepted => "the content-type provided is not supported",
            Self::GrantTypeNotAccepted => "the grant-type provided is not supported",
            Self::ParseError => "contents are not in appropriate format",
        }
    }

    /// HTTP status the service registers for this error at startup
    pub fn suggested_status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ContentTypeNotAccepted => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InvalidFormInput | Self::GrantTypeNotAccepted | Self::ParseError => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::encode(self.prefix(), self.code(), self.message()))
    }
}

impl std::error::Error for ErrorCode {}

impl PublicError for ErrorCode {
    fn public(&self) -> &str {
        self.code()
    }
}
