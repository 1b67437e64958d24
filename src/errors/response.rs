use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::public::{as_public, PublicError};
use super::registry::StatusRegistry;
use super::validation::{as_validation, ValidationErrors};

/// Code shown for every error that is not public
pub const SERVER_ERROR: &str = "server_error";

/// Classification of an error, computed once before rendering
#[derive(Debug, Clone, Copy)]
pub enum ErrorKind<'a> {
    /// Nothing about the error may be shown
    Opaque,
    /// Error with a public code
    Disclosable(&'a dyn PublicError),
    /// Per-field validation failures
    Validation(&'a ValidationErrors),
}

impl<'a> ErrorKind<'a> {
    pub fn of(err: &'a (dyn StdError + 'static)) -> Self {
        if let Some(fields) = as_validation(err) {
            return Self::Validation(fields);
        }
        match as_public(err) {
            Some(public) => Self::Disclosable(public),
            None => Self::Opaque,
        }
    }

    /// Public code, if any
    pub fn public(&self) -> Option<&'a str> {
        match *self {
            Self::Opaque => None,
            Self::Disclosable(e) => Some(e.public()),
            Self::Validation(e) => Some(e.public()),
        }
    }
}

/// JSON body of an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDocument {
    /// Public error code, or `server_error`
    pub error: String,
    /// Public code of each invalid field (validation errors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl Default for ErrorDocument {
    fn default() -> Self {
        Self {
            error: SERVER_ERROR.to_string(),
            fields: None,
        }
    }
}

/// Status and document ready to be written to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedError {
    pub status: StatusCode,
    pub document: ErrorDocument,
}

impl IntoResponse for RenderedError {
    fn into_response(self) -> Response {
        (self.status, Json(self.document)).into_response()
    }
}

/// Finds the public view of one concrete error type
pub type Discloser = for<'a> fn(&'a (dyn StdError + 'static)) -> Option<&'a dyn PublicError>;

fn downcast_public<'a, E: PublicError>(
    err: &'a (dyn StdError + 'static),
) -> Option<&'a dyn PublicError> {
    err.downcast_ref::<E>().map(|e| e as &dyn PublicError)
}

/// Turns errors into HTTP error responses.
///
/// Public errors get status 400 and their code in `error`; anything else gets
/// 500 and `server_error`. The registry can override the status of any public
/// code. For validation errors each field's code is listed under `fields`, and
/// when several field codes have overrides the highest status wins.
///
/// The crate's own public types are always recognised. Other `PublicError`
/// types are recognised once registered with [`ErrorView::disclose`], or can be
/// rendered directly with [`ErrorView::render_public`].
#[derive(Clone, Default)]
pub struct ErrorView {
    registry: StatusRegistry,
    disclosers: Vec<Discloser>,
}

impl fmt::Debug for ErrorView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorView")
            .field("registry", &self.registry)
            .field("disclosers", &self.disclosers.len())
            .finish()
    }
}

impl ErrorView {
    pub fn new(registry: StatusRegistry) -> Self {
        Self {
            registry,
            disclosers: Vec::new(),
        }
    }

    /// Treat errors of type `E` as public when they reach [`ErrorView::render`]
    pub fn disclose<E: PublicError>(mut self) -> Self {
        self.disclosers.push(downcast_public::<E>);
        self
    }

    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    /// Classify `err`, including the types registered with [`ErrorView::disclose`]
    pub fn classify<'a>(&self, err: &'a (dyn StdError + 'static)) -> ErrorKind<'a> {
        match ErrorKind::of(err) {
            ErrorKind::Opaque => self
                .disclosers
                .iter()
                .find_map(|disclose| disclose(err))
                .map_or(ErrorKind::Opaque, ErrorKind::Disclosable),
            kind => kind,
        }
    }

    pub fn render(&self, err: &(dyn StdError + 'static)) -> RenderedError {
        self.render_kind(self.classify(err))
    }

    /// Render an error already known to be public.
    ///
    /// Validation aggregates should go through [`ErrorView::render`] so their
    /// fields are listed.
    pub fn render_public(&self, err: &dyn PublicError) -> RenderedError {
        self.render_kind(ErrorKind::Disclosable(err))
    }

    pub fn render_kind(&self, kind: ErrorKind<'_>) -> RenderedError {
        let mut status = StatusCode::INTERNAL_SERVER_ERROR;
        let mut document = ErrorDocument::default();

        if let Some(code) = kind.public() {
            status = self.registry.lookup(code).unwrap_or(StatusCode::BAD_REQUEST);
            document.error = code.to_string();
        }

        if let ErrorKind::Validation(fields) = kind {
            let mut field_status: Option<StatusCode> = None;
            let mut codes = BTreeMap::new();

            for (field, code) in fields.codes() {
                if let Some(s) = self.registry.lookup(code) {
                    field_status = match field_status {
                        Some(cur) if cur.as_u16() >= s.as_u16() => Some(cur),
                        _ => Some(s),
                    };
                }
                codes.insert(field.to_string(), code.to_string());
            }

            if let Some(s) = field_status {
                status = s;
            }
            document.fields = Some(codes);
        }

        RenderedError { status, document }
    }

    /// Render `err` and write it as the response.
    pub fn respond(&self, err: &(dyn StdError + 'static)) -> Response {
        let kind = self.classify(err);
        let rendered = self.render_kind(kind);

        match kind {
            ErrorKind::Opaque => error!(
                status = %rendered.status.as_u16(),
                error = %err,
                "Internal error hidden from caller"
            ),
            _ => debug!(
                status = %rendered.status.as_u16(),
                code = %rendered.document.error,
                "Public error returned to caller"
            ),
        }

        rendered.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EncodedError, ErrorCode, Shutdown, Wrapper};
    use serde_json::json;

    fn invalid_email() -> EncodedError {
        EncodedError::new("models", "invalid_email", "email is invalid")
    }

    fn too_young() -> EncodedError {
        EncodedError::new("models", "too_young", "must be 18 or older")
    }

    #[derive(Debug, thiserror::Error)]
    #[error("payment declined by issuer")]
    struct PaymentDeclined;

    impl PublicError for PaymentDeclined {
        fn public(&self) -> &str {
            "payment_declined"
        }
    }

    #[test]
    fn test_unregistered_public_type_is_opaque() {
        let view = ErrorView::default();
        assert_eq!(view.render(&PaymentDeclined).document.error, SERVER_ERROR);
    }

    #[test]
    fn test_disclosed_type_matches_field_rendering() {
        let mut registry = StatusRegistry::new();
        registry.register("payment_declined", StatusCode::PAYMENT_REQUIRED);
        let view = ErrorView::new(registry).disclose::<PaymentDeclined>();

        let top = view.render(&PaymentDeclined);
        assert_eq!(top.status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(top.document.error, "payment_declined");

        let field = view.render(&ValidationErrors::new().with("card", PaymentDeclined));
        assert_eq!(field.status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            field.document.fields.unwrap().get("card").map(String::as_str),
            Some("payment_declined")
        );
    }

    #[test]
    fn test_disclose_keeps_builtin_types() {
        let view = ErrorView::default().disclose::<PaymentDeclined>();
        assert_eq!(view.render(&ErrorCode::NotFound).document.error, "not_found");
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(view.render(&err).document.error, SERVER_ERROR);
    }

    #[test]
    fn test_render_public() {
        let view = ErrorView::default();
        let rendered = view.render_public(&PaymentDeclined);
        assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
        assert_eq!(rendered.document.error, "payment_declined");
        assert!(rendered.document.fields.is_none());
    }

    #[test]
    fn test_registry_accessor() {
        let view = ErrorView::new(StatusRegistry::with_catalog());
        assert_eq!(view.registry().lookup("not_found"), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_opaque_error() {
        let view = ErrorView::default();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "password=hunter2");
        let rendered = view.render(&err);

        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            serde_json::to_value(&rendered.document).unwrap(),
            json!({"error": "server_error"})
        );
    }

    #[test]
    fn test_public_error_defaults_to_bad_request() {
        let view = ErrorView::default();
        let rendered = view.render(&ErrorCode::NotFound);

        assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
        assert_eq!(rendered.document.error, "not_found");
        assert!(rendered.document.fields.is_none());
    }

    #[test]
    fn test_public_error_override() {
        let mut registry = StatusRegistry::new();
        registry.register("too_young", StatusCode::UNPROCESSABLE_ENTITY);
        let view = ErrorView::new(registry);

        assert_eq!(view.render(&too_young()).status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validation_field_override_wins() {
        let mut registry = StatusRegistry::new();
        registry.register("too_young", StatusCode::UNPROCESSABLE_ENTITY);
        let view = ErrorView::new(registry);

        let err = ValidationErrors::new()
            .with("email", invalid_email())
            .with("age", too_young());
        let rendered = view.render(&err);

        assert_eq!(rendered.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            serde_json::to_value(&rendered.document).unwrap(),
            json!({
                "error": "validation_error",
                "fields": {"email": "invalid_email", "age": "too_young"}
            })
        );
    }

    #[test]
    fn test_validation_without_overrides() {
        let view = ErrorView::default();
        let err = ValidationErrors::new().with("email", invalid_email());
        let rendered = view.render(&err);

        assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
        assert_eq!(rendered.document.error, "validation_error");
    }

    #[test]
    fn test_validation_aggregate_override() {
        let mut registry = StatusRegistry::new();
        registry.register("validation_error", StatusCode::UNPROCESSABLE_ENTITY);
        let view = ErrorView::new(registry);

        let err = ValidationErrors::new().with("email", invalid_email());
        assert_eq!(view.render(&err).status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_conflicting_field_overrides_pick_highest() {
        let mut registry = StatusRegistry::new();
        registry.register("invalid_email", StatusCode::CONFLICT);
        registry.register("too_young", StatusCode::UNPROCESSABLE_ENTITY);
        registry.register("not_found", StatusCode::NOT_FOUND);
        let view = ErrorView::new(registry);

        let forward = ValidationErrors::new()
            .with("a", invalid_email())
            .with("b", too_young())
            .with("c", ErrorCode::NotFound);
        let backward = ValidationErrors::new()
            .with("c", invalid_email())
            .with("b", too_young())
            .with("a", ErrorCode::NotFound);

        assert_eq!(view.render(&forward).status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(view.render(&backward).status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_field_override_beats_aggregate_override() {
        let mut registry = StatusRegistry::new();
        registry.register("validation_error", StatusCode::UNPROCESSABLE_ENTITY);
        registry.register("invalid_email", StatusCode::BAD_REQUEST);
        let view = ErrorView::new(registry);

        let err = ValidationErrors::new().with("email", invalid_email());
        assert_eq!(view.render(&err).status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_wrapped_public_error_is_opaque() {
        let view = ErrorView::new(StatusRegistry::with_catalog());
        let err = Wrapper::new("handlers").wrap(ErrorCode::NotFound, "loading user");
        let rendered = view.render(&err);

        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rendered.document.error, SERVER_ERROR);
    }

    #[test]
    fn test_shutdown_renders_as_server_error() {
        let view = ErrorView::default();
        let rendered = view.render(&Shutdown::new("bye"));
        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rendered.document.error, SERVER_ERROR);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut registry = StatusRegistry::new();
        registry.register("too_young", StatusCode::UNPROCESSABLE_ENTITY);
        let view = ErrorView::new(registry);

        let err = ValidationErrors::new()
            .with("email", invalid_email())
            .with("age", too_young());
        assert_eq!(view.render(&err), view.render(&err));
    }

    #[test]
    fn test_render_kind_directly() {
        let view = ErrorView::default();
        let err = too_young();
        let rendered = view.render_kind(ErrorKind::Disclosable(&err));
        assert_eq!(rendered.document.error, "too_young");
        assert_eq!(view.render_kind(ErrorKind::Opaque).document, ErrorDocument::default());
    }

    #[test]
    fn test_into_response_status() {
        let view = ErrorView::new(StatusRegistry::with_catalog());
        let response = view.respond(&ErrorCode::NotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = view.respond(&ErrorCode::ContentTypeNotAccepted);
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
