use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{
    codes::MODELS_PREFIX, is_shutdown, EncodedError, ErrorCode, ErrorView, PublicError,
    Shutdown, StatusRegistry, ValidationErrors, Wrapper,
};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

const WRAP: Wrapper = Wrapper::new("handlers");

/// Error text kept from the previous user store
const LEGACY_ACCOUNT_LOCKED: &str = "models: account_locked, account was locked by an administrator";

/// Demo credentials accepted by the token endpoint
const DEMO_USERNAME: &str = "gopher";
const DEMO_PASSWORD: &str = "hunter2";

/// Username and password do not match
#[derive(Debug, thiserror::Error)]
#[error("invalid credentials for user '{username}'")]
pub struct InvalidCredentials {
    username: String,
}

impl PublicError for InvalidCredentials {
    fn public(&self) -> &str {
        "invalid_grant"
    }
}

/// Error view that also discloses the error types defined by the handlers
pub fn build_error_view(registry: StatusRegistry) -> ErrorView {
    ErrorView::new(registry).disclose::<InvalidCredentials>()
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub errors: ErrorView,
    /// Woken when a handler returns a shutdown error
    pub shutdown: Arc<Notify>,
}

impl AppStateInner {
    pub fn new(errors: ErrorView) -> Self {
        Self {
            errors,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Write `err` as the error response, and start a graceful shutdown if it asks for one.
    pub fn fail(&self, err: impl Into<anyhow::Error>) -> Response {
        let err = err.into();
        if is_shutdown(&*err) {
            warn!(error = %err, "Handler requested shutdown");
            self.shutdown.notify_one();
        }
        self.errors.respond(&*err)
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: String,
    pub email: String,
    pub age: u32,
}

/// New user payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Email address, must contain '@'
    pub email: String,
    /// Age in years, must be at least 18
    pub age: u32,
}

/// OAuth token request (form encoded)
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// Only "password" is supported
    pub grant_type: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Issued access token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "error-view",
        "version": env!("CARGO_PKG_VERSION"),
        "error_statuses": state.errors.registry().len(),
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Account locked", body = crate::errors::ErrorDocument),
        (status = 404, description = "User not found", body = crate::errors::ErrorDocument)
    )
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("Get user request: id={}", id);

    match find_user(&id) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => state.fail(e),
    }
}

fn find_user(id: &str) -> anyhow::Result<User> {
    match id {
        "1" => Ok(User {
            id: id.to_string(),
            email: "gopher@example.com".to_string(),
            age: 30,
        }),
        // Locked accounts still carry the old store's error text
        "2" => Err(EncodedError::parse(MODELS_PREFIX, LEGACY_ACCOUNT_LOCKED)?.into()),
        _ => Err(ErrorCode::NotFound.into()),
    }
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid fields", body = crate::errors::ErrorDocument),
        (status = 415, description = "Body is not JSON", body = crate::errors::ErrorDocument)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => {
            return state.fail(ErrorCode::ContentTypeNotAccepted)
        }
        Err(_) => return state.fail(ErrorCode::InvalidFormInput),
    };

    if let Err(e) = validate_user(&req) {
        return state.fail(e);
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        age: req.age,
    };
    info!("Created user: id={}", user.id);

    (StatusCode::CREATED, Json(user)).into_response()
}

fn validate_user(req: &CreateUserRequest) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::new();
    if !req.email.contains('@') {
        errs.add(
            "email",
            EncodedError::new("models", "invalid_email", "email address is not valid"),
        );
    }
    if req.age < 18 {
        errs.add(
            "age",
            EncodedError::new("models", "too_young", "user must be 18 or older"),
        );
    }
    errs.into_result()
}

/// Issue an access token
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Unsupported grant, missing or wrong credentials", body = crate::errors::ErrorDocument),
        (status = 415, description = "Body is not form encoded", body = crate::errors::ErrorDocument)
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    body: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let Form(req) = match body {
        Ok(body) => body,
        Err(FormRejection::InvalidFormContentType(_)) => {
            return state.fail(ErrorCode::ContentTypeNotAccepted)
        }
        Err(_) => return state.fail(ErrorCode::InvalidFormInput),
    };

    if req.grant_type != "password" {
        return state.fail(ErrorCode::GrantTypeNotAccepted);
    }

    let username = req.username.as_deref().unwrap_or("");
    let password = req.password.as_deref().unwrap_or("");

    let mut errs = ValidationErrors::new();
    if username.is_empty() {
        errs.add("username", EncodedError::new("models", "required", "username is required"));
    }
    if password.is_empty() {
        errs.add("password", EncodedError::new("models", "required", "password is required"));
    }
    if let Err(e) = errs.into_result() {
        return state.fail(e);
    }

    if username != DEMO_USERNAME || password != DEMO_PASSWORD {
        return state.fail(InvalidCredentials {
            username: username.to_string(),
        });
    }

    Json(TokenResponse {
        access_token: Uuid::new_v4().to_string(),
        token_type: "bearer".to_string(),
    })
    .into_response()
}

/// Endpoint whose failure is never shown to callers
#[utoipa::path(
    get,
    path = "/internal",
    tag = "debug",
    responses(
        (status = 500, description = "Internal error", body = crate::errors::ErrorDocument)
    )
)]
pub async fn internal_failure(State(state): State<AppState>) -> Response {
    state.fail(WRAP.wrap(ErrorCode::ParseError, "decoding stored profile"))
}

/// Ask the service to shut down gracefully
#[utoipa::path(
    post,
    path = "/admin/shutdown",
    tag = "admin",
    responses(
        (status = 500, description = "Shutdown started", body = crate::errors::ErrorDocument)
    )
)]
pub async fn admin_shutdown(State(state): State<AppState>) -> Response {
    info!("Shutdown requested through admin endpoint");
    state.fail(WRAP.wrap(Shutdown::new("shutdown requested by admin"), "admin shutdown"))
}
