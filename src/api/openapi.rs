use utoipa::OpenApi;

use crate::api::handlers::{CreateUserRequest, TokenRequest, TokenResponse, User};
use crate::errors::{ErrorCode, ErrorDocument};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Error View Service",
        version = "0.1.0",
        description = "Demo service for the error-view layer. Every failure is rendered as a JSON error document with a public code and, for validation failures, per-field codes.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::get_user,
        crate::api::handlers::create_user,
        crate::api::handlers::issue_token,
        crate::api::handlers::internal_failure,
        crate::api::handlers::admin_shutdown,
    ),
    components(
        schemas(
            ErrorDocument,
            ErrorCode,
            User,
            CreateUserRequest,
            TokenRequest,
            TokenResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User endpoints"),
        (name = "auth", description = "Token endpoints"),
        (name = "debug", description = "Endpoints that always fail internally"),
        (name = "admin", description = "Administrative endpoints"),
    )
)]
pub struct ApiDoc;
