use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{
    admin_shutdown, create_user, get_user, health, internal_failure, issue_token, AppState,
};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Users
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        // Auth
        .route("/token", post(issue_token))
        .route("/internal", get(internal_failure))
        // Admin endpoints
        .route("/admin/shutdown", post(admin_shutdown))
        // OpenAPI documentation
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
