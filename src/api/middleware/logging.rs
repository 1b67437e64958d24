use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Response header carrying the generated request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs every request with a generated request id and tags the response with it.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = sanitize_query(request.uri().query().unwrap_or(""));

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = %query,
        "Incoming request"
    );

    let mut response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis();

    match status_class(status) {
        Some(class) => warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration_ms,
            "Request failed ({})",
            class
        ),
        None => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration_ms,
            "Request completed"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn status_class(status: StatusCode) -> Option<&'static str> {
    if status.is_server_error() {
        Some("server error")
    } else if status.is_client_error() {
        Some("client error")
    } else {
        None
    }
}

/// Mask credential values in a query string
fn sanitize_query(query: &str) -> String {
    const SECRET_KEYS: [&str; 4] = ["api_key", "token", "password", "secret"];

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SECRET_KEYS.contains(&key) => format!("{}=***", key),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}
