use axum::{http::StatusCode, response::Response};

use super::{ErrorCode, ErrorResponse};

/// Fallback for unmatched routes
pub async fn not_found() -> Response {
    ErrorResponse::new(
        ErrorCode::NotFound,
        "The requested resource was not found",
    )
    .into_response_with(StatusCode::NOT_FOUND)
}

/// Fallback for routes that exist with a different method
pub async fn method_not_allowed() -> Response {
    ErrorResponse::new(
        ErrorCode::BadRequest,
        "The HTTP method is not allowed for this resource",
    )
    .into_response_with(StatusCode::METHOD_NOT_ALLOWED)
}
