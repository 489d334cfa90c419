//! ObjectId path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use bson::oid::ObjectId;

/// Parses a 24-character hex path segment into an [`ObjectId`], rejecting
/// anything else with `400 INVALID_OBJECT_ID` before the handler runs.
///
/// ```ignore
/// async fn get_supplier(ObjectIdPath(id): ObjectIdPath) -> String {
///     id.to_hex()
/// }
///
/// let app = Router::new().route("/suppliers/{id}", get(get_supplier));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ObjectIdPath(pub ObjectId);

impl<S> FromRequestParts<S> for ObjectIdPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        ObjectId::parse_str(&id).map(ObjectIdPath).map_err(|_| {
            AppError::InvalidObjectId(format!(
                "Invalid id: '{}' is not a 24-character hex ObjectId",
                id
            ))
            .into_response()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/items/{id}",
            get(|ObjectIdPath(id): ObjectIdPath| async move { id.to_hex() }),
        )
    }

    #[tokio::test]
    async fn test_valid_object_id() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/items/65f1a2b3c4d5e6f708192a3b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_object_id_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/items/not-an-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
