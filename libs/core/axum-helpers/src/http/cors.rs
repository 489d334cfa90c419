use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// CORS layer for the given origins; an empty list allows any origin.
/// Credentials are allowed only with an explicit origin list.
pub fn cors_layer(origins: &[String]) -> io::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let allowed = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    Ok(layer
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_origin_when_empty() {
        assert!(cors_layer(&[]).is_ok());
    }

    #[test]
    fn test_explicit_origins() {
        let origins = vec!["http://localhost:3000".to_string()];
        assert!(cors_layer(&origins).is_ok());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let origins = vec!["http://bad\norigin".to_string()];
        let err = cors_layer(&origins).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
