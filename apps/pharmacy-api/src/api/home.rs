//! Service index at `/`

use axum::{Json, Router, routing::get};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Endpoints {
    docs: &'static str,
    suppliers: &'static str,
    medicines: &'static str,
    stock: &'static str,
    reports: &'static str,
    health: &'static str,
}

#[derive(Debug, Serialize)]
struct HomeResponse {
    message: &'static str,
    endpoints: Endpoints,
}

pub fn router() -> Router {
    Router::new().route("/", get(home))
}

async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Bem-vindo ao Sistema Farmácia",
        endpoints: Endpoints {
            docs: "/swagger-ui",
            suppliers: "/api/suppliers",
            medicines: "/api/medicines",
            stock: "/api/stock",
            reports: "/api/reports",
            health: "/health",
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_home_lists_endpoints() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Bem-vindo ao Sistema Farmácia");
        assert_eq!(json["endpoints"]["suppliers"], "/api/suppliers");
    }
}
