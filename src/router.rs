use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route("/api/vendors", get(handlers::generate::list_vendors))
        .route("/api/validate", post(handlers::generate::validate_config))
        .route("/api/generate", post(handlers::generate::generate_config))
        .route("/api/generate/raw", post(handlers::generate::generate_raw))
        .route("/api/pair", post(handlers::generate::generate_pair))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::render::{BundledTemplates, Renderer};
    use crate::services::generation::GenerationService;
    use crate::synthesis::tests::rack1_request;
    use crate::validation::tests::rack1_pair;

    fn app() -> Router {
        let renderer = Renderer::new(Arc::new(BundledTemplates::new()));
        build(Arc::new(AppState {
            generator: GenerationService::new(renderer),
        }))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "torforge");
    }

    #[tokio::test]
    async fn test_vendors() {
        let response = app()
            .oneshot(Request::builder().uri("/api/vendors").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body, json!(["cisco/nxos", "dellemc/os10"]));
    }

    #[tokio::test]
    async fn test_validate_reports_errors() {
        let response = app()
            .oneshot(post("/api/validate", json!({ "config": { "vlans": [] } })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["errors"][0]["path"], "switch");
        assert_eq!(body["errors"][0]["type"], "schema");
    }

    #[tokio::test]
    async fn test_generate_and_raw() {
        let (tor1, _) = rack1_pair();
        let document = serde_json::to_value(&tor1).unwrap();

        let response = app()
            .oneshot(post("/api/generate", json!({ "config": document.clone() })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["filename"], "rack1-tor1.cfg");

        let response = app()
            .oneshot(post("/api/generate/raw", json!({ "config": document })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"rack1-tor1.cfg\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("hostname rack1-tor1"));
    }

    #[tokio::test]
    async fn test_generate_raw_rejects_invalid() {
        let response = app()
            .oneshot(post("/api/generate/raw", json!({ "config": {} })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Validation failed"));
    }

    #[tokio::test]
    async fn test_pair() {
        let request = serde_json::to_value(rack1_request()).unwrap();
        let response = app().oneshot(post("/api/pair", request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["tor2"]["config"]["switch"]["hostname"], "rack1-tor2");
        assert!(body.get("bmc").is_none());
    }

    #[tokio::test]
    async fn test_pair_with_bmc() {
        let mut request = serde_json::to_value(rack1_request()).unwrap();
        request["bmc"] = json!({});
        let response = app().oneshot(post("/api/pair", request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["bmc"]["role"], "BMC");
        assert_eq!(body["bmc"]["cfg_filename"], "rack1-bmc.cfg");
    }

    #[tokio::test]
    async fn test_pair_ambiguity_is_unprocessable() {
        let mut request = rack1_request();
        request.tor1.loopback_ip = None;
        let response = app()
            .oneshot(post("/api/pair", serde_json::to_value(request).unwrap()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("loopback_ip"));
    }
}
