use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::chat;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Relay
        .route("/api/chat", post(chat::relay_chat))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::REQUEST_ID_HEADER;
    use crate::domain::relay::MockUpstreamConnector;
    use crate::domain::{ChatRelay, ProviderId, ProviderProfile, ProviderRegistry};

    const HELLO_CHUNKS: [&str; 2] = [
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: [DONE]\n",
    ];

    fn registry(openai: Option<&str>, openrouter: Option<&str>) -> ProviderRegistry {
        ProviderRegistry::new([
            ProviderProfile::new(ProviderId::OpenAi).with_secret(openai.map(String::from)),
            ProviderProfile::new(ProviderId::OpenRouter).with_secret(openrouter.map(String::from)),
        ])
    }

    fn app(registry: ProviderRegistry, connector: Arc<MockUpstreamConnector>) -> Router {
        let relay = ChatRelay::new(Arc::new(registry), connector);
        create_router(AppState::new(relay), None)
    }

    fn chat_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_chat_streams_plain_text() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(Some("sk-openai"), None), connector.clone());

        let mut request = chat_request(json!({
            "messages": [{"role": "user", "content": "Hi"}],
            "provider": "openai"
        }));
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, "req-1".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-1");
        assert_eq!(body_text(response).await, "Hello");

        let sent = connector.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://api.openai.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_chat_uses_default_provider() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(Some("sk-openai"), Some("sk-or")), connector.clone());

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Hello");
        assert_eq!(
            connector.requests()[0].url,
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_chat_missing_provider_secret() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(Some("sk-openai"), None), connector.clone());

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Hi"}],
                "provider": "openrouter"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Missing OPENROUTER_API_KEY for selected provider 'openrouter'"})
        );
        assert!(connector.requests().is_empty());
    }

    #[tokio::test]
    async fn test_chat_without_any_secret() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(None, None), connector.clone());

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Provide OPENAI_API_KEY or OPENROUTER_API_KEY"})
        );
        assert!(connector.requests().is_empty());
    }

    #[tokio::test]
    async fn test_chat_upstream_rejection_passes_through() {
        let connector = Arc::new(MockUpstreamConnector::with_rejection(503, "overloaded"));
        let app = app(registry(Some("sk-openai"), None), connector);

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Hi"}],
                "provider": "openai"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_text(response).await, "overloaded");
    }

    #[tokio::test]
    async fn test_chat_transport_failure_is_bad_gateway() {
        let connector = Arc::new(MockUpstreamConnector::with_transport_error(
            "Request failed: connection refused",
        ));
        let app = app(registry(Some("sk-openai"), None), connector);

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Request failed: connection refused"})
        );
    }

    #[tokio::test]
    async fn test_chat_empty_messages() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(Some("sk-openai"), None), connector.clone());

        let response = app
            .oneshot(chat_request(json!({"messages": []})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Messages array is required"})
        );
        assert!(connector.requests().is_empty());
    }

    #[tokio::test]
    async fn test_chat_unknown_provider_rejected() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(Some("sk-openai"), None), connector.clone());

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Hi"}],
                "provider": "anthropic"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON data"));
        assert!(connector.requests().is_empty());
    }

    #[tokio::test]
    async fn test_chat_malformed_json() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(Some("sk-openai"), None), connector);

        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_mid_stream_failure_truncates_body() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks_then_error(
            [HELLO_CHUNKS[0]],
            "Stream error: connection reset",
        ));
        let app = app(registry(Some("sk-openai"), None), connector);

        let response = app
            .oneshot(chat_request(json!({
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Hel");
    }

    #[tokio::test]
    async fn test_ready_reports_provider_checks() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));

        let ready = app(registry(None, Some("sk-or")), connector.clone())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ready.status(), StatusCode::OK);
        assert_eq!(body_json(ready).await["status"], "degraded");

        let not_ready = app(registry(None, None), connector)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_and_live() {
        let connector = Arc::new(MockUpstreamConnector::with_chunks(HELLO_CHUNKS));
        let app = app(registry(None, None), connector);

        let health = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(body_json(health).await["status"], "healthy");

        let live = app
            .oneshot(Request::get("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(live.status(), StatusCode::OK);
    }
}
