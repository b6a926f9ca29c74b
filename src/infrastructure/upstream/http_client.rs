use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::warn;

use crate::config::UpstreamConfig;
use crate::domain::{ByteStream, RelayError, UpstreamConnector, UpstreamRequest};
use crate::infrastructure::observability::truncate_for_log;

/// Upstream connector using reqwest
#[derive(Debug, Clone)]
pub struct HttpUpstreamConnector {
    client: reqwest::Client,
    idle_read_timeout: Option<Duration>,
}

impl HttpUpstreamConnector {
    pub fn new(config: &UpstreamConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| {
                RelayError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        let idle_read_timeout = match config.idle_read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            client,
            idle_read_timeout,
        })
    }

    pub fn with_idle_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_read_timeout = timeout;
        self
    }
}

#[async_trait]
impl UpstreamConnector for HttpUpstreamConnector {
    async fn send(&self, request: UpstreamRequest) -> Result<ByteStream, RelayError> {
        let mut builder = self.client.post(&request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let pending = builder.json(&request.body).send();

        // The idle limit also bounds the wait for response headers
        let sent = match self.idle_read_timeout {
            Some(idle) => tokio::time::timeout(idle, pending).await.map_err(|_| {
                RelayError::transport(format!(
                    "No response headers from upstream within {}s",
                    idle.as_secs_f64()
                ))
            })?,
            None => pending.await,
        };

        let response =
            sent.map_err(|e| RelayError::transport(format!("Request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::NO_CONTENT {
            warn!("Upstream answered 204 with no body to stream");
            return Err(RelayError::transport("Upstream returned no content"));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %truncate_for_log(&error_body, 500),
                "Upstream rejected request"
            );
            return Err(RelayError::upstream_rejection(status.as_u16(), error_body));
        }

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| RelayError::transport(format!("Stream error: {}", e)))
        });

        Ok(match self.idle_read_timeout {
            Some(idle) => limit_idle(stream, idle),
            None => Box::pin(stream),
        })
    }
}

/// End the body with a transport error when no read completes within `idle`
fn limit_idle<S>(stream: S, idle: Duration) -> ByteStream
where
    S: Stream<Item = Result<Bytes, RelayError>> + Send + 'static,
{
    let stream = tokio_stream::StreamExt::timeout(stream, idle).map(move |item| match item {
        Ok(chunk) => chunk,
        Err(_) => Err(RelayError::transport(format!(
            "No data from upstream for {}s",
            idle.as_secs_f64()
        ))),
    });

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConversationMessage, OutputStream, ProviderId, ProviderProfile, RequestBuilder};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: [DONE]\n\n";

    fn request_for(server: &MockServer, provider: ProviderId) -> UpstreamRequest {
        let profile = ProviderProfile::new(provider)
            .with_secret(Some("sk-test".to_string()))
            .with_base_url(format!("{}/v1", server.uri()));

        RequestBuilder::new(&profile)
            .build(&[ConversationMessage::user("Hi")], None)
            .unwrap()
    }

    fn connector() -> HttpUpstreamConnector {
        HttpUpstreamConnector::new(&UpstreamConfig::default()).unwrap()
    }

    async fn send_err(connector: &HttpUpstreamConnector, request: UpstreamRequest) -> RelayError {
        match connector.send(request).await {
            Ok(_) => panic!("expected the upstream call to fail"),
            Err(e) => e,
        }
    }

    #[tokio::test]
    async fn test_streams_successful_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "stream": true,
                "messages": [{ "role": "user", "content": "Hi" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let body = connector()
            .send(request_for(&server, ProviderId::OpenAi))
            .await
            .unwrap();

        assert_eq!(OutputStream::new(body).collect_text().await, "Hello");
    }

    #[tokio::test]
    async fn test_sends_openrouter_attribution_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("HTTP-Referer", "https://localhost"))
            .and(header("X-Title", "REKA-POC"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let body = connector()
            .send(request_for(&server, ProviderId::OpenRouter))
            .await
            .unwrap();

        assert_eq!(OutputStream::new(body).collect_text().await, "Hello");
    }

    #[tokio::test]
    async fn test_rejection_passes_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = send_err(&connector(), request_for(&server, ProviderId::OpenAi)).await;

        match err {
            RelayError::UpstreamRejection { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_with_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = send_err(&connector(), request_for(&server, ProviderId::OpenAi)).await;

        assert!(matches!(
            err,
            RelayError::UpstreamRejection { status: 401, ref body } if body == "Upstream error"
        ));
    }

    #[tokio::test]
    async fn test_no_content_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = send_err(&connector(), request_for(&server, ProviderId::OpenAi)).await;

        assert!(matches!(
            err,
            RelayError::Transport { ref message } if message == "Upstream returned no content"
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let profile = ProviderProfile::new(ProviderId::OpenAi)
            .with_secret(Some("sk-test".to_string()))
            .with_base_url(format!("http://{}/v1", addr));
        let request = RequestBuilder::new(&profile)
            .build(&[ConversationMessage::user("Hi")], None)
            .unwrap();

        let err = send_err(&connector(), request).await;
        assert!(matches!(
            err,
            RelayError::Transport { ref message } if message.starts_with("Request failed")
        ));
    }

    #[tokio::test]
    async fn test_slow_response_headers_are_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(SSE_BODY, "text/event-stream")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let connector = connector().with_idle_read_timeout(Some(Duration::from_millis(50)));
        let err = send_err(&connector, request_for(&server, ProviderId::OpenAi)).await;

        assert!(matches!(
            err,
            RelayError::Transport { ref message } if message.starts_with("No response headers")
        ));
    }

    #[tokio::test]
    async fn test_idle_limit_fails_stalled_stream() {
        let stalled = futures::stream::iter(vec![Ok(Bytes::from_static(b"data: x\n"))])
            .chain(futures::stream::pending());

        let items: Vec<_> = limit_idle(stalled, Duration::from_millis(20))
            .take(2)
            .collect()
            .await;

        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(RelayError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_streams_with_idle_timeout_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(SSE_BODY, "text/event-stream")
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&server)
            .await;

        let body = connector()
            .with_idle_read_timeout(Some(Duration::from_secs(5)))
            .send(request_for(&server, ProviderId::OpenAi))
            .await
            .unwrap();

        assert_eq!(OutputStream::new(body).collect_text().await, "Hello");
    }
}
