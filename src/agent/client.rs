//! Client for the remote verification agent.
//!
//! Provides buffered calls that always yield a normalized reply, streaming
//! calls that yield parsed events, and a health probe.

use tracing::{debug, info, warn};

use crate::adapters::ReqwestHttpClient;
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult, ErrorContext, NetworkError, ResultExt};
use crate::normalize::NormalizedResponse;
use crate::traits::{Headers, HttpClient};

use super::reply::{ingest_agent_body, AgentReply};
use super::request::{AgentRequest, AttachmentRef};
use super::stream::{decode_event_stream, EventStream};

/// Client for interacting with the verification agent.
pub struct AgentClient<C: HttpClient> {
    config: AgentConfig,
    http: C,
}

impl AgentClient<ReqwestHttpClient> {
    /// Validate `config` and build a client over reqwest with its timeout.
    pub fn from_config(config: AgentConfig) -> AgentResult<Self> {
        config
            .validate()
            .context(ErrorContext::new("build agent client").with_component("config"))?;
        let http = ReqwestHttpClient::with_timeout(config.request_timeout());
        Ok(Self::new(config, http))
    }
}

impl<C: HttpClient> AgentClient<C> {
    pub fn new(config: AgentConfig, http: C) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn headers(&self, accept: &str) -> Headers {
        let mut headers = self.config.headers();
        headers.insert("Accept".to_string(), accept.to_string());
        headers
    }

    /// Send a request and wait for the whole reply.
    ///
    /// Never fails: transport problems and non-2xx statuses come back as an
    /// error-status [`NormalizedResponse`].
    pub async fn send(&self, request: &AgentRequest) -> AgentReply {
        let url = self.config.message_url();
        let ctx = ErrorContext::new("send agent request")
            .with_request_id(request.request_id.clone())
            .with_component("agent");
        info!(
            request_id = %request.request_id,
            attachments = request.attachments.len(),
            "sending agent request"
        );

        let body = match serde_json::to_string(request) {
            Ok(body) => body,
            Err(e) => {
                warn!(context = %ctx.to_log_string(), error = %e, "failed to encode agent request");
                return AgentReply::failure(format!("Could not encode request: {}", e));
            }
        };

        let response = match self
            .http
            .post(&url, &body, &self.headers("application/json, text/event-stream"))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = NetworkError::from(e);
                warn!(
                    context = %ctx.to_log_string(),
                    code = err.error_code(),
                    error = %err,
                    "agent request failed"
                );
                return AgentReply::failure(format!("Agent request failed: {}", err));
            }
        };

        let raw = response.text_lossy();
        let mut reply = ingest_agent_body(&raw, Some(&request.request_id), response.is_event_stream());

        if !response.is_success() {
            warn!(context = %ctx.to_log_string(), status = response.status, "agent returned error status");
            if reply.response.is_success() {
                let err = NetworkError::HttpStatus {
                    status: response.status,
                    message: String::new(),
                };
                reply.response = NormalizedResponse::error(err.user_message());
            }
        }

        info!(
            request_id = %request.request_id,
            status = ?reply.response.status,
            strategy = reply.strategy.as_str(),
            "agent request finished"
        );
        reply
    }

    /// Convenience wrapper over [`send`](Self::send) with a fresh request id.
    pub async fn send_message(&self, message: &str, attachments: Vec<AttachmentRef>) -> AgentReply {
        let request = AgentRequest::new(message).with_attachments(attachments);
        self.send(&request).await
    }

    /// Start a streaming request and return its events as they arrive.
    ///
    /// Fails only if the stream could not be opened (connection refused,
    /// non-2xx status). Later problems arrive as `stream_error` events.
    pub async fn stream(&self, request: &AgentRequest) -> AgentResult<EventStream> {
        let url = self.config.stream_url();
        let ctx = || {
            ErrorContext::new("open agent stream")
                .with_request_id(request.request_id.clone())
                .with_component("agent")
        };

        let body = serde_json::to_string(request)
            .map_err(AgentError::from)
            .with_context(ctx)?;

        info!(request_id = %request.request_id, "opening agent stream");
        let bytes = self
            .http
            .post_stream(&url, &body, &self.headers("text/event-stream"))
            .await
            .with_context(ctx)?;

        Ok(decode_event_stream(bytes, Some(request.request_id.clone())))
    }

    /// Check if the agent's health endpoint answers with 2xx.
    pub async fn health_check(&self) -> bool {
        let url = self.config.health_url();
        match self.http.get(&url, &self.headers("application/json")).await {
            Ok(response) => {
                debug!(status = response.status, "agent health check");
                response.is_success()
            }
            Err(e) => {
                debug!(error = %e, "agent health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::json::ParseStrategy;
    use crate::normalize::ResponseStatus;
    use crate::traits::{HttpError, Response};
    use futures::StreamExt;
    use serde_json::json;

    fn mock_client() -> (AgentClient<MockHttpClient>, MockHttpClient) {
        let mock = MockHttpClient::new();
        let config = AgentConfig::default()
            .with_base_url("http://agent.test")
            .with_api_key("secret");
        (AgentClient::new(config, mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_send_posts_request_and_normalizes() {
        let (client, mock) = mock_client();
        mock.set_response(
            "http://agent.test/v1/messages",
            MockResponse::text(r#"{"status":"success","result":{"match":true}}"#),
        );

        let request = AgentRequest::new("Verify")
            .with_request_id("req-1")
            .with_attachment(AttachmentRef::new("doc-1"));
        let reply = client.send(&request).await;

        assert!(reply.is_success());
        assert_eq!(reply.response.result.get("match"), Some(&json!(true)));

        let requests = mock.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].headers.get("Authorization").map(String::as_str),
            Some("Bearer secret")
        );
        let body: serde_json::Value =
            serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["request_id"], "req-1");
        assert_eq!(body["attachments"][0]["id"], "doc-1");
    }

    #[tokio::test]
    async fn test_send_transport_failure_is_error_reply() {
        let (client, mock) = mock_client();
        mock.set_default_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));

        let reply = client.send_message("Verify", Vec::new()).await;
        assert_eq!(reply.response.status, ResponseStatus::Error);
        assert_eq!(
            reply.response.message.as_deref(),
            Some("Agent request failed: Connection failed: refused")
        );
        assert_eq!(reply.strategy, ParseStrategy::None);
    }

    #[tokio::test]
    async fn test_send_error_status_overrides_success_body() {
        let (client, mock) = mock_client();
        mock.set_default_response(MockResponse::Success(Response::new(502, "Bad Gateway")));

        let reply = client.send_message("Verify", Vec::new()).await;
        assert_eq!(reply.response.status, ResponseStatus::Error);
        assert_eq!(
            reply.response.message.as_deref(),
            Some("The verification agent answered with HTTP 502.")
        );
        assert_eq!(reply.raw, "Bad Gateway");
    }

    #[tokio::test]
    async fn test_send_error_status_keeps_agent_error_message() {
        let (client, mock) = mock_client();
        mock.set_default_response(MockResponse::Success(Response::new(
            422,
            r#"{"status":"error","message":"Unsupported file type"}"#,
        )));

        let reply = client.send_message("Verify", Vec::new()).await;
        assert_eq!(reply.response.message.as_deref(), Some("Unsupported file type"));
    }

    #[tokio::test]
    async fn test_send_honours_event_stream_content_type() {
        let (client, mock) = mock_client();
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "text/event-stream".to_string());
        let body = "\n\nx-trace: abc\ndata: {\"result\":{\"page\":1}}\n\n\
                    data: {\"result\":{\"page\":2}}\n\ndata: [DONE]\n\n";
        mock.set_default_response(MockResponse::Success(Response::with_headers(200, headers, body)));

        let reply = client.send_message("Verify", Vec::new()).await;
        assert!(reply.is_success());
        assert_eq!(reply.response.result.get("page"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_stream_yields_events() {
        let (client, mock) = mock_client();
        mock.set_response(
            "http://agent.test/v1/messages/stream",
            MockResponse::chunks(&["data: {\"message\":\"reading\"}\n\n", "data: [DONE]\n\n"]),
        );

        let request = AgentRequest::new("Verify").with_request_id("req-9");
        let events: Vec<_> = client.stream(&request).await.unwrap().collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].field_str("request_id"), Some("req-9"));
        assert!(events[1].is_done());
        assert_eq!(
            mock.get_requests()[0].headers.get("Accept").map(String::as_str),
            Some("text/event-stream")
        );
    }

    #[tokio::test]
    async fn test_stream_open_failure_carries_context() {
        let (client, mock) = mock_client();
        mock.set_default_response(MockResponse::Success(Response::new(401, "unauthorized")));

        let request = AgentRequest::new("Verify").with_request_id("req-3");
        let err = match client.stream(&request).await {
            Ok(_) => panic!("expected stream to fail"),
            Err(err) => err,
        };
        assert_eq!(err.category(), crate::error::ErrorCategory::Auth);
        assert_eq!(
            err.context().and_then(|c| c.request_id.as_deref()),
            Some("req-3")
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        let (client, mock) = mock_client();
        mock.set_response("http://agent.test/health", MockResponse::text("ok"));
        assert!(client.health_check().await);

        let (client, mock) = mock_client();
        mock.set_default_response(MockResponse::Error(HttpError::Timeout("1s".to_string())));
        assert!(!client.health_check().await);
    }

    #[test]
    fn test_from_config_rejects_invalid_url() {
        let result = AgentClient::from_config(AgentConfig::default().with_base_url("ftp://x"));
        assert!(result.is_err());
    }
}
