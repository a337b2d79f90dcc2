//! Streaming-related error types.

use thiserror::Error;

use crate::traits::HttpError;

use super::category::ErrorCategory;

/// Problems that interrupt an agent event stream after it started.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// The body stopped delivering chunks with a transport error.
    #[error("Stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// No chunk arrived within the request timeout.
    #[error("Stream timed out: {message}")]
    Timeout { message: String },

    /// The agent reported a failure through an event.
    #[error("Agent error ({event_type}): {message}")]
    BackendError { event_type: String, message: String },
}

impl StreamError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::ConnectionLost { .. } | StreamError::Timeout { .. } => ErrorCategory::Network,
            StreamError::BackendError { .. } => ErrorCategory::Server,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::ConnectionLost { .. } | StreamError::Timeout { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "The connection to the verification agent dropped mid-answer.".to_string()
            }
            StreamError::Timeout { .. } => "The verification agent stopped responding.".to_string(),
            StreamError::BackendError { message, .. } => format!("The agent reported: {}", message),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
            StreamError::Timeout { .. } => "E_STREAM_TIMEOUT",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
        }
    }
}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(message) => StreamError::Timeout { message },
            other => StreamError::ConnectionLost {
                message: other.to_string(),
            },
        }
    }
}
