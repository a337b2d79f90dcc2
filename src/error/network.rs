//! Network-related error types.

use thiserror::Error;

use crate::traits::HttpError;

use super::category::ErrorCategory;

/// Failures talking to the agent endpoint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Rate limited by agent")]
    RateLimited,

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NetworkError::HttpStatus { status, .. } => match status {
                401 | 403 => ErrorCategory::Auth,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            NetworkError::RateLimited => ErrorCategory::Server,
            NetworkError::InvalidUrl { .. } => ErrorCategory::Configuration,
            NetworkError::Cancelled => ErrorCategory::Client,
            _ => ErrorCategory::Network,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Could not reach the verification agent.".to_string()
            }
            NetworkError::Timeout { .. } => "The verification agent took too long to answer.".to_string(),
            NetworkError::HttpStatus { status, .. } if *status == 401 || *status == 403 => {
                "The verification agent rejected our credentials.".to_string()
            }
            NetworkError::HttpStatus { status, .. } => {
                format!("The verification agent answered with HTTP {}.", status)
            }
            NetworkError::RateLimited => "Too many requests. Slow down and retry.".to_string(),
            NetworkError::InvalidUrl { url } => format!("The agent URL is invalid: {}", url),
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network problem: {}", message),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::RateLimited => "E_NET_RATE",
            NetworkError::InvalidUrl { .. } => "E_NET_URL",
            NetworkError::Cancelled => "E_NET_CANCELLED",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl From<HttpError> for NetworkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed { message },
            HttpError::Timeout(message) => NetworkError::Timeout { message },
            HttpError::ServerError { status: 429, .. } => NetworkError::RateLimited,
            HttpError::ServerError { status, message } => NetworkError::HttpStatus { status, message },
            HttpError::Cancelled => NetworkError::Cancelled,
            HttpError::InvalidUrl(url) => NetworkError::InvalidUrl { url },
            HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
        }
    }
}
