//! Unified error type for the agent-facing surface.

use thiserror::Error;

use crate::traits::HttpError;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::stream::StreamError;

/// Every fallible operation of the crate returns this.
///
/// Parsing never produces one; failures there are reported inside
/// [`ParseResult`](crate::json::ParseResult). Only transport and
/// configuration paths do.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{error} ({context})")]
    WithContext {
        #[source]
        error: Box<AgentError>,
        context: ErrorContext,
    },
}

impl AgentError {
    pub fn config(message: impl Into<String>) -> Self {
        AgentError::Config {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AgentError::Network(err) => err.category(),
            AgentError::Stream(err) => err.category(),
            AgentError::Config { .. } => ErrorCategory::Configuration,
            AgentError::InvalidRequest { .. } => ErrorCategory::Client,
            AgentError::WithContext { error, .. } => error.category(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Network(err) => err.is_retryable(),
            AgentError::Stream(err) => err.is_retryable(),
            AgentError::Config { .. } | AgentError::InvalidRequest { .. } => false,
            AgentError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Message suitable for showing to a person rather than a log.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Network(err) => err.user_message(),
            AgentError::Stream(err) => err.user_message(),
            AgentError::Config { message } => format!("Configuration problem: {}", message),
            AgentError::InvalidRequest { message } => format!("Could not build the request: {}", message),
            AgentError::WithContext { error, context } => {
                format!("{}\n\nContext: {}", error.user_message(), context)
            }
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Network(err) => err.error_code(),
            AgentError::Stream(err) => err.error_code(),
            AgentError::Config { .. } => "E_CONFIG",
            AgentError::InvalidRequest { .. } => "E_REQUEST",
            AgentError::WithContext { error, .. } => error.error_code(),
        }
    }

    pub fn with_context(self, ctx: ErrorContext) -> Self {
        AgentError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// The outermost attached context, if any.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            AgentError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The error with all context layers removed.
    pub fn inner(&self) -> &AgentError {
        match self {
            AgentError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl From<HttpError> for AgentError {
    fn from(err: HttpError) -> Self {
        AgentError::Network(err.into())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::InvalidRequest {
            message: err.to_string(),
        }
    }
}
