//! Error context for enriched error information.

use chrono::{DateTime, Utc};
use std::fmt;

/// Where and when an error happened, attached via
/// [`AgentError::with_context`](super::AgentError::with_context).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Correlation id of the agent request, if any.
    pub request_id: Option<String>,

    /// Document under verification, if known.
    pub document_id: Option<String>,

    /// Component/module where the error originated.
    pub component: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            request_id: None,
            document_id: None,
            component: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Formatted `key=value` pairs suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref request_id) = self.request_id {
            parts.push(format!("request_id={}", request_id));
        }
        if let Some(ref document_id) = self.document_id {
            parts.push(format!("document_id={}", document_id));
        }
        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));
        parts.join(" ")
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        if let Some(ref request_id) = self.request_id {
            write!(f, " [request {}]", request_id)?;
        }
        if let Some(ref document_id) = self.document_id {
            write!(f, " [document {}]", document_id)?;
        }
        Ok(())
    }
}
