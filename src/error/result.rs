//! Result type alias for agent operations.

use crate::traits::HttpError;

use super::agent_error::AgentError;
use super::context::ErrorContext;

/// Type alias for Results using [`AgentError`].
pub type AgentResult<T> = Result<T, AgentError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> AgentResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> AgentResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T> ResultExt<T> for AgentResult<T> {
    fn context(self, ctx: ErrorContext) -> AgentResult<T> {
        self.map_err(|e| e.with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> AgentResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for Result<T, HttpError> {
    fn context(self, ctx: ErrorContext) -> AgentResult<T> {
        self.map_err(|e| AgentError::from(e).with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> AgentResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| AgentError::from(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_on_ok_is_noop() {
        let result: AgentResult<u8> = Ok(3);
        assert_eq!(result.context(ErrorContext::new("noop")).ok(), Some(3));
    }

    #[test]
    fn test_context_on_http_error() {
        let result: Result<(), HttpError> = Err(HttpError::Cancelled);
        let err = result
            .with_context(|| ErrorContext::new("health_check"))
            .unwrap_err();
        assert_eq!(err.context().map(|c| c.operation.as_str()), Some("health_check"));
        assert_eq!(err.error_code(), "E_NET_CANCELLED");
    }
}
