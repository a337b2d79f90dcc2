//! Error category classification for unified error handling.

use std::fmt;

/// High-level categorization of errors for handling decisions.
///
/// Categories drive retry policy and how much of the failure is shown to
/// the person running the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout. Generally transient.
    Network,

    /// The agent rejected our credentials.
    Auth,

    /// Agent-side failure (HTTP 5xx, error events). Retry after a delay.
    Server,

    /// We sent something the agent could not accept, or mishandled a reply.
    Client,

    /// Missing or invalid settings. Not retryable until fixed.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the agent endpoint is reachable and try again.",
            ErrorCategory::Auth => "Check DOCVERIFY_API_KEY.",
            ErrorCategory::Server => "The agent had a problem. Wait a moment and retry.",
            ErrorCategory::Client => "The request was rejected. Check the message and attachments.",
            ErrorCategory::Configuration => "Check the DOCVERIFY_* environment variables.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
