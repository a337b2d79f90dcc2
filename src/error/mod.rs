//! Error handling for the agent-facing surface.
//!
//! - **Error Categories**: high-level classification for retry decisions
//! - **Domain errors**: [`NetworkError`] for transport, [`StreamError`] for
//!   failures after an event stream started
//! - **Unified type**: [`AgentError`] with [`ErrorContext`] attachment
//! - **Result alias**: [`AgentResult<T>`] and [`ResultExt`]
//!
//! The JSON and SSE parsers never return these; they report failure inside
//! their result values.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, timeout | Yes |
//! | Auth | Credentials rejected | No |
//! | Server | Agent 5xx / error events | Yes |
//! | Client | Bad request | No |
//! | Configuration | Missing settings | No |

mod agent_error;
mod category;
mod context;
mod network;
mod result;
mod stream;

pub use agent_error::AgentError;
pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use network::NetworkError;
pub use result::{AgentResult, ResultExt};
pub use stream::StreamError;
