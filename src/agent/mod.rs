//! Agent call facade.
//!
//! The one place that touches the network. Everything the agent sends back
//! goes through the ingestion pipeline before callers see it:
//!
//! - [`AgentClient::send`] buffers the body and returns an [`AgentReply`]
//!   (never an error)
//! - [`AgentClient::stream`] yields [`ParsedSseEvent`](crate::sse::ParsedSseEvent)s
//!   as frames complete
//! - [`ingest_agent_text`] is the same text-to-reply pipeline without the
//!   network, for bodies obtained elsewhere; [`ingest_agent_body`] also takes
//!   the transport's event-stream label

mod client;
mod reply;
mod request;
mod stream;

pub use client::AgentClient;
pub use reply::{ingest_agent_body, ingest_agent_text, AgentReply};
pub use request::{AgentRequest, AttachmentRef};
pub use stream::{decode_event_stream, EventStream};
