//! docverify - resilient ingestion of document-verification agent output
//!
//! Turns whatever the agent sends back (clean JSON, JSON buried in prose or
//! code fences, truncated JSON, or server-sent event streams of any of
//! those) into a well-typed [`normalize::NormalizedResponse`] or a sequence
//! of [`sse::ParsedSseEvent`]s, each tagged with the strategy that produced
//! it. Parsing never fails; only the network facade in [`agent`] does.

pub mod adapters;
pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod json;
pub mod logging;
pub mod normalize;
pub mod prelude;
pub mod sse;
pub mod traits;
