//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP transport used by the agent facade

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
