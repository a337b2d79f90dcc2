//! Concrete implementations of trait abstractions.
//!
//! - [`ReqwestHttpClient`] - production HTTP client using reqwest
//! - [`mock::MockHttpClient`] - test double with configurable responses

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
