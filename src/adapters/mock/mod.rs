//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP transport with configurable responses and
//!   request recording

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
