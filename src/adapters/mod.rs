//! Concrete implementations of trait abstractions.
//!
//! - [`ReqwestHttpClient`] - HTTP transport using reqwest
//! - [`mock::MockHttpClient`] - recording transport for tests

pub mod mock;
pub mod reqwest_http;

pub use mock::MockHttpClient;
pub use reqwest_http::ReqwestHttpClient;
