//! Trait abstractions at the seams of the credential layer.
//!
//! - [`HttpClient`] - HTTP transport used by both API clients
//! - [`Reloadable`] - clients whose credential the watcher can replace
//! - [`RobotApi`] - bare-metal API operations, cached or not

pub mod http;
pub mod reloadable;
pub mod robot;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use reloadable::{ApplyOutcome, Reloadable};
pub use robot::RobotApi;
