//! Transport layer for parkview.
//!
//! Serves the lot API over HTTP via axum.

pub mod http;

pub use http::{ServerConfig, serve};
