//! # Overseer Server
//!
//! Serves any [`overseer_http::Handler`] over HTTP/1 using hyper, one task per
//! connection, and sets up `tracing` output for binaries.

pub mod http;
pub mod logging;

pub use http::{DEFAULT_BODY_LIMIT, HttpServer, serve};
pub use logging::init_logging;
