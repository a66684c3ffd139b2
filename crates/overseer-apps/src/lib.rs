//! Host application for Overseer
//!
//! An [`Application`] owns the [`Settings`] and a mount table that maps URL
//! prefixes to [`Handler`]s. Requests are dispatched to the longest prefix
//! that matches on a segment boundary.

mod application;

pub use application::{AppError, Application};
pub use overseer_conf::Settings;
pub use overseer_http::Handler;
