//! HTTP primitives for Overseer
//!
//! This crate provides the request and response types shared by every other
//! Overseer crate, the [`Handler`] trait that anything able to answer a request
//! implements, and the HTTP-level error type.
//!
//! ## Quick Start
//!
//! ```
//! use overseer_http::{Request, Response};
//! use hyper::{Method, StatusCode};
//!
//! let request = Request::builder()
//!     .method(Method::GET)
//!     .uri("/admin/person/?page=1")
//!     .build()
//!     .unwrap();
//! assert_eq!(request.query_param("page"), Some("1"));
//!
//! let response = Response::ok().with_html("<h1>Hi</h1>");
//! assert_eq!(response.status, StatusCode::OK);
//! ```

pub mod error;
pub mod handler;
pub mod request;
pub mod response;

pub use error::{Error, Result};
pub use handler::Handler;
pub use request::{Request, RequestBuilder};
pub use response::Response;

pub use hyper::{HeaderMap, Method, StatusCode, Uri};
