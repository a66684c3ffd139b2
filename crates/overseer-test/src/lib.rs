//! # Overseer Test
//!
//! In-process test client and rstest fixtures for Overseer applications.
//!
//! [`TestClient`] dispatches requests straight into an
//! [`overseer_apps::Application`] without opening a socket, so handler errors
//! are turned into responses the same way the server does.

pub mod client;
pub mod fixtures;
pub mod response;

pub use client::TestClient;
pub use fixtures::{document_store, sqlite_pool};
pub use response::TestResponse;
