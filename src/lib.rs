//! # Overseer
//!
//! Generates an administrative web interface from model descriptions: list,
//! search, create, edit and delete screens over relational tables, document
//! collections and typed Rust models, grouped under one menu.
//!
//! This crate re-exports the workspace crates under one namespace:
//!
//! - [`http`]: request, response and the [`Handler`] trait
//! - [`conf`]: layered settings
//! - [`apps`]: the host [`Application`] views mount on
//! - [`forms`]: form fields, validation and CSRF tokens
//! - [`db`]: model schemas and the storage backends
//! - [`admin`]: the admin registry, views and model-admin screens
//! - [`server`]: the HTTP/1 server and logging setup
//!
//! ## Example
//!
//! ```
//! use overseer::prelude::*;
//! use overseer::db::document::{DocField, DocumentBackend, DocumentSchema, DocumentStore};
//! use std::sync::Arc;
//!
//! let app = Application::new(Settings::default());
//! let admin = Admin::builder().app(&app).build().unwrap();
//! let schema = DocumentSchema::new("Note").field("title", DocField::string().required());
//! admin
//!     .register(
//!         Arc::new(DocumentBackend::new(DocumentStore::new(), schema)),
//!         ModelAdminOptions::new().search_fields(["title"]),
//!     )
//!     .unwrap();
//! assert_eq!(app.mounts(), ["/admin", "/admin/note"]);
//! ```

pub use overseer_admin as admin;
pub use overseer_apps as apps;
pub use overseer_conf as conf;
pub use overseer_db as db;
pub use overseer_forms as forms;
pub use overseer_http as http;
pub use overseer_server as server;

pub use overseer_admin::{Admin, AdminError, AdminView, BaseView, Expose, ModelAdmin, ModelAdminOptions, ViewOptions};
pub use overseer_apps::Application;
pub use overseer_conf::Settings;
pub use overseer_http::{Handler, Request, Response};

/// Common imports for building an admin
pub mod prelude {
	pub use crate::{
		Admin, AdminError, AdminView, Application, BaseView, Expose, Handler, ModelAdmin, ModelAdminOptions, Request,
		Response, Settings, ViewOptions,
	};
	pub use overseer_admin::{AdminResult, ViewRequest};
	pub use overseer_db::{ListQuery, ModelBackend, SortKey};

	// External
	pub use async_trait::async_trait;
}
