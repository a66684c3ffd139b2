//! # Overseer Admin
//!
//! Admin registry, pluggable views and model-admin CRUD screens.
//!
//! An [`Admin`] holds an ordered set of views. Each view is attached once,
//! which resolves its name, endpoint and URL and gives it a [`Blueprint`];
//! binding the admin to an [`overseer_apps::Application`] mounts every view.
//! [`ModelAdmin`] provides list, add, edit and delete screens over any
//! [`overseer_db::ModelBackend`].
//!
//! ## Example
//!
//! ```
//! use overseer_admin::{Admin, AdminView, ModelAdminOptions};
//! use overseer_apps::{Application, Settings};
//! use overseer_db::document::{DocField, DocumentBackend, DocumentSchema, DocumentStore};
//! use std::sync::Arc;
//!
//! let app = Application::new(Settings::default().without_csrf());
//! let admin = Admin::builder().app(&app).build().unwrap();
//!
//! let schema = DocumentSchema::new("Person")
//!     .field("name", DocField::string())
//!     .field("age", DocField::int());
//! let people = Arc::new(DocumentBackend::new(DocumentStore::new(), schema));
//! let view = admin.register(people, ModelAdminOptions::new()).unwrap();
//!
//! assert_eq!(view.base().url(), Some("/admin/person"));
//! assert_eq!(app.mounts(), ["/admin", "/admin/person"]);
//! ```

pub mod error;
mod handler;
pub mod index;
pub mod menu;
pub mod model_admin;
pub mod options;
pub mod render;
pub mod routing;
pub mod site;
pub mod view;

pub use error::{AdminError, AdminResult};
pub use index::IndexView;
pub use menu::MenuItem;
pub use model_admin::ModelAdmin;
pub use options::{ModelAdminOptions, ViewOptions};
pub use routing::Expose;
pub use site::{Admin, AdminBuilder};
pub use view::{AdminView, BaseView, Blueprint, ViewRequest};
