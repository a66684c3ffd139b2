//! Storage backends for Overseer
//!
//! Every backend implements [`ModelBackend`]: it describes its model through a
//! [`ModelSchema`] (an ordered list of fields with their semantic kind and
//! constraints) and offers list, get, insert, update and delete primitives
//! over dynamic [`Record`]s.
//!
//! Three backends are provided:
//!
//! - [`sql::SqlTable`]: a SQLite table reached through `sqlx`, its schema
//!   reflected from the database
//! - [`document::DocumentBackend`]: a schema-declared collection in an
//!   in-process [`document::DocumentStore`]
//! - [`typed::TypedBackend`]: statically typed structs implementing
//!   [`typed::Model`]

pub mod backend;
pub mod document;
pub mod error;
mod memory;
pub mod query;
pub mod schema;
pub mod sql;
pub mod typed;

pub use backend::{ModelBackend, Record, default_label, pk_to_string};
pub use error::{DbError, DbResult};
pub use query::{ListQuery, Page, Search, SortKey};
pub use schema::{FieldDescriptor, FieldKind, ModelSchema, model_name_from_table};
