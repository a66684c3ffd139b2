//! Forms for Overseer
//!
//! A [`Form`] is an ordered list of [`FormField`]s bound to raw submitted
//! strings. Validation cleans each value into a typed `serde_json::Value` and
//! collects per-field error messages.
//!
//! ## Quick Start
//!
//! ```
//! use overseer_forms::{FieldKind, Form, FormField};
//! use std::collections::HashMap;
//! use serde_json::json;
//!
//! let mut form = Form::new(vec![
//!     FormField::new("name", FieldKind::TextLine).with_max_length(20),
//!     FormField::new("age", FieldKind::Integer).required(),
//! ]);
//! form.bind(HashMap::from([
//!     ("name".to_string(), "Steve".to_string()),
//!     ("age".to_string(), "0".to_string()),
//! ]));
//!
//! assert!(form.is_valid());
//! assert_eq!(form.cleaned_data()["age"], json!(0));
//! ```

pub mod csrf;
pub mod field;
pub mod form;
pub mod widget;

pub use csrf::{CSRF_FIELD_NAME, CsrfTokens};
pub use field::{FieldError, FieldKind, FieldResult, FormField, Validator, humanize};
pub use form::{ALL_FIELDS_KEY, Form};
pub use widget::{display_value, escape};
