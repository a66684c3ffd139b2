//! Model schema description
//!
//! A [`ModelSchema`] is what a backend knows about its model: the model name,
//! the ordered list of fields and which field labels a record.

use crate::error::{DbError, DbResult};
use serde::Serialize;

/// Semantic kind of a model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldKind {
	/// Single-line string
	String,
	/// Multi-line text
	Text,
	Integer,
	Float,
	Boolean,
	Date,
	DateTime,
	/// Identifies a record of the model named `target`
	Reference { target: String },
}

/// One field of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
	pub name: String,
	pub kind: FieldKind,
	pub required: bool,
	pub primary_key: bool,
	pub max_length: Option<usize>,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			required: false,
			primary_key: false,
			max_length: None,
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self
	}

	pub fn max_length(mut self, max: usize) -> Self {
		self.max_length = Some(max);
		self
	}
}

/// Ordered description of a model's fields
///
/// # Examples
///
/// ```
/// use overseer_db::{FieldDescriptor, FieldKind, ModelSchema};
///
/// let schema = ModelSchema::new("Person")
///     .with_field(FieldDescriptor::new("id", FieldKind::Integer).primary_key())
///     .with_field(FieldDescriptor::new("name", FieldKind::String).max_length(255))
///     .with_display_field("name");
///
/// assert_eq!(schema.primary_key().unwrap().name, "id");
/// assert_eq!(schema.field_names(), ["id", "name"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSchema {
	pub name: String,
	pub fields: Vec<FieldDescriptor>,
	pub display_field: Option<String>,
}

impl ModelSchema {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			fields: Vec::new(),
			display_field: None,
		}
	}

	pub fn with_field(mut self, field: FieldDescriptor) -> Self {
		self.fields.push(field);
		self
	}

	pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
		self.display_field = Some(field.into());
		self
	}

	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn field_names(&self) -> Vec<&str> {
		self.fields.iter().map(|f| f.name.as_str()).collect()
	}

	pub fn primary_keys(&self) -> Vec<&FieldDescriptor> {
		self.fields.iter().filter(|f| f.primary_key).collect()
	}

	/// The single primary-key field
	///
	/// Fails when the model declares zero or several primary-key fields.
	pub fn primary_key(&self) -> DbResult<&FieldDescriptor> {
		match self.primary_keys().as_slice() {
			[pk] => Ok(pk),
			[] => Err(DbError::Schema(format!(
				"Model '{}' has no primary key",
				self.name
			))),
			many => Err(DbError::Schema(format!(
				"Model '{}' has a composite primary key ({})",
				self.name,
				many.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ")
			))),
		}
	}
}

/// Model name for a table: `"user_profile"` becomes `"UserProfile"`
///
/// # Examples
///
/// ```
/// use overseer_db::model_name_from_table;
///
/// assert_eq!(model_name_from_table("model1"), "Model1");
/// assert_eq!(model_name_from_table("user_profile"), "UserProfile");
/// ```
pub fn model_name_from_table(table: &str) -> String {
	table
		.split('_')
		.filter(|part| !part.is_empty())
		.map(|part| {
			let mut chars = part.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_missing_primary_key() {
		// Arrange
		let schema = ModelSchema::new("Tag").with_field(FieldDescriptor::new("label", FieldKind::String));

		// Act
		let result = schema.primary_key();

		// Assert
		assert!(matches!(result, Err(DbError::Schema(msg)) if msg.contains("no primary key")));
	}

	#[rstest]
	fn test_composite_primary_key() {
		// Arrange
		let schema = ModelSchema::new("Membership")
			.with_field(FieldDescriptor::new("user_id", FieldKind::Integer).primary_key())
			.with_field(FieldDescriptor::new("group_id", FieldKind::Integer).primary_key());

		// Act
		let result = schema.primary_key();

		// Assert
		assert!(matches!(result, Err(DbError::Schema(msg)) if msg.contains("user_id, group_id")));
	}
}
