//! Document backend
//!
//! Documents are JSON objects kept in named collections of an in-process
//! [`DocumentStore`]. A [`DocumentSchema`] declares the fields a collection
//! holds; [`DocumentBackend`] checks every write against it.

use crate::backend::{ModelBackend, Record};
use crate::error::{DbError, DbResult};
use crate::memory::run_list_query;
use crate::query::{ListQuery, Page};
use crate::schema::{FieldDescriptor, FieldKind, ModelSchema};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the id field every document carries
pub const ID_FIELD: &str = "id";

type Collection = IndexMap<String, Record>;

/// In-process document database
///
/// Cloning yields another handle to the same collections. Each operation runs
/// under a single lock acquisition.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
	collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl DocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store `document` and return its id
	///
	/// A fresh id is generated unless the document already carries one.
	pub fn insert_one(&self, collection: &str, mut document: Record) -> String {
		let id = match document.get(ID_FIELD) {
			Some(Value::String(id)) if !id.is_empty() => id.clone(),
			_ => uuid::Uuid::new_v4().simple().to_string(),
		};
		document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
		self.collections
			.write()
			.entry(collection.to_string())
			.or_default()
			.insert(id.clone(), document);
		id
	}

	pub fn find_one(&self, collection: &str, id: &str) -> Option<Record> {
		self.collections
			.read()
			.get(collection)
			.and_then(|c| c.get(id))
			.cloned()
	}

	/// Every document of `collection` in insertion order
	pub fn find_many(&self, collection: &str) -> Vec<Record> {
		self.collections
			.read()
			.get(collection)
			.map(|c| c.values().cloned().collect())
			.unwrap_or_default()
	}

	/// Set the fields `merge` derives from the stored document
	///
	/// Reading and writing happen under one write lock, so no other write can
	/// land in between. An error from `merge` leaves the document untouched.
	pub fn update_with<E>(
		&self,
		collection: &str,
		id: &str,
		merge: impl FnOnce(&Record) -> Result<Record, E>,
	) -> Result<bool, E> {
		let mut collections = self.collections.write();
		let Some(document) = collections.get_mut(collection).and_then(|c| c.get_mut(id)) else {
			return Ok(false);
		};
		for (key, value) in merge(document)? {
			if key != ID_FIELD {
				document.insert(key, value);
			}
		}
		Ok(true)
	}

	pub fn delete_one(&self, collection: &str, id: &str) -> bool {
		self.collections
			.write()
			.get_mut(collection)
			.and_then(|c| c.shift_remove(id))
			.is_some()
	}

	pub fn count_documents(&self, collection: &str) -> u64 {
		self.collections
			.read()
			.get(collection)
			.map_or(0, |c| c.len() as u64)
	}
}

/// Declaration of one document field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocField {
	kind: FieldKind,
	required: bool,
	max_length: Option<usize>,
}

impl DocField {
	fn of(kind: FieldKind) -> Self {
		Self {
			kind,
			required: false,
			max_length: None,
		}
	}

	/// Free-form string; becomes single-line once bounded by [`DocField::max_length`]
	pub fn string() -> Self {
		Self::of(FieldKind::Text)
	}

	pub fn int() -> Self {
		Self::of(FieldKind::Integer)
	}

	pub fn float() -> Self {
		Self::of(FieldKind::Float)
	}

	pub fn boolean() -> Self {
		Self::of(FieldKind::Boolean)
	}

	pub fn datetime() -> Self {
		Self::of(FieldKind::DateTime)
	}

	/// Id of a document of the model named `model`
	pub fn reference(model: impl Into<String>) -> Self {
		Self::of(FieldKind::Reference {
			target: model.into(),
		})
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn max_length(mut self, max: usize) -> Self {
		self.max_length = Some(max);
		if self.kind == FieldKind::Text {
			self.kind = FieldKind::String;
		}
		self
	}
}

/// Declared shape of a document model
///
/// # Examples
///
/// ```
/// use overseer_db::FieldKind;
/// use overseer_db::document::{DocField, DocumentSchema};
///
/// let schema = DocumentSchema::new("Person")
///     .field("name", DocField::string().max_length(20).required())
///     .field("bio", DocField::string())
///     .display_field("name");
///
/// let schema = schema.into_model_schema();
/// assert_eq!(schema.field("name").unwrap().kind, FieldKind::String);
/// assert_eq!(schema.field("bio").unwrap().kind, FieldKind::Text);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentSchema {
	name: String,
	collection: String,
	fields: Vec<(String, DocField)>,
	display_field: Option<String>,
}

impl DocumentSchema {
	/// The collection defaults to the lowercased model name
	pub fn new(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			collection: name.to_lowercase(),
			name,
			fields: Vec::new(),
			display_field: None,
		}
	}

	pub fn collection(mut self, collection: impl Into<String>) -> Self {
		self.collection = collection.into();
		self
	}

	pub fn field(mut self, name: impl Into<String>, field: DocField) -> Self {
		self.fields.push((name.into(), field));
		self
	}

	pub fn display_field(mut self, name: impl Into<String>) -> Self {
		self.display_field = Some(name.into());
		self
	}

	/// Model schema with the generated id as primary key
	pub fn into_model_schema(self) -> ModelSchema {
		let mut schema = ModelSchema::new(self.name)
			.with_field(FieldDescriptor::new(ID_FIELD, FieldKind::String).primary_key());
		for (name, field) in self.fields {
			let mut descriptor = FieldDescriptor::new(name, field.kind);
			descriptor.required = field.required;
			descriptor.max_length = field.max_length;
			schema.fields.push(descriptor);
		}
		schema.display_field = self.display_field;
		schema
	}
}

/// A collection of a [`DocumentStore`] exposed as a model
pub struct DocumentBackend {
	store: DocumentStore,
	collection: String,
	schema: ModelSchema,
}

impl DocumentBackend {
	pub fn new(store: DocumentStore, schema: DocumentSchema) -> Self {
		let collection = schema.collection.clone();
		Self {
			store,
			collection,
			schema: schema.into_model_schema(),
		}
	}

	pub fn store(&self) -> &DocumentStore {
		&self.store
	}

	pub fn collection(&self) -> &str {
		&self.collection
	}

	/// Type-check `values` and coerce form strings into the declared kinds
	fn check(&self, values: Record) -> DbResult<Record> {
		let mut checked = Record::new();
		for (key, value) in values {
			if key == ID_FIELD {
				continue;
			}
			let field = self
				.schema
				.field(&key)
				.ok_or_else(|| DbError::invalid_value(&key, format!("not a field of {}", self.schema.name)))?;
			checked.insert(key, coerce(field, value)?);
		}
		Ok(checked)
	}

	fn check_required(&self, document: &Record) -> DbResult<()> {
		for field in self.schema.fields.iter().filter(|f| f.required) {
			match document.get(&field.name) {
				None | Some(Value::Null) => {
					return Err(DbError::invalid_value(&field.name, "field is required"));
				}
				_ => {}
			}
		}
		Ok(())
	}
}

fn coerce(field: &FieldDescriptor, value: Value) -> DbResult<Value> {
	let mismatch = |expected: &str| DbError::invalid_value(&field.name, format!("expected {}", expected));
	match (&field.kind, value) {
		(_, Value::Null) => Ok(Value::Null),
		(FieldKind::String | FieldKind::Text, Value::String(s)) => {
			if let Some(max) = field.max_length
				&& s.chars().count() > max
			{
				return Err(DbError::invalid_value(
					&field.name,
					format!("longer than {} characters", max),
				));
			}
			Ok(Value::String(s))
		}
		(FieldKind::Integer, Value::Number(n)) if n.is_i64() => Ok(Value::Number(n)),
		(FieldKind::Integer, Value::String(s)) => s
			.trim()
			.parse::<i64>()
			.map(Value::from)
			.map_err(|_| mismatch("an integer")),
		(FieldKind::Float, Value::Number(n)) => Ok(Value::Number(n)),
		(FieldKind::Float, Value::String(s)) => s
			.trim()
			.parse::<f64>()
			.ok()
			.and_then(serde_json::Number::from_f64)
			.map(Value::Number)
			.ok_or_else(|| mismatch("a number")),
		(FieldKind::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
		(FieldKind::Date | FieldKind::DateTime, Value::String(s)) => {
			let parsed = chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").is_ok()
				|| chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").is_ok()
				|| chrono::DateTime::parse_from_rfc3339(&s).is_ok();
			if parsed {
				Ok(Value::String(s))
			} else {
				Err(mismatch("a date"))
			}
		}
		(FieldKind::Reference { .. }, Value::String(s)) if s.is_empty() => Ok(Value::Null),
		(FieldKind::Reference { .. }, Value::String(s)) => Ok(Value::String(s)),
		(FieldKind::Reference { .. }, Value::Number(n)) => Ok(Value::String(n.to_string())),
		(FieldKind::String, _) | (FieldKind::Text, _) => Err(mismatch("a string")),
		(FieldKind::Integer, _) => Err(mismatch("an integer")),
		(FieldKind::Float, _) => Err(mismatch("a number")),
		(FieldKind::Boolean, _) => Err(mismatch("a boolean")),
		(FieldKind::Date | FieldKind::DateTime, _) => Err(mismatch("a date")),
		(FieldKind::Reference { .. }, _) => Err(mismatch("a document id")),
	}
}

#[async_trait]
impl ModelBackend for DocumentBackend {
	fn schema(&self) -> &ModelSchema {
		&self.schema
	}

	async fn list(&self, query: &ListQuery) -> DbResult<Page> {
		Ok(run_list_query(self.store.find_many(&self.collection), query))
	}

	async fn get(&self, pk: &str) -> DbResult<Option<Record>> {
		Ok(self.store.find_one(&self.collection, pk))
	}

	async fn insert(&self, values: Record) -> DbResult<String> {
		let document = self.check(values)?;
		self.check_required(&document)?;
		let id = self.store.insert_one(&self.collection, document);
		tracing::debug!(collection = %self.collection, id = %id, "Inserted document");
		Ok(id)
	}

	async fn update(&self, pk: &str, values: Record) -> DbResult<bool> {
		let fields = self.check(values)?;
		self.store.update_with(&self.collection, pk, |current| {
			let mut merged = current.clone();
			merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
			self.check_required(&merged)?;
			Ok(fields)
		})
	}

	async fn delete(&self, pk: &str) -> DbResult<bool> {
		Ok(self.store.delete_one(&self.collection, pk))
	}

	async fn count(&self) -> DbResult<u64> {
		Ok(self.store.count_documents(&self.collection))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn people() -> DocumentBackend {
		let schema = DocumentSchema::new("Person")
			.field("name", DocField::string().max_length(20).required())
			.field("age", DocField::int())
			.display_field("name");
		DocumentBackend::new(DocumentStore::new(), schema)
	}

	fn record(value: Value) -> Record {
		match value {
			Value::Object(map) => map,
			_ => Record::new(),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_insert_generates_simple_uuid(people: DocumentBackend) {
		// Act
		let id = people
			.insert(record(json!({"name": "Stan", "age": 10})))
			.await
			.unwrap();

		// Assert
		assert_eq!(id.len(), 32);
		assert!(!id.contains('-'));
		let stored = people.get(&id).await.unwrap().unwrap();
		assert_eq!(stored["age"], json!(10));
		assert_eq!(people.label(&stored), "Stan");
	}

	#[rstest]
	#[tokio::test]
	async fn test_form_strings_are_coerced(people: DocumentBackend) {
		// Act
		let id = people
			.insert(record(json!({"name": "Stan", "age": "12"})))
			.await
			.unwrap();

		// Assert
		assert_eq!(people.get(&id).await.unwrap().unwrap()["age"], json!(12));
	}

	#[rstest]
	#[case(json!({"name": "Stan", "age": "ten"}))]
	#[case(json!({"name": 5}))]
	#[case(json!({"name": "x".repeat(21)}))]
	#[case(json!({"age": 3}))]
	#[case(json!({"name": "Stan", "weight": 3}))]
	#[tokio::test]
	async fn test_rejected_writes(people: DocumentBackend, #[case] input: Value) {
		// Act
		let result = people.insert(record(input)).await;

		// Assert
		assert!(matches!(result, Err(DbError::InvalidValue { .. })));
		assert_eq!(people.count().await.unwrap(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_keeps_unsubmitted_fields(people: DocumentBackend) {
		// Arrange
		let id = people
			.insert(record(json!({"name": "Stan", "age": 18})))
			.await
			.unwrap();

		// Act
		let updated = people
			.update(&id, record(json!({"name": "Stanley"})))
			.await
			.unwrap();

		// Assert
		assert!(updated);
		let stored = people.get(&id).await.unwrap().unwrap();
		assert_eq!(stored["name"], json!("Stanley"));
		assert_eq!(stored["age"], json!(18));
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_document(people: DocumentBackend) {
		// Act & Assert
		assert!(!people.update("nope", Record::new()).await.unwrap());
		assert!(!people.delete("nope").await.unwrap());
		assert!(people.get("nope").await.unwrap().is_none());
	}

	#[rstest]
	fn test_store_preserves_insertion_order() {
		// Arrange
		let store = DocumentStore::new();
		for name in ["b", "a", "c"] {
			store.insert_one("things", record(json!({"name": name})));
		}

		// Act
		let names: Vec<Value> = store
			.find_many("things")
			.into_iter()
			.map(|d| d["name"].clone())
			.collect();

		// Assert
		assert_eq!(names, [json!("b"), json!("a"), json!("c")]);
	}

	#[rstest]
	fn test_update_with_reads_and_writes_atomically() {
		// Arrange
		let store = DocumentStore::new();
		let id = store.insert_one("counters", record(json!({"hits": 0})));

		// Act
		std::thread::scope(|scope| {
			for _ in 0..8 {
				scope.spawn(|| {
					for _ in 0..100 {
						store
							.update_with("counters", &id, |current| {
								let hits = current["hits"].as_i64().unwrap_or_default();
								Ok::<_, DbError>(record(json!({"hits": hits + 1})))
							})
							.unwrap();
					}
				});
			}
		});

		// Assert
		assert_eq!(store.find_one("counters", &id).unwrap()["hits"], json!(800));
	}

	#[rstest]
	#[tokio::test]
	async fn test_rejected_update_leaves_document_untouched(people: DocumentBackend) {
		// Arrange
		let id = people
			.insert(record(json!({"name": "Stan", "age": 18})))
			.await
			.unwrap();

		// Act
		let result = people
			.update(&id, record(json!({"name": null, "age": "19"})))
			.await;

		// Assert
		assert!(matches!(result, Err(DbError::InvalidValue { .. })));
		let stored = people.get(&id).await.unwrap().unwrap();
		assert_eq!((stored["name"].clone(), stored["age"].clone()), (json!("Stan"), json!(18)));
	}
}
