//! The backend capability every model adapter implements

use crate::error::DbResult;
use crate::query::{ListQuery, Page};
use crate::schema::ModelSchema;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A record as a map from field name to value, primary key included
pub type Record = Map<String, Value>;

/// Schema description plus persistence primitives for one model
///
/// Primary keys travel as strings (they appear in URLs); each backend parses
/// them into its native key type. Every mutation is atomic in the backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
	/// Ordered field description of the model
	fn schema(&self) -> &ModelSchema;

	/// One page of records matching `query`, plus the overall match count
	async fn list(&self, query: &ListQuery) -> DbResult<Page>;

	async fn get(&self, pk: &str) -> DbResult<Option<Record>>;

	/// Persist a new record and return its primary key
	async fn insert(&self, values: Record) -> DbResult<String>;

	/// Overwrite the given fields; `false` when no record has this key
	async fn update(&self, pk: &str, values: Record) -> DbResult<bool>;

	/// `false` when no record has this key
	async fn delete(&self, pk: &str) -> DbResult<bool>;

	async fn count(&self) -> DbResult<u64> {
		Ok(self.list(&ListQuery::new().limit(0)).await?.total)
	}

	/// Preferred string representation of a record
	///
	/// Uses the schema's display field when set, otherwise
	/// `"{Model} object ({pk})"`.
	fn label(&self, record: &Record) -> String {
		default_label(self.schema(), record)
	}

	/// Primary key of `record` as a string
	fn record_pk(&self, record: &Record) -> Option<String> {
		let pk = self.schema().primary_key().ok()?;
		record.get(&pk.name).filter(|v| !v.is_null()).map(pk_to_string)
	}
}

/// Display field value of `record`, else `"{Model} object ({pk})"`
pub fn default_label(schema: &ModelSchema, record: &Record) -> String {
	if let Some(display) = &schema.display_field
		&& let Some(value) = record.get(display)
		&& !value.is_null()
	{
		return pk_to_string(value);
	}
	let pk = schema
		.primary_key()
		.ok()
		.and_then(|pk| record.get(&pk.name))
		.map(pk_to_string)
		.unwrap_or_default();
	format!("{} object ({})", schema.name, pk)
}

/// String form of a key or scalar value
///
/// # Examples
///
/// ```
/// use overseer_db::pk_to_string;
/// use serde_json::json;
///
/// assert_eq!(pk_to_string(&json!(7)), "7");
/// assert_eq!(pk_to_string(&json!("a1b2")), "a1b2");
/// ```
pub fn pk_to_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}
