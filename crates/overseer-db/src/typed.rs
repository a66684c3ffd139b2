//! Typed-model backend
//!
//! Plain Rust structs become admin models by implementing [`Model`]: the
//! struct declares its fields once, serde moves values in and out of records,
//! and a [`TypedBackend`] keeps the instances with auto-increment keys.
//!
//! # Examples
//!
//! ```
//! use overseer_db::typed::{Model, TypedBackend, TypedField};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Person {
//!     #[serde(default)]
//!     id: i64,
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Model for Person {
//!     const MODEL_NAME: &'static str = "Person";
//!
//!     fn fields() -> Vec<TypedField> {
//!         vec![
//!             TypedField::auto("id"),
//!             TypedField::char("name", 255).required(),
//!             TypedField::integer("age").required(),
//!         ]
//!     }
//!
//!     fn label(&self) -> Option<String> {
//!         Some(self.name.clone())
//!     }
//! }
//!
//! let people = TypedBackend::<Person>::new();
//! let id = people.create(Person { id: 0, name: "Ron".into(), age: 59 }).unwrap();
//! assert_eq!(id, 1);
//! assert_eq!(people.all()[0].name, "Ron");
//! ```

use crate::backend::{ModelBackend, Record, default_label};
use crate::error::{DbError, DbResult};
use crate::memory::run_list_query;
use crate::query::{ListQuery, Page};
use crate::schema::{FieldDescriptor, FieldKind, ModelSchema};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// A statically typed admin model
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
	const MODEL_NAME: &'static str;

	/// Field declarations in display order
	fn fields() -> Vec<TypedField>;

	/// Preferred representation of this instance
	fn label(&self) -> Option<String> {
		None
	}
}

/// Field declaration of a typed model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedField {
	descriptor: FieldDescriptor,
}

impl TypedField {
	fn of(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			descriptor: FieldDescriptor::new(name, kind),
		}
	}

	/// Auto-increment integer primary key
	pub fn auto(name: impl Into<String>) -> Self {
		Self {
			descriptor: FieldDescriptor::new(name, FieldKind::Integer).primary_key(),
		}
	}

	pub fn char(name: impl Into<String>, max_length: usize) -> Self {
		Self {
			descriptor: FieldDescriptor::new(name, FieldKind::String).max_length(max_length),
		}
	}

	pub fn text(name: impl Into<String>) -> Self {
		Self::of(name, FieldKind::Text)
	}

	pub fn integer(name: impl Into<String>) -> Self {
		Self::of(name, FieldKind::Integer)
	}

	pub fn float(name: impl Into<String>) -> Self {
		Self::of(name, FieldKind::Float)
	}

	pub fn boolean(name: impl Into<String>) -> Self {
		Self::of(name, FieldKind::Boolean)
	}

	pub fn date(name: impl Into<String>) -> Self {
		Self::of(name, FieldKind::Date)
	}

	pub fn datetime(name: impl Into<String>) -> Self {
		Self::of(name, FieldKind::DateTime)
	}

	/// Key of an instance of the model named `model`
	pub fn foreign_key(name: impl Into<String>, model: impl Into<String>) -> Self {
		Self::of(
			name,
			FieldKind::Reference {
				target: model.into(),
			},
		)
	}

	pub fn required(mut self) -> Self {
		self.descriptor.required = true;
		self
	}

	pub fn name(&self) -> &str {
		&self.descriptor.name
	}
}

struct Objects<M> {
	rows: BTreeMap<i64, M>,
	next_id: i64,
}

/// Object manager for one typed model
pub struct TypedBackend<M: Model> {
	schema: ModelSchema,
	objects: RwLock<Objects<M>>,
	_model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for TypedBackend<M> {
	fn default() -> Self {
		Self::new()
	}
}

impl<M: Model> TypedBackend<M> {
	pub fn new() -> Self {
		let schema = M::fields()
			.into_iter()
			.fold(ModelSchema::new(M::MODEL_NAME), |schema, field| {
				schema.with_field(field.descriptor)
			});
		Self {
			schema,
			objects: RwLock::new(Objects {
				rows: BTreeMap::new(),
				next_id: 1,
			}),
			_model: PhantomData,
		}
	}

	/// Store `model` under the next key and return that key
	pub fn create(&self, model: M) -> DbResult<i64> {
		let record = to_record(&model)?;
		self.store(record)
	}

	/// All instances in key order
	pub fn all(&self) -> Vec<M> {
		self.objects.read().rows.values().cloned().collect()
	}

	pub fn find(&self, id: i64) -> Option<M> {
		self.objects.read().rows.get(&id).cloned()
	}

	fn pk_name(&self) -> DbResult<&str> {
		Ok(self.schema.primary_key()?.name.as_str())
	}

	fn store(&self, mut record: Record) -> DbResult<i64> {
		let pk = self.pk_name()?.to_string();
		let mut objects = self.objects.write();
		let id = objects.next_id;
		record.insert(pk, Value::from(id));
		let model = materialize::<M>(record)?;
		objects.rows.insert(id, model);
		objects.next_id += 1;
		Ok(id)
	}

	/// Coerce form strings into the declared kinds and drop the key
	fn check(&self, values: Record) -> DbResult<Record> {
		let pk = self.pk_name()?;
		let mut checked = Record::new();
		for (key, value) in values {
			if key == pk {
				continue;
			}
			let field = self
				.schema
				.field(&key)
				.ok_or_else(|| DbError::invalid_value(&key, format!("not a field of {}", M::MODEL_NAME)))?;
			checked.insert(key, coerce(field, value)?);
		}
		Ok(checked)
	}
}

fn to_record<M: Model>(model: &M) -> DbResult<Record> {
	match serde_json::to_value(model)? {
		Value::Object(record) => Ok(record),
		other => Err(DbError::Schema(format!(
			"Model '{}' does not serialize to a map: {}",
			M::MODEL_NAME,
			other
		))),
	}
}

/// Rebuild a model from a merged record
///
/// A record the struct cannot hold is a validation failure, not a storage
/// one: a blank value for a non-optional member is reported against that
/// field, anything else against the whole form.
fn materialize<M: Model>(record: Record) -> DbResult<M> {
	let mut value = Value::Object(record);
	let error = match M::deserialize(&value) {
		Ok(model) => return Ok(model),
		Err(e) => e,
	};
	if let Value::Object(record) = &mut value {
		record.retain(|_, field| !field.is_null());
	}
	let blank = M::deserialize(&value)
		.err()
		.and_then(|e| missing_field(&e.to_string()));
	Err(match blank {
		Some(field) => DbError::invalid_value(field, "This field is required."),
		None => DbError::invalid_value(NON_FIELD_ERRORS, error.to_string()),
	})
}

const NON_FIELD_ERRORS: &str = "__all__";

fn missing_field(message: &str) -> Option<String> {
	let rest = message.strip_prefix("missing field `")?;
	rest.split_once('`').map(|(name, _)| name.to_string())
}

fn coerce(field: &FieldDescriptor, value: Value) -> DbResult<Value> {
	let Value::String(raw) = value else {
		return Ok(value);
	};
	let parsed = match field.kind {
		FieldKind::Integer | FieldKind::Reference { .. } if raw.trim().is_empty() => Some(Value::Null),
		FieldKind::Integer | FieldKind::Reference { .. } => {
			raw.trim().parse::<i64>().ok().map(Value::from)
		}
		FieldKind::Float if raw.trim().is_empty() => Some(Value::Null),
		FieldKind::Float => raw
			.trim()
			.parse::<f64>()
			.ok()
			.and_then(serde_json::Number::from_f64)
			.map(Value::Number),
		_ => return Ok(Value::String(raw)),
	};
	parsed.ok_or_else(|| DbError::invalid_value(&field.name, format!("'{}' is not a number", raw)))
}

fn parse_pk(pk: &str) -> Option<i64> {
	pk.trim().parse().ok()
}

#[async_trait]
impl<M: Model> ModelBackend for TypedBackend<M> {
	fn schema(&self) -> &ModelSchema {
		&self.schema
	}

	async fn list(&self, query: &ListQuery) -> DbResult<Page> {
		let records = self
			.all()
			.iter()
			.map(to_record)
			.collect::<DbResult<Vec<_>>>()?;
		Ok(run_list_query(records, query))
	}

	async fn get(&self, pk: &str) -> DbResult<Option<Record>> {
		parse_pk(pk)
			.and_then(|id| self.find(id))
			.map(|model| to_record(&model))
			.transpose()
	}

	async fn insert(&self, values: Record) -> DbResult<String> {
		let record = self.check(values)?;
		let id = self.store(record)?;
		tracing::debug!(model = M::MODEL_NAME, id, "Created object");
		Ok(id.to_string())
	}

	async fn update(&self, pk: &str, values: Record) -> DbResult<bool> {
		let fields = self.check(values)?;
		let Some(id) = parse_pk(pk) else {
			return Ok(false);
		};
		let mut objects = self.objects.write();
		let Some(current) = objects.rows.get(&id) else {
			return Ok(false);
		};
		let mut record = to_record(current)?;
		record.extend(fields);
		let model = materialize::<M>(record)?;
		objects.rows.insert(id, model);
		Ok(true)
	}

	async fn delete(&self, pk: &str) -> DbResult<bool> {
		let Some(id) = parse_pk(pk) else {
			return Ok(false);
		};
		Ok(self.objects.write().rows.remove(&id).is_some())
	}

	async fn count(&self) -> DbResult<u64> {
		Ok(self.objects.read().rows.len() as u64)
	}

	fn label(&self, record: &Record) -> String {
		serde_json::from_value::<M>(Value::Object(record.clone()))
			.ok()
			.and_then(|model| model.label())
			.unwrap_or_else(|| default_label(&self.schema, record))
	}
}
