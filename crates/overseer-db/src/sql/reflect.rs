//! Schema reflection from SQLite's catalog pragmas

use crate::error::{DbError, DbResult};
use crate::schema::{FieldDescriptor, FieldKind, ModelSchema, model_name_from_table};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

/// Column type affinity as SQLite derives it from the declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Affinity {
	Integer,
	Text,
	Real,
	Numeric,
	Blob,
}

impl Affinity {
	/// SQLite's affinity rules, in their documented order
	pub(crate) fn of(declared: &str) -> Self {
		let upper = declared.to_uppercase();
		if upper.contains("INT") {
			Affinity::Integer
		} else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
			Affinity::Text
		} else if upper.is_empty() || upper.contains("BLOB") {
			Affinity::Blob
		} else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
			Affinity::Real
		} else {
			Affinity::Numeric
		}
	}
}

#[derive(Debug, Clone)]
pub(crate) struct SqlColumn {
	pub(crate) name: String,
	pub(crate) affinity: Affinity,
}

fn declared_length(upper: &str) -> Option<usize> {
	let open = upper.find('(')?;
	let close = upper[open..].find(')')? + open;
	upper[open + 1..close].split(',').next()?.trim().parse().ok()
}

/// Map a declared column type onto a field kind and optional maximum length
pub(crate) fn map_declared_type(declared: &str) -> (FieldKind, Option<usize>) {
	let upper = declared.trim().to_uppercase();
	if upper.contains("BOOL") {
		(FieldKind::Boolean, None)
	} else if upper.starts_with("DATETIME") || upper.contains("TIMESTAMP") {
		(FieldKind::DateTime, None)
	} else if upper == "DATE" {
		(FieldKind::Date, None)
	} else if upper.contains("INT") {
		(FieldKind::Integer, None)
	} else if upper.contains("CHAR") {
		(FieldKind::String, declared_length(&upper))
	} else if upper.contains("TEXT") || upper.contains("CLOB") {
		(FieldKind::Text, None)
	} else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
		.iter()
		.any(|t| upper.contains(t))
	{
		(FieldKind::Float, None)
	} else {
		(FieldKind::String, None)
	}
}

/// Reflect `table` into a schema and its column list
///
/// A table without any primary-key column reflects fine; it is rejected later
/// when an admin view is built over it.
pub(crate) async fn reflect_table(
	pool: &SqlitePool,
	table: &str,
) -> DbResult<(ModelSchema, Vec<SqlColumn>)> {
	let foreign_keys: HashMap<String, String> =
		sqlx::query(r#"SELECT "from", "table" FROM pragma_foreign_key_list(?1)"#)
			.bind(table)
			.fetch_all(pool)
			.await?
			.iter()
			.map(|row| -> DbResult<(String, String)> { Ok((row.try_get(0)?, row.try_get(1)?)) })
			.collect::<DbResult<_>>()?;

	let rows = sqlx::query(
		r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#,
	)
	.bind(table)
	.fetch_all(pool)
	.await?;

	if rows.is_empty() {
		return Err(DbError::Schema(format!("Table '{}' does not exist", table)));
	}

	let mut schema = ModelSchema::new(model_name_from_table(table));
	let mut columns = Vec::with_capacity(rows.len());

	for row in rows {
		let name: String = row.try_get("name")?;
		let declared: String = row.try_get::<Option<String>, _>("type")?.unwrap_or_default();
		let not_null: i64 = row.try_get("notnull")?;
		let default: Option<String> = row.try_get("dflt_value")?;
		let pk: i64 = row.try_get("pk")?;

		let (mut kind, max_length) = map_declared_type(&declared);
		if let Some(target) = foreign_keys.get(&name) {
			kind = FieldKind::Reference {
				target: model_name_from_table(target),
			};
		}

		let mut field = FieldDescriptor::new(&name, kind);
		field.max_length = max_length;
		field.primary_key = pk > 0;
		field.required =
			not_null != 0 && default.is_none() && pk == 0 && field.kind != FieldKind::Boolean;

		tracing::debug!(table, column = %name, declared = %declared, kind = ?field.kind, "Reflected column");
		columns.push(SqlColumn {
			name,
			affinity: Affinity::of(&declared),
		});
		schema.fields.push(field);
	}

	Ok((schema, columns))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("VARCHAR(20)", FieldKind::String, Some(20))]
	#[case("varchar", FieldKind::String, None)]
	#[case("CHARACTER(8)", FieldKind::String, Some(8))]
	#[case("TEXT", FieldKind::Text, None)]
	#[case("INTEGER", FieldKind::Integer, None)]
	#[case("BIGINT", FieldKind::Integer, None)]
	#[case("BOOLEAN", FieldKind::Boolean, None)]
	#[case("REAL", FieldKind::Float, None)]
	#[case("DECIMAL(10,2)", FieldKind::Float, None)]
	#[case("DATE", FieldKind::Date, None)]
	#[case("DATETIME", FieldKind::DateTime, None)]
	#[case("TIMESTAMP", FieldKind::DateTime, None)]
	#[case("", FieldKind::String, None)]
	fn test_declared_type_mapping(
		#[case] declared: &str,
		#[case] kind: FieldKind,
		#[case] max_length: Option<usize>,
	) {
		// Act & Assert
		assert_eq!(map_declared_type(declared), (kind, max_length));
	}

	#[rstest]
	#[case("INTEGER", Affinity::Integer)]
	#[case("VARCHAR(20)", Affinity::Text)]
	#[case("", Affinity::Blob)]
	#[case("DOUBLE", Affinity::Real)]
	#[case("BOOLEAN", Affinity::Numeric)]
	fn test_affinity(#[case] declared: &str, #[case] expected: Affinity) {
		// Act & Assert
		assert_eq!(Affinity::of(declared), expected);
	}
}
