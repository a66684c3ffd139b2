//! Conversion between JSON values, sea-query values and SQLite rows

use super::reflect::{Affinity, SqlColumn};
use crate::backend::Record;
use crate::schema::FieldKind;
use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Convert a JSON value for storage in `column`
///
/// Strings headed for integer or real columns are parsed so that form input
/// binds as a number.
pub(crate) fn to_sea_value(column: &SqlColumn, value: Value) -> sea_query::Value {
	match value {
		Value::Null => sea_query::Value::String(None),
		Value::Bool(b) => sea_query::Value::Bool(Some(b)),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				sea_query::Value::BigInt(Some(i))
			} else if let Some(f) = n.as_f64() {
				sea_query::Value::Double(Some(f))
			} else {
				sea_query::Value::String(Some(n.to_string()))
			}
		}
		Value::String(s) => match column.affinity {
			Affinity::Integer => match s.trim().parse::<i64>() {
				Ok(i) => sea_query::Value::BigInt(Some(i)),
				Err(_) => sea_query::Value::String(Some(s)),
			},
			Affinity::Real => match s.trim().parse::<f64>() {
				Ok(f) => sea_query::Value::Double(Some(f)),
				Err(_) => sea_query::Value::String(Some(s)),
			},
			_ => sea_query::Value::String(Some(s)),
		},
		other => sea_query::Value::String(Some(other.to_string())),
	}
}

fn float_value(f: f64) -> Value {
	serde_json::Number::from_f64(f)
		.map(Value::Number)
		.unwrap_or(Value::Null)
}

/// Decode one column, preferring the type implied by the field kind
fn decode_column(row: &SqliteRow, column: &SqlColumn, kind: &FieldKind) -> Value {
	let name = column.name.as_str();
	let preferred = match kind {
		FieldKind::Boolean => row
			.try_get::<Option<bool>, _>(name)
			.map(|v| v.map(Value::Bool)),
		FieldKind::Integer => row
			.try_get::<Option<i64>, _>(name)
			.map(|v| v.map(Value::from)),
		FieldKind::Reference { .. } if column.affinity == Affinity::Integer => row
			.try_get::<Option<i64>, _>(name)
			.map(|v| v.map(Value::from)),
		FieldKind::Float => row
			.try_get::<Option<f64>, _>(name)
			.map(|v| v.map(float_value)),
		_ => row
			.try_get::<Option<String>, _>(name)
			.map(|v| v.map(Value::String)),
	};

	match preferred {
		Ok(value) => value.unwrap_or(Value::Null),
		Err(_) => {
			if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
				Value::String(s)
			} else if let Ok(Some(i)) = row.try_get::<Option<i64>, _>(name) {
				Value::from(i)
			} else if let Ok(Some(f)) = row.try_get::<Option<f64>, _>(name) {
				float_value(f)
			} else {
				tracing::warn!(column = name, "Could not decode column value");
				Value::Null
			}
		}
	}
}

pub(crate) fn decode_row(
	row: &SqliteRow,
	columns: &[SqlColumn],
	kinds: &[&FieldKind],
) -> Record {
	columns
		.iter()
		.zip(kinds)
		.map(|(column, kind)| (column.name.clone(), decode_column(row, column, kind)))
		.collect()
}

/// GLOB pattern matching `term` anywhere in a value, ignoring case
///
/// SQLite's `LIKE` and `lower()` only fold ASCII, so every cased character
/// becomes a set holding both of its forms. GLOB wildcards in the term are
/// matched literally.
pub(crate) fn case_insensitive_glob(term: &str) -> String {
	let mut pattern = String::with_capacity(term.len() * 4 + 2);
	pattern.push('*');
	for ch in term.chars() {
		let lower = single_char(ch.to_lowercase()).unwrap_or(ch);
		let upper = single_char(ch.to_uppercase()).unwrap_or(ch);
		if lower != upper {
			pattern.push('[');
			pattern.push(lower);
			pattern.push(upper);
			pattern.push(']');
		} else if matches!(ch, '*' | '?' | '[') {
			pattern.push('[');
			pattern.push(ch);
			pattern.push(']');
		} else {
			pattern.push(ch);
		}
	}
	pattern.push('*');
	pattern
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
	let first = chars.next()?;
	chars.next().is_none().then_some(first)
}
