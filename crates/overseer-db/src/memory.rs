//! List-query evaluation for the in-process backends

use crate::backend::{Record, pk_to_string};
use crate::query::{ListQuery, Page};
use serde_json::Value;
use std::cmp::Ordering;

fn type_rank(value: &Value) -> u8 {
	match value {
		Value::Null => 0,
		Value::Bool(_) => 1,
		Value::Number(_) => 2,
		Value::String(_) => 3,
		Value::Array(_) => 4,
		Value::Object(_) => 5,
	}
}

/// Total order over JSON values: nulls first, then booleans, numbers and strings
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
	match (a, b) {
		(Value::Bool(x), Value::Bool(y)) => x.cmp(y),
		(Value::Number(x), Value::Number(y)) => {
			let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
			x.partial_cmp(&y).unwrap_or(Ordering::Equal)
		}
		(Value::String(x), Value::String(y)) => x.cmp(y),
		_ => type_rank(a).cmp(&type_rank(b)),
	}
}

fn matches_search(record: &Record, term: &str, fields: &[String]) -> bool {
	fields.iter().any(|field| match record.get(field) {
		None | Some(Value::Null) => false,
		Some(value) => pk_to_string(value).to_lowercase().contains(term),
	})
}

/// Filter, sort and paginate `records`, which arrive in natural order
///
/// Sorting is stable, so natural order breaks ties.
pub(crate) fn run_list_query(mut records: Vec<Record>, query: &ListQuery) -> Page {
	if let Some(search) = &query.search {
		let term = search.term.to_lowercase();
		records.retain(|r| matches_search(r, &term, &search.fields));
	}

	if let Some(sort) = &query.sort {
		records.sort_by(|a, b| {
			let ordering = compare_values(
				a.get(&sort.field).unwrap_or(&Value::Null),
				b.get(&sort.field).unwrap_or(&Value::Null),
			);
			if sort.descending { ordering.reverse() } else { ordering }
		});
	}

	let total = records.len() as u64;
	let records = records
		.into_iter()
		.skip(query.offset)
		.take(query.limit.unwrap_or(usize::MAX))
		.collect();

	Page { records, total }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::query::SortKey;
	use proptest::prelude::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	fn person(name: &str, age: i64) -> Record {
		let mut r = Record::new();
		r.insert("name".into(), json!(name));
		r.insert("age".into(), json!(age));
		r
	}

	#[fixture]
	fn people() -> Vec<Record> {
		vec![
			person("John", 18),
			person("Michael", 21),
			person("Steve", 15),
			person("Ron", 59),
		]
	}

	fn names(page: &Page) -> Vec<&str> {
		page.records
			.iter()
			.map(|r| r["name"].as_str().unwrap())
			.collect()
	}

	#[rstest]
	fn test_sort_by_age_partitions_pages(people: Vec<Record>) {
		// Arrange
		let first = ListQuery::new().sort(SortKey::asc("age")).page(0, 2);
		let second = ListQuery::new().sort(SortKey::asc("age")).page(1, 2);

		// Act
		let page0 = run_list_query(people.clone(), &first);
		let page1 = run_list_query(people, &second);

		// Assert
		assert_eq!(names(&page0), ["Steve", "John"]);
		assert_eq!(names(&page1), ["Michael", "Ron"]);
		assert_eq!(page0.total, 4);
	}

	#[rstest]
	fn test_search_is_case_insensitive(people: Vec<Record>) {
		// Arrange
		let query = ListQuery::new().search("JOHN", vec!["name".into()]);

		// Act
		let page = run_list_query(people, &query);

		// Assert
		assert_eq!(names(&page), ["John"]);
		assert_eq!(page.total, 1);
	}

	#[rstest]
	fn test_nulls_sort_first() {
		// Act & Assert
		assert_eq!(compare_values(&Value::Null, &json!(0)), Ordering::Less);
		assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
		assert_eq!(compare_values(&json!("Ron"), &json!("Steve")), Ordering::Less);
	}

	proptest! {
		#[test]
		fn prop_sorted_pages_are_monotonic(ages in proptest::collection::vec(0i64..100, 0..30), desc in any::<bool>()) {
			let records: Vec<Record> = ages.iter().map(|a| person("p", *a)).collect();
			let key = if desc { SortKey::desc("age") } else { SortKey::asc("age") };
			let page = run_list_query(records, &ListQuery::new().sort(key));
			let sorted: Vec<i64> = page.records.iter().map(|r| r["age"].as_i64().unwrap()).collect();
			for pair in sorted.windows(2) {
				if desc {
					prop_assert!(pair[0] >= pair[1]);
				} else {
					prop_assert!(pair[0] <= pair[1]);
				}
			}
		}
	}
}
