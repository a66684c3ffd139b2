//! List queries

use crate::backend::Record;

/// Sort order for a list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
	pub field: String,
	pub descending: bool,
}

impl SortKey {
	pub fn asc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			descending: false,
		}
	}

	pub fn desc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			descending: true,
		}
	}

	/// Parse a sort parameter; a leading `-` means descending
	///
	/// # Examples
	///
	/// ```
	/// use overseer_db::SortKey;
	///
	/// assert_eq!(SortKey::parse("-age"), Some(SortKey::desc("age")));
	/// assert_eq!(SortKey::parse("name"), Some(SortKey::asc("name")));
	/// assert_eq!(SortKey::parse("-"), None);
	/// ```
	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		let key = match raw.strip_prefix('-') {
			Some(field) => Self::desc(field),
			None => Self::asc(raw),
		};
		(!key.field.is_empty()).then_some(key)
	}
}

/// Case-insensitive substring search over a set of fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
	pub term: String,
	pub fields: Vec<String>,
}

/// One page request against a backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
	pub sort: Option<SortKey>,
	pub search: Option<Search>,
	pub offset: usize,
	/// `None` returns every remaining record
	pub limit: Option<usize>,
}

impl ListQuery {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sort(mut self, key: SortKey) -> Self {
		self.sort = Some(key);
		self
	}

	/// Search `fields` for `term`; a blank term or no fields disables search
	pub fn search(mut self, term: impl Into<String>, fields: Vec<String>) -> Self {
		let term = term.into();
		self.search = (!term.trim().is_empty() && !fields.is_empty()).then(|| Search {
			term: term.trim().to_string(),
			fields,
		});
		self
	}

	/// Zero-based `page` of `per_page` records
	///
	/// # Examples
	///
	/// ```
	/// use overseer_db::ListQuery;
	///
	/// let query = ListQuery::new().page(1, 20);
	/// assert_eq!(query.offset, 20);
	/// assert_eq!(query.limit, Some(20));
	/// ```
	pub fn page(mut self, page: usize, per_page: usize) -> Self {
		self.offset = page.saturating_mul(per_page);
		self.limit = Some(per_page);
		self
	}

	pub fn limit(mut self, limit: usize) -> Self {
		self.limit = Some(limit);
		self
	}
}

/// One page of records plus the number of records matching overall
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
	pub records: Vec<Record>,
	pub total: u64,
}
