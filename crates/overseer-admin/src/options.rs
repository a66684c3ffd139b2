//! Configuration of views and model-admin views

use overseer_db::SortKey;
use overseer_http::Request;
use std::fmt;
use std::sync::Arc;

/// Overrides a view is constructed with
///
/// Every value left unset is derived when the view is attached to an admin.
///
/// # Examples
///
/// ```
/// use overseer_admin::ViewOptions;
///
/// let options = ViewOptions::new().name("Test 1").category("Test").endpoint("test1");
/// assert_eq!(options.category.as_deref(), Some("Test"));
/// assert!(options.url.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
	pub name: Option<String>,
	pub category: Option<String>,
	pub endpoint: Option<String>,
	/// Absolute (leading `/`) or relative to the admin's mount URL
	pub url: Option<String>,
	pub static_folder: Option<String>,
}

impl ViewOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = Some(endpoint.into());
		self
	}

	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	pub fn static_folder(mut self, folder: impl Into<String>) -> Self {
		self.static_folder = Some(folder.into());
		self
	}
}

type AccessCheck = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Configuration of a model-admin view
///
/// # Examples
///
/// ```
/// use overseer_admin::{ModelAdminOptions, ViewOptions};
///
/// let options = ModelAdminOptions::new()
///     .view(ViewOptions::new().name("People"))
///     .list_display(["name", "age"])
///     .search_fields(["name"])
///     .list_per_page(2);
/// assert_eq!(options.list_per_page, Some(2));
/// assert_eq!(options.list_display, ["name", "age"]);
/// ```
#[derive(Clone, Default)]
pub struct ModelAdminOptions {
	pub view: ViewOptions,
	/// Allow-list of form fields; empty means every non-key field
	pub fields: Vec<String>,
	/// Removed from the form after `fields` is applied
	pub exclude: Vec<String>,
	/// List columns; empty shows the record label
	pub list_display: Vec<String>,
	pub search_fields: Vec<String>,
	/// Shown on the form but never written
	pub readonly_fields: Vec<String>,
	/// Page size; falls back to the application's `list_per_page`
	pub list_per_page: Option<usize>,
	/// Sort applied when the request does not ask for one
	pub ordering: Option<SortKey>,
	access: Option<AccessCheck>,
}

fn strings<I, S>(items: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	items.into_iter().map(Into::into).collect()
}

impl ModelAdminOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn view(mut self, view: ViewOptions) -> Self {
		self.view = view;
		self
	}

	pub fn fields<I: IntoIterator<Item = S>, S: Into<String>>(mut self, fields: I) -> Self {
		self.fields = strings(fields);
		self
	}

	pub fn exclude<I: IntoIterator<Item = S>, S: Into<String>>(mut self, fields: I) -> Self {
		self.exclude = strings(fields);
		self
	}

	pub fn list_display<I: IntoIterator<Item = S>, S: Into<String>>(mut self, fields: I) -> Self {
		self.list_display = strings(fields);
		self
	}

	pub fn search_fields<I: IntoIterator<Item = S>, S: Into<String>>(mut self, fields: I) -> Self {
		self.search_fields = strings(fields);
		self
	}

	pub fn readonly_fields<I: IntoIterator<Item = S>, S: Into<String>>(mut self, fields: I) -> Self {
		self.readonly_fields = strings(fields);
		self
	}

	pub fn list_per_page(mut self, per_page: usize) -> Self {
		self.list_per_page = Some(per_page);
		self
	}

	pub fn ordering(mut self, key: SortKey) -> Self {
		self.ordering = Some(key);
		self
	}

	/// Authorization hook consulted before every route of the view
	pub fn access<F>(mut self, check: F) -> Self
	where
		F: Fn(&Request) -> bool + Send + Sync + 'static,
	{
		self.access = Some(Arc::new(check));
		self
	}

	pub(crate) fn is_accessible(&self, request: &Request) -> bool {
		self.access.as_ref().is_none_or(|check| check(request))
	}
}

impl fmt::Debug for ModelAdminOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelAdminOptions")
			.field("view", &self.view)
			.field("fields", &self.fields)
			.field("exclude", &self.exclude)
			.field("list_display", &self.list_display)
			.field("search_fields", &self.search_fields)
			.field("readonly_fields", &self.readonly_fields)
			.field("list_per_page", &self.list_per_page)
			.field("ordering", &self.ordering)
			.field("access", &self.access.is_some())
			.finish()
	}
}
