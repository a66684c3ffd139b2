//! List screen: search, sorting and pagination

use super::ModelAdmin;
use super::form::reference_html;
use crate::error::AdminResult;
use crate::render::{ColumnContext, ListContext, PageLink, RowContext};
use crate::view::ViewRequest;
use overseer_db::{FieldKind, ListQuery, ModelSchema, Record, SortKey};
use overseer_forms::{display_value, escape, humanize};
use overseer_http::{Request, Response};

/// Query parameters of the list screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ListParams {
	/// Zero-based
	pub(crate) page: usize,
	pub(crate) sort: Option<SortKey>,
	pub(crate) search: Option<String>,
}

impl ListParams {
	/// Read `page`, `sort` and `q` (or `search`) from `request`
	///
	/// A page that is not a number falls back to the first page and a sort on
	/// an unknown field is ignored.
	pub(crate) fn from_request(request: &Request, schema: &ModelSchema) -> Self {
		let page = match request.query_param("page") {
			None => 0,
			Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
				tracing::warn!(page = raw, "Ignoring invalid page number");
				0
			}),
		};

		let sort = request.query_param("sort").and_then(SortKey::parse).filter(|key| {
			let known = schema.field(&key.field).is_some();
			if !known {
				tracing::warn!(model = %schema.name, field = %key.field, "Ignoring sort on unknown field");
			}
			known
		});

		let search = request
			.query_param("q")
			.or_else(|| request.query_param("search"))
			.map(str::trim)
			.filter(|term| !term.is_empty())
			.map(str::to_string);

		Self { page, sort, search }
	}

	fn sort_param(key: &SortKey) -> String {
		if key.descending {
			format!("-{}", key.field)
		} else {
			key.field.clone()
		}
	}

	/// Query string for `page` and `sort`, carrying over the search term
	fn url(&self, page: Option<usize>, sort: Option<&SortKey>) -> String {
		let mut pairs: Vec<(&str, String)> = Vec::new();
		if let Some(term) = &self.search {
			pairs.push(("q", term.clone()));
		}
		if let Some(key) = sort {
			pairs.push(("sort", Self::sort_param(key)));
		}
		if let Some(page) = page {
			pairs.push(("page", page.to_string()));
		}
		match serde_urlencoded::to_string(&pairs) {
			Ok(query) if !query.is_empty() => format!("?{}", query),
			_ => "?".to_string(),
		}
	}
}

/// Number of pages needed for `total` records, at least one
pub(crate) fn page_count(total: u64, per_page: usize) -> usize {
	let per_page = per_page.max(1) as u64;
	total.div_ceil(per_page).max(1) as usize
}

impl ModelAdmin {
	pub(crate) async fn list_view(&self, request: ViewRequest) -> AdminResult<Response> {
		let schema = self.schema();
		let params = ListParams::from_request(&request.request, schema);
		let per_page = self.list_per_page();
		let sort = params.sort.clone().or_else(|| self.options.ordering.clone());

		let mut query = ListQuery::new().page(params.page, per_page);
		if let Some(key) = &sort {
			query = query.sort(key.clone());
		}
		if let Some(term) = &params.search {
			query = query.search(term.clone(), self.options.search_fields.clone());
		}
		let page = self.backend.list(&query).await?;
		tracing::debug!(
			model = %self.model_name(),
			page = params.page,
			total = page.total,
			returned = page.records.len(),
			"Listed records"
		);

		let mut rows = Vec::with_capacity(page.records.len());
		for record in &page.records {
			rows.push(self.row(record).await?);
		}

		let pages = (0..page_count(page.total, per_page))
			.map(|number| PageLink {
				number: number + 1,
				url: escape(&params.url(Some(number), params.sort.as_ref())),
				active: number == params.page,
			})
			.collect();

		let context = ListContext {
			view_name: self
				.base
				.name()
				.map(str::to_string)
				.unwrap_or_else(|| self.model_name().to_string()),
			model_name: self.model_name().to_string(),
			list_url: escape(&self.list_url()),
			add_url: escape(&format!("{}/add/", self.url())),
			columns: self.columns(&params, sort.as_ref()),
			rows,
			total: page.total,
			search_enabled: !self.options.search_fields.is_empty(),
			search_query: params.search.clone().unwrap_or_default(),
			pages,
		};
		let html = self.base.render(
			&request.request,
			"admin/model/list.html",
			tera::Context::from_serialize(&context)?,
		)?;
		Ok(Response::ok().with_html(html))
	}

	/// Headers; a column sorted ascending links to its descending sort
	fn columns(&self, params: &ListParams, current: Option<&SortKey>) -> Vec<ColumnContext> {
		if self.options.list_display.is_empty() {
			return vec![ColumnContext {
				name: self.pk.clone(),
				label: self.model_name().to_string(),
				sort_url: None,
				order: "",
			}];
		}

		self.options
			.list_display
			.iter()
			.map(|name| {
				let active = current.filter(|key| key.field == *name);
				let next = match active {
					Some(key) if !key.descending => SortKey::desc(name),
					_ => SortKey::asc(name),
				};
				ColumnContext {
					name: name.clone(),
					label: humanize(name),
					sort_url: Some(escape(&params.url(None, Some(&next)))),
					order: match active {
						Some(key) if key.descending => "desc",
						Some(_) => "asc",
						None => "",
					},
				}
			})
			.collect()
	}

	async fn row(&self, record: &Record) -> AdminResult<RowContext> {
		let pk = self.backend.record_pk(record).unwrap_or_default();

		let cells = if self.options.list_display.is_empty() {
			vec![escape(&self.backend.label(record))]
		} else {
			let admin = self.base.admin();
			let mut cells = Vec::with_capacity(self.options.list_display.len());
			for name in &self.options.list_display {
				let value = record.get(name).cloned().unwrap_or_default();
				let cell = match self.schema().field(name).map(|f| &f.kind) {
					Some(FieldKind::Reference { target }) => reference_html(admin.as_ref(), target, &value).await?,
					_ => escape(&display_value(&value)),
				};
				cells.push(cell);
			}
			cells
		};

		Ok(RowContext {
			edit_url: escape(&self.edit_url(&pk)),
			pk,
			cells,
		})
	}
}
