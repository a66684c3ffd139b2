//! Template rendering for the admin interface
//!
//! The built-in templates are compiled into the crate and loaded into a Tera
//! instance per admin. Applications can add or replace templates at runtime.
//!
//! Context values ending up in `href` attributes, and pre-rendered widget
//! HTML, are escaped on the Rust side and emitted with the `safe` filter; all
//! other strings rely on Tera's autoescaping.

use crate::error::AdminResult;
use crate::menu::MenuItem;
use overseer_forms::escape;
use overseer_http::Request;
use serde::Serialize;
use tera::Tera;

const BUILTIN_TEMPLATES: [(&str, &str); 5] = [
	("admin/base.html", include_str!("../templates/admin/base.html")),
	("admin/index.html", include_str!("../templates/admin/index.html")),
	("admin/model/list.html", include_str!("../templates/admin/model/list.html")),
	("admin/model/edit.html", include_str!("../templates/admin/model/edit.html")),
	("admin/model/delete.html", include_str!("../templates/admin/model/delete.html")),
];

pub(crate) struct AdminTemplates {
	tera: Tera,
}

impl AdminTemplates {
	pub(crate) fn new() -> AdminResult<Self> {
		let mut tera = Tera::default();
		tera.add_raw_templates(BUILTIN_TEMPLATES)?;
		Ok(Self { tera })
	}

	pub(crate) fn add(&mut self, name: &str, source: &str) -> AdminResult<()> {
		self.tera.add_raw_template(name, source)?;
		Ok(())
	}

	pub(crate) fn render(&self, name: &str, context: &tera::Context) -> AdminResult<String> {
		Ok(self.tera.render(name, context)?)
	}
}

/// Menu entry as templates see it
#[derive(Debug, Clone, Serialize)]
pub struct MenuContext {
	pub name: String,
	/// Escaped; `None` for categories
	pub url: Option<String>,
	pub children: Vec<MenuContext>,
}

impl MenuContext {
	/// Entries of `menu` visible for `request`, with inaccessible children dropped
	pub fn visible(menu: &[MenuItem], request: &Request) -> Vec<MenuContext> {
		menu.iter()
			.filter(|item| item.is_visible(request))
			.map(|item| MenuContext {
				name: item.name(),
				url: item.url().map(|u| escape(&u)),
				children: item
					.children(request)
					.into_iter()
					.map(|view| {
						let child = MenuItem::View(view);
						MenuContext {
							name: child.name(),
							url: child.url().map(|u| escape(&u)),
							children: Vec::new(),
						}
					})
					.collect(),
			})
			.collect()
	}
}

/// List column header
#[derive(Debug, Clone, Serialize)]
pub struct ColumnContext {
	pub name: String,
	pub label: String,
	/// `None` for columns that cannot be sorted
	pub sort_url: Option<String>,
	/// `asc`, `desc` or empty
	pub order: &'static str,
}

/// One record on the list page
#[derive(Debug, Clone, Serialize)]
pub struct RowContext {
	pub pk: String,
	pub edit_url: String,
	/// Rendered HTML per column
	pub cells: Vec<String>,
}

/// Pager entry; `number` is one-based
#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
	pub number: usize,
	pub url: String,
	pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListContext {
	pub view_name: String,
	pub model_name: String,
	pub list_url: String,
	pub add_url: String,
	pub columns: Vec<ColumnContext>,
	pub rows: Vec<RowContext>,
	pub total: u64,
	pub search_enabled: bool,
	pub search_query: String,
	pub pages: Vec<PageLink>,
}

/// Form field as the edit template renders it
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
	pub name: String,
	pub label_html: String,
	pub html: String,
	pub errors: Vec<String>,
	pub required: bool,
	pub readonly: bool,
	pub help_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormContext {
	pub title: String,
	pub model_name: String,
	pub action_url: String,
	pub list_url: String,
	pub delete_url: Option<String>,
	pub fields: Vec<FieldContext>,
	/// Form-level errors
	pub errors: Vec<String>,
	pub csrf_input: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteContext {
	pub model_name: String,
	pub object_label: String,
	pub action_url: String,
	pub cancel_url: String,
	pub errors: Vec<String>,
	pub csrf_input: Option<String>,
}
