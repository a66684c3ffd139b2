//! Navigation menu

use crate::view::AdminView;
use overseer_http::Request;
use std::fmt;
use std::sync::Arc;

/// One entry of the admin menu
///
/// A category is synthetic: it has no URL of its own and is never accessible,
/// but it is shown while at least one of its children is.
#[derive(Clone)]
pub enum MenuItem {
	View(Arc<dyn AdminView>),
	Category {
		name: String,
		children: Vec<Arc<dyn AdminView>>,
	},
}

impl MenuItem {
	pub fn name(&self) -> String {
		match self {
			MenuItem::View(view) => view
				.base()
				.name()
				.map(str::to_string)
				.unwrap_or_else(|| view.default_name()),
			MenuItem::Category { name, .. } => name.clone(),
		}
	}

	pub fn url(&self) -> Option<String> {
		match self {
			MenuItem::View(view) => view.base().url().map(str::to_string),
			MenuItem::Category { .. } => None,
		}
	}

	pub fn is_category(&self) -> bool {
		matches!(self, MenuItem::Category { .. })
	}

	pub fn is_accessible(&self, request: &Request) -> bool {
		match self {
			MenuItem::View(view) => view.is_accessible(request),
			MenuItem::Category { .. } => false,
		}
	}

	/// Every child, accessible or not
	pub fn all_children(&self) -> &[Arc<dyn AdminView>] {
		match self {
			MenuItem::View(_) => &[],
			MenuItem::Category { children, .. } => children,
		}
	}

	/// Children accessible for `request`
	pub fn children(&self, request: &Request) -> Vec<Arc<dyn AdminView>> {
		self.all_children()
			.iter()
			.filter(|v| v.is_accessible(request))
			.cloned()
			.collect()
	}

	/// Whether the entry should be shown for `request`
	pub fn is_visible(&self, request: &Request) -> bool {
		match self {
			MenuItem::View(view) => view.is_accessible(request),
			MenuItem::Category { children, .. } => children.iter().any(|v| v.is_accessible(request)),
		}
	}
}

impl fmt::Debug for MenuItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MenuItem::View(view) => f
				.debug_tuple("View")
				.field(&view.resolved_endpoint())
				.finish(),
			MenuItem::Category { name, children } => f
				.debug_struct("Category")
				.field("name", name)
				.field("children", &children.len())
				.finish(),
		}
	}
}
