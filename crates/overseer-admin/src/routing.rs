//! Route patterns relative to a view's URL

use overseer_http::Method;
use std::collections::HashMap;

/// A route a view exposes
///
/// `path` is relative to the view URL; a `{name}` segment captures one path
/// segment into the route parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expose {
	pub path: String,
	pub methods: Vec<Method>,
	/// Handler name passed to [`crate::AdminView::call`]
	pub name: String,
}

impl Expose {
	pub fn new(path: impl Into<String>, name: impl Into<String>, methods: &[Method]) -> Self {
		Self {
			path: path.into(),
			methods: methods.to_vec(),
			name: name.into(),
		}
	}

	pub fn get(path: impl Into<String>, name: impl Into<String>) -> Self {
		Self::new(path, name, &[Method::GET])
	}

	/// Whether this is the view's default route
	pub fn is_default(&self) -> bool {
		self.path.trim_matches('/').is_empty()
	}

	pub fn allows(&self, method: &Method) -> bool {
		self.methods.contains(method) || (*method == Method::HEAD && self.methods.contains(&Method::GET))
	}
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
	path.split('/').filter(|s| !s.is_empty())
}

/// Match `path` against `pattern`, returning the captured parameters
///
/// A missing trailing slash is tolerated.
pub(crate) fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
	let expected: Vec<&str> = segments(pattern).collect();
	let actual: Vec<&str> = segments(path).collect();
	if expected.len() != actual.len() {
		return None;
	}

	let mut params = HashMap::new();
	for (want, got) in expected.iter().zip(&actual) {
		match want.strip_prefix('{').and_then(|w| w.strip_suffix('}')) {
			Some(name) => {
				params.insert(name.to_string(), got.to_string());
			}
			None if want == got => {}
			None => return None,
		}
	}
	Some(params)
}

/// Outcome of resolving a request against a view's routes
#[derive(Debug)]
pub(crate) enum Resolved<'a> {
	Found(&'a Expose, HashMap<String, String>),
	WrongMethod,
	Missing,
}

/// First route matching both `path` and `method`
pub(crate) fn resolve<'a>(routes: &'a [Expose], method: &Method, path: &str) -> Resolved<'a> {
	let mut path_matched = false;
	for route in routes {
		if let Some(params) = match_path(&route.path, path) {
			if route.allows(method) {
				return Resolved::Found(route, params);
			}
			path_matched = true;
		}
	}
	if path_matched {
		Resolved::WrongMethod
	} else {
		Resolved::Missing
	}
}
