//! Base view
//!
//! An admin view is anything implementing [`AdminView`]. Its configurable
//! state lives in a [`BaseView`]: the overrides it was constructed with and,
//! once attached to an [`Admin`], the resolved name, endpoint and URL together
//! with the [`Blueprint`] that routes requests to it.

use crate::error::{AdminError, AdminResult};
use crate::model_admin::ModelAdmin;
use crate::options::ViewOptions;
use crate::routing::Expose;
use crate::site::{Admin, AdminInner};
use async_trait::async_trait;
use overseer_http::{Request, Response};
use std::collections::HashMap;
use std::sync::{OnceLock, Weak};

/// Routing namespace created when a view is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
	/// Same as the view endpoint
	pub name: String,
	/// Same as the view URL
	pub url_prefix: String,
	pub template_folder: String,
	pub static_folder: Option<String>,
	pub routes: Vec<Expose>,
}

/// A request routed to one view, with the parameters its route captured
#[derive(Debug, Clone)]
pub struct ViewRequest {
	pub request: Request,
	pub params: HashMap<String, String>,
}

impl ViewRequest {
	pub fn new(request: Request) -> Self {
		Self {
			request,
			params: HashMap::new(),
		}
	}

	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}
}

struct ViewBinding {
	name: String,
	endpoint: String,
	url: String,
	admin: Weak<AdminInner>,
	blueprint: Blueprint,
}

/// State shared by every admin view
///
/// Before attachment the accessors report the construction overrides; after
/// attachment they report the resolved values.
///
/// # Examples
///
/// ```
/// use overseer_admin::{BaseView, ViewOptions};
///
/// let view = BaseView::new(ViewOptions::new().name("Test"));
/// assert_eq!(view.name(), Some("Test"));
/// assert_eq!(view.endpoint(), None);
/// assert!(view.admin().is_none());
/// assert!(view.blueprint().is_none());
/// ```
#[derive(Default)]
pub struct BaseView {
	options: ViewOptions,
	binding: OnceLock<ViewBinding>,
}

impl BaseView {
	pub fn new(options: ViewOptions) -> Self {
		Self {
			options,
			binding: OnceLock::new(),
		}
	}

	pub fn options(&self) -> &ViewOptions {
		&self.options
	}

	pub fn name(&self) -> Option<&str> {
		self.binding
			.get()
			.map(|b| b.name.as_str())
			.or(self.options.name.as_deref())
	}

	pub fn category(&self) -> Option<&str> {
		self.options.category.as_deref()
	}

	pub fn endpoint(&self) -> Option<&str> {
		self.binding
			.get()
			.map(|b| b.endpoint.as_str())
			.or(self.options.endpoint.as_deref())
	}

	pub fn url(&self) -> Option<&str> {
		self.binding
			.get()
			.map(|b| b.url.as_str())
			.or(self.options.url.as_deref())
	}

	pub fn static_folder(&self) -> Option<&str> {
		self.options.static_folder.as_deref()
	}

	/// The admin this view is attached to
	pub fn admin(&self) -> Option<Admin> {
		self.binding
			.get()
			.and_then(|b| b.admin.upgrade())
			.map(Admin::from_inner)
	}

	pub fn blueprint(&self) -> Option<&Blueprint> {
		self.binding.get().map(|b| &b.blueprint)
	}

	pub fn is_attached(&self) -> bool {
		self.binding.get().is_some()
	}

	/// Render `template` with the attached admin's template engine
	pub fn render(&self, request: &Request, template: &str, context: tera::Context) -> AdminResult<String> {
		let admin = self
			.admin()
			.ok_or_else(|| AdminError::NotFound(format!("view is not attached, cannot render '{}'", template)))?;
		admin.render(request, template, context)
	}
}

/// Split a CamelCase identifier into words: `MockView` becomes `Mock View`
///
/// # Examples
///
/// ```
/// use overseer_admin::view::humanize_class_name;
///
/// assert_eq!(humanize_class_name("MockView"), "Mock View");
/// assert_eq!(humanize_class_name("HTTPStatusView"), "HTTP Status View");
/// assert_eq!(humanize_class_name("Model1"), "Model1");
/// ```
pub fn humanize_class_name(name: &str) -> String {
	let chars: Vec<char> = name.chars().collect();
	let mut words = String::with_capacity(name.len() + 4);
	for (i, &ch) in chars.iter().enumerate() {
		if i > 0 && ch.is_uppercase() {
			let prev = chars[i - 1];
			let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
			if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
				words.push(' ');
			}
		}
		words.push(ch);
	}
	words
}

/// Last path segment of a type name, without generic arguments
fn short_type_name(full: &'static str) -> &'static str {
	let without_generics = full.split('<').next().unwrap_or(full);
	without_generics.rsplit("::").next().unwrap_or(without_generics)
}

/// Resolve a view URL against the admin mount URL
pub(crate) fn resolve_url(mount_url: &str, endpoint: &str, url: Option<&str>) -> String {
	let mount = mount_url.trim_end_matches('/');
	match url {
		Some(url) if url.starts_with('/') => url.to_string(),
		Some(url) => format!("{}/{}", mount, url),
		None => format!("{}/{}", mount, endpoint),
	}
}

/// An admin view
///
/// Implementors provide their [`BaseView`], the routes they expose and the
/// handler behind each route. Every request passes through
/// [`AdminView::handle_view`] before reaching [`AdminView::call`].
#[async_trait]
pub trait AdminView: Send + Sync + 'static {
	fn base(&self) -> &BaseView;

	/// Routes relative to the view URL; one of them must be `/`
	fn routes(&self) -> Vec<Expose>;

	/// Handle the route named `route`
	async fn call(&self, route: &str, request: ViewRequest) -> AdminResult<Response>;

	/// Type name the default name and endpoint derive from
	fn class_name(&self) -> &'static str {
		short_type_name(std::any::type_name::<Self>())
	}

	fn default_name(&self) -> String {
		humanize_class_name(self.class_name())
	}

	fn default_endpoint(&self) -> String {
		self.class_name().to_lowercase()
	}

	/// Authorization hook; denied requests get a 403 response
	fn is_accessible(&self, _request: &Request) -> bool {
		true
	}

	/// Gate every route passes through
	async fn handle_view(&self, route: &str, request: ViewRequest) -> AdminResult<Response> {
		if !self.is_accessible(&request.request) {
			tracing::warn!(
				endpoint = self.base().endpoint().unwrap_or_default(),
				path = %request.request.path(),
				"Access denied"
			);
			return Ok(Response::forbidden());
		}
		self.call(route, request).await
	}

	fn as_model_admin(&self) -> Option<&ModelAdmin> {
		None
	}

	/// Endpoint this view resolves to, attached or not
	fn resolved_endpoint(&self) -> String {
		self.base()
			.endpoint()
			.map(str::to_string)
			.unwrap_or_else(|| self.default_endpoint())
	}

	/// Attach this view to `admin`, resolving its name, endpoint and URL
	///
	/// Fails with [`AdminError::AlreadyAttached`] on a second call.
	fn create_blueprint(&self, admin: &Admin) -> AdminResult<Blueprint> {
		let base = self.base();
		let endpoint = self.resolved_endpoint();
		if base.is_attached() {
			return Err(AdminError::AlreadyAttached(endpoint));
		}

		let name = base
			.options
			.name
			.clone()
			.unwrap_or_else(|| self.default_name());
		let url = resolve_url(admin.url(), &endpoint, base.options.url.as_deref());
		let blueprint = Blueprint {
			name: endpoint.clone(),
			url_prefix: url.clone(),
			template_folder: "templates".to_string(),
			static_folder: base.options.static_folder.clone(),
			routes: self.routes(),
		};

		base.binding
			.set(ViewBinding {
				name,
				endpoint: endpoint.clone(),
				url,
				admin: admin.downgrade(),
				blueprint: blueprint.clone(),
			})
			.map_err(|_| AdminError::AlreadyAttached(endpoint))?;
		Ok(blueprint)
	}
}

/// A bare view exposes no routes, so it can never be added to an admin
#[async_trait]
impl AdminView for BaseView {
	fn base(&self) -> &BaseView {
		self
	}

	fn routes(&self) -> Vec<Expose> {
		Vec::new()
	}

	async fn call(&self, route: &str, _request: ViewRequest) -> AdminResult<Response> {
		Err(AdminError::NotFound(format!("route '{}'", route)))
	}
}
