//! Admin registry

use crate::error::{AdminError, AdminResult};
use crate::handler::ViewHandler;
use crate::index::IndexView;
use crate::menu::MenuItem;
use crate::model_admin::ModelAdmin;
use crate::options::{ModelAdminOptions, ViewOptions};
use crate::render::{AdminTemplates, MenuContext};
use crate::view::AdminView;
use overseer_apps::Application;
use overseer_db::ModelBackend;
use overseer_http::Request;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

pub(crate) struct AdminInner {
	name: String,
	url: String,
	app: OnceLock<Application>,
	index_view: Arc<dyn AdminView>,
	views: RwLock<Vec<Arc<dyn AdminView>>>,
	templates: RwLock<AdminTemplates>,
}

/// Admin registry
///
/// `Admin` is a cheap handle; clones share the same registry. It always holds
/// its index view as the first view.
///
/// # Examples
///
/// ```
/// use overseer_admin::Admin;
///
/// let admin = Admin::new().unwrap();
/// assert_eq!(admin.name(), "Admin");
/// assert_eq!(admin.url(), "/admin");
/// assert!(admin.app().is_none());
/// assert_eq!(admin.views().len(), 1);
/// ```
#[derive(Clone)]
pub struct Admin {
	inner: Arc<AdminInner>,
}

/// Builder for [`Admin`]
#[derive(Default)]
pub struct AdminBuilder {
	name: Option<String>,
	url: Option<String>,
	index_view: Option<Arc<dyn AdminView>>,
	app: Option<Application>,
}

impl AdminBuilder {
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Mount URL of the admin
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	/// Replace the default index view
	pub fn index_view<V: AdminView>(mut self, view: Arc<V>) -> Self {
		self.index_view = Some(view);
		self
	}

	/// Bind to `app` as part of construction
	///
	/// Name and URL not set on the builder come from the application settings.
	pub fn app(mut self, app: &Application) -> Self {
		self.app = Some(app.clone());
		self
	}

	pub fn build(self) -> AdminResult<Admin> {
		let settings = self.app.as_ref().map(|app| app.settings());
		let name = self
			.name
			.or_else(|| settings.map(|s| s.admin_name.clone()))
			.unwrap_or_else(|| "Admin".to_string());
		let url = self
			.url
			.or_else(|| settings.map(|s| s.admin_url.clone()))
			.unwrap_or_else(|| "/admin".to_string());
		let index_view = self
			.index_view
			.unwrap_or_else(|| Arc::new(IndexView::new(ViewOptions::new().url(url.clone()))));

		let admin = Admin {
			inner: Arc::new(AdminInner {
				name,
				url,
				app: OnceLock::new(),
				index_view: Arc::clone(&index_view),
				views: RwLock::new(Vec::new()),
				templates: RwLock::new(AdminTemplates::new()?),
			}),
		};
		admin.attach(index_view)?;

		if let Some(app) = &self.app {
			admin.init_app(app)?;
		}
		Ok(admin)
	}
}

impl Admin {
	/// Admin named `Admin` mounted at `/admin`, not yet bound
	pub fn new() -> AdminResult<Self> {
		Self::builder().build()
	}

	pub fn builder() -> AdminBuilder {
		AdminBuilder::default()
	}

	pub(crate) fn from_inner(inner: Arc<AdminInner>) -> Self {
		Self { inner }
	}

	pub(crate) fn downgrade(&self) -> Weak<AdminInner> {
		Arc::downgrade(&self.inner)
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	pub fn url(&self) -> &str {
		&self.inner.url
	}

	pub fn app(&self) -> Option<&Application> {
		self.inner.app.get()
	}

	/// Registered views, index view first
	pub fn views(&self) -> Vec<Arc<dyn AdminView>> {
		self.inner.views.read().clone()
	}

	pub fn index_view(&self) -> Arc<dyn AdminView> {
		Arc::clone(&self.inner.index_view)
	}

	pub fn view_by_endpoint(&self, endpoint: &str) -> Option<Arc<dyn AdminView>> {
		self.inner
			.views
			.read()
			.iter()
			.find(|v| v.base().endpoint() == Some(endpoint))
			.cloned()
	}

	/// The model-admin view registered for the model named `model_name`
	pub fn model_view(&self, model_name: &str) -> Option<Arc<dyn AdminView>> {
		self.inner
			.views
			.read()
			.iter()
			.find(|v| {
				v.as_model_admin()
					.is_some_and(|m| m.model_name() == model_name)
			})
			.cloned()
	}

	/// Whether both handles refer to the same registry
	pub fn ptr_eq(&self, other: &Admin) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Attach `view` and, when bound, mount it on the application
	///
	/// Fails when the view has no `/` route or its endpoint is taken.
	pub fn add_view<V: AdminView>(&self, view: Arc<V>) -> AdminResult<()> {
		self.attach(view)
	}

	/// Build a model-admin view over `backend` and attach it
	pub fn register(
		&self,
		backend: Arc<dyn ModelBackend>,
		options: ModelAdminOptions,
	) -> AdminResult<Arc<ModelAdmin>> {
		let view = Arc::new(ModelAdmin::new(backend, options)?);
		self.attach(Arc::clone(&view) as Arc<dyn AdminView>)?;
		Ok(view)
	}

	fn attach(&self, view: Arc<dyn AdminView>) -> AdminResult<()> {
		let endpoint = view.resolved_endpoint();
		if !view.routes().iter().any(|r| r.is_default()) {
			return Err(AdminError::NoDefaultRoute(endpoint));
		}

		let mut views = self.inner.views.write();
		if views.iter().any(|v| v.base().endpoint() == Some(endpoint.as_str())) {
			return Err(AdminError::DuplicateEndpoint(endpoint));
		}
		let blueprint = view.create_blueprint(self)?;
		views.push(Arc::clone(&view));
		drop(views);

		tracing::info!(
			endpoint = %blueprint.name,
			url = %blueprint.url_prefix,
			routes = blueprint.routes.len(),
			"Registered admin view"
		);

		if let Some(app) = self.app() {
			mount(app, view, self)?;
		}
		Ok(())
	}

	/// Bind the registry to `app`, mounting every registered view
	///
	/// May be called once; a second call fails with [`AdminError::AlreadyBound`].
	pub fn init_app(&self, app: &Application) -> AdminResult<()> {
		self.inner
			.app
			.set(app.clone())
			.map_err(|_| AdminError::AlreadyBound)?;
		for view in self.views() {
			mount(app, view, self)?;
		}
		tracing::info!(admin = %self.name(), url = %self.url(), "Admin bound to application");
		Ok(())
	}

	/// Navigation menu, grouped by category in first-seen order
	pub fn menu(&self) -> Vec<MenuItem> {
		let mut menu: Vec<MenuItem> = Vec::new();
		for view in self.views() {
			match view.base().category().map(str::to_string) {
				None => menu.push(MenuItem::View(view)),
				Some(category) => {
					let existing = menu.iter_mut().find_map(|item| match item {
						MenuItem::Category { name, children } if *name == category => Some(children),
						_ => None,
					});
					match existing {
						Some(children) => children.push(view),
						None => menu.push(MenuItem::Category {
							name: category,
							children: vec![view],
						}),
					}
				}
			}
		}
		menu
	}

	/// Category names in first-seen order
	pub fn menu_categories(&self) -> Vec<String> {
		self.menu()
			.into_iter()
			.filter_map(|item| match item {
				MenuItem::Category { name, .. } => Some(name),
				MenuItem::View(_) => None,
			})
			.collect()
	}

	/// Register a template, replacing any existing one with the same name
	pub fn add_template(&self, name: &str, source: &str) -> AdminResult<()> {
		self.inner.templates.write().add(name, source)
	}

	/// Render `template` with the admin's base context added to `context`
	pub fn render(&self, request: &Request, template: &str, mut context: tera::Context) -> AdminResult<String> {
		context.insert("admin_name", self.name());
		context.insert("admin_url", self.url());
		context.insert("menu", &MenuContext::visible(&self.menu(), request));
		self.inner.templates.read().render(template, &context)
	}
}

fn mount(app: &Application, view: Arc<dyn AdminView>, admin: &Admin) -> AdminResult<()> {
	let url = view
		.base()
		.url()
		.map(str::to_string)
		.ok_or_else(|| AdminError::NotFound(format!("URL of view '{}'", view.resolved_endpoint())))?;
	app.mount(&url, Arc::new(ViewHandler::new(view, admin.clone())))?;
	Ok(())
}

impl fmt::Debug for Admin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let endpoints: Vec<String> = self.views().iter().map(|v| v.resolved_endpoint()).collect();
		f.debug_struct("Admin")
			.field("name", &self.name())
			.field("url", &self.url())
			.field("bound", &self.app().is_some())
			.field("views", &endpoints)
			.finish()
	}
}
