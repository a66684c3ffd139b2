//! Admin registry and base view behaviour over the in-process test client

use async_trait::async_trait;
use overseer_admin::{
	Admin, AdminError, AdminResult, AdminView, BaseView, Expose, MenuItem, ViewOptions, ViewRequest,
};
use overseer_apps::{Application, Settings};
use overseer_http::{Request, Response};
use overseer_test::TestClient;
use rstest::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

struct MockView {
	base: BaseView,
	allow_call: AtomicBool,
	allow_access: AtomicBool,
}

impl MockView {
	fn new(options: ViewOptions) -> Self {
		Self {
			base: BaseView::new(options),
			allow_call: AtomicBool::new(true),
			allow_access: AtomicBool::new(true),
		}
	}
}

#[async_trait]
impl AdminView for MockView {
	fn base(&self) -> &BaseView {
		&self.base
	}

	fn routes(&self) -> Vec<Expose> {
		vec![Expose::get("/", "index"), Expose::get("/test/", "test")]
	}

	fn is_accessible(&self, _request: &Request) -> bool {
		self.allow_access.load(Ordering::SeqCst)
	}

	async fn handle_view(&self, route: &str, request: ViewRequest) -> AdminResult<Response> {
		if !self.allow_call.load(Ordering::SeqCst) {
			return Ok(Response::ok().with_body("Failure!"));
		}
		if !self.is_accessible(&request.request) {
			return Ok(Response::forbidden());
		}
		self.call(route, request).await
	}

	async fn call(&self, route: &str, request: ViewRequest) -> AdminResult<Response> {
		match route {
			"test" => {
				let html = self
					.base
					.render(&request.request, "mock.html", tera::Context::new())?;
				Ok(Response::ok().with_html(html))
			}
			_ => Ok(Response::ok().with_body("Success!")),
		}
	}
}

#[fixture]
fn app() -> Application {
	Application::new(Settings::default().without_csrf())
}

#[rstest]
fn test_view_defaults_before_attachment() {
	// Arrange
	let view = MockView::new(ViewOptions::new());

	// Act & Assert
	assert!(view.base().name().is_none());
	assert!(view.base().category().is_none());
	assert!(view.base().endpoint().is_none());
	assert!(view.base().url().is_none());
	assert!(view.base().static_folder().is_none());
	assert!(view.base().admin().is_none());
	assert!(view.base().blueprint().is_none());
}

#[rstest]
fn test_admin_defaults() {
	// Act
	let admin = Admin::new().unwrap();

	// Assert
	assert_eq!(admin.name(), "Admin");
	assert_eq!(admin.url(), "/admin");
	assert!(admin.app().is_none());
	let views = admin.views();
	assert_eq!(views.len(), 1);
	assert_eq!(views[0].base().endpoint(), Some("admin"));
	assert_eq!(views[0].base().name(), Some("Home"));
	assert_eq!(views[0].base().url(), Some("/admin"));
}

#[rstest]
#[tokio::test]
async fn test_attached_view_resolves_defaults(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let view = Arc::new(MockView::new(ViewOptions::new()));

	// Act
	admin.add_view(Arc::clone(&view)).unwrap();

	// Assert
	assert_eq!(admin.views().len(), 2);
	assert_eq!(view.base().endpoint(), Some("mockview"));
	assert_eq!(view.base().url(), Some("/admin/mockview"));
	assert_eq!(view.base().name(), Some("Mock View"));
	assert!(view.base().admin().unwrap().ptr_eq(&admin));
	let blueprint = view.base().blueprint().unwrap();
	assert_eq!(blueprint.name, "mockview");
	assert_eq!(blueprint.url_prefix, "/admin/mockview");
	assert_eq!(blueprint.template_folder, "templates");
	assert_eq!(blueprint.routes.len(), 2);

	let client = TestClient::new(app);
	let response = client.get("/admin/mockview/").await;
	assert_eq!(response.status_code(), 200);
	assert_eq!(response.text(), "Success!");

	admin.add_template("mock.html", "Success!").unwrap();
	let response = client.get("/admin/mockview/test/").await;
	assert_eq!(response.status_code(), 200);
	assert_eq!(response.text(), "Success!");

	let response = client.get("/admin/mockview/missing/").await;
	assert_eq!(response.status_code(), 404);
}

#[rstest]
#[tokio::test]
async fn test_handle_view_and_access_hooks(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let view = Arc::new(MockView::new(ViewOptions::new()));
	admin.add_view(Arc::clone(&view)).unwrap();
	let client = TestClient::new(app);

	// Act
	view.allow_call.store(false, Ordering::SeqCst);
	let overridden = client.get("/admin/mockview/").await;
	view.allow_call.store(true, Ordering::SeqCst);
	view.allow_access.store(false, Ordering::SeqCst);
	let denied = client.get("/admin/mockview/").await;

	// Assert
	assert_eq!(overridden.text(), "Failure!");
	assert_eq!(denied.status_code(), 403);
}

#[rstest]
#[case(ViewOptions::new().name("Test").endpoint("foobar"), "foobar", "/admin/foobar", "Test")]
#[case(ViewOptions::new().url("test"), "mockview", "/admin/test", "Mock View")]
#[case(ViewOptions::new().url("/test/test"), "mockview", "/test/test", "Mock View")]
#[tokio::test]
async fn test_url_overrides(
	app: Application,
	#[case] options: ViewOptions,
	#[case] endpoint: &str,
	#[case] url: &str,
	#[case] name: &str,
) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let view = Arc::new(MockView::new(options));

	// Act
	admin.add_view(Arc::clone(&view)).unwrap();

	// Assert
	assert_eq!(view.base().endpoint(), Some(endpoint));
	assert_eq!(view.base().url(), Some(url));
	assert_eq!(view.base().name(), Some(name));
	let response = TestClient::new(app).get(&format!("{}/", url)).await;
	assert_eq!(response.text(), "Success!");
}

#[rstest]
#[tokio::test]
async fn test_custom_admin_url(app: Application) {
	// Arrange
	let admin = Admin::builder().url("/foobar").app(&app).build().unwrap();
	let client = TestClient::new(app);

	// Act
	let response = client.get("/foobar/").await;

	// Assert
	assert_eq!(admin.url(), "/foobar");
	assert_eq!(response.status_code(), 200);
}

#[rstest]
fn test_bare_view_cannot_be_added() {
	// Arrange
	let admin = Admin::new().unwrap();

	// Act
	let result = admin.add_view(Arc::new(BaseView::default()));

	// Assert
	assert!(matches!(result, Err(AdminError::NoDefaultRoute(endpoint)) if endpoint == "baseview"));
	assert_eq!(admin.views().len(), 1);
}

#[rstest]
fn test_duplicate_endpoint_rejected() {
	// Arrange
	let admin = Admin::new().unwrap();
	admin
		.add_view(Arc::new(MockView::new(ViewOptions::new())))
		.unwrap();

	// Act
	let result = admin.add_view(Arc::new(MockView::new(ViewOptions::new().url("other"))));

	// Assert
	assert!(matches!(result, Err(AdminError::DuplicateEndpoint(endpoint)) if endpoint == "mockview"));
}

#[rstest]
fn test_view_attaches_once() {
	// Arrange
	let first = Admin::new().unwrap();
	let second = Admin::new().unwrap();
	let view = Arc::new(MockView::new(ViewOptions::new()));
	first.add_view(Arc::clone(&view)).unwrap();

	// Act
	let result = second.add_view(view);

	// Assert
	assert!(matches!(result, Err(AdminError::AlreadyAttached(_))));
}

#[rstest]
fn test_submenu() {
	// Arrange
	let admin = Admin::new().unwrap();
	let hidden = Arc::new(MockView::new(
		ViewOptions::new().name("Test 2").category("Test").endpoint("test2"),
	));
	admin
		.add_view(Arc::new(MockView::new(
			ViewOptions::new().name("Test 1").category("Test").endpoint("test1"),
		)))
		.unwrap();
	admin.add_view(Arc::clone(&hidden)).unwrap();
	let request = Request::get("/admin/").unwrap();

	// Act
	let menu = admin.menu();

	// Assert
	assert_eq!(menu.len(), 2);
	assert_eq!(menu[0].name(), "Home");
	let category = &menu[1];
	assert!(matches!(category, MenuItem::Category { .. }));
	assert_eq!(category.name(), "Test");
	assert!(category.url().is_none());
	assert!(!category.is_accessible(&request));
	assert_eq!(category.all_children().len(), 2);
	assert_eq!(category.children(&request).len(), 2);
	assert_eq!(admin.menu_categories(), ["Test"]);

	hidden.allow_access.store(false, Ordering::SeqCst);
	assert_eq!(category.children(&request).len(), 1);
	assert!(category.is_visible(&request));
}

#[rstest]
#[tokio::test]
async fn test_menu_renders_visible_entries(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();
	let hidden = Arc::new(MockView::new(ViewOptions::new().name("Secret").category("Tools").endpoint("secret")));
	admin
		.add_view(Arc::new(MockView::new(
			ViewOptions::new().name("Reports").category("Tools").endpoint("reports"),
		)))
		.unwrap();
	admin.add_view(Arc::clone(&hidden)).unwrap();
	hidden.allow_access.store(false, Ordering::SeqCst);

	// Act
	let response = TestClient::new(app).get("/admin/").await;

	// Assert
	assert_eq!(response.status_code(), 200);
	assert!(response.contains(r#"<a href="/admin/reports/">Reports</a>"#));
	assert!(!response.contains("Secret"));
	assert!(response.contains("Tools"));
}

#[rstest]
#[tokio::test]
async fn test_delayed_init_app(app: Application) {
	// Arrange
	let admin = Admin::new().unwrap();
	admin
		.add_view(Arc::new(MockView::new(ViewOptions::new())))
		.unwrap();

	// Act
	admin.init_app(&app).unwrap();

	// Assert
	assert!(admin.app().unwrap().ptr_eq(&app));
	assert_eq!(app.mounts(), ["/admin", "/admin/mockview"]);
	let response = TestClient::new(app.clone()).get("/admin/mockview/").await;
	assert_eq!(response.text(), "Success!");
	assert!(matches!(admin.init_app(&app), Err(AdminError::AlreadyBound)));
}

#[rstest]
#[tokio::test]
async fn test_views_added_after_binding_are_mounted(app: Application) {
	// Arrange
	let admin = Admin::builder().app(&app).build().unwrap();

	// Act
	admin
		.add_view(Arc::new(MockView::new(ViewOptions::new())))
		.unwrap();
	let response = TestClient::new(app).get("/admin/mockview/").await;

	// Assert
	assert_eq!(response.text(), "Success!");
}

#[rstest]
#[case::builder(false)]
#[case::init_app(true)]
#[tokio::test]
async fn test_mounted_views_outlive_admin_handle(app: Application, #[case] delayed: bool) {
	// Arrange
	let admin = if delayed {
		Admin::new().unwrap()
	} else {
		Admin::builder().app(&app).build().unwrap()
	};
	admin
		.add_view(Arc::new(MockView::new(ViewOptions::new())))
		.unwrap();
	admin.add_template("mock.html", "Rendered").unwrap();
	if delayed {
		admin.init_app(&app).unwrap();
	}
	drop(admin);
	let client = TestClient::new(app);

	// Act
	let index = client.get("/admin/").await;
	let rendered = client.get("/admin/mockview/test/").await;

	// Assert
	assert_eq!(index.status_code(), 200);
	assert!(index.contains("Mock View"));
	assert_eq!(rendered.status_code(), 200);
	assert_eq!(rendered.text(), "Rendered");
}
