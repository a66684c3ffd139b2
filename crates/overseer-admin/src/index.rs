//! Admin dashboard

use crate::error::AdminResult;
use crate::options::ViewOptions;
use crate::routing::Expose;
use crate::view::{AdminView, BaseView, ViewRequest};
use async_trait::async_trait;
use overseer_http::Response;

/// Default index view, named `Home` under the endpoint `admin`
///
/// Renders `admin/index.html`, which lists the menu.
pub struct IndexView {
	base: BaseView,
}

impl IndexView {
	pub fn new(options: ViewOptions) -> Self {
		Self {
			base: BaseView::new(options),
		}
	}
}

#[async_trait]
impl AdminView for IndexView {
	fn base(&self) -> &BaseView {
		&self.base
	}

	fn routes(&self) -> Vec<Expose> {
		vec![Expose::get("/", "index")]
	}

	fn default_name(&self) -> String {
		"Home".to_string()
	}

	fn default_endpoint(&self) -> String {
		"admin".to_string()
	}

	async fn call(&self, _route: &str, request: ViewRequest) -> AdminResult<Response> {
		let html = self
			.base
			.render(&request.request, "admin/index.html", tera::Context::new())?;
		Ok(Response::ok().with_html(html))
	}
}
