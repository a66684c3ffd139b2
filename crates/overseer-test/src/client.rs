//! In-process test client

use crate::response::TestResponse;
use overseer_apps::Application;
use overseer_http::{Handler, Method, Request, Response};

/// Client that drives an [`Application`] directly
///
/// # Examples
///
/// ```
/// use overseer_apps::Application;
/// use overseer_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let client = TestClient::new(Application::default());
/// let response = client.get("/missing/").await;
/// assert_eq!(response.status_code(), 404);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct TestClient {
	app: Application,
}

impl TestClient {
	pub fn new(app: Application) -> Self {
		Self { app }
	}

	pub fn app(&self) -> &Application {
		&self.app
	}

	pub async fn get(&self, uri: &str) -> TestResponse {
		self.send(Request::builder().method(Method::GET).uri(uri).build())
			.await
	}

	/// POST `pairs` as an urlencoded form
	pub async fn post_form<K: AsRef<str>, V: AsRef<str>>(&self, uri: &str, pairs: &[(K, V)]) -> TestResponse {
		self.send(
			Request::builder()
				.method(Method::POST)
				.uri(uri)
				.form(pairs)
				.build(),
		)
		.await
	}

	/// Dispatch `request`; handler errors become their error responses
	pub async fn request(&self, request: Request) -> TestResponse {
		self.send(Ok(request)).await
	}

	async fn send(&self, request: overseer_http::Result<Request>) -> TestResponse {
		let response = match request {
			Ok(request) => {
				tracing::debug!(method = %request.method, path = %request.path(), "Test request");
				self.app.handle(request).await.unwrap_or_else(Response::from)
			}
			Err(e) => Response::from(e),
		};
		TestResponse::new(response)
	}
}
