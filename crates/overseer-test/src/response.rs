//! Test response wrapper with assertion helpers

use overseer_http::{HeaderMap, Response, StatusCode};

/// Response captured by [`crate::TestClient`]
#[derive(Debug, Clone)]
pub struct TestResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: String,
}

impl TestResponse {
	pub fn new(response: Response) -> Self {
		Self {
			status: response.status,
			body: response.text(),
			headers: response.headers,
		}
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Status as a plain number, e.g. `302`
	pub fn status_code(&self) -> u16 {
		self.status.as_u16()
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	/// Target of a redirect
	pub fn location(&self) -> Option<&str> {
		self.header("location")
	}

	pub fn text(&self) -> &str {
		&self.body
	}

	pub fn contains(&self, needle: &str) -> bool {
		self.body.contains(needle)
	}

	/// Assert the status, printing the body on mismatch
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Response;
	/// use overseer_test::TestResponse;
	///
	/// let response = TestResponse::new(Response::ok().with_body("Success!"));
	/// response.assert_status(200);
	/// assert_eq!(response.text(), "Success!");
	/// ```
	pub fn assert_status(&self, expected: u16) -> &Self {
		assert_eq!(
			self.status_code(),
			expected,
			"unexpected status, body:\n{}",
			self.body
		);
		self
	}
}
