use crate::Error;
use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};

/// HTTP Response representation
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Create a Response with HTTP 302 Found (temporary redirect)
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::temporary_redirect("/admin/person/");
	/// assert_eq!(response.status, StatusCode::FOUND);
	/// assert_eq!(
	///     response.headers.get("location").unwrap().to_str().unwrap(),
	///     "/admin/person/"
	/// );
	/// ```
	pub fn temporary_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::FOUND).with_location(location.as_ref())
	}

	/// Set the response body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set an HTML body and the matching content type
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Response;
	///
	/// let response = Response::ok().with_html("<p>ok</p>");
	/// assert_eq!(
	///     response.headers.get("content-type").unwrap().to_str().unwrap(),
	///     "text/html; charset=utf-8"
	/// );
	/// ```
	pub fn with_html(self, html: impl Into<String>) -> Self {
		self.with_header("content-type", "text/html; charset=utf-8")
			.with_body(html.into())
	}

	/// Add a custom header to the response
	///
	/// Invalid header names or values are skipped.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Add a Location header to the response
	pub fn with_location(mut self, location: &str) -> Self {
		if let Ok(value) = hyper::header::HeaderValue::from_str(location) {
			self.headers.insert(hyper::header::LOCATION, value);
		}
		self
	}

	/// Body decoded as UTF-8, lossily
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

impl From<Error> for Response {
	fn from(error: Error) -> Self {
		if error.status_code().is_server_error() {
			tracing::error!(error = %error, "Request failed");
		}
		Response::new(error.status_code())
			.with_header("content-type", "text/plain; charset=utf-8")
			.with_body(error.public_message())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_error_conversion_keeps_status() {
		// Act
		let response: Response = Error::Forbidden("admin".into()).into();

		// Assert
		assert_eq!(response.status, StatusCode::FORBIDDEN);
		assert_eq!(response.text(), "Forbidden: admin");
	}

	#[rstest]
	fn test_invalid_header_is_skipped() {
		// Act
		let response = Response::ok().with_header("bad header", "v");

		// Assert
		assert!(response.headers.is_empty());
	}
}
