//! HTTP request representation

mod params;

use crate::{Error, Result};
use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri};
use std::collections::HashMap;

/// HTTP request
///
/// `script_name` and `path_info` split the request path between the mount a
/// request was dispatched to and the remainder the mounted handler sees. A
/// request that has not been dispatched yet has an empty `script_name` and the
/// full path as `path_info`.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub query_params: HashMap<String, String>,
	pub script_name: String,
	pub path_info: String,
}

impl Request {
	/// Start building a request
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/admin/person/add/")
	///     .form(&[("name", "Steve"), ("age", "18")])
	///     .build()
	///     .unwrap();
	/// assert_eq!(request.method, Method::POST);
	/// assert_eq!(request.form().unwrap().get("name").map(String::as_str), Some("Steve"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Shorthand for a GET request without headers or body
	pub fn get(uri: &str) -> Result<Self> {
		Self::builder().method(Method::GET).uri(uri).build()
	}

	/// Narrow this request to a mount: the mount prefix moves from
	/// `path_info` to `script_name`.
	pub fn mounted_at(mut self, prefix: &str) -> Self {
		let remainder = self
			.path_info
			.strip_prefix(prefix)
			.unwrap_or(&self.path_info)
			.to_string();
		self.script_name.push_str(prefix);
		self.path_info = if remainder.is_empty() {
			"/".to_string()
		} else {
			remainder
		};
		self
	}
}

/// Builder for [`Request`]
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Add a single header, skipping names or values that are not valid HTTP
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			hyper::header::HeaderName::from_bytes(name.as_bytes()),
			hyper::header::HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Encode `pairs` as an `application/x-www-form-urlencoded` body
	pub fn form<K: AsRef<str>, V: AsRef<str>>(self, pairs: &[(K, V)]) -> Self {
		let encoded = params::encode_form(pairs);
		self.header("content-type", "application/x-www-form-urlencoded")
			.body(encoded)
	}

	pub fn build(self) -> Result<Request> {
		let raw = self.uri.unwrap_or_else(|| "/".to_string());
		let uri: Uri = raw
			.parse()
			.map_err(|e: hyper::http::uri::InvalidUri| Error::InvalidUri(format!("{}: {}", raw, e)))?;
		let query_params = Request::parse_query_params(&uri);
		let path_info = params::decode_path(uri.path());

		Ok(Request {
			method: self.method.unwrap_or(Method::GET),
			uri,
			headers: self.headers,
			body: self.body,
			query_params,
			script_name: String::new(),
			path_info,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_builder_defaults_to_get_root() {
		// Act
		let request = Request::builder().build().unwrap();

		// Assert
		assert_eq!(request.method, Method::GET);
		assert_eq!(request.path(), "/");
		assert_eq!(request.path_info, "/");
	}

	#[rstest]
	fn test_invalid_uri_is_rejected() {
		// Act
		let result = Request::builder().uri("http://[::1").build();

		// Assert
		assert!(matches!(result, Err(Error::InvalidUri(_))));
	}

	#[rstest]
	#[case("/admin/person/", "/admin/person", "/")]
	#[case("/admin/person", "/admin/person", "/")]
	#[case("/admin/person/3/delete/", "/admin/person", "/3/delete/")]
	fn test_mounted_at_splits_path(
		#[case] path: &str,
		#[case] prefix: &str,
		#[case] expected_info: &str,
	) {
		// Arrange
		let request = Request::get(path).unwrap();

		// Act
		let mounted = request.mounted_at(prefix);

		// Assert
		assert_eq!(mounted.script_name, prefix);
		assert_eq!(mounted.path_info, expected_info);
	}
}
