use super::Request;
use crate::Result;
use hyper::Uri;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

impl Request {
	/// Parse and URL-decode the query string
	///
	/// A malformed query string yields no parameters rather than an error.
	pub(super) fn parse_query_params(uri: &Uri) -> HashMap<String, String> {
		uri.query()
			.map(|q| match serde_urlencoded::from_str::<Vec<(String, String)>>(q) {
				Ok(pairs) => pairs.into_iter().collect(),
				Err(e) => {
					tracing::warn!(query = q, error = %e, "Ignoring malformed query string");
					HashMap::new()
				}
			})
			.unwrap_or_default()
	}

	/// Get the request path
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Request;
	///
	/// let request = Request::get("/admin/person/?q=john").unwrap();
	/// assert_eq!(request.path(), "/admin/person/");
	/// ```
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Get a single decoded query parameter
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Request;
	///
	/// let request = Request::get("/list/?q=John%20Doe&sort=-age").unwrap();
	/// assert_eq!(request.query_param("q"), Some("John Doe"));
	/// assert_eq!(request.query_param("sort"), Some("-age"));
	/// assert_eq!(request.query_param("page"), None);
	/// ```
	pub fn query_param(&self, name: &str) -> Option<&str> {
		self.query_params.get(name).map(String::as_str)
	}

	/// Decode an `application/x-www-form-urlencoded` body
	///
	/// When a key repeats, the last value wins.
	pub fn form(&self) -> Result<HashMap<String, String>> {
		if self.body.is_empty() {
			return Ok(HashMap::new());
		}
		let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&self.body)?;
		Ok(pairs.into_iter().collect())
	}
}

pub(super) fn encode_form<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
	let pairs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect();
	// Serializing a sequence of string pairs cannot fail.
	serde_urlencoded::to_string(pairs).unwrap_or_default()
}

pub(super) fn decode_path(path: &str) -> String {
	percent_decode_str(path).decode_utf8_lossy().to_string()
}
