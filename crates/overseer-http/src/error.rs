use hyper::StatusCode;

/// HTTP-level error
///
/// Every variant maps onto one status code through [`Error::status_code`].
/// Converting an error into a [`crate::Response`] never leaks the detail of an
/// internal error into the body.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid URI: {0}")]
	InvalidUri(String),

	#[error("Malformed form body: {0}")]
	FormParse(#[from] serde_urlencoded::de::Error),

	#[error("Bad request: {0}")]
	BadRequest(String),

	#[error("Forbidden: {0}")]
	Forbidden(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),

	#[error("Internal server error: {0}")]
	Internal(String),
}

impl Error {
	/// Status code this error is reported with
	///
	/// # Examples
	///
	/// ```
	/// use overseer_http::Error;
	/// use hyper::StatusCode;
	///
	/// let err = Error::NotFound("/missing/".into());
	/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
	/// ```
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::InvalidUri(_) | Error::FormParse(_) | Error::BadRequest(_) => {
				StatusCode::BAD_REQUEST
			}
			Error::Forbidden(_) => StatusCode::FORBIDDEN,
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
			Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Message that is safe to show to a client
	pub fn public_message(&self) -> String {
		match self {
			Error::Internal(_) => "Internal server error".to_string(),
			other => other.to_string(),
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
