//! Error types for the admin

use overseer_apps::AppError;
use overseer_db::DbError;

/// Admin error type
///
/// Configuration variants are raised at setup time. Request-time variants map
/// onto an HTTP status through the conversion into [`overseer_http::Error`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
	/// Another view already uses this endpoint
	#[error("View endpoint '{0}' is already registered")]
	DuplicateEndpoint(String),

	#[error("Admin is already bound to an application")]
	AlreadyBound,

	#[error("View '{0}' is already attached to an admin")]
	AlreadyAttached(String),

	/// The view has no route at `/`
	#[error("View '{0}' does not expose a default '/' route")]
	NoDefaultRoute(String),

	/// The model does not have exactly one primary key
	#[error("Model '{model}' cannot be administered: {reason}")]
	PrimaryKey { model: String, reason: String },

	/// An option names a field the model does not have
	#[error("Unknown field '{field}' in {option} of model '{model}'")]
	UnknownField {
		model: String,
		option: &'static str,
		field: String,
	},

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Permission denied: {0}")]
	PermissionDenied(String),

	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),

	#[error("Bad request: {0}")]
	BadRequest(String),

	#[error(transparent)]
	Database(#[from] DbError),

	#[error("Template rendering error: {0}")]
	Template(#[from] tera::Error),

	#[error(transparent)]
	App(#[from] AppError),
}

/// Result type for admin operations
pub type AdminResult<T> = Result<T, AdminError>;

impl From<overseer_http::Error> for AdminError {
	fn from(err: overseer_http::Error) -> Self {
		match err {
			overseer_http::Error::NotFound(msg) => AdminError::NotFound(msg),
			overseer_http::Error::Forbidden(msg) => AdminError::PermissionDenied(msg),
			overseer_http::Error::MethodNotAllowed(msg) => AdminError::MethodNotAllowed(msg),
			other => AdminError::BadRequest(other.to_string()),
		}
	}
}

impl From<AdminError> for overseer_http::Error {
	fn from(err: AdminError) -> Self {
		match err {
			AdminError::NotFound(msg) => overseer_http::Error::NotFound(msg),
			AdminError::PermissionDenied(msg) => overseer_http::Error::Forbidden(msg),
			AdminError::MethodNotAllowed(msg) => overseer_http::Error::MethodNotAllowed(msg),
			AdminError::BadRequest(msg) => overseer_http::Error::BadRequest(msg),
			other => overseer_http::Error::Internal(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use overseer_http::StatusCode;
	use rstest::rstest;

	#[rstest]
	#[case(AdminError::NotFound("x".into()), StatusCode::NOT_FOUND)]
	#[case(AdminError::PermissionDenied("x".into()), StatusCode::FORBIDDEN)]
	#[case(AdminError::MethodNotAllowed("x".into()), StatusCode::METHOD_NOT_ALLOWED)]
	#[case(AdminError::BadRequest("x".into()), StatusCode::BAD_REQUEST)]
	#[case(AdminError::Database(DbError::Database("disk I/O error".into())), StatusCode::INTERNAL_SERVER_ERROR)]
	#[case(AdminError::Database(DbError::Integrity("FOREIGN KEY constraint failed".into())), StatusCode::INTERNAL_SERVER_ERROR)]
	fn test_status_mapping(#[case] error: AdminError, #[case] expected: StatusCode) {
		// Act
		let http: overseer_http::Error = error.into();

		// Assert
		assert_eq!(http.status_code(), expected);
	}

	#[rstest]
	fn test_database_detail_is_hidden() {
		// Arrange
		let error = AdminError::Database(DbError::Database("secret table layout".into()));

		// Act
		let response: overseer_http::Response = overseer_http::Error::from(error).into();

		// Assert
		assert!(!response.text().contains("secret"));
	}
}
