//! Backend error types

/// Result type for backend operations
pub type DbResult<T> = std::result::Result<T, DbError>;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DbError {
	/// The model's schema could not be described
	#[error("Schema error: {0}")]
	Schema(String),

	/// A value does not fit the field it is written to
	#[error("Invalid value for '{field}': {message}")]
	InvalidValue { field: String, message: String },

	/// Referential or uniqueness constraint violated
	#[error("Integrity error: {0}")]
	Integrity(String),

	#[error("Database error: {0}")]
	Database(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl DbError {
	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		DbError::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}

impl From<sqlx::Error> for DbError {
	fn from(err: sqlx::Error) -> Self {
		if let Some(db_err) = err.as_database_error() {
			match db_err.kind() {
				sqlx::error::ErrorKind::ForeignKeyViolation
				| sqlx::error::ErrorKind::UniqueViolation
				| sqlx::error::ErrorKind::NotNullViolation
				| sqlx::error::ErrorKind::CheckViolation => {
					return DbError::Integrity(db_err.message().to_string());
				}
				_ => {}
			}
		}
		DbError::Database(err.to_string())
	}
}
