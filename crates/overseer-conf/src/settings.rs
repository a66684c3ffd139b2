//! Application settings

use crate::sources::{ConfigSource, EnvSource, SourceError, TomlFileSource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Settings shared by an application and the admin mounted on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub debug: bool,
	/// Key used to derive CSRF tokens
	pub secret_key: String,
	pub csrf_enabled: bool,
	pub admin_name: String,
	pub admin_url: String,
	/// Default page size of model list screens
	pub list_per_page: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: false,
			secret_key: String::new(),
			csrf_enabled: true,
			admin_name: "Admin".to_string(),
			admin_url: "/admin".to_string(),
			list_per_page: 20,
		}
	}
}

impl Settings {
	/// Load settings from an optional TOML file and `OVERSEER_` environment variables
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let mut builder = SettingsBuilder::new().add_source(EnvSource::new().with_prefix("OVERSEER_"));
		if let Some(path) = path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		builder.build()
	}

	/// Disable CSRF protection, typically for tests
	pub fn without_csrf(mut self) -> Self {
		self.csrf_enabled = false;
		self
	}

	pub fn with_secret_key(mut self, key: impl Into<String>) -> Self {
		self.secret_key = key.into();
		self
	}

	/// Check cross-field constraints
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !self.admin_url.starts_with('/') {
			return Err(SettingsError::Invalid(format!(
				"admin_url must start with '/': {}",
				self.admin_url
			)));
		}
		if self.list_per_page == 0 {
			return Err(SettingsError::Invalid(
				"list_per_page must be positive".to_string(),
			));
		}
		if self.csrf_enabled && self.secret_key.is_empty() {
			return Err(SettingsError::Invalid(
				"secret_key is required while csrf_enabled is set".to_string(),
			));
		}
		Ok(())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to load {source_name}: {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Failed to deserialize settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid settings: {0}")]
	Invalid(String),
}

/// Merges configuration sources by priority
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merge every source, higher priorities overriding lower ones, then validate
	pub fn build(mut self) -> Result<Settings, SettingsError> {
		self.sources.sort_by_key(|s| s.priority());

		let mut merged = match serde_json::to_value(Settings::default())? {
			Value::Object(map) => map,
			_ => Map::new(),
		};
		for source in &self.sources {
			let values = source.load().map_err(|error| SettingsError::Source {
				source_name: source.description(),
				error,
			})?;
			tracing::debug!(source = %source.description(), keys = values.len(), "Loaded settings source");
			merged.extend(values);
		}

		let settings: Settings = serde_json::from_value(Value::Object(merged))?;
		settings.validate()?;
		Ok(settings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sources::DefaultSource;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn test_defaults() {
		// Act
		let settings = Settings::default();

		// Assert
		assert_eq!(settings.admin_name, "Admin");
		assert_eq!(settings.admin_url, "/admin");
		assert_eq!(settings.list_per_page, 20);
		assert!(settings.csrf_enabled);
	}

	#[rstest]
	fn test_file_overrides_defaults() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "csrf_enabled = false\nadmin_name = \"Backoffice\"").unwrap();

		// Act
		let settings = SettingsBuilder::new()
			.add_source(TomlFileSource::new(file.path()))
			.add_source(DefaultSource::new().with_value("admin_name", Value::String("Ignored".into())))
			.build()
			.unwrap();

		// Assert
		assert_eq!(settings.admin_name, "Backoffice");
		assert!(!settings.csrf_enabled);
	}

	#[rstest]
	#[case(Settings { admin_url: "admin".into(), ..Settings::default().without_csrf() })]
	#[case(Settings { list_per_page: 0, ..Settings::default().without_csrf() })]
	#[case(Settings::default())]
	fn test_validate_rejects(#[case] settings: Settings) {
		// Act & Assert
		assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
	}

	#[rstest]
	fn test_wrong_type_is_deserialize_error() {
		// Act
		let result = SettingsBuilder::new()
			.add_source(DefaultSource::new().with_value("list_per_page", Value::String("many".into())))
			.build();

		// Assert
		assert!(matches!(result, Err(SettingsError::Deserialize(_))));
	}
}
