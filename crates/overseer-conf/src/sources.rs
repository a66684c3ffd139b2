//! Configuration sources for the layered settings system
//!
//! Sources are merged in priority order
//! (environment variables > config file > defaults).

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Keys whose environment values are read as booleans
const BOOL_KEYS: &[&str] = &["debug", "csrf_enabled"];

/// Keys whose environment values are always kept as strings
const STRING_KEYS: &[&str] = &["secret_key", "admin_name", "admin_url"];

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Environment variable configuration source
///
/// With a prefix, only variables starting with it are read and the prefix is
/// stripped. Keys are lowercased.
pub struct EnvSource {
	prefix: Option<String>,
}

impl EnvSource {
	pub fn new() -> Self {
		Self { prefix: None }
	}

	/// Set a prefix filter for environment variables
	///
	/// # Examples
	///
	/// ```
	/// use overseer_conf::sources::EnvSource;
	///
	/// // Only loads env vars starting with OVERSEER_
	/// let source = EnvSource::new().with_prefix("OVERSEER_");
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

fn parse_env_value(key: &str, value: String) -> Value {
	if BOOL_KEYS.contains(&key) {
		return match value.trim().to_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Value::Bool(true),
			"false" | "0" | "no" | "off" | "" => Value::Bool(false),
			_ => Value::String(value),
		};
	}
	if STRING_KEYS.contains(&key) {
		return Value::String(value);
	}
	if let Ok(num) = value.parse::<i64>() {
		Value::Number(num.into())
	} else if let Ok(b) = value.parse::<bool>() {
		Value::Bool(b)
	} else {
		Value::String(value)
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();

		for (key, value) in std::env::vars() {
			let clean_key = match &self.prefix {
				Some(prefix) => match key.strip_prefix(prefix.as_str()) {
					Some(stripped) => stripped.to_string(),
					None => continue,
				},
				None => key,
			};
			let lower_key = clean_key.to_lowercase();
			let parsed = parse_env_value(&lower_key, value);
			config.insert(lower_key, parsed);
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("Environment variables (prefix: {})", prefix),
			None => "Environment variables".to_string(),
		}
	}
}

/// TOML file configuration source
///
/// A missing file contributes nothing.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			tracing::debug!(path = %self.path.display(), "Settings file not found, skipping");
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		let map = json_value
			.as_object()
			.ok_or_else(|| SourceError::Parse("Expected table at root".to_string()))?;

		Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Default values configuration source
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	pub fn new() -> Self {
		Self {
			values: IndexMap::new(),
		}
	}

	/// Add a default value for a configuration key
	///
	/// # Examples
	///
	/// ```
	/// use overseer_conf::sources::{ConfigSource, DefaultSource};
	/// use serde_json::Value;
	///
	/// let source = DefaultSource::new().with_value("list_per_page", Value::Number(50.into()));
	/// assert_eq!(source.load().unwrap()["list_per_page"], 50);
	/// ```
	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl Default for DefaultSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use std::io::Write;

	#[rstest]
	#[case("debug", "on", Value::Bool(true))]
	#[case("csrf_enabled", "0", Value::Bool(false))]
	#[case("secret_key", "12345", Value::String("12345".into()))]
	#[case("list_per_page", "50", Value::Number(50.into()))]
	fn test_env_value_parsing(#[case] key: &str, #[case] raw: &str, #[case] expected: Value) {
		// Act & Assert
		assert_eq!(parse_env_value(key, raw.to_string()), expected);
	}

	#[rstest]
	#[serial(env)]
	fn test_env_source_strips_prefix() {
		// Arrange
		// SAFETY: serialized with every other env-touching test
		unsafe {
			std::env::set_var("OVERSEER_TEST_ADMIN_NAME", "Backoffice");
		}
		let source = EnvSource::new().with_prefix("OVERSEER_TEST_");

		// Act
		let loaded = source.load().unwrap();

		// Assert
		assert_eq!(loaded["admin_name"], Value::String("Backoffice".into()));
		unsafe {
			std::env::remove_var("OVERSEER_TEST_ADMIN_NAME");
		}
	}

	#[rstest]
	fn test_toml_source_reads_table() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "admin_url = \"/backoffice\"\nlist_per_page = 5").unwrap();
		let source = TomlFileSource::new(file.path());

		// Act
		let loaded = source.load().unwrap();

		// Assert
		assert_eq!(loaded["admin_url"], Value::String("/backoffice".into()));
		assert_eq!(loaded["list_per_page"], Value::Number(5.into()));
	}

	#[rstest]
	fn test_missing_toml_file_is_empty() {
		// Arrange
		let source = TomlFileSource::new("/nonexistent/overseer.toml");

		// Act & Assert
		assert!(source.load().unwrap().is_empty());
	}
}
