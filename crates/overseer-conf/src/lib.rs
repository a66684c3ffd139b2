//! Settings for Overseer applications
//!
//! Settings are assembled from prioritized [`sources::ConfigSource`]s:
//! built-in defaults, an optional TOML file and prefixed environment
//! variables, in increasing order of priority.
//!
//! ```
//! use overseer_conf::{Settings, SettingsBuilder};
//! use overseer_conf::sources::DefaultSource;
//! use serde_json::Value;
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(DefaultSource::new().with_value("secret_key", Value::String("s3cr3t".into())))
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.admin_url, "/admin");
//! assert!(settings.csrf_enabled);
//! ```

pub mod settings;
pub mod sources;

pub use settings::{Settings, SettingsBuilder, SettingsError};
pub use sources::{ConfigSource, SourceError};
