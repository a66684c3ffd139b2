use async_trait::async_trait;
use overseer_conf::Settings;
use overseer_http::{Error, Handler, Request, Response, Result};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("A handler is already mounted at '{0}'")]
	DuplicateMount(String),

	#[error("Mount prefix must start with '/': '{0}'")]
	InvalidPrefix(String),
}

struct Mount {
	prefix: String,
	handler: Arc<dyn Handler>,
}

struct AppInner {
	settings: Settings,
	mounts: RwLock<Vec<Mount>>,
}

/// Host web application
///
/// `Application` is a cheap handle; clones share the same mount table.
///
/// # Examples
///
/// ```
/// use overseer_apps::{Application, Settings};
///
/// let app = Application::new(Settings::default().without_csrf());
/// assert!(!app.settings().csrf_enabled);
/// assert!(app.mounts().is_empty());
/// ```
#[derive(Clone)]
pub struct Application {
	inner: Arc<AppInner>,
}

impl Application {
	pub fn new(settings: Settings) -> Self {
		Self {
			inner: Arc::new(AppInner {
				settings,
				mounts: RwLock::new(Vec::new()),
			}),
		}
	}

	pub fn settings(&self) -> &Settings {
		&self.inner.settings
	}

	/// Mount `handler` under `prefix`
	///
	/// A trailing slash on the prefix is ignored and `/` mounts at the root.
	pub fn mount(&self, prefix: &str, handler: Arc<dyn Handler>) -> std::result::Result<(), AppError> {
		if !prefix.starts_with('/') {
			return Err(AppError::InvalidPrefix(prefix.to_string()));
		}
		let prefix = prefix.trim_end_matches('/').to_string();

		let mut mounts = self.inner.mounts.write();
		if mounts.iter().any(|m| m.prefix == prefix) {
			return Err(AppError::DuplicateMount(prefix));
		}
		tracing::debug!(prefix = %prefix, "Mounted handler");
		mounts.push(Mount { prefix, handler });
		Ok(())
	}

	/// Mounted prefixes in registration order
	pub fn mounts(&self) -> Vec<String> {
		self.inner.mounts.read().iter().map(|m| m.prefix.clone()).collect()
	}

	/// Whether two handles refer to the same application
	pub fn ptr_eq(&self, other: &Application) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	fn resolve(&self, path: &str) -> Option<(String, Arc<dyn Handler>)> {
		let mounts = self.inner.mounts.read();
		mounts
			.iter()
			.filter(|m| prefix_matches(&m.prefix, path))
			.max_by_key(|m| m.prefix.len())
			.map(|m| (m.prefix.clone(), Arc::clone(&m.handler)))
	}
}

impl Default for Application {
	fn default() -> Self {
		Self::new(Settings::default())
	}
}

impl fmt::Debug for Application {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Application")
			.field("mounts", &self.mounts())
			.finish()
	}
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
	match path.strip_prefix(prefix) {
		Some(rest) => rest.is_empty() || rest.starts_with('/'),
		None => false,
	}
}

#[async_trait]
impl Handler for Application {
	async fn handle(&self, request: Request) -> Result<Response> {
		let path = request.path_info.clone();
		let Some((prefix, handler)) = self.resolve(&path) else {
			tracing::debug!(path = %path, "No handler mounted for path");
			return Err(Error::NotFound(path));
		};
		handler.handle(request.mounted_at(&prefix)).await
	}
}
