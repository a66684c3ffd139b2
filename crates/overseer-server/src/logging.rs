//! Log output setup

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, or by
/// `default_filter` when the variable is unset
///
/// Calling it again once a subscriber is installed has no effect.
///
/// # Examples
///
/// ```
/// overseer_server::init_logging("overseer=info");
/// tracing::info!("logging ready");
/// ```
pub fn init_logging(default_filter: &str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.try_init();
}
