use crate::{Request, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can answer an HTTP request
///
/// Applications, mounted admin views and test doubles all implement this trait.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}
