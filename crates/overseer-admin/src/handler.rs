//! Request dispatch into a mounted view

use crate::routing::{Resolved, resolve};
use crate::site::Admin;
use crate::view::{AdminView, ViewRequest};
use async_trait::async_trait;
use overseer_http::{Error, Handler, Request, Response, Result};
use std::sync::Arc;

/// Mount-table handler for one attached view
///
/// Holds the registry strongly, so the mounted screens keep rendering after
/// the caller drops its own [`Admin`] handle.
pub(crate) struct ViewHandler {
	view: Arc<dyn AdminView>,
	_admin: Admin,
}

impl ViewHandler {
	pub(crate) fn new(view: Arc<dyn AdminView>, admin: Admin) -> Self {
		Self { view, _admin: admin }
	}
}

#[async_trait]
impl Handler for ViewHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		let Some(blueprint) = self.view.base().blueprint() else {
			return Err(Error::Internal(format!(
				"view '{}' is mounted but not attached",
				self.view.resolved_endpoint()
			)));
		};

		let (route, params) = match resolve(&blueprint.routes, &request.method, &request.path_info) {
			Resolved::Found(route, params) => (route.name.clone(), params),
			Resolved::WrongMethod => {
				return Err(Error::MethodNotAllowed(format!(
					"{} {}",
					request.method,
					request.path()
				)));
			}
			Resolved::Missing => return Err(Error::NotFound(request.path().to_string())),
		};

		tracing::debug!(endpoint = %blueprint.name, route = %route, path = %request.path(), "Dispatching admin request");
		self.view
			.handle_view(&route, ViewRequest { request, params })
			.await
			.map_err(Error::from)
	}
}
