//! HTTP/1 server

use anyhow::Context;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use overseer_http::{Handler, Request, Response, StatusCode};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Largest request body read by default, in bytes
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// HTTP server around a single handler, usually an application
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	body_limit: usize,
}

impl HttpServer {
	/// # Examples
	///
	/// ```
	/// use overseer_apps::Application;
	/// use overseer_server::HttpServer;
	/// use std::sync::Arc;
	///
	/// let server = HttpServer::new(Arc::new(Application::default()));
	/// ```
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			body_limit: DEFAULT_BODY_LIMIT,
		}
	}

	/// Answer requests whose body exceeds `bytes` with 413 Payload Too Large
	pub fn with_body_limit(mut self, bytes: usize) -> Self {
		self.body_limit = bytes;
		self
	}

	/// Bind `addr` and serve until accepting fails
	pub async fn listen(self, addr: SocketAddr) -> anyhow::Result<()> {
		let listener = TcpListener::bind(addr)
			.await
			.with_context(|| format!("failed to bind {}", addr))?;
		self.serve(listener).await
	}

	/// Serve connections from an already bound listener
	pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
		self.serve_until(listener, std::future::pending()).await
	}

	/// Serve until `shutdown` resolves; connections already accepted finish on
	/// their own tasks
	pub async fn serve_until<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
	where
		F: Future<Output = ()>,
	{
		let local = listener.local_addr().context("listener has no local address")?;
		tracing::info!(addr = %local, "Server listening on http://{}", local);
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				accepted = listener.accept() => {
					let (stream, peer) = accepted.context("failed to accept connection")?;
					let handler = Arc::clone(&self.handler);
					let body_limit = self.body_limit;
					tokio::task::spawn(async move {
						if let Err(err) = Self::handle_connection(stream, peer, handler, body_limit).await {
							tracing::warn!(peer = %peer, error = %err, "Error handling connection");
						}
					});
				}
				_ = &mut shutdown => {
					tracing::info!(addr = %local, "Shutdown requested, no longer accepting connections");
					return Ok(());
				}
			}
		}
	}

	/// Serve HTTP/1 requests from one TCP connection
	pub async fn handle_connection(
		stream: TcpStream,
		peer: SocketAddr,
		handler: Arc<dyn Handler>,
		body_limit: usize,
	) -> anyhow::Result<()> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			peer,
			body_limit,
		};
		http1::Builder::new()
			.serve_connection(io, service)
			.await
			.context("connection error")?;
		Ok(())
	}
}

struct RequestService {
	handler: Arc<dyn Handler>,
	peer: SocketAddr,
	body_limit: usize,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = Arc::clone(&self.handler);
		let peer = self.peer;
		let body_limit = self.body_limit;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let response = match Limited::new(body, body_limit).collect().await {
				Ok(body) => match Request::builder()
					.method(parts.method.clone())
					.uri(parts.uri.to_string())
					.headers(parts.headers)
					.body(body.to_bytes())
					.build()
				{
					Ok(request) => handler.handle(request).await.unwrap_or_else(Response::from),
					Err(err) => Response::from(err),
				},
				Err(err) if err.is::<LengthLimitError>() => {
					tracing::warn!(peer = %peer, limit = body_limit, "Request body too large");
					Response::new(StatusCode::PAYLOAD_TOO_LARGE).with_body("Payload Too Large")
				}
				Err(err) => return Err(err),
			};
			tracing::debug!(
				peer = %peer,
				method = %parts.method,
				uri = %parts.uri,
				status = response.status.as_u16(),
				"Handled request"
			);

			let mut builder = hyper::Response::builder().status(response.status);
			for (name, value) in response.headers.iter() {
				builder = builder.header(name, value);
			}
			Ok(builder.body(Full::new(response.body))?)
		})
	}
}

/// Serve `handler` on `addr`
pub async fn serve(addr: SocketAddr, handler: Arc<dyn Handler>) -> anyhow::Result<()> {
	HttpServer::new(handler).listen(addr).await
}
