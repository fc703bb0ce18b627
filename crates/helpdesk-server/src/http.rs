use async_trait::async_trait;
use bytes::Bytes;
use helpdesk_core::exception::Error;
use helpdesk_http::{Handler, Middleware, MiddlewareChain, Request, Response};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Request bodies larger than this are answered with `413`
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		#[source]
		source: std::io::Error,
	},

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// HTTP/1.1 server with middleware support
pub struct HttpServer {
	pub handler: Arc<dyn Handler>,
	pub(crate) middlewares: Vec<Arc<dyn Middleware>>,
	max_body_bytes: usize,
}

impl HttpServer {
	/// Create a new server with the given handler
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use helpdesk_http::{Handler, Request, Response, Result};
	/// use helpdesk_server::HttpServer;
	///
	/// struct Health;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for Health {
	///     async fn handle(&self, _req: Request) -> Result<Response> {
	///         Ok(Response::ok().with_body("ok"))
	///     }
	/// }
	///
	/// let server = HttpServer::new(Arc::new(Health));
	/// ```
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
			max_body_bytes: DEFAULT_MAX_BODY_BYTES,
		}
	}

	/// Add a middleware. The first one added runs outermost.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
		self.max_body_bytes = limit;
		self
	}

	pub(crate) fn build_handler(&self) -> Arc<dyn Handler> {
		self.wrap(self.handler.clone())
	}

	fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			return inner;
		}

		let mut chain = MiddlewareChain::new(inner);
		for middleware in &self.middlewares {
			chain.add_middleware(middleware.clone());
		}

		Arc::new(chain)
	}

	/// Bind `addr` and serve until `coordinator` signals shutdown
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|source| ServerError::Bind { addr, source })?;
		self.serve_listener(listener, coordinator).await
	}

	/// Serve connections from an already bound listener.
	///
	/// On shutdown the listener is dropped, open connections are asked to
	/// close after their current request, and the call returns once they are
	/// gone or the coordinator's timeout has elapsed.
	pub async fn serve_listener(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		tracing::info!(addr = %listener.local_addr()?, "server listening");

		let handler = self.build_handler();
		// oversized requests still pass through the middleware, so the 413
		// is logged and carries the same headers as any other response
		let oversized = self.wrap(Arc::new(RejectOversized));
		let max_body_bytes = self.max_body_bytes;
		let mut shutdown_rx = coordinator.subscribe();
		let mut connections = JoinSet::new();

		loop {
			tokio::select! {
				accepted = listener.accept() => {
					let (stream, remote_addr) = match accepted {
						Ok(accepted) => accepted,
						Err(err) => {
							// per-connection failures (e.g. EMFILE) must not stop the server
							tracing::warn!(error = %err, "failed to accept connection");
							continue;
						}
					};
					let service = RequestService {
						handler: handler.clone(),
						oversized: oversized.clone(),
						remote_addr,
						max_body_bytes,
					};
					let conn_shutdown = coordinator.subscribe();
					connections.spawn(serve_connection(stream, service, conn_shutdown));
				}
				Some(_) = connections.join_next(), if !connections.is_empty() => {}
				() = shutdown_rx.recv() => {
					tracing::info!("shutdown requested, no longer accepting connections");
					break;
				}
			}
		}
		drop(listener);

		let drain = async { while connections.join_next().await.is_some() {} };
		if tokio::time::timeout(coordinator.timeout(), drain).await.is_err() {
			tracing::warn!(
				remaining = connections.len(),
				"shutdown timeout elapsed, aborting open connections"
			);
			connections.abort_all();
		}

		tracing::info!("server stopped");
		Ok(())
	}
}

async fn serve_connection(
	stream: TcpStream,
	service: RequestService,
	mut shutdown: ShutdownSignal,
) {
	let remote_addr = service.remote_addr;
	let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
	tokio::pin!(conn);

	let result = tokio::select! {
		result = conn.as_mut() => result,
		() = shutdown.recv() => {
			conn.as_mut().graceful_shutdown();
			conn.await
		}
	};

	if let Err(err) = result {
		tracing::debug!(%remote_addr, error = %err, "connection closed with error");
	}
}

/// Final handler for requests whose body exceeded the limit. Answers with
/// a rendered response, like a router would, so middleware sees an `Ok`.
struct RejectOversized;

#[async_trait]
impl Handler for RejectOversized {
	async fn handle(&self, _request: Request) -> helpdesk_core::exception::Result<Response> {
		Ok(Response::from(Error::PayloadTooLarge))
	}
}

/// Adapts a [`Handler`] to hyper's service interface
struct RequestService {
	handler: Arc<dyn Handler>,
	oversized: Arc<dyn Handler>,
	remote_addr: SocketAddr,
	max_body_bytes: usize,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let mut handler = self.handler.clone();
		let oversized = self.oversized.clone();
		let remote_addr = self.remote_addr;
		let max_body_bytes = self.max_body_bytes;

		Box::pin(async move {
			let (parts, body) = req.into_parts();

			let body = match Limited::new(body, max_body_bytes).collect().await {
				Ok(collected) => collected.to_bytes(),
				Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
					handler = oversized;
					Bytes::new()
				}
				Err(err) => return Err(err),
			};

			let mut request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);
			request.remote_addr = Some(remote_addr);

			let response = match handler.handle(request).await {
				Ok(response) => response,
				Err(err) => Response::from(err),
			};

			Ok(into_hyper(response))
		})
	}
}

fn into_hyper(response: Response) -> hyper::Response<Full<Bytes>> {
	let mut hyper_response = hyper::Response::new(Full::new(response.body));
	*hyper_response.status_mut() = response.status;
	*hyper_response.headers_mut() = response.headers;
	hyper_response
}

#[cfg(test)]
mod tests {
	use super::*;
	use helpdesk_http::Result;
	use rstest::rstest;
	use std::time::Duration;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> Result<Response> {
			if request.path() == "/missing" {
				return Err(Error::NotFound("Ticket not found.".into()));
			}
			let remote = request.remote_addr.map(|a| a.ip().to_string()).unwrap_or_default();
			Ok(Response::ok().with_body(format!("{} {} {}", request.method, request.path(), remote)))
		}
	}

	struct Tag(&'static str);

	#[async_trait]
	impl Middleware for Tag {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			Ok(response.with_header("X-Tag", self.0))
		}
	}

	async fn spawn(server: HttpServer) -> (SocketAddr, ShutdownCoordinator, tokio::task::JoinHandle<()>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(2));
		let running = coordinator.clone();
		let handle = tokio::spawn(async move {
			server.serve_listener(listener, running).await.unwrap();
		});
		(addr, coordinator, handle)
	}

	async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
		let mut stream = TcpStream::connect(addr).await.unwrap();
		stream.write_all(raw.as_bytes()).await.unwrap();
		let mut buf = Vec::new();
		stream.read_to_end(&mut buf).await.unwrap();
		String::from_utf8_lossy(&buf).into_owned()
	}

	#[rstest]
	fn test_middleware_registration() {
		let server = HttpServer::new(Arc::new(Echo))
			.with_middleware(Arc::new(Tag("a")))
			.with_middleware(Arc::new(Tag("b")));

		assert_eq!(server.middlewares.len(), 2);
	}

	#[rstest]
	#[tokio::test]
	async fn test_serves_request_through_middleware() {
		let server = HttpServer::new(Arc::new(Echo)).with_middleware(Arc::new(Tag("helpdesk")));
		let (addr, coordinator, handle) = spawn(server).await;

		let raw = roundtrip(
			addr,
			"GET /tickets HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
		)
		.await;

		assert!(raw.starts_with("HTTP/1.1 200 OK"), "{}", raw);
		assert!(raw.to_ascii_lowercase().contains("x-tag: helpdesk"), "{}", raw);
		assert!(raw.ends_with("GET /tickets 127.0.0.1"), "{}", raw);

		coordinator.shutdown();
		handle.await.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_handler_error_becomes_json() {
		let (addr, coordinator, handle) = spawn(HttpServer::new(Arc::new(Echo))).await;

		let raw = roundtrip(
			addr,
			"GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
		)
		.await;

		assert!(raw.starts_with("HTTP/1.1 404 Not Found"), "{}", raw);
		assert!(raw.ends_with(r#"{"message":"Ticket not found."}"#), "{}", raw);

		coordinator.shutdown();
		handle.await.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_oversized_body_rejected() {
		let server = HttpServer::new(Arc::new(Echo))
			.with_middleware(Arc::new(Tag("helpdesk")))
			.with_max_body_bytes(16);
		let (addr, coordinator, handle) = spawn(server).await;
		let body = "x".repeat(64);

		let raw = roundtrip(
			addr,
			&format!(
				"POST /tickets HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
				body.len(),
				body
			),
		)
		.await;

		assert!(raw.starts_with("HTTP/1.1 413 Payload Too Large"), "{}", raw);
		assert!(raw.to_ascii_lowercase().contains("x-tag: helpdesk"), "{}", raw);
		assert!(raw.contains("\"message\""), "{}", raw);

		coordinator.shutdown();
		handle.await.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_shutdown_stops_accepting() {
		let (addr, coordinator, handle) = spawn(HttpServer::new(Arc::new(Echo))).await;

		coordinator.shutdown();
		tokio::time::timeout(Duration::from_secs(3), handle)
			.await
			.expect("server did not stop")
			.unwrap();

		assert!(TcpStream::connect(addr).await.is_err());
	}

	#[rstest]
	#[tokio::test]
	async fn test_shutdown_before_serving_returns() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
		coordinator.shutdown();

		let served = tokio::time::timeout(
			Duration::from_secs(3),
			HttpServer::new(Arc::new(Echo)).serve_listener(listener, coordinator),
		)
		.await;

		assert!(matches!(served, Ok(Ok(()))));
	}
}
