//! Request logging

use async_trait::async_trait;
use helpdesk_http::{Handler, Middleware, Request, Response, Result};
use std::sync::Arc;
use std::time::Instant;

/// Logs method, path, status and latency of every request
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Instant::now();
		let method = request.method.to_string();
		let path = request.path().to_string();

		let result = next.handle(request).await;

		let elapsed_ms = start.elapsed().as_millis() as u64;
		match &result {
			Ok(response) if response.status.is_server_error() => {
				tracing::warn!(%method, %path, status = response.status.as_u16(), elapsed_ms, "request failed");
			}
			Ok(response) => {
				tracing::info!(%method, %path, status = response.status.as_u16(), elapsed_ms, "request");
			}
			Err(err) => {
				tracing::warn!(%method, %path, status = err.status_code(), elapsed_ms, error = %err, "request error");
			}
		}

		result
	}
}
