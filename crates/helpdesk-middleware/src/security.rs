//! Security response headers

use async_trait::async_trait;
use helpdesk_http::{Handler, Middleware, Request, Response, Result};
use hyper::header::{HeaderName, HeaderValue};
use std::sync::Arc;

/// Adds a fixed set of hardening headers to every response.
///
/// Headers already set by the handler are left alone.
#[derive(Debug, Clone)]
pub struct SecurityHeadersMiddleware {
	headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeadersMiddleware {
	pub fn new() -> Self {
		Self {
			headers: vec![
				(
					HeaderName::from_static("x-content-type-options"),
					HeaderValue::from_static("nosniff"),
				),
				(
					HeaderName::from_static("x-frame-options"),
					HeaderValue::from_static("DENY"),
				),
				(
					HeaderName::from_static("referrer-policy"),
					HeaderValue::from_static("no-referrer"),
				),
				(
					HeaderName::from_static("cross-origin-resource-policy"),
					HeaderValue::from_static("same-origin"),
				),
				(
					HeaderName::from_static("x-dns-prefetch-control"),
					HeaderValue::from_static("off"),
				),
			],
		}
	}

	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.retain(|(existing, _)| *existing != name);
		self.headers.push((name, value));
		self
	}
}

impl Default for SecurityHeadersMiddleware {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Middleware for SecurityHeadersMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let mut response = next.handle(request).await?;

		for (name, value) in &self.headers {
			if !response.headers.contains_key(name) {
				response.headers.insert(name.clone(), value.clone());
			}
		}

		Ok(response)
	}
}
