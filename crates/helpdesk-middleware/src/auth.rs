//! Bearer token authentication
//!
//! The middleware never rejects a request itself. It records the outcome
//! of token verification in the request extensions, and handlers that need
//! a caller ask for it with [`authenticated_identity`]. Public paths skip
//! verification altogether.

use async_trait::async_trait;
use helpdesk_auth::{AuthError, Identity, TokenService};
use helpdesk_http::{Handler, Middleware, Request, Response, Result};
use hyper::header::AUTHORIZATION;
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of bearer token verification, stored in request extensions
#[derive(Debug, Clone)]
pub struct Authentication(pub std::result::Result<Identity, AuthError>);

pub struct BearerAuthMiddleware {
	tokens: Arc<dyn TokenService>,
	public_paths: Vec<String>,
}

impl BearerAuthMiddleware {
	pub fn new(tokens: Arc<dyn TokenService>) -> Self {
		Self {
			tokens,
			public_paths: Vec::new(),
		}
	}

	/// Never verify tokens on `path` (exact match)
	pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
		self.public_paths.push(path.into());
		self
	}

	fn authenticate(&self, request: &Request) -> std::result::Result<Identity, AuthError> {
		let token = request
			.header(AUTHORIZATION.as_str())
			.and_then(|value| value.strip_prefix(BEARER_PREFIX))
			.ok_or(AuthError::MissingCredentials)?;

		self.tokens.verify(token.trim())
	}
}

#[async_trait]
impl Middleware for BearerAuthMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let outcome = self.authenticate(&request);
		if let Err(err) = &outcome {
			if !matches!(err, AuthError::MissingCredentials) {
				tracing::debug!(path = request.path(), error = ?err, "bearer token rejected");
			}
		}

		request.extensions.insert(Authentication(outcome));
		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		!self.public_paths.iter().any(|path| path == request.path())
	}
}

/// The caller's identity, or why there is none
pub fn authenticated_identity(request: &Request) -> std::result::Result<Identity, AuthError> {
	match request.extensions.get::<Authentication>() {
		Some(Authentication(outcome)) => outcome.clone(),
		None => Err(AuthError::MissingCredentials),
	}
}
