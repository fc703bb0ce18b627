//! Assembling the application from [`Settings`]

use helpdesk_auth::{Argon2Hasher, InMemoryCredentialStore, JwtAuth, PasswordHasher, TokenService};
use helpdesk_conf::{DatabaseBackend, Settings};
use helpdesk_http::{Handler, Middleware, MiddlewareChain};
use helpdesk_middleware::{
	BearerAuthMiddleware, CorsConfig, CorsMiddleware, LoggingMiddleware, RateLimitConfig,
	RateLimitMiddleware, SecurityHeadersMiddleware,
};
use helpdesk_server::HttpServer;
use helpdesk_tickets::{InMemoryTicketStore, SqliteTicketStore, StoreError, TicketStore};
use secrecy::ExposeSecret;
use std::sync::Arc;

use super::state::AppState;
use super::urls::ApiRouter;

/// Open the configured ticket store, creating the schema if needed
pub async fn open_store(backend: &DatabaseBackend) -> Result<Arc<dyn TicketStore>, StoreError> {
	match backend {
		DatabaseBackend::Memory => {
			tracing::warn!("using the in-memory ticket store; tickets are lost on restart");
			Ok(Arc::new(InMemoryTicketStore::new()))
		}
		DatabaseBackend::Sqlite(url) => {
			let store = SqliteTicketStore::connect(url).await?;
			store.migrate().await?;
			Ok(Arc::new(store))
		}
	}
}

pub fn token_service(settings: &Settings) -> JwtAuth {
	JwtAuth::new(settings.jwt_secret.expose_secret().as_bytes())
		.with_ttl(chrono::Duration::minutes(settings.jwt_ttl_minutes))
}

/// Build shared state: ticket store, demo credentials and token service
pub async fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
	let store = open_store(&settings.database).await?;
	let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
	let credentials = InMemoryCredentialStore::with_demo_users(hasher.as_ref())?;
	let tokens: Arc<dyn TokenService> = Arc::new(token_service(settings));

	Ok(AppState::new(store, Arc::new(credentials), hasher, tokens))
}

/// Middleware in the order requests pass through it
pub fn middleware_stack(settings: &Settings, tokens: Arc<dyn TokenService>) -> Vec<Arc<dyn Middleware>> {
	vec![
		Arc::new(LoggingMiddleware::new()),
		Arc::new(SecurityHeadersMiddleware::new()),
		Arc::new(CorsMiddleware::new(CorsConfig {
			allow_credentials: settings.cors_allow_credentials,
			..CorsConfig::for_origin(&settings.cors_origin)
		})),
		Arc::new(RateLimitMiddleware::new(RateLimitConfig::new(
			settings.rate_limit_max,
			settings.rate_limit_window,
		))),
		Arc::new(
			BearerAuthMiddleware::new(tokens)
				.with_public_path("/health")
				.with_public_path("/auth/login"),
		),
	]
}

pub fn build_server(state: AppState, settings: &Settings) -> HttpServer {
	let tokens = state.tokens.clone();
	let mut server = HttpServer::new(Arc::new(ApiRouter::new(state)));
	for middleware in middleware_stack(settings, tokens) {
		server = server.with_middleware(middleware);
	}
	server
}

/// The full middleware-wrapped handler, without a listening socket
pub fn build_handler(state: AppState, settings: &Settings) -> Arc<dyn Handler> {
	let tokens = state.tokens.clone();
	let mut chain = MiddlewareChain::new(Arc::new(ApiRouter::new(state)));
	for middleware in middleware_stack(settings, tokens) {
		chain.add_middleware(middleware);
	}
	Arc::new(chain)
}
