//! # Helpdesk Middleware
//!
//! [`Middleware`](helpdesk_http::Middleware) implementations wrapped around
//! the API router. The server installs them outermost first:
//!
//! 1. [`LoggingMiddleware`]
//! 2. [`SecurityHeadersMiddleware`]
//! 3. [`CorsMiddleware`]
//! 4. [`RateLimitMiddleware`]
//! 5. [`BearerAuthMiddleware`]

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security;

pub use auth::{Authentication, BearerAuthMiddleware, authenticated_identity};
pub use cors::{CorsConfig, CorsMiddleware};
pub use logging::LoggingMiddleware;
pub use rate_limit::{RateLimitConfig, RateLimitMiddleware};
pub use security::SecurityHeadersMiddleware;
