//! HTTP plumbing for the helpdesk API.
//!
//! A [`Request`] is fully buffered before it reaches a [`Handler`], so
//! handlers and middleware never deal with streaming bodies. Middleware is
//! composed with [`MiddlewareChain`]; the first middleware added is the
//! outermost.

pub mod middleware;
pub mod request;
pub mod response;

pub use helpdesk_core::exception::{Error, Result};
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;
