//! HTTP/1.1 server for the helpdesk API, based on Hyper.
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use helpdesk_server::{HttpServer, ShutdownCoordinator};
//!
//! let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
//! let server = HttpServer::new(router).with_middleware(Arc::new(LoggingMiddleware::new()));
//!
//! tokio::spawn({
//!     let coordinator = coordinator.clone();
//!     async move { coordinator.wait_for_signal().await }
//! });
//! server.listen_with_shutdown(addr, coordinator).await?;
//! ```

pub mod http;
pub mod shutdown;

pub use http::{DEFAULT_MAX_BODY_BYTES, HttpServer, ServerError};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal, shutdown_signal};
