//! # Helpdesk
//!
//! A role-based support ticket tracker served as a JSON API.
//!
//! Users file tickets and follow their own; admins see every ticket, assign
//! it to an agent and drive it through `OPEN → IN_PROGRESS → CLOSED`. The
//! ticket rules live in [`helpdesk_tickets`]; this crate wires them to HTTP.
//!
//! ## Layout
//!
//! - [`apps`]: views for health, login and tickets
//! - [`config::urls`]: the [`ApiRouter`] mapping method and path to a view
//! - [`config::app`]: builds state, middleware and the server from [`Settings`]
//!
//! ## Example
//!
//! ```no_run
//! use helpdesk::config::app::{build_server, build_state};
//! use helpdesk_conf::Settings;
//! use helpdesk_server::ShutdownCoordinator;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::load()?;
//! let state = build_state(&settings).await?;
//! let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout);
//!
//! build_server(state, &settings)
//!     .listen_with_shutdown(settings.bind_addr(), coordinator)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Settings`]: helpdesk_conf::Settings

pub mod apps;
pub mod config;

pub use config::state::AppState;
pub use config::urls::{ApiRouter, Route};
