//! # Helpdesk Conf
//!
//! Settings are read from the process environment, then from a `.env` file,
//! then fall back to defaults. See [`Settings`] for the full list of
//! variables.

pub mod env;
pub mod settings;

pub use env::{Env, EnvError};
pub use settings::{ConfigError, DatabaseBackend, LogFormat, Settings};
