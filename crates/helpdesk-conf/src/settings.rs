//! Server settings

use crate::env::{Env, EnvError, load_dotenv_file};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://helpdesk.db?mode=rwc";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const MIN_JWT_SECRET_LEN: usize = 16;
pub const DOTENV_FILE: &str = ".env";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error(transparent)]
	Env(#[from] EnvError),

	#[error("invalid configuration: {}", .0.join("; "))]
	Invalid(Vec<String>),
}

/// Where tickets are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
	Memory,
	Sqlite(String),
}

impl FromStr for DatabaseBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"" => Err("must not be empty".to_string()),
			"memory" => Ok(DatabaseBackend::Memory),
			url if url.starts_with("sqlite:") => Ok(DatabaseBackend::Sqlite(url.to_string())),
			_ => Err("must be `memory` or a sqlite: URL".to_string()),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
	#[default]
	Text,
	Json,
}

impl FromStr for LogFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"text" | "pretty" => Ok(LogFormat::Text),
			"json" => Ok(LogFormat::Json),
			other => Err(format!("unknown log format: {}", other)),
		}
	}
}

impl fmt::Display for LogFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LogFormat::Text => f.write_str("text"),
			LogFormat::Json => f.write_str("json"),
		}
	}
}

/// Fully resolved server settings.
///
/// # Examples
///
/// ```
/// use helpdesk_conf::{DatabaseBackend, Env, Settings};
///
/// let env = Env::from_vars([
///     ("JWT_SECRET", "0123456789abcdef"),
///     ("DATABASE_URL", "memory"),
/// ]);
/// let settings = Settings::from_env(&env).unwrap();
///
/// assert_eq!(settings.port, 4000);
/// assert_eq!(settings.database, DatabaseBackend::Memory);
/// ```
#[derive(Debug)]
pub struct Settings {
	pub host: IpAddr,
	pub port: u16,
	pub database: DatabaseBackend,
	pub jwt_secret: SecretString,
	pub jwt_ttl_minutes: i64,
	pub cors_origin: String,
	pub cors_allow_credentials: bool,
	pub rate_limit_max: usize,
	pub rate_limit_window: Duration,
	pub shutdown_timeout: Duration,
	pub log_format: LogFormat,
	pub log_filter: String,
}

impl Settings {
	/// Load `.env` from the working directory if present, then read the
	/// process environment. A malformed `.env` is an error.
	pub fn load() -> Result<Self, ConfigError> {
		Self::load_from(Path::new(DOTENV_FILE))
	}

	pub fn load_from(dotenv: &Path) -> Result<Self, ConfigError> {
		if dotenv.is_file() {
			load_dotenv_file(dotenv)?;
		}
		Self::from_env(&Env::new())
	}

	pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
		let port = env.int_with_default("PORT", Some(i64::from(DEFAULT_PORT)))?;
		let port = u16::try_from(port)
			.map_err(|_| ConfigError::Invalid(vec![format!("PORT out of range: {}", port)]))?;

		let settings = Self {
			host: env.parsed_with_default("HOST", Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)), |v| {
				v.trim().parse::<IpAddr>().map_err(|e| e.to_string())
			})?,
			port,
			database: env.parsed_with_default(
				"DATABASE_URL",
				Some(DatabaseBackend::Sqlite(DEFAULT_DATABASE_URL.to_string())),
				str::parse,
			)?,
			jwt_secret: SecretString::from(env.str_with_default("JWT_SECRET", Some(""))?),
			jwt_ttl_minutes: env.int_with_default("JWT_TTL_MINUTES", Some(120))?,
			cors_origin: env.str_with_default("CORS_ORIGIN", Some(DEFAULT_CORS_ORIGIN))?,
			cors_allow_credentials: env.bool_with_default("CORS_ALLOW_CREDENTIALS", Some(true))?,
			rate_limit_max: env.parsed_with_default("RATE_LIMIT_MAX", Some(200), |v| {
				v.trim().parse::<usize>().map_err(|e| e.to_string())
			})?,
			rate_limit_window: Duration::from_secs(env.parsed_with_default(
				"RATE_LIMIT_WINDOW_SECS",
				Some(15 * 60),
				|v| v.trim().parse::<u64>().map_err(|e| e.to_string()),
			)?),
			shutdown_timeout: Duration::from_secs(env.parsed_with_default(
				"SHUTDOWN_TIMEOUT_SECS",
				Some(30),
				|v| v.trim().parse::<u64>().map_err(|e| e.to_string()),
			)?),
			log_format: env.parsed_with_default("LOG_FORMAT", Some(LogFormat::Text), str::parse)?,
			log_filter: env.str_with_default("RUST_LOG", Some("info"))?,
		};

		settings.validate()?;
		Ok(settings)
	}

	/// Check every rule, reporting all violations at once
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut problems = Vec::new();

		if self.port == 0 {
			problems.push("PORT must be between 1 and 65535".to_string());
		}
		let secret_len = self.jwt_secret.expose_secret().chars().count();
		if secret_len == 0 {
			problems.push("JWT_SECRET is required".to_string());
		} else if secret_len < MIN_JWT_SECRET_LEN {
			problems.push(format!(
				"JWT_SECRET must be at least {} characters",
				MIN_JWT_SECRET_LEN
			));
		}
		if self.jwt_ttl_minutes <= 0 {
			problems.push("JWT_TTL_MINUTES must be positive".to_string());
		}
		if self.rate_limit_max == 0 {
			problems.push("RATE_LIMIT_MAX must be positive".to_string());
		}
		if self.rate_limit_window.is_zero() {
			problems.push("RATE_LIMIT_WINDOW_SECS must be positive".to_string());
		}
		if self.cors_origin.trim().is_empty() {
			problems.push("CORS_ORIGIN must not be empty".to_string());
		}

		if problems.is_empty() {
			Ok(())
		} else {
			Err(ConfigError::Invalid(problems))
		}
	}

	pub fn bind_addr(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.port)
	}
}
