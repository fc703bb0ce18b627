//! Environment variable handling
//!
//! [`Env`] reads typed values from the process environment, or from a fixed
//! map when settings must be built without touching global state.

use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
enum Source {
	#[default]
	Process,
	Map(HashMap<String, String>),
}

#[derive(Debug, Clone, Default)]
pub struct Env {
	source: Source,
}

impl Env {
	/// Read from the process environment
	pub fn new() -> Self {
		Self::default()
	}

	/// Read from a fixed set of variables.
	///
	/// # Examples
	///
	/// ```
	/// use helpdesk_conf::Env;
	///
	/// let env = Env::from_vars([("PORT", "8080"), ("DEBUG", "yes")]);
	///
	/// assert_eq!(env.int("PORT").unwrap(), 8080);
	/// assert!(env.bool("DEBUG").unwrap());
	/// assert_eq!(env.str_with_default("HOST", Some("0.0.0.0")).unwrap(), "0.0.0.0");
	/// ```
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			source: Source::Map(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn lookup(&self, key: &str) -> Result<(String, Option<String>), EnvError> {
		validate_env_var_name(key)?;

		let value = match &self.source {
			Source::Process => std::env::var(key).ok(),
			Source::Map(vars) => vars.get(key).cloned(),
		};
		Ok((key.to_string(), value))
	}

	pub fn str(&self, key: &str) -> Result<String, EnvError> {
		self.str_with_default(key, None)
	}

	pub fn str_with_default(&self, key: &str, default: Option<&str>) -> Result<String, EnvError> {
		match self.lookup(key)? {
			(_, Some(val)) => Ok(val),
			(full_key, None) => match default {
				Some(d) => Ok(d.to_string()),
				None => Err(EnvError::MissingVariable(full_key)),
			},
		}
	}

	pub fn bool(&self, key: &str) -> Result<bool, EnvError> {
		self.bool_with_default(key, None)
	}

	pub fn bool_with_default(&self, key: &str, default: Option<bool>) -> Result<bool, EnvError> {
		self.parsed_with_default(key, default, parse_bool)
	}

	pub fn int(&self, key: &str) -> Result<i64, EnvError> {
		self.int_with_default(key, None)
	}

	pub fn int_with_default(&self, key: &str, default: Option<i64>) -> Result<i64, EnvError> {
		self.parsed_with_default(key, default, |val| {
			val.trim().parse::<i64>().map_err(|e| e.to_string())
		})
	}

	/// Read and convert a value with a custom parser
	pub fn parsed_with_default<T, F>(
		&self,
		key: &str,
		default: Option<T>,
		parse: F,
	) -> Result<T, EnvError>
	where
		F: FnOnce(&str) -> Result<T, String>,
	{
		match self.lookup(key)? {
			(full_key, Some(val)) => parse(&val).map_err(|error| EnvError::ParseError {
				key: full_key,
				value_len: val.len(),
				error,
			}),
			(full_key, None) => default.ok_or(EnvError::MissingVariable(full_key)),
		}
	}
}

/// Load a `.env` file into the process environment.
///
/// Variables already set in the process win over the file.
pub fn load_dotenv_file(path: &Path) -> Result<(), EnvError> {
	dotenv::from_path(path)
		.map_err(|e| EnvError::InvalidFormat(format!("{}: {}", path.display(), e)))
}

pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" | "" => Ok(false),
		other => Err(format!("not a boolean: {}", other)),
	}
}

pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	if name.is_empty() {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not be empty".to_string(),
		});
	}

	if let Some(pos) = name.find(|c: char| c.is_control()) {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: format!(
				"environment variable name contains control character at position {}",
				pos
			),
		});
	}

	if name.contains('=') {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not contain '='".to_string(),
		});
	}

	Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Missing environment variable: {0}")]
	MissingVariable(String),

	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		value_len: usize,
		error: String,
	},

	#[error("Invalid format: {0}")]
	InvalidFormat(String),

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use std::io::Write;

	#[rstest]
	#[case("true", true)]
	#[case("YES", true)]
	#[case("1", true)]
	#[case("off", false)]
	#[case("0", false)]
	fn test_parse_bool(#[case] raw: &str, #[case] expected: bool) {
		assert_eq!(parse_bool(raw), Ok(expected));
	}

	#[rstest]
	fn test_int_parse_error_hides_value() {
		let env = Env::from_vars([("PORT", "eighty")]);

		match env.int("PORT") {
			Err(EnvError::ParseError { key, value_len, .. }) => {
				assert_eq!(key, "PORT");
				assert_eq!(value_len, 6);
			}
			other => panic!("expected parse error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_missing_without_default() {
		let env = Env::from_vars(Vec::<(String, String)>::new());

		assert!(matches!(env.str("JWT_SECRET"), Err(EnvError::MissingVariable(key)) if key == "JWT_SECRET"));
		assert_eq!(env.int_with_default("PORT", Some(4000)).unwrap(), 4000);
	}

	#[rstest]
	fn test_bool_with_default() {
		let env = Env::from_vars([("CORS_ALLOW_CREDENTIALS", "maybe")]);

		assert!(env.bool_with_default("MISSING", Some(true)).unwrap());
		assert!(matches!(
			env.bool("CORS_ALLOW_CREDENTIALS"),
			Err(EnvError::ParseError { .. })
		));
	}

	#[rstest]
	fn test_invalid_key_name() {
		let env = Env::new();

		assert!(matches!(
			env.str("BAD=KEY"),
			Err(EnvError::InvalidVariableName { .. })
		));
	}

	#[rstest]
	#[serial]
	fn test_process_env_lookup() {
		// SAFETY: Environment mutation is serialized with #[serial].
		unsafe {
			std::env::set_var("HELPDESK_TEST_FLAG", "on");
		}

		let env = Env::new();
		assert!(env.bool("HELPDESK_TEST_FLAG").unwrap());

		// SAFETY: Environment mutation is serialized with #[serial].
		unsafe {
			std::env::remove_var("HELPDESK_TEST_FLAG");
		}
	}

	#[rstest]
	#[serial]
	fn test_dotenv_does_not_override_process() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "HELPDESK_TEST_FROM_FILE=file").unwrap();
		writeln!(file, "HELPDESK_TEST_SHADOWED=file").unwrap();

		// SAFETY: Environment mutation is serialized with #[serial].
		unsafe {
			std::env::set_var("HELPDESK_TEST_SHADOWED", "process");
		}

		load_dotenv_file(file.path()).unwrap();
		let env = Env::new();

		assert_eq!(env.str("HELPDESK_TEST_FROM_FILE").unwrap(), "file");
		assert_eq!(env.str("HELPDESK_TEST_SHADOWED").unwrap(), "process");

		// SAFETY: Environment mutation is serialized with #[serial].
		unsafe {
			std::env::remove_var("HELPDESK_TEST_FROM_FILE");
			std::env::remove_var("HELPDESK_TEST_SHADOWED");
		}
	}
}
