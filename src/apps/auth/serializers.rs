use helpdesk_auth::{Identity, Role};
use helpdesk_core::validators::{LengthValidator, ValidationErrors};
use serde::{Deserialize, Serialize};

pub const USERNAME: LengthValidator = LengthValidator::at_least(3);
pub const PASSWORD: LengthValidator = LengthValidator::at_least(6);

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
	pub username: Option<String>,
	pub password: Option<String>,
}

impl LoginInput {
	/// Returns `(username, password)` once both fields are present and long enough
	pub fn validate(self) -> Result<(String, String), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		let username = required(&mut errors, "username", self.username, USERNAME);
		let password = required(&mut errors, "password", self.password, PASSWORD);
		errors.into_result()?;

		match (username, password) {
			(Some(username), Some(password)) => Ok((username, password)),
			_ => Err(ValidationErrors::single("body", "is required")),
		}
	}
}

fn required(
	errors: &mut ValidationErrors,
	field: &str,
	value: Option<String>,
	validator: LengthValidator,
) -> Option<String> {
	let Some(value) = value else {
		errors.add(field, "is required");
		return None;
	};
	match validator.validate(&value) {
		Ok(()) => Some(value),
		Err(message) => {
			errors.add(field, message);
			None
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
	pub id: String,
	pub username: String,
	pub role: Role,
}

impl From<Identity> for UserSummary {
	fn from(identity: Identity) -> Self {
		Self {
			id: identity.id,
			username: identity.username,
			role: identity.role,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
	pub token: String,
	pub user: UserSummary,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn input(username: Option<&str>, password: Option<&str>) -> LoginInput {
		LoginInput {
			username: username.map(String::from),
			password: password.map(String::from),
		}
	}

	#[rstest]
	fn test_valid_login_input() {
		let (username, password) = input(Some("admin"), Some("admin123")).validate().unwrap();

		assert_eq!(username, "admin");
		assert_eq!(password, "admin123");
	}

	#[rstest]
	#[case(None, Some("secret1"), &["username"])]
	#[case(Some("ab"), Some("secret1"), &["username"])]
	#[case(Some("alice"), Some("12345"), &["password"])]
	#[case(None, None, &["username", "password"])]
	fn test_invalid_login_input(
		#[case] username: Option<&str>,
		#[case] password: Option<&str>,
		#[case] fields: &[&str],
	) {
		let errors = input(username, password).validate().unwrap_err();

		assert_eq!(errors.issues().len(), fields.len());
		for field in fields {
			assert!(errors.has_field(field), "missing issue for {}", field);
		}
	}
}
