use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Admin,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::User => "user",
			Role::Admin => "admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"user" => Ok(Role::User),
			"admin" => Ok(Role::Admin),
			other => Err(format!("unknown role: {}", other)),
		}
	}
}

/// An authenticated caller.
///
/// Once minted into a token the identity is not refreshed; the credential
/// store stays authoritative for new logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub id: String,
	pub username: String,
	pub role: Role,
}

impl Identity {
	pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
		Self {
			id: id.into(),
			username: username.into(),
			role,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("user", Some(Role::User))]
	#[case("admin", Some(Role::Admin))]
	#[case("Admin", None)]
	#[case("", None)]
	fn test_role_from_str(#[case] input: &str, #[case] expected: Option<Role>) {
		assert_eq!(input.parse::<Role>().ok(), expected);
	}

	#[rstest]
	fn test_identity_wire_shape() {
		let identity = Identity::new("a1", "admin", Role::Admin);

		let json = serde_json::to_value(&identity).unwrap();

		assert_eq!(
			json,
			serde_json::json!({ "id": "a1", "username": "admin", "role": "admin" })
		);
	}
}
