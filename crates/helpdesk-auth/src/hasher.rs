//! Password hashing

use crate::error::AuthError;
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use rand::RngCore;

/// Password hasher trait
///
/// # Examples
///
/// ```
/// use helpdesk_auth::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let hash = hasher.hash("user123").unwrap();
///
/// assert!(hasher.verify("user123", &hash).unwrap());
/// assert!(!hasher.verify("wrong_password", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
	/// Hash a plaintext password into a PHC string
	fn hash(&self, password: &str) -> Result<String, AuthError>;

	/// `Ok(false)` for a wrong password, `Err` only when `hash` is unusable
	fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id password hasher
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
	params: Params,
}

impl Argon2Hasher {
	pub fn new() -> Self {
		Self {
			params: Params::default(),
		}
	}

	/// Use explicit cost parameters (memory in KiB, iterations, lanes)
	pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
		let params = Params::new(memory_kib, iterations, parallelism, None)
			.map_err(|e| AuthError::Hashing(e.to_string()))?;
		Ok(Self { params })
	}

	fn argon2(&self) -> Argon2<'static> {
		Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
	}
}

impl Default for Argon2Hasher {
	fn default() -> Self {
		Self::new()
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> Result<String, AuthError> {
		let mut salt_bytes = [0u8; 16];
		rand::thread_rng().fill_bytes(&mut salt_bytes);

		let salt =
			SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;

		self.argon2()
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| AuthError::Hashing(e.to_string()))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
		let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

		// Cost parameters come from the PHC string, not from `self`
		Ok(Argon2::default()
			.verify_password(password.as_bytes(), &parsed_hash)
			.is_ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn hasher() -> Argon2Hasher {
		Argon2Hasher::with_params(8, 1, 1).unwrap()
	}

	#[rstest]
	fn test_hash_and_verify(hasher: Argon2Hasher) {
		let hash = hasher.hash("admin123").unwrap();

		assert!(hash.starts_with("$argon2id$"));
		assert!(hasher.verify("admin123", &hash).unwrap());
		assert!(!hasher.verify("admin124", &hash).unwrap());
	}

	#[rstest]
	fn test_salts_differ(hasher: Argon2Hasher) {
		let first = hasher.hash("same").unwrap();
		let second = hasher.hash("same").unwrap();

		assert_ne!(first, second);
	}

	#[rstest]
	fn test_verify_rejects_garbage_hash(hasher: Argon2Hasher) {
		let result = hasher.verify("user123", "not-a-phc-string");

		assert!(matches!(result, Err(AuthError::Hashing(_))));
	}

	#[rstest]
	fn test_invalid_params() {
		assert!(Argon2Hasher::with_params(0, 0, 0).is_err());
	}
}
