//! Credential storage and login verification

use crate::error::AuthError;
use crate::hasher::PasswordHasher;
use crate::identity::{Identity, Role};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
	pub id: String,
	pub username: String,
	pub role: Role,
	pub password_hash: String,
}

impl UserRecord {
	pub fn identity(&self) -> Identity {
		Identity::new(self.id.clone(), self.username.clone(), self.role)
	}
}

/// Lookup of user accounts by username
#[async_trait]
pub trait CredentialStore: Send + Sync {
	async fn find_by_username(&self, username: &str) -> Option<UserRecord>;
}

/// Credential store backed by a map, used for the demo accounts and tests
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
	users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryCredentialStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed the two demo accounts: `user`/`user123` and `admin`/`admin123`
	pub fn with_demo_users(hasher: &dyn PasswordHasher) -> Result<Self, AuthError> {
		let store = Self::new();
		store.add_user("u1", "user", Role::User, &hasher.hash("user123")?);
		store.add_user("a1", "admin", Role::Admin, &hasher.hash("admin123")?);
		Ok(store)
	}

	/// Insert or replace an account
	pub fn add_user(&self, id: &str, username: &str, role: Role, password_hash: &str) {
		self.users.write().insert(
			username.to_string(),
			UserRecord {
				id: id.to_string(),
				username: username.to_string(),
				role,
				password_hash: password_hash.to_string(),
			},
		);
	}

	pub fn len(&self) -> usize {
		self.users.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.users.read().is_empty()
	}
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
	async fn find_by_username(&self, username: &str) -> Option<UserRecord> {
		self.users.read().get(username).cloned()
	}
}

/// Verify a username/password pair.
///
/// Unknown users and wrong passwords fail the same way. Hash verification
/// runs on the blocking pool so a login does not stall the async workers.
pub async fn authenticate(
	store: &dyn CredentialStore,
	hasher: Arc<dyn PasswordHasher>,
	username: &str,
	password: &str,
) -> Result<Identity, AuthError> {
	let Some(record) = store.find_by_username(username).await else {
		tracing::debug!(username, "login for unknown user");
		return Err(AuthError::InvalidCredentials);
	};

	let password = password.to_string();
	let hash = record.password_hash.clone();
	let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
		.await
		.map_err(|e| AuthError::Hashing(format!("verification task failed: {}", e)))??;

	if !matches {
		tracing::debug!(username, "login with wrong password");
		return Err(AuthError::InvalidCredentials);
	}

	Ok(record.identity())
}
