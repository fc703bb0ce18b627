use helpdesk_auth::{
	AuthError, CredentialStore, InMemoryCredentialStore, PasswordHasher, TokenService,
};
use helpdesk_tickets::{InMemoryTicketStore, TicketLifecycle, TicketStore};
use std::sync::Arc;

/// Services shared by every request
#[derive(Clone)]
pub struct AppState {
	pub lifecycle: TicketLifecycle,
	pub credentials: Arc<dyn CredentialStore>,
	pub hasher: Arc<dyn PasswordHasher>,
	pub tokens: Arc<dyn TokenService>,
}

impl AppState {
	pub fn new(
		store: Arc<dyn TicketStore>,
		credentials: Arc<dyn CredentialStore>,
		hasher: Arc<dyn PasswordHasher>,
		tokens: Arc<dyn TokenService>,
	) -> Self {
		Self {
			lifecycle: TicketLifecycle::new(store),
			credentials,
			hasher,
			tokens,
		}
	}

	/// In-memory tickets plus the demo accounts, hashed with `hasher`
	pub fn in_memory(
		hasher: Arc<dyn PasswordHasher>,
		tokens: Arc<dyn TokenService>,
	) -> Result<Self, AuthError> {
		let credentials = InMemoryCredentialStore::with_demo_users(hasher.as_ref())?;
		Ok(Self::new(
			Arc::new(InMemoryTicketStore::new()),
			Arc::new(credentials),
			hasher,
			tokens,
		))
	}
}
