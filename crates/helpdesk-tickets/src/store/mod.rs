//! Ticket storage backends
//!
//! Stores assign ids and timestamps; they do not check permissions or
//! status rules. Those belong to [`crate::TicketLifecycle`].

mod memory;
mod sqlite;

pub use memory::InMemoryTicketStore;
pub use sqlite::SqliteTicketStore;

use crate::error::StoreError;
use crate::model::{NewTicket, Ticket, TicketId, TicketPatch};
use async_trait::async_trait;

#[async_trait]
pub trait TicketStore: Send + Sync {
	/// Persist a new OPEN ticket with a fresh id and timestamps
	async fn create(&self, new: NewTicket) -> Result<Ticket, StoreError>;

	async fn get(&self, id: TicketId) -> Result<Option<Ticket>, StoreError>;

	/// Every ticket, most recently updated first
	async fn list_all(&self) -> Result<Vec<Ticket>, StoreError>;

	/// Tickets filed by `username`, most recently updated first
	async fn list_by_creator(&self, username: &str) -> Result<Vec<Ticket>, StoreError>;

	/// Apply `patch` atomically and bump `updatedAt`.
	///
	/// Fails with [`StoreError::Missing`] when `id` is unknown.
	async fn update(&self, id: TicketId, patch: TicketPatch) -> Result<Ticket, StoreError>;

	/// Delete every ticket, returning how many were removed
	async fn purge(&self) -> Result<u64, StoreError>;
}

pub(crate) fn newest_first(tickets: &mut [Ticket]) {
	tickets.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
}
