use super::{TicketStore, newest_first};
use crate::error::StoreError;
use crate::model::{NewTicket, Ticket, TicketId, TicketPatch, now};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local ticket store
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
	tickets: RwLock<HashMap<TicketId, Ticket>>,
}

impl InMemoryTicketStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.tickets.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.tickets.read().is_empty()
	}
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
	async fn create(&self, new: NewTicket) -> Result<Ticket, StoreError> {
		let ticket = Ticket::open(TicketId::new(), new, now());
		self.tickets.write().insert(ticket.id(), ticket.clone());
		Ok(ticket)
	}

	async fn get(&self, id: TicketId) -> Result<Option<Ticket>, StoreError> {
		Ok(self.tickets.read().get(&id).cloned())
	}

	async fn list_all(&self) -> Result<Vec<Ticket>, StoreError> {
		let mut tickets: Vec<Ticket> = self.tickets.read().values().cloned().collect();
		newest_first(&mut tickets);
		Ok(tickets)
	}

	async fn list_by_creator(&self, username: &str) -> Result<Vec<Ticket>, StoreError> {
		let mut tickets: Vec<Ticket> = self
			.tickets
			.read()
			.values()
			.filter(|ticket| ticket.created_by() == username)
			.cloned()
			.collect();
		newest_first(&mut tickets);
		Ok(tickets)
	}

	async fn update(&self, id: TicketId, patch: TicketPatch) -> Result<Ticket, StoreError> {
		let mut tickets = self.tickets.write();
		let ticket = tickets.get_mut(&id).ok_or(StoreError::Missing(id))?;
		ticket.apply(patch, now());
		Ok(ticket.clone())
	}

	async fn purge(&self) -> Result<u64, StoreError> {
		let mut tickets = self.tickets.write();
		let removed = tickets.len() as u64;
		tickets.clear();
		Ok(removed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{TicketPriority, TicketStatus};
	use rstest::{fixture, rstest};

	fn new_ticket(created_by: &str, title: &str) -> NewTicket {
		NewTicket {
			title: title.to_string(),
			description: "Something is not working as expected".to_string(),
			priority: TicketPriority::Low,
			created_by: created_by.to_string(),
		}
	}

	async fn tick() {
		tokio::time::sleep(std::time::Duration::from_millis(2)).await;
	}

	#[fixture]
	fn store() -> InMemoryTicketStore {
		InMemoryTicketStore::new()
	}

	#[rstest]
	#[tokio::test]
	async fn test_create_and_get(store: InMemoryTicketStore) {
		let created = store.create(new_ticket("alice", "VPN down")).await.unwrap();

		let fetched = store.get(created.id()).await.unwrap();

		assert_eq!(fetched, Some(created));
		assert_eq!(store.len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_get_unknown_is_none(store: InMemoryTicketStore) {
		assert!(store.get(TicketId::new()).await.unwrap().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_unknown_is_missing(store: InMemoryTicketStore) {
		let id = TicketId::new();

		let result = store.update(id, TicketPatch::new().with_title("x")).await;

		assert!(matches!(result, Err(StoreError::Missing(missing)) if missing == id));
	}

	#[rstest]
	#[tokio::test]
	async fn test_lists_are_newest_first(store: InMemoryTicketStore) {
		let first = store.create(new_ticket("alice", "First")).await.unwrap();
		tick().await;
		let second = store.create(new_ticket("bob", "Second")).await.unwrap();
		tick().await;
		let third = store.create(new_ticket("alice", "Third")).await.unwrap();
		tick().await;

		// touching the oldest moves it to the front
		store
			.update(first.id(), TicketPatch::new().with_assignee("carol"))
			.await
			.unwrap();

		let all: Vec<TicketId> = store.list_all().await.unwrap().iter().map(Ticket::id).collect();
		let alice: Vec<TicketId> = store
			.list_by_creator("alice")
			.await
			.unwrap()
			.iter()
			.map(Ticket::id)
			.collect();

		assert_eq!(all[0], first.id());
		assert_eq!(all.len(), 3);
		assert!(all.contains(&second.id()));
		assert_eq!(alice, vec![first.id(), third.id()]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_update_bumps_updated_at(store: InMemoryTicketStore) {
		let created = store.create(new_ticket("alice", "Laptop slow")).await.unwrap();

		let updated = store
			.update(created.id(), TicketPatch::new().with_assignee("bob"))
			.await
			.unwrap();

		assert!(updated.updated_at() > created.updated_at());
		assert_eq!(updated.status(), TicketStatus::Open);
		assert_eq!(updated.assigned_to(), Some("bob"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_purge(store: InMemoryTicketStore) {
		store.create(new_ticket("alice", "One")).await.unwrap();
		store.create(new_ticket("bob", "Two")).await.unwrap();

		assert_eq!(store.purge().await.unwrap(), 2);
		assert!(store.is_empty());
	}
}
