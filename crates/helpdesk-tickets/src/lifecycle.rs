//! Ticket lifecycle rules
//!
//! Check order per operation:
//!
//! | Operation        | Order                                                  |
//! |------------------|--------------------------------------------------------|
//! | `create`         | admin gate, payload                                    |
//! | `get`            | existence, visibility                                  |
//! | `update_content` | payload, existence, creator, OPEN status               |
//! | `close`          | existence, visibility, note                            |
//! | `assign`         | admin gate, payload, existence                         |
//! | `set_status`     | admin gate, payload, existence                         |
//!
//! Admin-only operations refuse non-admins before looking the ticket up, so
//! they never reveal whether an id exists. "payload" covers decoding a raw
//! JSON [`Body`] as well as validating it.

use crate::error::LifecycleError;
use crate::model::{StatusUpdate, Ticket, TicketId, TicketPatch, TicketStatus, now};
use crate::payload::{
	AssignTicket, Body, CloseTicket, CreateTicket, REQUIRED_TO_CLOSE, SetTicketStatus,
	UpdateTicketContent,
};
use crate::store::TicketStore;
use helpdesk_auth::{Identity, can_view, is_admin, is_owner};
use helpdesk_core::validators::ValidationErrors;
use std::sync::Arc;

pub const ADMIN_CREATE_FORBIDDEN: &str = "Admins can not create tickets directly.";
pub const EDIT_REQUIRES_OPEN: &str = "Ticket content can only be edited while status is OPEN.";

/// Role-aware operations over a [`TicketStore`]
#[derive(Clone)]
pub struct TicketLifecycle {
	store: Arc<dyn TicketStore>,
}

impl TicketLifecycle {
	pub fn new(store: Arc<dyn TicketStore>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &Arc<dyn TicketStore> {
		&self.store
	}

	/// All tickets for admins, own tickets otherwise; newest update first
	pub async fn list(&self, caller: &Identity) -> Result<Vec<Ticket>, LifecycleError> {
		if is_admin(caller) {
			Ok(self.store.list_all().await?)
		} else {
			Ok(self.store.list_by_creator(&caller.username).await?)
		}
	}

	pub async fn get(&self, caller: &Identity, id: &str) -> Result<Ticket, LifecycleError> {
		let ticket = self.find(id).await?;
		if !can_view(caller, &ticket) {
			return Err(LifecycleError::forbidden());
		}
		Ok(ticket)
	}

	pub async fn create(
		&self,
		caller: &Identity,
		payload: impl Into<Body<CreateTicket>>,
	) -> Result<Ticket, LifecycleError> {
		if is_admin(caller) {
			return Err(LifecycleError::Forbidden(ADMIN_CREATE_FORBIDDEN.to_string()));
		}
		let new = payload.into().decode()?.validate(&caller.username)?;
		Ok(self.store.create(new).await?)
	}

	/// Edit title, description or priority. Creator only, and only while OPEN.
	pub async fn update_content(
		&self,
		caller: &Identity,
		id: &str,
		payload: impl Into<Body<UpdateTicketContent>>,
	) -> Result<Ticket, LifecycleError> {
		let patch = payload.into().decode()?.validate()?;
		let ticket = self.find(id).await?;

		if !is_owner(caller, &ticket) {
			return Err(LifecycleError::forbidden());
		}
		if ticket.status() != TicketStatus::Open {
			return Err(LifecycleError::Conflict(EDIT_REQUIRES_OPEN.to_string()));
		}

		Ok(self.store.update(ticket.id(), patch).await?)
	}

	/// Close with a resolution note. Admin or creator.
	///
	/// Closing an already CLOSED ticket replaces its note and `closedAt`.
	pub async fn close(
		&self,
		caller: &Identity,
		id: &str,
		payload: impl Into<Body<CloseTicket>>,
	) -> Result<Ticket, LifecycleError> {
		let ticket = self.find(id).await?;
		if !can_view(caller, &ticket) {
			return Err(LifecycleError::forbidden());
		}
		let resolution_note = payload.into().decode()?.validate()?;

		let patch = TicketPatch::new().with_status(StatusUpdate::Closed {
			resolution_note,
			closed_at: now(),
		});
		Ok(self.store.update(ticket.id(), patch).await?)
	}

	/// Set the assignee without touching status. Admin only.
	pub async fn assign(
		&self,
		caller: &Identity,
		id: &str,
		payload: impl Into<Body<AssignTicket>>,
	) -> Result<Ticket, LifecycleError> {
		if !is_admin(caller) {
			return Err(LifecycleError::forbidden());
		}
		let assignee = payload.into().decode()?.validate()?;
		let ticket = self.find(id).await?;

		Ok(self
			.store
			.update(ticket.id(), TicketPatch::new().with_assignee(assignee))
			.await?)
	}

	/// Move to any status. Admin only.
	///
	/// Leaving CLOSED (or never entering it) clears `closedAt` and
	/// `resolutionNote`, which is how an admin reopens a ticket.
	pub async fn set_status(
		&self,
		caller: &Identity,
		id: &str,
		payload: impl Into<Body<SetTicketStatus>>,
	) -> Result<Ticket, LifecycleError> {
		if !is_admin(caller) {
			return Err(LifecycleError::forbidden());
		}
		let (status, note) = payload.into().decode()?.validate()?;
		let ticket = self.find(id).await?;

		let update = match (status, note) {
			(TicketStatus::Open, _) => StatusUpdate::Open,
			(TicketStatus::InProgress, _) => StatusUpdate::InProgress,
			(TicketStatus::Closed, Some(resolution_note)) => StatusUpdate::Closed {
				resolution_note,
				closed_at: now(),
			},
			(TicketStatus::Closed, None) => {
				return Err(ValidationErrors::single("resolutionNote", REQUIRED_TO_CLOSE).into());
			}
		};

		Ok(self
			.store
			.update(ticket.id(), TicketPatch::new().with_status(update))
			.await?)
	}

	async fn find(&self, id: &str) -> Result<Ticket, LifecycleError> {
		let id = TicketId::parse(id).ok_or(LifecycleError::NotFound)?;
		self.store.get(id).await?.ok_or(LifecycleError::NotFound)
	}
}
