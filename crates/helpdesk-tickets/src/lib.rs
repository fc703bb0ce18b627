//! # Helpdesk Tickets
//!
//! The ticket model and the rules that govern it.
//!
//! [`TicketLifecycle`] is the only entry point callers should mutate tickets
//! through: it checks the caller's role and ownership, validates payloads,
//! and enforces the status rules before anything reaches a [`TicketStore`].
//!
//! ## Status rules
//!
//! ```text
//! OPEN ----------(close / set CLOSED)----------> CLOSED
//! OPEN ----------(set IN_PROGRESS, admin)------> IN_PROGRESS
//! IN_PROGRESS ---(close / set CLOSED)----------> CLOSED
//! IN_PROGRESS ---(set OPEN, admin)-------------> OPEN
//! CLOSED --------(set OPEN | IN_PROGRESS, admin)> reopened
//! ```
//!
//! A ticket is CLOSED exactly when it carries both `closedAt` and a
//! `resolutionNote`. Content (title, description, priority) can only be
//! edited by its creator while the ticket is OPEN.

pub mod error;
pub mod lifecycle;
pub mod model;
pub mod payload;
pub mod store;

pub use error::{LifecycleError, StoreError};
pub use lifecycle::TicketLifecycle;
pub use model::{
	NewTicket, StatusUpdate, Ticket, TicketId, TicketPatch, TicketPriority, TicketStatus,
};
pub use payload::{AssignTicket, Body, CloseTicket, CreateTicket, SetTicketStatus, UpdateTicketContent};
pub use store::{InMemoryTicketStore, SqliteTicketStore, TicketStore};
