use crate::model::TicketId;
use helpdesk_core::exception::Error;
use helpdesk_core::validators::ValidationErrors;
use thiserror::Error as ThisError;

pub const TICKET_NOT_FOUND: &str = "Ticket not found.";

/// Failures raised by a ticket store
#[derive(Debug, ThisError)]
pub enum StoreError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// A stored row could not be turned back into a ticket
	#[error("corrupt ticket record: {0}")]
	Corrupt(String),

	#[error("ticket {0} does not exist")]
	Missing(TicketId),
}

/// Why a lifecycle operation was refused
#[derive(Debug, ThisError)]
pub enum LifecycleError {
	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),

	#[error("{0}")]
	Forbidden(String),

	#[error("Ticket not found.")]
	NotFound,

	#[error("{0}")]
	Conflict(String),

	#[error(transparent)]
	Store(StoreError),
}

impl LifecycleError {
	pub(crate) fn forbidden() -> Self {
		LifecycleError::Forbidden("Forbidden.".to_string())
	}
}

impl From<ValidationErrors> for LifecycleError {
	fn from(errors: ValidationErrors) -> Self {
		LifecycleError::Validation(errors)
	}
}

impl From<StoreError> for LifecycleError {
	fn from(err: StoreError) -> Self {
		match err {
			// the record vanished between read and write
			StoreError::Missing(_) => LifecycleError::NotFound,
			other => LifecycleError::Store(other),
		}
	}
}

impl From<StoreError> for Error {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::Missing(_) => Error::NotFound(TICKET_NOT_FOUND.to_string()),
			other => Error::Database(other.to_string()),
		}
	}
}

impl From<LifecycleError> for Error {
	fn from(err: LifecycleError) -> Self {
		match err {
			LifecycleError::Validation(errors) => Error::Validation(errors),
			LifecycleError::Forbidden(message) => Error::Authorization(message),
			LifecycleError::NotFound => Error::NotFound(TICKET_NOT_FOUND.to_string()),
			LifecycleError::Conflict(message) => Error::Conflict(message),
			LifecycleError::Store(store) => store.into(),
		}
	}
}
