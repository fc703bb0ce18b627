//! Boundary error type
//!
//! Each domain crate keeps its own error enum and converts into [`Error`]
//! at the HTTP edge. The variant decides the status code; the payload
//! decides the client-facing message.

use crate::validators::ValidationErrors;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),

	#[error("Authentication error: {0}")]
	Authentication(String),

	#[error("Authorization error: {0}")]
	Authorization(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Payload too large")]
	PayloadTooLarge,

	#[error("Too many requests")]
	TooManyRequests,

	#[error("Database error: {0}")]
	Database(String),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl Error {
	/// HTTP status code for this error
	pub fn status_code(&self) -> u16 {
		match self {
			Error::Validation(_) => 400,
			Error::Authentication(_) => 401,
			Error::Authorization(_) => 403,
			Error::NotFound(_) => 404,
			Error::Conflict(_) => 409,
			Error::PayloadTooLarge => 413,
			Error::TooManyRequests => 429,
			Error::Database(_) | Error::Serialization(_) | Error::Other(_) => 500,
		}
	}

	/// Message safe to show to a client.
	///
	/// Server-side failures never leak their details.
	pub fn client_message(&self) -> String {
		match self {
			Error::Validation(_) => "Validation failed".to_string(),
			Error::Authentication(message)
			| Error::Authorization(message)
			| Error::NotFound(message)
			| Error::Conflict(message) => message.clone(),
			Error::PayloadTooLarge => "Payload too large.".to_string(),
			Error::TooManyRequests => "Too many requests, please try again later.".to_string(),
			Error::Database(_) | Error::Serialization(_) | Error::Other(_) => {
				"Internal Server Error".to_string()
			}
		}
	}

	/// Field issues carried by a validation error
	pub fn issues(&self) -> Option<&ValidationErrors> {
		match self {
			Error::Validation(errors) => Some(errors),
			_ => None,
		}
	}

	pub fn is_server_error(&self) -> bool {
		self.status_code() >= 500
	}
}

impl From<ValidationErrors> for Error {
	fn from(errors: ValidationErrors) -> Self {
		Error::Validation(errors)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Serialization(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Error::Validation(ValidationErrors::single("title", "is required")), 400)]
	#[case(Error::Authentication("Invalid credentials.".into()), 401)]
	#[case(Error::Authorization("Forbidden.".into()), 403)]
	#[case(Error::NotFound("Ticket not found.".into()), 404)]
	#[case(Error::Conflict("edit locked".into()), 409)]
	#[case(Error::PayloadTooLarge, 413)]
	#[case(Error::TooManyRequests, 429)]
	#[case(Error::Database("disk I/O error".into()), 500)]
	fn test_status_codes(#[case] error: Error, #[case] expected: u16) {
		assert_eq!(error.status_code(), expected);
	}

	#[rstest]
	fn test_server_errors_hide_details() {
		let error = Error::Database("no such table: tickets".into());

		assert!(error.is_server_error());
		assert_eq!(error.client_message(), "Internal Server Error");
		assert!(error.to_string().contains("no such table"));
	}

	#[rstest]
	fn test_client_errors_keep_message() {
		let error = Error::NotFound("Ticket not found.".into());

		assert_eq!(error.client_message(), "Ticket not found.");
		assert!(error.issues().is_none());
	}

	#[rstest]
	fn test_validation_exposes_issues() {
		let error: Error = ValidationErrors::single("resolutionNote", "is required").into();

		assert_eq!(error.client_message(), "Validation failed");
		assert!(error.issues().is_some_and(|i| i.has_field("resolutionNote")));
	}
}
