use helpdesk_core::exception::Error;
use thiserror::Error as ThisError;

/// Why a caller could not be authenticated
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AuthError {
	#[error("Missing or invalid Authorization header.")]
	MissingCredentials,

	#[error("Invalid credentials.")]
	InvalidCredentials,

	/// The token failed signature or shape checks; the payload is the
	/// decoder's reason, kept for logs only.
	#[error("Invalid or expired token.")]
	InvalidToken(String),

	#[error("Invalid or expired token.")]
	Expired,

	#[error("Password hashing failed: {0}")]
	Hashing(String),
}

impl From<AuthError> for Error {
	fn from(err: AuthError) -> Self {
		match err {
			AuthError::Hashing(reason) => {
				Error::Other(anyhow::anyhow!("password hashing failed: {}", reason))
			}
			other => Error::Authentication(other.to_string()),
		}
	}
}
