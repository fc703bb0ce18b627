//! JWT token service

use crate::error::AuthError;
use crate::identity::{Identity, Role};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Issues and verifies signed identity assertions
pub trait TokenService: Send + Sync {
	fn issue(&self, identity: &Identity) -> Result<String, AuthError>;

	fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
	pub sub: String, // user id
	pub username: String,
	pub role: Role,
	pub iat: i64,
	pub exp: i64,
}

impl Claims {
	pub fn new(identity: &Identity, expires_in: Duration) -> Self {
		let now = Utc::now();
		Self {
			sub: identity.id.clone(),
			username: identity.username.clone(),
			role: identity.role,
			iat: now.timestamp(),
			exp: (now + expires_in).timestamp(),
		}
	}

	pub fn is_expired(&self) -> bool {
		Utc::now().timestamp() > self.exp
	}

	pub fn into_identity(self) -> Identity {
		Identity::new(self.sub, self.username, self.role)
	}
}

/// HS256 token service.
///
/// Tokens live for two hours unless configured otherwise.
pub struct JwtAuth {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	ttl: Duration,
}

impl JwtAuth {
	pub fn new(secret: &[u8]) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			validation: Validation::default(),
			ttl: Duration::hours(2),
		}
	}

	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;
		self
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
		encode(&Header::default(), claims, &self.encoding_key)
			.map_err(|e| AuthError::InvalidToken(e.to_string()))
	}

	pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
		decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|e| match e.kind() {
				ErrorKind::ExpiredSignature => AuthError::Expired,
				_ => AuthError::InvalidToken(e.to_string()),
			})
	}
}

impl TokenService for JwtAuth {
	fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
		self.encode(&Claims::new(identity, self.ttl))
	}

	fn verify(&self, token: &str) -> Result<Identity, AuthError> {
		let claims = self.decode(token)?;

		// the decoder allows clock leeway; expiry itself is strict
		if claims.is_expired() {
			return Err(AuthError::Expired);
		}

		Ok(claims.into_identity())
	}
}
