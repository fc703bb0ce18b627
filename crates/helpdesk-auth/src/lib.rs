//! # Helpdesk Auth
//!
//! Everything needed to turn a username/password or a bearer token into an
//! [`Identity`]:
//!
//! - [`credentials`]: the [`CredentialStore`] seam and login verification
//! - [`hasher`]: Argon2id password hashing behind the [`PasswordHasher`] trait
//! - [`jwt`]: HS256 tokens behind the [`TokenService`] trait
//! - [`permissions`]: stateless role and ownership predicates
//!
//! ## Example
//!
//! ```
//! use helpdesk_auth::{Identity, JwtAuth, Role, TokenService};
//!
//! let tokens = JwtAuth::new(b"a-secret-of-at-least-16-bytes");
//! let alice = Identity::new("u7", "alice", Role::User);
//!
//! let token = tokens.issue(&alice).unwrap();
//! assert_eq!(tokens.verify(&token).unwrap(), alice);
//! ```

pub mod credentials;
pub mod error;
pub mod hasher;
pub mod identity;
pub mod jwt;
pub mod permissions;

pub use credentials::{CredentialStore, InMemoryCredentialStore, UserRecord, authenticate};
pub use error::AuthError;
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use identity::{Identity, Role};
pub use jwt::{Claims, JwtAuth, TokenService};
pub use permissions::{Owned, can_view, is_admin, is_owner};
