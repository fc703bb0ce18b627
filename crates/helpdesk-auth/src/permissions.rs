//! Role and ownership predicates

use crate::identity::{Identity, Role};

/// Anything with a creator
pub trait Owned {
	fn owner_username(&self) -> &str;
}

pub fn is_admin(identity: &Identity) -> bool {
	identity.role == Role::Admin
}

/// True when `identity` created `resource`; admin status is irrelevant
pub fn is_owner<T: Owned + ?Sized>(identity: &Identity, resource: &T) -> bool {
	identity.username == resource.owner_username()
}

pub fn can_view<T: Owned + ?Sized>(identity: &Identity, resource: &T) -> bool {
	is_admin(identity) || is_owner(identity, resource)
}
