//! Request handlers, grouped by the area of the API they serve

pub mod auth;
pub mod health;
pub mod tickets;
