//! Login

pub mod serializers;
pub mod views;
