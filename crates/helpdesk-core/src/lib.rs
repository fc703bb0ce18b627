//! # Helpdesk Core
//!
//! Foundation types shared by every helpdesk crate.
//!
//! ## Modules
//!
//! - [`exception`]: The boundary [`Error`] enum that every crate converts its
//!   domain errors into, together with the HTTP status each variant maps to.
//! - [`validators`]: Character-length validation and the [`ValidationErrors`]
//!   collection used to report field-level problems.
//!
//! ## Quick Start
//!
//! ```rust
//! use helpdesk_core::validators::{LengthValidator, ValidationErrors};
//! use helpdesk_core::exception::Error;
//!
//! let title = LengthValidator::between(3, 120);
//! let mut errors = ValidationErrors::new();
//! errors.check("title", title.validate("ok"));
//!
//! let error = Error::from(errors);
//! assert_eq!(error.status_code(), 400);
//! ```

pub mod exception;
pub mod validators;

pub use exception::{Error, Result};
pub use validators::{FieldIssue, LengthValidator, ValidationErrors};
