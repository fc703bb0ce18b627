//! Field validators
//!
//! Lengths are measured in Unicode scalar values, not bytes, so a title made
//! of multi-byte characters is judged by what the user typed.

use serde::Serialize;
use std::fmt;

/// A single problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
	/// Name of the offending field as it appears on the wire (camelCase).
	pub field: String,
	/// Human readable description of the problem.
	pub message: String,
}

/// Ordered collection of field issues.
///
/// # Examples
///
/// ```
/// use helpdesk_core::validators::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// assert!(errors.is_empty());
///
/// errors.add("resolutionNote", "is required");
/// assert!(errors.has_field("resolutionNote"));
/// assert!(errors.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
	issues: Vec<FieldIssue>,
}

impl ValidationErrors {
	/// Create an empty collection
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a collection holding exactly one issue
	pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
		let mut errors = Self::new();
		errors.add(field, message);
		errors
	}

	/// Record an issue for `field`
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.issues.push(FieldIssue {
			field: field.into(),
			message: message.into(),
		});
	}

	/// Record the outcome of a validator, keeping only failures
	pub fn check(&mut self, field: &str, outcome: Result<(), String>) {
		if let Err(message) = outcome {
			self.add(field, message);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.issues.is_empty()
	}

	pub fn issues(&self) -> &[FieldIssue] {
		&self.issues
	}

	/// Returns true if any issue names `field`
	pub fn has_field(&self, field: &str) -> bool {
		self.issues.iter().any(|issue| issue.field == field)
	}

	/// `Ok(())` when no issue was recorded, otherwise `Err(self)`
	pub fn into_result(self) -> Result<(), Self> {
		if self.is_empty() { Ok(()) } else { Err(self) }
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let rendered: Vec<String> = self
			.issues
			.iter()
			.map(|issue| format!("{}: {}", issue.field, issue.message))
			.collect();
		f.write_str(&rendered.join("; "))
	}
}

impl std::error::Error for ValidationErrors {}

/// Validates the character length of a string.
///
/// # Examples
///
/// ```
/// use helpdesk_core::validators::LengthValidator;
///
/// let validator = LengthValidator::between(3, 120);
/// assert!(validator.validate("Printer broken").is_ok());
/// assert!(validator.validate("no").is_err());
///
/// let assignee = LengthValidator::at_least(2);
/// assert!(assignee.validate("bo").is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthValidator {
	min: usize,
	max: Option<usize>,
}

impl LengthValidator {
	/// Accept lengths in `min..=max`
	pub const fn between(min: usize, max: usize) -> Self {
		Self {
			min,
			max: Some(max),
		}
	}

	/// Accept any length of at least `min`
	pub const fn at_least(min: usize) -> Self {
		Self { min, max: None }
	}

	pub const fn min(&self) -> usize {
		self.min
	}

	pub const fn max(&self) -> Option<usize> {
		self.max
	}

	/// Check `value`, returning the failure message on error
	pub fn validate(&self, value: &str) -> Result<(), String> {
		let length = value.chars().count();
		if length < self.min {
			return Err(format!("must be at least {} characters", self.min));
		}
		match self.max {
			Some(max) if length > max => Err(format!("must be at most {} characters", max)),
			_ => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("abc", true)]
	#[case("ab", false)]
	#[case("", false)]
	#[case(&"x".repeat(120), true)]
	#[case(&"x".repeat(121), false)]
	fn test_between_boundaries(#[case] value: &str, #[case] valid: bool) {
		let validator = LengthValidator::between(3, 120);

		assert_eq!(validator.validate(value).is_ok(), valid, "value length {}", value.len());
	}

	#[rstest]
	fn test_length_counts_characters_not_bytes() {
		let validator = LengthValidator::between(3, 3);

		// three characters, six bytes
		assert!(validator.validate("äöü").is_ok());
	}

	#[rstest]
	fn test_at_least_has_no_upper_bound() {
		let validator = LengthValidator::at_least(2);

		assert!(validator.validate(&"y".repeat(10_000)).is_ok());
		assert_eq!(
			validator.validate("y"),
			Err("must be at least 2 characters".to_string())
		);
	}

	#[rstest]
	fn test_validation_errors_collects_only_failures() {
		let validator = LengthValidator::between(10, 2000);
		let mut errors = ValidationErrors::new();

		errors.check("description", validator.validate("long enough text"));
		assert!(errors.is_empty());

		errors.check("resolutionNote", validator.validate("short"));
		assert_eq!(errors.issues().len(), 1);
		assert!(errors.has_field("resolutionNote"));
		assert_eq!(
			errors.to_string(),
			"resolutionNote: must be at least 10 characters"
		);
	}

	#[rstest]
	fn test_validation_errors_serializes_as_list() {
		let errors = ValidationErrors::single("title", "is required");

		let json = serde_json::to_value(&errors).unwrap();

		assert_eq!(
			json,
			serde_json::json!([{ "field": "title", "message": "is required" }])
		);
	}
}
