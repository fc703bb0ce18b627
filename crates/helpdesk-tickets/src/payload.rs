//! Request payloads for lifecycle operations
//!
//! Every field is optional at the serde level so that validation can name
//! each missing or malformed field instead of failing on the first one.

use crate::model::{NewTicket, TicketPatch, TicketPriority, TicketStatus};
use helpdesk_core::validators::{LengthValidator, ValidationErrors};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const TITLE: LengthValidator = LengthValidator::between(3, 120);
pub const DESCRIPTION: LengthValidator = LengthValidator::between(10, 2000);
pub const RESOLUTION_NOTE: LengthValidator = LengthValidator::between(10, 2000);
pub const ASSIGNEE: LengthValidator = LengthValidator::at_least(2);

const REQUIRED: &str = "is required";
pub const REQUIRED_TO_CLOSE: &str = "resolutionNote is required when closing a ticket.";

fn check_length(
	errors: &mut ValidationErrors,
	field: &str,
	value: Option<String>,
	validator: LengthValidator,
) -> Option<String> {
	let value = value?;
	match validator.validate(&value) {
		Ok(()) => Some(value),
		Err(message) => {
			errors.add(field, message);
			None
		}
	}
}

fn check_required(
	errors: &mut ValidationErrors,
	field: &str,
	value: Option<String>,
	validator: LengthValidator,
) -> Option<String> {
	if value.is_none() {
		errors.add(field, REQUIRED);
		return None;
	}
	check_length(errors, field, value, validator)
}

fn check_priority(errors: &mut ValidationErrors, value: Option<String>) -> Option<TicketPriority> {
	match value?.parse() {
		Ok(priority) => Some(priority),
		Err(message) => {
			errors.add("priority", message);
			None
		}
	}
}

/// Notes are judged and stored without surrounding whitespace
fn check_note(errors: &mut ValidationErrors, value: Option<String>) -> Option<String> {
	let trimmed = value.map(|note| note.trim().to_string());
	check_length(errors, "resolutionNote", trimmed, RESOLUTION_NOTE)
}

/// A payload as handed to a lifecycle operation.
///
/// Raw JSON is decoded only once the operation's role and ownership checks
/// have passed, so a malformed body never masks a `403` or `404`.
#[derive(Debug, Clone)]
pub enum Body<T> {
	Typed(T),
	Json(serde_json::Value),
}

impl<T: DeserializeOwned> Body<T> {
	pub fn decode(self) -> Result<T, ValidationErrors> {
		match self {
			Body::Typed(payload) => Ok(payload),
			Body::Json(value) => {
				serde_json::from_value(value).map_err(|e| ValidationErrors::single("body", e.to_string()))
			}
		}
	}
}

impl<T> From<T> for Body<T> {
	fn from(payload: T) -> Self {
		Body::Typed(payload)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicket {
	pub title: Option<String>,
	pub description: Option<String>,
	pub priority: Option<String>,
}

impl CreateTicket {
	/// Validate into a new ticket filed by `created_by`; priority defaults to MEDIUM
	pub fn validate(self, created_by: &str) -> Result<NewTicket, ValidationErrors> {
		let mut errors = ValidationErrors::new();
		let title = check_required(&mut errors, "title", self.title, TITLE);
		let description = check_required(&mut errors, "description", self.description, DESCRIPTION);
		let priority = check_priority(&mut errors, self.priority);
		errors.into_result()?;

		match (title, description) {
			(Some(title), Some(description)) => Ok(NewTicket {
				title,
				description,
				priority: priority.unwrap_or_default(),
				created_by: created_by.to_string(),
			}),
			_ => Err(ValidationErrors::single("body", REQUIRED)),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketContent {
	pub title: Option<String>,
	pub description: Option<String>,
	pub priority: Option<String>,
}

impl UpdateTicketContent {
	/// Validate into a content-only patch with at least one field set
	pub fn validate(self) -> Result<TicketPatch, ValidationErrors> {
		if self.title.is_none() && self.description.is_none() && self.priority.is_none() {
			return Err(ValidationErrors::single(
				"body",
				"At least one field must be provided.",
			));
		}

		let mut errors = ValidationErrors::new();
		let patch = TicketPatch {
			title: check_length(&mut errors, "title", self.title, TITLE),
			description: check_length(&mut errors, "description", self.description, DESCRIPTION),
			priority: check_priority(&mut errors, self.priority),
			..TicketPatch::default()
		};
		errors.into_result()?;
		Ok(patch)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTicket {
	pub resolution_note: Option<String>,
}

impl CloseTicket {
	/// The trimmed resolution note
	pub fn validate(self) -> Result<String, ValidationErrors> {
		let mut errors = ValidationErrors::new();
		if self.resolution_note.is_none() {
			errors.add("resolutionNote", REQUIRED);
		}
		let note = check_note(&mut errors, self.resolution_note);
		errors.into_result()?;
		note.ok_or_else(|| ValidationErrors::single("resolutionNote", REQUIRED))
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTicket {
	pub assigned_to: Option<String>,
}

impl AssignTicket {
	pub fn validate(self) -> Result<String, ValidationErrors> {
		let mut errors = ValidationErrors::new();
		let assignee = check_required(&mut errors, "assignedTo", self.assigned_to, ASSIGNEE);
		errors.into_result()?;
		assignee.ok_or_else(|| ValidationErrors::single("assignedTo", REQUIRED))
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTicketStatus {
	pub status: Option<String>,
	pub resolution_note: Option<String>,
}

impl SetTicketStatus {
	/// Target status and, when supplied, the trimmed note.
	///
	/// A note is required when the target is CLOSED. A note supplied for
	/// any other status is still validated but later discarded.
	pub fn validate(self) -> Result<(TicketStatus, Option<String>), ValidationErrors> {
		let mut errors = ValidationErrors::new();

		let status = match self.status.as_deref().map(str::parse::<TicketStatus>) {
			None => {
				errors.add("status", REQUIRED);
				None
			}
			Some(Err(message)) => {
				errors.add("status", message);
				None
			}
			Some(Ok(status)) => Some(status),
		};

		let note_supplied = self.resolution_note.is_some();
		let note = check_note(&mut errors, self.resolution_note);

		if status == Some(TicketStatus::Closed) && !note_supplied {
			errors.add("resolutionNote", REQUIRED_TO_CLOSE);
		}

		errors.into_result()?;
		match status {
			Some(status) => Ok((status, note)),
			None => Err(ValidationErrors::single("status", REQUIRED)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn create(title: Option<&str>, description: Option<&str>, priority: Option<&str>) -> CreateTicket {
		CreateTicket {
			title: title.map(String::from),
			description: description.map(String::from),
			priority: priority.map(String::from),
		}
	}

	#[rstest]
	fn test_create_defaults_priority() {
		let new = create(Some("Printer broken"), Some("Paper jam on floor 3"), None)
			.validate("alice")
			.unwrap();

		assert_eq!(new.priority, TicketPriority::Medium);
		assert_eq!(new.created_by, "alice");
	}

	#[rstest]
	#[case(create(None, Some("Paper jam on floor 3"), None), &["title"])]
	#[case(create(Some("ab"), Some("short"), None), &["title", "description"])]
	#[case(create(Some("Printer"), Some("Paper jam on floor 3"), Some("URGENT")), &["priority"])]
	#[case(create(None, None, Some("low")), &["title", "description", "priority"])]
	fn test_create_reports_every_field(#[case] payload: CreateTicket, #[case] fields: &[&str]) {
		let errors = payload.validate("alice").unwrap_err();

		let reported: Vec<&str> = errors.issues().iter().map(|i| i.field.as_str()).collect();
		assert_eq!(reported, fields);
	}

	#[rstest]
	fn test_body_decodes_json_lazily() {
		let body: Body<CreateTicket> = Body::Json(serde_json::json!({ "title": "Printer broken" }));

		let payload = body.decode().unwrap();

		assert_eq!(payload.title.as_deref(), Some("Printer broken"));
	}

	#[rstest]
	fn test_body_wrong_shape_names_body_field() {
		let body: Body<AssignTicket> = Body::Json(serde_json::json!({ "assignedTo": 42 }));

		let errors = body.decode().unwrap_err();

		assert!(errors.has_field("body"));
	}

	#[rstest]
	fn test_update_requires_some_field() {
		let errors = UpdateTicketContent::default().validate().unwrap_err();

		assert!(errors.has_field("body"));
	}

	#[rstest]
	fn test_update_builds_content_patch() {
		let patch = UpdateTicketContent {
			priority: Some("HIGH".into()),
			..Default::default()
		}
		.validate()
		.unwrap();

		assert_eq!(patch, TicketPatch::new().with_priority(TicketPriority::High));
	}

	#[rstest]
	#[case(None, false)]
	#[case(Some("too short"), false)]
	#[case(Some("          padded   "), false)]
	#[case(Some("Replaced toner cartridge."), true)]
	fn test_close_note_rules(#[case] note: Option<&str>, #[case] valid: bool) {
		let result = CloseTicket {
			resolution_note: note.map(String::from),
		}
		.validate();

		assert_eq!(result.is_ok(), valid);
		if let Err(errors) = result {
			assert!(errors.has_field("resolutionNote"));
		}
	}

	#[rstest]
	fn test_close_note_is_trimmed() {
		let note = CloseTicket {
			resolution_note: Some("  Rebooted the router.  ".into()),
		}
		.validate()
		.unwrap();

		assert_eq!(note, "Rebooted the router.");
	}

	#[rstest]
	#[case(None, false)]
	#[case(Some("b"), false)]
	#[case(Some("bo"), true)]
	fn test_assignee_rules(#[case] assignee: Option<&str>, #[case] valid: bool) {
		let result = AssignTicket {
			assigned_to: assignee.map(String::from),
		}
		.validate();

		assert_eq!(result.is_ok(), valid);
	}

	#[rstest]
	#[case(Some("CLOSED"), None, Some("resolutionNote"))]
	#[case(Some("CLOSED"), Some("short"), Some("resolutionNote"))]
	#[case(Some("CLOSED"), Some("Replaced toner cartridge."), None)]
	#[case(Some("IN_PROGRESS"), None, None)]
	#[case(Some("OPEN"), None, None)]
	#[case(Some("DONE"), None, Some("status"))]
	#[case(None, None, Some("status"))]
	fn test_set_status_rules(
		#[case] status: Option<&str>,
		#[case] note: Option<&str>,
		#[case] failing_field: Option<&str>,
	) {
		let result = SetTicketStatus {
			status: status.map(String::from),
			resolution_note: note.map(String::from),
		}
		.validate();

		match failing_field {
			Some(field) => assert!(result.unwrap_err().has_field(field)),
			None => assert!(result.is_ok()),
		}
	}

	#[rstest]
	fn test_payloads_read_camel_case() {
		let payload: SetTicketStatus =
			serde_json::from_str(r#"{"status":"CLOSED","resolutionNote":"Replaced toner cartridge."}"#)
				.unwrap();

		let (status, note) = payload.validate().unwrap();

		assert_eq!(status, TicketStatus::Closed);
		assert_eq!(note.as_deref(), Some("Replaced toner cartridge."));
	}
}
