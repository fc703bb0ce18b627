//! Ticket records and the patches applied to them

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use helpdesk_auth::Owned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Current time at the precision tickets are stored with
pub fn now() -> DateTime<Utc> {
	Utc::now().trunc_subsecs(6)
}

/// Next `updatedAt` value, strictly after `previous`
pub fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
	if now > previous {
		now
	} else {
		previous + TimeDelta::microseconds(1)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	/// `None` for anything that is not a UUID
	pub fn parse(raw: &str) -> Option<Self> {
		Uuid::parse_str(raw).ok().map(Self)
	}

	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for TicketId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for TicketId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.hyphenated())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
	Open,
	InProgress,
	Closed,
}

impl TicketStatus {
	pub const ALL: [TicketStatus; 3] = [TicketStatus::Open, TicketStatus::InProgress, TicketStatus::Closed];

	pub fn as_str(&self) -> &'static str {
		match self {
			TicketStatus::Open => "OPEN",
			TicketStatus::InProgress => "IN_PROGRESS",
			TicketStatus::Closed => "CLOSED",
		}
	}
}

impl fmt::Display for TicketStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TicketStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		TicketStatus::ALL
			.into_iter()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| "must be one of OPEN, IN_PROGRESS, CLOSED".to_string())
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketPriority {
	Low,
	#[default]
	Medium,
	High,
}

impl TicketPriority {
	pub const ALL: [TicketPriority; 3] = [TicketPriority::Low, TicketPriority::Medium, TicketPriority::High];

	pub fn as_str(&self) -> &'static str {
		match self {
			TicketPriority::Low => "LOW",
			TicketPriority::Medium => "MEDIUM",
			TicketPriority::High => "HIGH",
		}
	}
}

impl fmt::Display for TicketPriority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TicketPriority {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		TicketPriority::ALL
			.into_iter()
			.find(|priority| priority.as_str() == s)
			.ok_or_else(|| "must be one of LOW, MEDIUM, HIGH".to_string())
	}
}

/// A support ticket as stored and as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
	pub(crate) id: TicketId,
	pub(crate) title: String,
	pub(crate) description: String,
	pub(crate) status: TicketStatus,
	pub(crate) priority: TicketPriority,
	pub(crate) created_by: String,
	pub(crate) assigned_to: Option<String>,
	pub(crate) resolution_note: Option<String>,
	pub(crate) closed_at: Option<DateTime<Utc>>,
	pub(crate) created_at: DateTime<Utc>,
	pub(crate) updated_at: DateTime<Utc>,
}

impl Ticket {
	/// A fresh OPEN ticket
	pub fn open(id: TicketId, new: NewTicket, now: DateTime<Utc>) -> Self {
		Self {
			id,
			title: new.title,
			description: new.description,
			status: TicketStatus::Open,
			priority: new.priority,
			created_by: new.created_by,
			assigned_to: None,
			resolution_note: None,
			closed_at: None,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn id(&self) -> TicketId {
		self.id
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn status(&self) -> TicketStatus {
		self.status
	}

	pub fn priority(&self) -> TicketPriority {
		self.priority
	}

	pub fn created_by(&self) -> &str {
		&self.created_by
	}

	pub fn assigned_to(&self) -> Option<&str> {
		self.assigned_to.as_deref()
	}

	pub fn resolution_note(&self) -> Option<&str> {
		self.resolution_note.as_deref()
	}

	pub fn closed_at(&self) -> Option<DateTime<Utc>> {
		self.closed_at
	}

	pub fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}

	pub fn updated_at(&self) -> DateTime<Utc> {
		self.updated_at
	}

	/// Apply `patch` in place and bump `updated_at`.
	///
	/// Moving to any status other than CLOSED clears `closed_at` and
	/// `resolution_note`.
	pub fn apply(&mut self, patch: TicketPatch, now: DateTime<Utc>) {
		if let Some(title) = patch.title {
			self.title = title;
		}
		if let Some(description) = patch.description {
			self.description = description;
		}
		if let Some(priority) = patch.priority {
			self.priority = priority;
		}
		if let Some(assigned_to) = patch.assigned_to {
			self.assigned_to = Some(assigned_to);
		}

		match patch.status {
			Some(StatusUpdate::Open) => self.reopen(TicketStatus::Open),
			Some(StatusUpdate::InProgress) => self.reopen(TicketStatus::InProgress),
			Some(StatusUpdate::Closed {
				resolution_note,
				closed_at,
			}) => {
				self.status = TicketStatus::Closed;
				self.resolution_note = Some(resolution_note);
				self.closed_at = Some(closed_at);
			}
			None => {}
		}

		self.updated_at = next_timestamp(self.updated_at, now);
	}

	fn reopen(&mut self, status: TicketStatus) {
		self.status = status;
		self.resolution_note = None;
		self.closed_at = None;
	}
}

impl Owned for Ticket {
	fn owner_username(&self) -> &str {
		&self.created_by
	}
}

/// Fields supplied when a ticket is filed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
	pub title: String,
	pub description: String,
	pub priority: TicketPriority,
	pub created_by: String,
}

/// Target of a status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
	Open,
	InProgress,
	Closed {
		resolution_note: String,
		closed_at: DateTime<Utc>,
	},
}

/// A partial update; `None` leaves the field untouched.
///
/// # Examples
///
/// ```
/// use helpdesk_tickets::{TicketPatch, TicketPriority};
///
/// let patch = TicketPatch::new()
///     .with_title("Printer still broken")
///     .with_priority(TicketPriority::High);
///
/// assert!(!patch.is_empty());
/// assert!(patch.status.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
	pub title: Option<String>,
	pub description: Option<String>,
	pub priority: Option<TicketPriority>,
	pub assigned_to: Option<String>,
	pub status: Option<StatusUpdate>,
}

impl TicketPatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_priority(mut self, priority: TicketPriority) -> Self {
		self.priority = Some(priority);
		self
	}

	pub fn with_assignee(mut self, assigned_to: impl Into<String>) -> Self {
		self.assigned_to = Some(assigned_to.into());
		self
	}

	pub fn with_status(mut self, status: StatusUpdate) -> Self {
		self.status = Some(status);
		self
	}

	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}
