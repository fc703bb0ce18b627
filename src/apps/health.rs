use chrono::{SecondsFormat, Utc};
use helpdesk_http::{Response, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
	pub status: &'static str,
	pub timestamp: String,
}

/// Liveness probe, always `200` while the process is serving
pub async fn health() -> Result<Response> {
	Response::ok().with_json(&HealthStatus {
		status: "ok",
		timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
	})
}
