use bytes::Bytes;
use helpdesk_core::exception::Error;
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

/// HTTP response returned by handlers and middleware
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	stop_chain: bool,
}

impl Response {
	/// Create a response with an empty body.
	///
	/// # Examples
	///
	/// ```
	/// use helpdesk_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			stop_chain: false,
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set a header. Invalid names or values are ignored.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = hyper::header::HeaderName::from_bytes(name.as_bytes()) {
			if let Ok(header_value) = hyper::header::HeaderValue::from_str(value) {
				self.headers.insert(header_name, header_value);
			}
		}
		self
	}

	/// Serialize `data` as the JSON body and set `Content-Type`.
	///
	/// # Examples
	///
	/// ```
	/// use helpdesk_http::Response;
	/// use serde_json::json;
	///
	/// let response = Response::ok().with_json(&json!({"status": "ok"})).unwrap();
	/// assert_eq!(
	///     response.headers.get("content-type").unwrap(),
	///     "application/json"
	/// );
	/// ```
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self, Error> {
		let json = serde_json::to_vec(data)?;
		self.body = Bytes::from(json);
		self.headers.insert(
			hyper::header::CONTENT_TYPE,
			hyper::header::HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	/// JSON `{"message": ...}` body with the given status
	pub fn message(status: StatusCode, message: &str) -> Self {
		Response::new(status)
			.with_json(&serde_json::json!({ "message": message }))
			.unwrap_or_else(|_| Response::internal_server_error())
	}

	/// Whether middleware asked the chain to stop here
	pub fn should_stop_chain(&self) -> bool {
		self.stop_chain
	}

	pub fn with_stop_chain(mut self, stop: bool) -> Self {
		self.stop_chain = stop;
		self
	}
}

impl From<Error> for Response {
	fn from(error: Error) -> Self {
		let status =
			StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		let body = match error.issues() {
			Some(issues) => serde_json::json!({
				"message": error.client_message(),
				"issues": issues,
			}),
			None => serde_json::json!({ "message": error.client_message() }),
		};

		Response::new(status)
			.with_json(&body)
			.unwrap_or_else(|_| Response::internal_server_error())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use helpdesk_core::validators::ValidationErrors;
	use rstest::rstest;

	fn body_json(response: &Response) -> serde_json::Value {
		serde_json::from_slice(&response.body).unwrap()
	}

	#[rstest]
	fn test_error_to_response_carries_message() {
		let response: Response = Error::Conflict("Ticket content can only be edited while status is OPEN.".into()).into();

		assert_eq!(response.status, StatusCode::CONFLICT);
		assert_eq!(
			body_json(&response),
			serde_json::json!({ "message": "Ticket content can only be edited while status is OPEN." })
		);
	}

	#[rstest]
	fn test_validation_error_includes_issues() {
		let response: Response =
			Error::Validation(ValidationErrors::single("resolutionNote", "is required")).into();

		assert_eq!(response.status, StatusCode::BAD_REQUEST);
		let body = body_json(&response);
		assert_eq!(body["message"], "Validation failed");
		assert_eq!(body["issues"][0]["field"], "resolutionNote");
	}

	#[rstest]
	fn test_internal_error_is_generic() {
		let response: Response = Error::Database("database is locked".into()).into();

		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body_json(&response)["message"], "Internal Server Error");
	}

	#[rstest]
	fn test_with_header_ignores_invalid_name() {
		let response = Response::ok().with_header("bad header", "value");

		assert!(response.headers.is_empty());
	}

	#[rstest]
	fn test_message_helper() {
		let response = Response::message(StatusCode::NOT_FOUND, "Not Found");

		assert_eq!(body_json(&response), serde_json::json!({ "message": "Not Found" }));
	}
}
