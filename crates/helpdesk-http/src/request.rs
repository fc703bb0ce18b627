use bytes::Bytes;
use helpdesk_core::exception::Error;
use helpdesk_core::validators::ValidationErrors;
use hyper::{HeaderMap, Method, Uri, Version};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;

/// A fully buffered HTTP request.
///
/// `extensions` carries per-request values set by middleware, such as the
/// authenticated identity.
#[derive(Debug)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub remote_addr: Option<SocketAddr>,
	pub extensions: http::Extensions,
}

impl Request {
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			remote_addr: None,
			extensions: http::Extensions::new(),
		}
	}

	/// Start building a request.
	///
	/// # Examples
	///
	/// ```
	/// use helpdesk_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/tickets")
	///     .header("content-type", "application/json")
	///     .body(r#"{"title":"Printer broken"}"#)
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/tickets");
	/// assert_eq!(request.header("content-type"), Some("application/json"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Header value as a string, if present and valid UTF-8
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	/// Deserialize the body as JSON.
	///
	/// An empty body is read as `{}` so that payloads made entirely of
	/// optional fields report missing fields instead of a parse failure.
	/// Malformed input becomes a validation error on the `body` field.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
		let raw: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
			b"{}"
		} else {
			&self.body
		};

		serde_json::from_slice(raw)
			.map_err(|e| Error::Validation(ValidationErrors::single("body", e.to_string())))
	}
}

#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: Option<String>,
	version: Version,
	headers: Vec<(String, String)>,
	body: Bytes,
	remote_addr: Option<SocketAddr>,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: None,
			version: Version::HTTP_11,
			headers: Vec::new(),
			body: Bytes::new(),
			remote_addr: None,
		}
	}
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		for (name, value) in headers.iter() {
			if let Ok(value) = value.to_str() {
				self.headers.push((name.to_string(), value.to_string()));
			}
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	pub fn build(self) -> Result<Request, http::Error> {
		let uri: Uri = self.uri.as_deref().unwrap_or("/").parse()?;

		let mut headers = HeaderMap::new();
		for (name, value) in self.headers {
			let name = http::header::HeaderName::from_bytes(name.as_bytes())?;
			let value = http::header::HeaderValue::from_str(&value)?;
			headers.append(name, value);
		}

		let mut request = Request::new(self.method, uri, self.version, headers, self.body);
		request.remote_addr = self.remote_addr;
		Ok(request)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde::Deserialize;

	#[derive(Debug, Deserialize)]
	struct Payload {
		title: Option<String>,
	}

	#[rstest]
	#[case("")]
	#[case("  \n")]
	fn test_json_empty_body_is_empty_object(#[case] body: &'static str) {
		let request = Request::builder().body(body).build().unwrap();

		let payload: Payload = request.json().unwrap();

		assert!(payload.title.is_none());
	}

	#[rstest]
	fn test_json_malformed_body_names_body_field() {
		let request = Request::builder().body("{not json").build().unwrap();

		let error = request.json::<Payload>().unwrap_err();

		assert_eq!(error.status_code(), 400);
		assert!(error.issues().is_some_and(|i| i.has_field("body")));
	}

	#[rstest]
	fn test_builder_defaults() {
		let request = Request::builder().build().unwrap();

		assert_eq!(request.method, Method::GET);
		assert_eq!(request.path(), "/");
		assert!(request.remote_addr.is_none());
	}

	#[rstest]
	fn test_builder_rejects_invalid_header() {
		let result = Request::builder().header("bad header", "x").build();

		assert!(result.is_err());
	}
}
