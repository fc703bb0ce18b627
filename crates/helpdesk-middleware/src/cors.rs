//! CORS

use async_trait::async_trait;
use helpdesk_http::{Handler, Middleware, Request, Response, Result};
use hyper::Method;
use hyper::header::{self, HeaderValue};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CorsConfig {
	pub allow_origin: String,
	pub allow_methods: Vec<String>,
	pub allow_headers: Vec<String>,
	pub allow_credentials: bool,
	pub max_age: Option<u64>,
}

impl CorsConfig {
	/// Allow a single origin with credentials, the way the web client needs it
	pub fn for_origin(origin: impl Into<String>) -> Self {
		Self {
			allow_origin: origin.into(),
			..Self::default()
		}
	}
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allow_origin: "*".to_string(),
			allow_methods: ["GET", "POST", "PATCH", "OPTIONS"]
				.into_iter()
				.map(String::from)
				.collect(),
			allow_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
			allow_credentials: true,
			max_age: Some(3600),
		}
	}
}

pub struct CorsMiddleware {
	config: CorsConfig,
}

impl CorsMiddleware {
	pub fn new(config: CorsConfig) -> Self {
		Self { config }
	}

	fn apply_origin(&self, response: &mut Response) {
		if let Ok(origin) = HeaderValue::from_str(&self.config.allow_origin) {
			response.headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
		}
		response
			.headers
			.insert(header::VARY, HeaderValue::from_static("Origin"));
		if self.config.allow_credentials {
			response.headers.insert(
				header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
				HeaderValue::from_static("true"),
			);
		}
	}

	fn preflight(&self) -> Response {
		let mut response = Response::no_content().with_stop_chain(true);
		self.apply_origin(&mut response);

		if let Ok(methods) = HeaderValue::from_str(&self.config.allow_methods.join(",")) {
			response
				.headers
				.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods);
		}
		if let Ok(headers) = HeaderValue::from_str(&self.config.allow_headers.join(",")) {
			response
				.headers
				.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, headers);
		}
		if let Some(max_age) = self.config.max_age {
			response
				.headers
				.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
		}
		response
	}
}

#[async_trait]
impl Middleware for CorsMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if request.method == Method::OPTIONS {
			return Ok(self.preflight());
		}

		let mut response = next.handle(request).await?;
		self.apply_origin(&mut response);
		Ok(response)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::StatusCode;
	use rstest::{fixture, rstest};

	struct Ok200;

	#[async_trait]
	impl Handler for Ok200 {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body("tickets"))
		}
	}

	#[fixture]
	fn cors() -> CorsMiddleware {
		CorsMiddleware::new(CorsConfig::for_origin("http://localhost:5173"))
	}

	#[rstest]
	#[tokio::test]
	async fn test_preflight_short_circuits(cors: CorsMiddleware) {
		let request = Request::builder()
			.method(Method::OPTIONS)
			.uri("/tickets/abc/close")
			.build()
			.unwrap();

		let response = cors.process(request, Arc::new(Ok200)).await.unwrap();

		assert_eq!(response.status, StatusCode::NO_CONTENT);
		assert!(response.body.is_empty());
		assert!(response.should_stop_chain());
		assert_eq!(
			response.headers[header::ACCESS_CONTROL_ALLOW_METHODS],
			"GET,POST,PATCH,OPTIONS"
		);
		assert_eq!(
			response.headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
			"Content-Type,Authorization"
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_simple_request_gets_origin(cors: CorsMiddleware) {
		let request = Request::builder().uri("/tickets").build().unwrap();

		let response = cors.process(request, Arc::new(Ok200)).await.unwrap();

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(
			response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
			"http://localhost:5173"
		);
		assert_eq!(response.headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
	}
}
