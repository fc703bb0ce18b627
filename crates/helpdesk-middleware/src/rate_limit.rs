//! Fixed-window rate limiting keyed by client IP

use async_trait::async_trait;
use helpdesk_core::exception::Error;
use helpdesk_http::{Handler, Middleware, Request, Response, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Expired entries are swept once the table grows past this many clients
const SWEEP_THRESHOLD: usize = 1024;

pub const DEFAULT_MAX_CLIENTS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
	/// Maximum requests per window
	pub max_requests: usize,
	pub window: Duration,
	/// Hard cap on tracked clients. A new client arriving at the cap evicts
	/// the one whose window started first.
	pub max_clients: usize,
}

impl RateLimitConfig {
	pub fn new(max_requests: usize, window: Duration) -> Self {
		Self {
			max_requests,
			window,
			max_clients: DEFAULT_MAX_CLIENTS,
		}
	}

	pub fn per_minute(max_requests: usize) -> Self {
		Self::new(max_requests, Duration::from_secs(60))
	}

	pub fn with_max_clients(mut self, max_clients: usize) -> Self {
		self.max_clients = max_clients.max(1);
		self
	}
}

impl Default for RateLimitConfig {
	fn default() -> Self {
		Self::new(200, Duration::from_secs(15 * 60))
	}
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
	count: usize,
	window_start: Instant,
}

impl RateLimitEntry {
	fn new(now: Instant) -> Self {
		Self {
			count: 0,
			window_start: now,
		}
	}
}

#[derive(Debug, Default)]
struct ClientTable {
	entries: HashMap<IpAddr, RateLimitEntry>,
	/// Earliest instant at which a sweep can remove anything
	next_sweep: Option<Instant>,
}

impl ClientTable {
	fn sweep(&mut self, now: Instant, window: Duration) {
		self.entries
			.retain(|_, entry| now.duration_since(entry.window_start) < window);
		self.next_sweep = self
			.entries
			.values()
			.map(|entry| entry.window_start + window)
			.min();
	}

	fn evict_oldest(&mut self) {
		let oldest = self
			.entries
			.iter()
			.min_by_key(|(_, entry)| entry.window_start)
			.map(|(client, _)| *client);
		if let Some(client) = oldest {
			self.entries.remove(&client);
		}
	}
}

/// Rejects clients that exceed `max_requests` within one window with `429`
pub struct RateLimitMiddleware {
	config: RateLimitConfig,
	table: Mutex<ClientTable>,
}

impl RateLimitMiddleware {
	pub fn new(config: RateLimitConfig) -> Self {
		Self {
			config,
			table: Mutex::new(ClientTable::default()),
		}
	}

	pub fn config(&self) -> &RateLimitConfig {
		&self.config
	}

	/// Count one request from `client`; on rejection returns the time until
	/// the window resets
	fn check(&self, client: IpAddr, now: Instant) -> std::result::Result<(), Duration> {
		let mut table = self.table.lock();

		if table.entries.len() > SWEEP_THRESHOLD && table.next_sweep.is_none_or(|at| now >= at) {
			table.sweep(now, self.config.window);
		}
		if !table.entries.contains_key(&client) && table.entries.len() >= self.config.max_clients {
			table.evict_oldest();
		}

		let entry = table
			.entries
			.entry(client)
			.or_insert_with(|| RateLimitEntry::new(now));

		if now.duration_since(entry.window_start) >= self.config.window {
			*entry = RateLimitEntry::new(now);
		}

		if entry.count >= self.config.max_requests {
			let elapsed = now.duration_since(entry.window_start);
			return Err(self.config.window.saturating_sub(elapsed));
		}

		entry.count += 1;
		Ok(())
	}
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let client = request
			.remote_addr
			.map(|addr| addr.ip())
			.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

		if let Err(retry_after) = self.check(client, Instant::now()) {
			tracing::debug!(%client, "rate limit exceeded");
			// round up so clients never retry early
			let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
			return Ok(Response::from(Error::TooManyRequests)
				.with_header("Retry-After", &secs.to_string())
				.with_stop_chain(true));
		}

		next.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::StatusCode;
	use rstest::rstest;
	use std::net::SocketAddr;

	struct Ok200;

	#[async_trait]
	impl Handler for Ok200 {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok())
		}
	}

	fn request_from(addr: &str) -> Request {
		Request::builder()
			.uri("/tickets")
			.remote_addr(addr.parse::<SocketAddr>().unwrap())
			.build()
			.unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_rejects_after_limit() {
		let limiter = RateLimitMiddleware::new(RateLimitConfig::per_minute(2));
		let next: Arc<dyn Handler> = Arc::new(Ok200);

		for _ in 0..2 {
			let response = limiter
				.process(request_from("10.0.0.1:5000"), next.clone())
				.await
				.unwrap();
			assert_eq!(response.status, StatusCode::OK);
		}

		let response = limiter
			.process(request_from("10.0.0.1:5001"), next.clone())
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
		assert!(response.should_stop_chain());
		assert!(response.headers.contains_key("retry-after"));
		let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
		assert_eq!(body["message"], "Too many requests, please try again later.");

		// other clients are unaffected
		let response = limiter
			.process(request_from("10.0.0.2:5000"), next)
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::OK);
	}

	#[rstest]
	fn test_window_resets() {
		let limiter = RateLimitMiddleware::new(RateLimitConfig::new(1, Duration::from_secs(10)));
		let client: IpAddr = "10.0.0.1".parse().unwrap();
		let start = Instant::now();

		assert!(limiter.check(client, start).is_ok());
		let retry = limiter.check(client, start + Duration::from_secs(4)).unwrap_err();
		assert_eq!(retry, Duration::from_secs(6));
		assert!(limiter.check(client, start + Duration::from_secs(10)).is_ok());
	}

	#[rstest]
	fn test_stale_entries_swept() {
		let limiter = RateLimitMiddleware::new(RateLimitConfig::new(5, Duration::from_secs(1)));
		let start = Instant::now();

		for i in 0..=SWEEP_THRESHOLD as u32 {
			let client = IpAddr::V4(Ipv4Addr::from(i + 1));
			limiter.check(client, start).unwrap();
		}
		assert_eq!(limiter.table.lock().entries.len(), SWEEP_THRESHOLD + 1);

		let late = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1));
		limiter.check(late, start + Duration::from_secs(2)).unwrap();

		assert_eq!(limiter.table.lock().entries.len(), 1);
	}

	#[rstest]
	fn test_no_resweep_until_something_can_expire() {
		let window = Duration::from_secs(10);
		let limiter = RateLimitMiddleware::new(RateLimitConfig::new(5, window));
		let start = Instant::now();

		for i in 0..=SWEEP_THRESHOLD as u32 {
			limiter.check(IpAddr::V4(Ipv4Addr::from(i + 1)), start).unwrap();
		}
		let busy = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1));
		limiter.check(busy, start + Duration::from_secs(1)).unwrap();

		let table = limiter.table.lock();
		assert_eq!(table.entries.len(), SWEEP_THRESHOLD + 2);
		assert_eq!(table.next_sweep, Some(start + window));
	}

	#[rstest]
	fn test_table_is_capped() {
		let limiter =
			RateLimitMiddleware::new(RateLimitConfig::per_minute(5).with_max_clients(3));
		let start = Instant::now();

		for i in 0..5u32 {
			let client = IpAddr::V4(Ipv4Addr::from(i + 1));
			limiter.check(client, start + Duration::from_millis(u64::from(i))).unwrap();
		}

		let table = limiter.table.lock();
		assert_eq!(table.entries.len(), 3);
		assert!(!table.entries.contains_key(&IpAddr::V4(Ipv4Addr::from(1))));
		assert!(table.entries.contains_key(&IpAddr::V4(Ipv4Addr::from(5))));
	}
}
