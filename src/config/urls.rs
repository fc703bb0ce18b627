//! URL configuration
//!
//! | Method | Path | View |
//! |--------|------|------|
//! | GET | `/health` | [`health::health`] |
//! | POST | `/auth/login` | [`auth::views::login`] |
//! | GET | `/tickets` | [`tickets::views::list`] |
//! | POST | `/tickets` | [`tickets::views::create`] |
//! | GET | `/tickets/{id}` | [`tickets::views::retrieve`] |
//! | PATCH | `/tickets/{id}` | [`tickets::views::update`] |
//! | POST | `/tickets/{id}/close` | [`tickets::views::close`] |
//! | POST | `/tickets/{id}/assign` | [`tickets::views::assign`] |
//! | PATCH | `/tickets/{id}/status` | [`tickets::views::set_status`] |
//!
//! Anything else is `404 {"message":"Not Found"}`.

use async_trait::async_trait;
use helpdesk_http::{Error, Handler, Request, Response, Result};

use super::state::AppState;
use crate::apps::{auth, health, tickets};

const NOT_FOUND: &str = "Not Found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
	Health,
	Login,
	ListTickets,
	CreateTicket,
	RetrieveTicket(&'a str),
	UpdateTicket(&'a str),
	CloseTicket(&'a str),
	AssignTicket(&'a str),
	SetTicketStatus(&'a str),
}

impl<'a> Route<'a> {
	/// Match a method and path. Empty segments are ignored, so a trailing
	/// slash routes the same as none.
	pub fn resolve(method: &str, path: &'a str) -> Option<Self> {
		let segments: Vec<&'a str> = path.split('/').filter(|s| !s.is_empty()).collect();

		let route = match (method, segments.as_slice()) {
			("GET", ["health"]) => Route::Health,
			("POST", ["auth", "login"]) => Route::Login,
			("GET", ["tickets"]) => Route::ListTickets,
			("POST", ["tickets"]) => Route::CreateTicket,
			("GET", ["tickets", id]) => Route::RetrieveTicket(*id),
			("PATCH", ["tickets", id]) => Route::UpdateTicket(*id),
			("POST", ["tickets", id, "close"]) => Route::CloseTicket(*id),
			("POST", ["tickets", id, "assign"]) => Route::AssignTicket(*id),
			("PATCH", ["tickets", id, "status"]) => Route::SetTicketStatus(*id),
			_ => return None,
		};
		Some(route)
	}
}

/// Innermost handler: routes to a view and renders its error, if any
pub struct ApiRouter {
	state: AppState,
}

impl ApiRouter {
	pub fn new(state: AppState) -> Self {
		Self { state }
	}

	pub fn state(&self) -> &AppState {
		&self.state
	}

	async fn dispatch(&self, request: &Request) -> Result<Response> {
		let state = &self.state;
		let Some(route) = Route::resolve(request.method.as_str(), request.path()) else {
			return Err(Error::NotFound(NOT_FOUND.to_string()));
		};

		match route {
			Route::Health => health::health().await,
			Route::Login => auth::views::login(state, request).await,
			Route::ListTickets => tickets::views::list(state, request).await,
			Route::CreateTicket => tickets::views::create(state, request).await,
			Route::RetrieveTicket(id) => tickets::views::retrieve(state, request, id).await,
			Route::UpdateTicket(id) => tickets::views::update(state, request, id).await,
			Route::CloseTicket(id) => tickets::views::close(state, request, id).await,
			Route::AssignTicket(id) => tickets::views::assign(state, request, id).await,
			Route::SetTicketStatus(id) => tickets::views::set_status(state, request, id).await,
		}
	}
}

#[async_trait]
impl Handler for ApiRouter {
	async fn handle(&self, request: Request) -> Result<Response> {
		match self.dispatch(&request).await {
			Ok(response) => Ok(response),
			Err(err) => {
				if err.is_server_error() {
					tracing::error!(
						method = %request.method,
						path = request.path(),
						error = %err,
						"request failed"
					);
				}
				Ok(Response::from(err))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("GET", "/health", Some(Route::Health))]
	#[case("POST", "/auth/login", Some(Route::Login))]
	#[case("GET", "/tickets", Some(Route::ListTickets))]
	#[case("GET", "/tickets/", Some(Route::ListTickets))]
	#[case("POST", "/tickets", Some(Route::CreateTicket))]
	#[case("GET", "/tickets/abc", Some(Route::RetrieveTicket("abc")))]
	#[case("PATCH", "/tickets/abc", Some(Route::UpdateTicket("abc")))]
	#[case("POST", "/tickets/abc/close", Some(Route::CloseTicket("abc")))]
	#[case("POST", "/tickets/abc/assign", Some(Route::AssignTicket("abc")))]
	#[case("PATCH", "/tickets/abc/status", Some(Route::SetTicketStatus("abc")))]
	#[case("DELETE", "/tickets/abc", None)]
	#[case("GET", "/tickets/abc/close", None)]
	#[case("GET", "/", None)]
	#[case("GET", "/admin", None)]
	fn test_resolve(#[case] method: &str, #[case] path: &str, #[case] expected: Option<Route<'static>>) {
		assert_eq!(Route::resolve(method, path), expected);
	}
}
