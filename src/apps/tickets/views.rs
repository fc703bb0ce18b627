//! Every view authenticates before touching the body or the engine, so an
//! anonymous caller always gets `401`. Bodies are handed over as raw JSON;
//! the lifecycle decodes them only after its role and ownership checks.

use helpdesk_auth::Identity;
use helpdesk_http::{Error, Request, Response, Result};
use helpdesk_middleware::authenticated_identity;
use helpdesk_tickets::{
	AssignTicket, Body, CloseTicket, CreateTicket, SetTicketStatus, UpdateTicketContent,
};

use crate::config::state::AppState;

fn caller(request: &Request) -> Result<Identity> {
	authenticated_identity(request).map_err(Error::from)
}

pub async fn list(state: &AppState, request: &Request) -> Result<Response> {
	let caller = caller(request)?;
	let tickets = state.lifecycle.list(&caller).await?;
	Response::ok().with_json(&tickets)
}

pub async fn create(state: &AppState, request: &Request) -> Result<Response> {
	let caller = caller(request)?;
	let payload: Body<CreateTicket> = Body::Json(request.json()?);
	let ticket = state.lifecycle.create(&caller, payload).await?;

	tracing::info!(ticket = %ticket.id(), created_by = %caller.username, "ticket created");
	Response::created().with_json(&ticket)
}

pub async fn retrieve(state: &AppState, request: &Request, id: &str) -> Result<Response> {
	let caller = caller(request)?;
	let ticket = state.lifecycle.get(&caller, id).await?;
	Response::ok().with_json(&ticket)
}

pub async fn update(state: &AppState, request: &Request, id: &str) -> Result<Response> {
	let caller = caller(request)?;
	let payload: Body<UpdateTicketContent> = Body::Json(request.json()?);
	let ticket = state.lifecycle.update_content(&caller, id, payload).await?;
	Response::ok().with_json(&ticket)
}

pub async fn close(state: &AppState, request: &Request, id: &str) -> Result<Response> {
	let caller = caller(request)?;
	let payload: Body<CloseTicket> = Body::Json(request.json()?);
	let ticket = state.lifecycle.close(&caller, id, payload).await?;

	tracing::info!(ticket = %ticket.id(), closed_by = %caller.username, "ticket closed");
	Response::ok().with_json(&ticket)
}

pub async fn assign(state: &AppState, request: &Request, id: &str) -> Result<Response> {
	let caller = caller(request)?;
	let payload: Body<AssignTicket> = Body::Json(request.json()?);
	let ticket = state.lifecycle.assign(&caller, id, payload).await?;
	Response::ok().with_json(&ticket)
}

pub async fn set_status(state: &AppState, request: &Request, id: &str) -> Result<Response> {
	let caller = caller(request)?;
	let payload: Body<SetTicketStatus> = Body::Json(request.json()?);
	let ticket = state.lifecycle.set_status(&caller, id, payload).await?;

	tracing::info!(ticket = %ticket.id(), status = %ticket.status(), "ticket status changed");
	Response::ok().with_json(&ticket)
}
