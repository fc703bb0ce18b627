use helpdesk_auth::authenticate;
use helpdesk_http::{Error, Request, Response, Result};

use super::serializers::{AuthPayload, LoginInput};
use crate::config::state::AppState;

/// Exchange a username and password for a bearer token
pub async fn login(state: &AppState, request: &Request) -> Result<Response> {
	let (username, password) = request.json::<LoginInput>()?.validate()?;

	let identity = authenticate(
		state.credentials.as_ref(),
		state.hasher.clone(),
		&username,
		&password,
	)
	.await
	.map_err(Error::from)?;
	let token = state.tokens.issue(&identity).map_err(Error::from)?;

	tracing::info!(username = %identity.username, role = %identity.role, "user logged in");

	Response::ok().with_json(&AuthPayload {
		token,
		user: identity.into(),
	})
}
