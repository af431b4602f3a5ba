//! Token endpoint (`POST /collect`), part of C9. Dispatches on `Content-Type`:
//! JSON is the app-local BID collect, form-urlencoded is the OAuth2/CIBA
//! token exchange. The two halves answer in different error wire shapes, so
//! this is the one place in the crate that builds an `axum::response::Response`
//! directly instead of returning `ClResult<Json<_>>`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use idp_types::store::{ChallengeStore, CredentialStore, KeyStore, SessionStore};
use idp_types::types::{Application, Challenge, ChallengeStatus, ChallengeType, TokenResponse};

use crate::prelude::*;
use crate::session_state::SessionState;
use crate::types::{AuthorizeForm, BidCollectRequest, BidCollectResponse, CibaForm, CollectForm};

pub async fn collect(State(app): State<App>, headers: HeaderMap, body: Bytes) -> Response {
	let content_type =
		headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
	if content_type.starts_with("application/json") {
		match collect_bid(&app, &headers, &body).await {
			Ok(response) => Json(response).into_response(),
			Err(err) => err.into_response(),
		}
	} else {
		match collect_oauth(&app, &headers, &body).await {
			Ok(response) => Json(response).into_response(),
			Err(err) => err.into_oauth2_response(),
		}
	}
}

/// Resolves which user the challenge's accepted assertion belongs to.
/// `Login`/`Registration` carry it directly; a discoverable login only
/// learns it once the credential it recorded is looked up.
async fn resolve_signed_user(app: &App, challenge: &Challenge) -> ClResult<Box<str>> {
	match SessionState::decode(&challenge.private_data)? {
		SessionState::Registration { user_id, .. } => Ok(user_id),
		SessionState::Login { user_id, .. } => Ok(user_id),
		SessionState::DiscoverableLogin { .. } => {
			let credential_id = challenge
				.credential
				.as_deref()
				.ok_or_else(|| Error::Internal("signed challenge carries no credential".into()))?;
			let key = app.credential_store.get_key(credential_id).await?;
			Ok(key.user_id)
		}
	}
}

/// The `credential` field of a BID collect response: the full passkey for a
/// freshly created credential, or the raw credential id (base64) for a login.
fn credential_value(typ: ChallengeType, bytes: &[u8]) -> ClResult<serde_json::Value> {
	match typ {
		ChallengeType::WebauthnCreate => serde_json::from_slice(bytes)
			.map_err(|_| Error::Internal("stored credential is not valid JSON".into())),
		ChallengeType::WebauthnGet => Ok(serde_json::Value::String(URL_SAFE_NO_PAD.encode(bytes))),
	}
}

async fn collect_bid(app: &App, headers: &HeaderMap, body: &[u8]) -> ClResult<BidCollectResponse> {
	let credentials = idp_token::basic_auth(headers).ok_or(Error::InvalidClient)?;
	let client = idp_token::authenticate(&app.application_store, &credentials).await?;

	let req: BidCollectRequest = serde_json::from_slice(body)?;
	let challenge = app.challenge_store.get_challenge(&req.challenge_id).await?;
	if challenge.oauth2_context.as_ref().is_some_and(|context| !context.is_empty()) {
		return Err(Error::InvalidRequest("challenge was initiated through the OAuth2 flow".into()));
	}
	if challenge.app_id.as_ref() != client.id.as_ref() {
		return Err(Error::WrongApp);
	}
	idp_challenge::validate_bid_collect(&challenge)?;
	app.challenge_store.set_challenge_status(&challenge.id, ChallengeStatus::Collected).await?;

	let user_id = resolve_signed_user(app, &challenge).await?;
	let signature_bytes = challenge
		.signature
		.as_deref()
		.ok_or_else(|| Error::Internal("signed challenge carries no signature".into()))?;
	let signature: serde_json::Value = serde_json::from_slice(signature_bytes)?;
	let credential =
		challenge.credential.as_deref().map(|bytes| credential_value(challenge.typ, bytes)).transpose()?;

	Ok(BidCollectResponse { user_id, signature, credential })
}

async fn collect_oauth(app: &App, headers: &HeaderMap, body: &[u8]) -> ClResult<TokenResponse> {
	let body = std::str::from_utf8(body)
		.map_err(|_| Error::InvalidRequest("token request body is not valid UTF-8".into()))?;
	let form: CollectForm = serde_urlencoded::from_str(body)
		.map_err(|_| Error::InvalidRequest("malformed token request body".into()))?;
	let credentials =
		idp_token::resolve_form_credentials(headers, form.client_id.as_deref(), form.client_secret.as_deref())?;
	let client = idp_token::authenticate(&app.application_store, &credentials).await?;
	let issuer = crate::discovery::issuer(app);

	match form.grant_type.as_ref() {
		"authorization_code" => handle_authorization_code(app, &client, &form, &issuer).await,
		"refresh_token" => handle_refresh_token(app, &client, &form, &issuer).await,
		"urn:openid:params:grant-type:ciba" => handle_ciba(app, &client, &form, &issuer).await,
		_ => Err(Error::InvalidGrantType),
	}
}

async fn handle_authorization_code(
	app: &App,
	client: &Application,
	form: &CollectForm,
	issuer: &str,
) -> ClResult<TokenResponse> {
	let code = form.code.as_deref().ok_or_else(|| Error::InvalidRequest("code is required".into()))?;
	let challenge = app.challenge_store.get_challenge_by_code(code).await.map_err(|err| {
		if matches!(err, Error::NotFound) {
			Error::InvalidChallenge("unknown or expired code".into())
		} else {
			err
		}
	})?;
	if challenge.app_id.as_ref() != client.id.as_ref() {
		return Err(Error::WrongApp);
	}
	idp_challenge::validate_oauth_collect(&challenge)?;

	let authorize_form: AuthorizeForm =
		serde_urlencoded::from_str(challenge.oauth2_context.as_deref().unwrap_or_default())
			.map_err(|_| Error::Internal("stored authorize context is corrupt".into()))?;
	if let Some(method) = &authorize_form.code_challenge_method {
		let code_challenge = authorize_form
			.code_challenge
			.as_deref()
			.ok_or_else(|| Error::Internal("PKCE method present without a challenge".into()))?;
		let verifier = form
			.code_verifier
			.as_deref()
			.ok_or_else(|| Error::InvalidChallenge("code_verifier is required".into()))?;
		// Verified before the code is consumed: a PKCE mismatch must leave the
		// challenge collectable again rather than burning the one-shot code.
		idp_token::verify_pkce(method, verifier, code_challenge)?;
	}

	if !app.challenge_store.delete_code(code).await? {
		return Err(Error::Collected);
	}
	app.challenge_store.set_challenge_status(&challenge.id, ChallengeStatus::Collected).await?;
	let user_id = resolve_signed_user(app, &challenge).await?;
	mint_tokens(
		app,
		client,
		issuer,
		&user_id,
		authorize_form.scope.as_deref(),
		challenge.user_verified.unwrap_or(false),
		authorize_form.nonce.as_deref(),
	)
	.await
}

async fn handle_ciba(
	app: &App,
	client: &Application,
	form: &CollectForm,
	issuer: &str,
) -> ClResult<TokenResponse> {
	let auth_req_id = form
		.auth_req_id
		.as_deref()
		.ok_or_else(|| Error::InvalidRequest("auth_req_id is required".into()))?;
	let challenge =
		app.challenge_store.get_challenge_by_ciba_request_id(auth_req_id).await.map_err(|err| {
			if matches!(err, Error::NotFound) {
				Error::InvalidChallenge("unknown or expired auth_req_id".into())
			} else {
				err
			}
		})?;
	if challenge.app_id.as_ref() != client.id.as_ref() {
		return Err(Error::WrongApp);
	}
	idp_challenge::validate_oauth_collect(&challenge)?;
	if !app.challenge_store.delete_ciba_request(auth_req_id).await? {
		return Err(Error::Collected);
	}

	let ciba_form: CibaForm =
		serde_urlencoded::from_str(challenge.oauth2_context.as_deref().unwrap_or_default())
			.map_err(|_| Error::Internal("stored CIBA context is corrupt".into()))?;
	app.challenge_store.set_challenge_status(&challenge.id, ChallengeStatus::Collected).await?;
	let user_id = resolve_signed_user(app, &challenge).await?;
	mint_tokens(
		app,
		client,
		issuer,
		&user_id,
		Some(&ciba_form.scope),
		challenge.user_verified.unwrap_or(false),
		None,
	)
	.await
}

async fn handle_refresh_token(
	app: &App,
	client: &Application,
	form: &CollectForm,
	issuer: &str,
) -> ClResult<TokenResponse> {
	let refresh_token = form
		.refresh_token
		.as_deref()
		.ok_or_else(|| Error::InvalidRequest("refresh_token is required".into()))?;
	let key = app.key_store.get_server_key(&client.key_id).await?;
	let session = idp_session::rotate(
		&app.session_store,
		refresh_token,
		issuer,
		&key,
		&client.id,
		app.config.refresh_token_extend_on_use,
		app.config.session_ttl_secs,
	)
	.await?;

	let start = Timestamp::now();
	let scope = session.requested_scopes.clone();
	let mut response =
		TokenResponse { token_type: "Bearer".into(), scope: Some(scope.clone()), ..Default::default() };

	if scope.split_whitespace().any(|s| s == "openid") {
		// The refresh event doesn't re-run an assertion; `uv`/`up` reflect
		// the original grant, which required `openid` and therefore a
		// completed ceremony.
		let auth_time = app.credential_store.get_auth_time(&session.user_id, &client.id).await?;
		response.id_token = Some(idp_token::mint_id_token(
			&key,
			issuer,
			&session.user_id,
			&client.id,
			start,
			app.config.token_ttl_secs,
			auth_time,
			true,
			true,
			Some(&session.id),
			None,
		)?);
	}

	response.access_token = Some(idp_token::mint_access_token(
		&key,
		issuer,
		&session.user_id,
		&client.id,
		start,
		app.config.token_ttl_secs,
		Some(&session.id),
		Some(&scope),
	)?);
	response.refresh_token =
		Some(idp_session::build_refresh_token(&session, issuer, &key)?.into());

	Ok(response)
}

/// Shared tail of the `authorization_code` and CIBA grants: `offline_access`
/// opens a session (and therefore a refresh token), `openid` mints an ID
/// token, an access token is minted unconditionally.
async fn mint_tokens(
	app: &App,
	client: &Application,
	issuer: &str,
	user_id: &str,
	scope: Option<&str>,
	user_verified: bool,
	nonce: Option<&str>,
) -> ClResult<TokenResponse> {
	let scope = scope.unwrap_or("openid");
	let key = app.key_store.get_server_key(&client.key_id).await?;
	let start = Timestamp::now();
	let mut response =
		TokenResponse { token_type: "Bearer".into(), scope: Some(scope.into()), ..Default::default() };

	let session = if scope.split_whitespace().any(|s| s == "offline_access") {
		Some(app.session_store.create_session(user_id, &client.id, scope).await?)
	} else {
		None
	};

	if scope.split_whitespace().any(|s| s == "openid") {
		let auth_time = app.credential_store.get_auth_time(user_id, &client.id).await?;
		response.id_token = Some(idp_token::mint_id_token(
			&key,
			issuer,
			user_id,
			&client.id,
			start,
			app.config.token_ttl_secs,
			auth_time,
			user_verified,
			true,
			session.as_ref().map(|s| s.id.as_ref()),
			nonce,
		)?);
	}

	response.access_token = Some(idp_token::mint_access_token(
		&key,
		issuer,
		user_id,
		&client.id,
		start,
		app.config.token_ttl_secs,
		session.as_ref().map(|s| s.id.as_ref()),
		Some(scope),
	)?);

	if let Some(session) = &session {
		response.refresh_token = Some(idp_session::build_refresh_token(session, issuer, &key)?.into());
	}

	Ok(response)
}

// vim: ts=4
