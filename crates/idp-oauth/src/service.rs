//! Admin `/service/*` routes (C9), gated by [`AuthenticatedAdmin`]. Covers
//! user and credential administration only: provisioning applications
//! themselves is out of scope here, so there is no `/service/create/app`.

use axum::extract::State;
use axum::Json;

use idp_types::store::CredentialStore;
use idp_types::types::{ChallengeType, NewChallenge};
use idp_types::utils::random_id;

use crate::auth::AuthenticatedAdmin;
use crate::credential::load_webauthn_user;
use crate::prelude::*;
use crate::redirect::is_allowed_redirect;
use crate::session_state::SessionState;
use crate::types::{
	ServiceCreateKeyRequest, ServiceCreateKeyResponse, ServiceDeleteKeyRequest, ServiceDeleteUserRequest,
	ServiceUserKeyResponse, ServiceUserResponse,
};

pub async fn list_users(
	State(app): State<App>,
	AuthenticatedAdmin(_admin): AuthenticatedAdmin,
) -> ClResult<Json<Vec<ServiceUserResponse>>> {
	let users = app.credential_store.list_users_with_keys().await?;
	Ok(Json(
		users
			.into_iter()
			.map(|(user, keys)| ServiceUserResponse {
				id: user.id,
				created: user.created.0,
				keys: keys
					.into_iter()
					.map(|key| ServiceUserKeyResponse {
						hash: key.hash,
						aaguid: key.aaguid,
						created: key.created.0,
						last_used: key.last_used.map(|t| t.0),
					})
					.collect(),
			})
			.collect(),
	))
}

/// `POST /service/create/key` — creates a new user if `user_id` is absent,
/// then starts a WebAuthn registration ceremony for it. The ceremony itself
/// completes through the usual public `/challenge` surface.
pub async fn create_key(
	State(app): State<App>,
	AuthenticatedAdmin(admin): AuthenticatedAdmin,
	Json(req): Json<ServiceCreateKeyRequest>,
) -> ClResult<Json<ServiceCreateKeyResponse>> {
	let user_id = match &req.user_id {
		Some(user_id) => {
			app.credential_store.get_user(user_id).await?;
			user_id.clone()
		}
		None => app.credential_store.create_user().await?.id,
	};

	let redirect_url = match &req.redirect {
		Some(redirect) => {
			let url = url::Url::parse(redirect)
				.map_err(|_| Error::InvalidChallenge("unparseable redirect".into()))?;
			if !is_allowed_redirect(&admin, &url) {
				return Err(Error::InvalidChallenge("redirect not in the app's allowed set".into()));
			}
			Some(redirect.clone())
		}
		None => None,
	};

	let (_user, webauthn_user) = load_webauthn_user(&app.credential_store, &user_id).await?;
	let engine = idp_webauthn::Engine::new(&app.config)?;
	let (ccr, reg_state) = engine.begin_registration(&webauthn_user)?;

	let state = SessionState::Registration { user_id: user_id.clone(), state: reg_state };
	let expire = idp_types::types::Timestamp::from_now(app.config.challenge_ttl_secs);
	let (challenge_id, secret) = app
		.challenge_store
		.create_challenge(NewChallenge {
			typ: ChallengeType::WebauthnCreate,
			app_id: admin.id.clone(),
			expire,
			public_data: serde_json::to_vec(&ccr)?.into(),
			private_data: state.encode()?,
			signature_text: None,
			signature_data: None,
			redirect_url,
			nonce: random_id(16).into(),
			explicit_id: None,
		})
		.await?;

	Ok(Json(ServiceCreateKeyResponse { user_id, challenge_id, secret }))
}

pub async fn delete_user(
	State(app): State<App>,
	AuthenticatedAdmin(_admin): AuthenticatedAdmin,
	Json(req): Json<ServiceDeleteUserRequest>,
) -> ClResult<Json<()>> {
	app.credential_store.delete_user(&req.user_id).await?;
	Ok(Json(()))
}

pub async fn delete_key(
	State(app): State<App>,
	AuthenticatedAdmin(_admin): AuthenticatedAdmin,
	Json(req): Json<ServiceDeleteKeyRequest>,
) -> ClResult<Json<()>> {
	app.credential_store.delete_user_key(&req.user_id, &req.hash).await?;
	Ok(Json(()))
}

// vim: ts=4
