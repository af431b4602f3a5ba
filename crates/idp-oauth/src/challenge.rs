//! Public (unauthenticated) challenge retrieval, signing, and rejection:
//! `POST`/`PUT`/`DELETE /challenge`, part of C5/C9.

use axum::extract::State;
use axum::Form;
use axum::Json;
use webauthn_rs::prelude::{
	DiscoverableKey, PublicKeyCredential, RegisterPublicKeyCredential,
};

use idp_types::store::{ChallengeStore, CredentialStore};
use idp_types::types::{ChallengeStatus, ChallengeType, UserKey};

use crate::credential::{decode_passkey, encode_passkey, refreshed_passkey};
use crate::prelude::*;
use crate::session_state::SessionState;
use crate::types::{ChallengeOptionsResponse, ChallengeSignForm, ChallengeTokenForm, RedirectResponse};

/// `POST /challenge` — advances `pending -> viewed` and hands the browser
/// the ceremony options it needs to call the WebAuthn API.
pub async fn get_challenge(
	State(app): State<App>,
	Form(form): Form<ChallengeTokenForm>,
) -> ClResult<Json<ChallengeOptionsResponse>> {
	let challenge =
		idp_challenge::resolve_bearer_token(&app.challenge_store, &form.token, app.config.challenge_max_time_diff_secs)
			.await?;
	idp_challenge::validate(&challenge)?;

	if matches!(challenge.status, ChallengeStatus::Pending) {
		app.challenge_store.set_challenge_status(&challenge.id, ChallengeStatus::Viewed).await?;
	}

	let public_key: serde_json::Value = serde_json::from_slice(&challenge.public_data)?;
	Ok(Json(ChallengeOptionsResponse {
		typ: match challenge.typ {
			ChallengeType::WebauthnCreate => "webauthn.create",
			ChallengeType::WebauthnGet => "webauthn.get",
		},
		public_key,
		expire: challenge.expire.0,
		app: Some(challenge.app_id),
		sign_data: challenge.signature_text,
	}))
}

fn redirect_target(app_redirect: Option<&str>, challenge_id: &str, extra: &str) -> ClResult<Box<str>> {
	let base =
		app_redirect.ok_or_else(|| Error::InvalidRequest("challenge carries no redirect".into()))?;
	let sep = if base.contains('?') { '&' } else { '?' };
	Ok(format!("{base}{sep}{extra}").into())
}

async fn build_success_redirect(
	app: &App,
	challenge_id: &str,
	redirect_url: Option<&str>,
	oauth2_context: Option<&str>,
) -> ClResult<Box<str>> {
	match oauth2_context {
		Some(context) if !context.is_empty() => {
			let code = app.challenge_store.create_code(challenge_id).await?;
			let state = serde_urlencoded::from_str::<Vec<(String, String)>>(context)
				.ok()
				.and_then(|pairs| pairs.into_iter().find(|(k, _)| k == "state").map(|(_, v)| v))
				.unwrap_or_default();
			redirect_target(redirect_url, challenge_id, &format!("code={code}&state={state}"))
		}
		_ => redirect_target(redirect_url, challenge_id, &format!("challengeId={challenge_id}")),
	}
}

/// `PUT /challenge` — the end-user's device posts the signed/created
/// authenticator response.
pub async fn sign_challenge(
	State(app): State<App>,
	Form(form): Form<ChallengeSignForm>,
) -> ClResult<Json<RedirectResponse>> {
	let challenge = idp_challenge::resolve_bearer_token_time_insensitive(&app.challenge_store, &form.token).await?;
	idp_challenge::validate(&challenge)?;
	let state = SessionState::decode(&challenge.private_data)?;
	let engine = idp_webauthn::Engine::new(&app.config)?;

	match (challenge.typ, state) {
		(ChallengeType::WebauthnCreate, SessionState::Registration { user_id, state }) => {
			let response: RegisterPublicKeyCredential = serde_json::from_str(&form.response)
				.map_err(|_| Error::InvalidChallenge("malformed registration response".into()))?;
			let passkey = engine.finish_registration(&state, &response)?;
			let credential_id: Box<[u8]> = passkey.cred_id().as_slice().to_vec().into();
			let hash = idp_types::utils::sha256_hex(&credential_id);
			app.credential_store
				.add_user_key(
					&user_id,
					&UserKey {
						hash: hash.into(),
						credential_id,
						aaguid: uuid::Uuid::nil(),
						user_id: user_id.clone(),
						credential: encode_passkey(&passkey)?,
						created: Timestamp::now(),
						last_used: None,
					},
				)
				.await?;
			app.challenge_store
				.sign_challenge(&challenge.id, form.response.as_bytes(), &encode_passkey(&passkey)?, true)
				.await?;
			let redirect = redirect_target(
				challenge.redirect_url.as_deref(),
				&challenge.id,
				&format!("challengeId={}&userId={}&action=created", challenge.id, user_id),
			)?;
			Ok(Json(RedirectResponse { redirect }))
		}
		(ChallengeType::WebauthnGet, SessionState::Login { user_id, state, uv_policy }) => {
			let response: PublicKeyCredential = serde_json::from_str(&form.response)
				.map_err(|_| Error::InvalidChallenge("malformed assertion response".into()))?;
			let (result, uv) = engine.finish_login(&state, &response)?;
			if !uv_policy.is_satisfied_by(uv) {
				return Err(Error::InvalidChallenge("user verification required but not performed".into()));
			}
			if uv {
				app.credential_store.update_auth_time(&user_id, &challenge.app_id).await?;
			}
			let owner = app.credential_store.get_key(response.raw_id.as_slice()).await?;
			let updated_credential = refreshed_passkey(&owner.credential, &result)?;
			app.credential_store
				.ping_user_key(response.raw_id.as_slice(), result_counter(&result), &updated_credential)
				.await?;
			app.challenge_store
				.sign_challenge(&challenge.id, form.response.as_bytes(), response.raw_id.as_slice(), uv)
				.await?;
			let redirect = build_success_redirect(
				&app,
				&challenge.id,
				challenge.redirect_url.as_deref(),
				challenge.oauth2_context.as_deref(),
			)
			.await?;
			Ok(Json(RedirectResponse { redirect }))
		}
		(ChallengeType::WebauthnGet, SessionState::DiscoverableLogin { state, uv_policy }) => {
			let response: PublicKeyCredential = serde_json::from_str(&form.response)
				.map_err(|_| Error::InvalidChallenge("malformed assertion response".into()))?;
			let (cred_id, _user_handle) = engine.identify_discoverable_login(&response)?;
			let owner = app.credential_store.get_key(cred_id.as_slice()).await?;
			let keys = vec![DiscoverableKey::from(&decode_passkey(&owner.credential)?)];
			let (result, uv) = engine.finish_discoverable_login(&state, &response, &keys)?;
			if !uv_policy.is_satisfied_by(uv) {
				return Err(Error::InvalidChallenge("user verification required but not performed".into()));
			}
			let credential_id = response.raw_id.as_slice();
			if uv {
				app.credential_store.update_auth_time(&owner.user_id, &challenge.app_id).await?;
			}
			let updated_credential = refreshed_passkey(&owner.credential, &result)?;
			app.credential_store
				.ping_user_key(credential_id, result_counter(&result), &updated_credential)
				.await?;
			app.challenge_store
				.sign_challenge(&challenge.id, form.response.as_bytes(), credential_id, uv)
				.await?;
			let redirect = build_success_redirect(
				&app,
				&challenge.id,
				challenge.redirect_url.as_deref(),
				challenge.oauth2_context.as_deref(),
			)
			.await?;
			Ok(Json(RedirectResponse { redirect }))
		}
		_ => Err(Error::Internal("challenge type and RP session state disagree".into())),
	}
}

fn result_counter(result: &webauthn_rs::prelude::AuthenticationResult) -> u32 {
	result.counter()
}

/// `DELETE /challenge` — the end-user declines the ceremony.
pub async fn reject_challenge(
	State(app): State<App>,
	Form(form): Form<ChallengeTokenForm>,
) -> ClResult<Json<RedirectResponse>> {
	let challenge = idp_challenge::resolve_bearer_token_time_insensitive(&app.challenge_store, &form.token).await?;
	idp_challenge::validate(&challenge)?;
	app.challenge_store.set_challenge_status(&challenge.id, ChallengeStatus::Rejected).await?;

	let extra = match &challenge.oauth2_context {
		Some(context) if !context.is_empty() => {
			let state = serde_urlencoded::from_str::<Vec<(String, String)>>(context)
				.ok()
				.and_then(|pairs| pairs.into_iter().find(|(k, _)| k == "state").map(|(_, v)| v))
				.unwrap_or_default();
			format!("error=access_denied&error_description=user+declined&state={state}")
		}
		_ => "error=access_denied&error_description=user+declined".to_string(),
	};
	let redirect = redirect_target(challenge.redirect_url.as_deref(), &challenge.id, &extra)?;
	Ok(Json(RedirectResponse { redirect }))
}

// vim: ts=4
