//! CIBA backchannel-authentication init (`POST /sign`, urlencoded), part of C9.

use axum::extract::State;
use axum::Form;
use axum::Json;

use idp_types::store::CredentialStore;
use idp_types::types::{Application, CibaMode, ChallengeType, NewChallenge, Timestamp};
use idp_types::utils::random_id;
use serde::Deserialize;

use crate::acr::acr_values_to_uv_policy;
use crate::auth::AuthenticatedClient;
use crate::credential::restrict_to_user_keys;
use crate::prelude::*;
use crate::session_state::SessionState;
use crate::types::{CibaForm, CibaInitResponse};

/// Minimal peek at a `sub` claim, used to resolve `id_token_hint`/`login_hint_token`.
#[derive(Debug, Deserialize)]
struct SubjectHint {
	sub: Box<str>,
}

fn resolve_user_hint(form: &CibaForm) -> ClResult<Box<str>> {
	if let Some(hint) = &form.login_hint {
		return Ok(hint.clone());
	}
	if let Some(jwt) = &form.id_token_hint {
		let claims: SubjectHint = idp_types::utils::decode_jwt_no_verify(jwt)?;
		return Ok(claims.sub);
	}
	if let Some(jwt) = &form.login_hint_token {
		let claims: SubjectHint = idp_types::utils::decode_jwt_no_verify(jwt)?;
		return Ok(claims.sub);
	}
	Err(Error::InvalidRequest("one of login_hint, id_token_hint, login_hint_token is required".into()))
}

fn poll_interval(mode: CibaMode) -> Option<i64> {
	match mode {
		CibaMode::Poll | CibaMode::Ping => Some(1),
		CibaMode::Push => None,
	}
}

pub async fn ciba_init(
	State(app): State<App>,
	AuthenticatedClient(client): AuthenticatedClient,
	Form(form): Form<CibaForm>,
) -> ClResult<Json<CibaInitResponse>> {
	ciba_init_impl(&app, client, form).await.map(Json)
}

/// `POST /sign`'s urlencoded branch, shared with the combined content-type
/// dispatcher `router::sign` which authenticates and parses the body itself.
pub(crate) async fn ciba_init_impl(
	app: &App,
	client: Application,
	form: CibaForm,
) -> ClResult<CibaInitResponse> {
	if !form.scope.split_whitespace().any(|s| s == "openid") {
		return Err(Error::InvalidRequest("scope must include openid".into()));
	}
	if matches!(client.ciba_mode, CibaMode::Ping | CibaMode::Push) && form.client_notification_token.is_none() {
		return Err(Error::InvalidRequest(
			"client_notification_token is required for ping/push delivery".into(),
		));
	}

	let user_id = resolve_user_hint(&form)?;
	let uv_policy = acr_values_to_uv_policy(form.acr_values.as_deref());
	debug!(?uv_policy, "resolved acr_values to a user-verification policy");

	let signature_text = match &form.binding_message {
		Some(msg) => {
			std::str::from_utf8(msg.as_bytes())
				.map_err(|_| Error::InvalidRequest("binding_message is not valid UTF-8".into()))?;
			Some(msg.clone())
		}
		None => None,
	};

	let (_, keys) = app.credential_store.get_user_with_keys(&user_id).await?;
	let passkeys = restrict_to_user_keys(&keys)?;
	let engine = idp_webauthn::Engine::new(&app.config)?;
	let (rcr, auth_state) = engine.begin_login(&passkeys)?;
	let state = SessionState::Login { user_id: user_id.clone(), state: auth_state, uv_policy };

	let expire_secs = form.requested_expiry.unwrap_or(app.config.challenge_ttl_secs);
	let expire = Timestamp::from_now(expire_secs);
	let nonce: Box<str> = random_id(16).into();

	let (challenge_id, secret) = app
		.challenge_store
		.create_challenge(NewChallenge {
			typ: ChallengeType::WebauthnGet,
			app_id: client.id.clone(),
			expire,
			public_data: serde_json::to_vec(&rcr)?.into(),
			private_data: state.encode()?,
			signature_text: signature_text.clone(),
			signature_data: None,
			redirect_url: None,
			nonce,
			explicit_id: None,
		})
		.await?;

	let oauth2_context = serde_urlencoded::to_string(&form)
		.map_err(|err| Error::Internal(format!("failed to re-encode CIBA context: {err}")))?;
	app.challenge_store.set_oauth2_context(&challenge_id, &oauth2_context).await?;

	let auth_req_id = app.challenge_store.create_ciba_request_id(&challenge_id).await?;

	if matches!(client.ciba_mode, CibaMode::Push) {
		// `client_notification_token` is required for push mode, checked above.
		let token = form.client_notification_token.as_deref().unwrap_or_default();
		let endpoint = client.notification_endpoint.as_deref().unwrap_or_default();
		match &app.notifier {
			Some(notifier) => notifier.notify(endpoint, token, &auth_req_id).await?,
			None => info!(
				app_id = %client.id,
				auth_req_id = %auth_req_id,
				"CIBA push delivery requested but no notifier is configured in this build"
			),
		}
	}

	Ok(CibaInitResponse {
		qr_data: format!("openid://connect?auth_req_id={auth_req_id}").into(),
		qr_secret: secret,
		interval: poll_interval(client.ciba_mode),
		expires_in: expire_secs,
		auth_req_id,
	})
}

// vim: ts=4
