//! Authorization-code init (`POST /oauth2`), part of C9.

use axum::extract::State;
use axum::Form;
use axum::Json;
use url::Url;

use idp_types::store::CredentialStore;
use idp_types::types::{ChallengeType, NewChallenge, Timestamp};
use idp_types::utils::random_id;

use crate::acr::acr_values_to_uv_policy;
use crate::credential::{load_webauthn_user, restrict_to_user_keys};
use crate::prelude::*;
use crate::redirect::is_allowed_redirect;
use crate::session_state::SessionState;
use crate::types::{AuthorizeForm, AuthorizeInitResponse};

fn check_pkce(form: &AuthorizeForm) -> ClResult<()> {
	match (&form.code_challenge, &form.code_challenge_method) {
		(None, None) => Ok(()),
		(Some(_), Some(method)) if method.as_ref() == "S256" || method.as_ref() == "plain" => Ok(()),
		_ => Err(Error::InvalidChallenge("incoherent PKCE parameters".into())),
	}
}

pub async fn authorize(
	State(app): State<App>,
	Form(form): Form<AuthorizeForm>,
) -> ClResult<Json<AuthorizeInitResponse>> {
	if !form.response_type.split_whitespace().any(|t| t == "code") {
		return Err(Error::BadResponseType);
	}
	if form.state.is_empty() {
		return Err(Error::InvalidRequest("missing state".into()));
	}
	check_pkce(&form)?;

	let client = app.application_store.get_application(&form.client_id).await.map_err(|err| {
		if matches!(err, Error::NotFound) {
			Error::InvalidClient
		} else {
			err
		}
	})?;

	let redirect_uri = Url::parse(&form.redirect_uri)
		.map_err(|_| Error::InvalidChallenge("unparseable redirect_uri".into()))?;
	if !is_allowed_redirect(&client, &redirect_uri) {
		return Err(Error::InvalidChallenge("redirect_uri not in the app's allowed set".into()));
	}

	let uv_policy = acr_values_to_uv_policy(form.acr_values.as_deref());
	debug!(?uv_policy, "resolved acr_values to a user-verification policy");
	let engine = idp_webauthn::Engine::new(&app.config)?;

	let (public_key, state) = if let Some(user_id) = &form.login_hint {
		let (_, keys) = app.credential_store.get_user_with_keys(user_id).await?;
		let passkeys = restrict_to_user_keys(&keys)?;
		let (rcr, auth_state) = engine.begin_login(&passkeys)?;
		(
			serde_json::to_value(&rcr)?,
			SessionState::Login { user_id: user_id.clone(), state: auth_state, uv_policy },
		)
	} else {
		let (rcr, auth_state) = engine.begin_discoverable_login()?;
		(serde_json::to_value(&rcr)?, SessionState::DiscoverableLogin { state: auth_state, uv_policy })
	};

	let oauth2_context = serde_urlencoded::to_string(&form)
		.map_err(|err| Error::Internal(format!("failed to re-encode authorize context: {err}")))?;

	let expire = Timestamp::from_now(app.config.challenge_ttl_secs);
	let (challenge_id, secret) = app
		.challenge_store
		.create_challenge(NewChallenge {
			typ: ChallengeType::WebauthnGet,
			app_id: client.id.clone(),
			expire,
			public_data: serde_json::to_vec(&public_key)?.into(),
			private_data: state.encode()?,
			signature_text: None,
			signature_data: None,
			redirect_url: Some(form.redirect_uri.clone()),
			nonce: random_id(16).into(),
			explicit_id: None,
		})
		.await?;
	app.challenge_store.set_oauth2_context(&challenge_id, &oauth2_context).await?;

	Ok(Json(AuthorizeInitResponse { challenge_id, secret }))
}

// vim: ts=4
