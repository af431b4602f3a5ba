//! App-local BID (browser-initiated device) challenge init (`POST /sign`,
//! JSON), part of C9.

use axum::extract::State;
use axum::Json;
use url::Url;

use idp_types::store::CredentialStore;
use idp_types::types::{Application, ChallengeType, NewChallenge, Timestamp};
use idp_types::utils::random_id;
use idp_webauthn::UserVerificationPolicy;

use crate::auth::AuthenticatedClient;
use crate::credential::restrict_to_user_keys;
use crate::prelude::*;
use crate::redirect::is_allowed_redirect;
use crate::session_state::SessionState;
use crate::types::{BidChallengeRequest, BidChallengeResponse};

fn parse_uv(raw: Option<&str>) -> UserVerificationPolicy {
	match raw {
		Some("required") => UserVerificationPolicy::Required,
		Some("discouraged") => UserVerificationPolicy::Discouraged,
		_ => UserVerificationPolicy::Preferred,
	}
}

pub async fn bid_init(
	State(app): State<App>,
	AuthenticatedClient(client): AuthenticatedClient,
	Json(req): Json<BidChallengeRequest>,
) -> ClResult<Json<BidChallengeResponse>> {
	bid_init_impl(&app, client, req).await.map(Json)
}

/// `POST /sign`'s JSON branch, shared with the combined content-type
/// dispatcher `router::sign` which authenticates and parses the body itself.
pub(crate) async fn bid_init_impl(
	app: &App,
	client: Application,
	req: BidChallengeRequest,
) -> ClResult<BidChallengeResponse> {
	if req.data.is_some() && req.text.is_none() {
		return Err(Error::InvalidRequest("text is required when data is present".into()));
	}
	let uv_policy = parse_uv(req.user_verification.as_deref());
	debug!(?uv_policy, "BID challenge user-verification policy");

	let redirect_url = match &req.redirect {
		Some(redirect) => {
			let url = Url::parse(redirect)
				.map_err(|_| Error::InvalidChallenge("unparseable redirect".into()))?;
			if !is_allowed_redirect(&client, &url) {
				return Err(Error::InvalidChallenge("redirect not in the app's allowed set".into()));
			}
			Some(redirect.clone())
		}
		None => None,
	};

	let engine = idp_webauthn::Engine::new(&app.config)?;
	let (public_key, state) = if let Some(user_id) = &req.user_id {
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

	let expire = Timestamp::from_now(req.timeout);
	let (challenge_id, secret) = app
		.challenge_store
		.create_challenge(NewChallenge {
			typ: ChallengeType::WebauthnGet,
			app_id: client.id.clone(),
			expire,
			public_data: serde_json::to_vec(&public_key)?.into(),
			private_data: state.encode()?,
			signature_text: req.text,
			signature_data: req.data.map(|d| d.as_bytes().to_vec().into_boxed_slice()),
			redirect_url,
			nonce: random_id(16).into(),
			explicit_id: None,
		})
		.await?;

	Ok(BidChallengeResponse { challenge_id, secret })
}

// vim: ts=4
