//! `/user/*` — self-service key management, gated by a bearer JWT from a
//! trusted external issuer rather than by [`crate::auth::AuthenticatedClient`].
//! The token's `sub` is taken as the local user id: these routes let a user
//! who has already authenticated with a trusted issuer elsewhere manage
//! their own WebAuthn credentials without going through an admin.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::Json;
use serde::Deserialize;

use idp_types::store::CredentialStore;
use idp_types::types::{ChallengeType, NewChallenge};
use idp_types::utils::random_id;

use crate::credential::load_webauthn_user;
use crate::prelude::*;
use crate::session_state::SessionState;
use crate::types::{ServiceCreateKeyResponse, ServiceUserKeyResponse};

#[derive(Debug, Deserialize)]
struct UnverifiedHeader {
	iss: Box<str>,
}

#[derive(Debug, Deserialize)]
struct TrustedClaims {
	sub: Box<str>,
}

fn jsonwebtoken_alg_from_jwk(alg: &str) -> ClResult<jsonwebtoken::Algorithm> {
	match alg {
		"RS256" => Ok(jsonwebtoken::Algorithm::RS256),
		"RS384" => Ok(jsonwebtoken::Algorithm::RS384),
		"RS512" => Ok(jsonwebtoken::Algorithm::RS512),
		"ES256" => Ok(jsonwebtoken::Algorithm::ES256),
		"ES384" => Ok(jsonwebtoken::Algorithm::ES384),
		"EdDSA" => Ok(jsonwebtoken::Algorithm::EdDSA),
		_ => Err(Error::UnsupportedAlg),
	}
}

/// The verified subject of a trusted-issuer bearer token.
#[derive(Debug, Clone)]
pub struct TrustedSubject(pub Box<str>);

#[async_trait]
impl FromRequestParts<App> for TrustedSubject {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
		let token = parts
			.headers
			.get(axum::http::header::AUTHORIZATION)
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.strip_prefix("Bearer "))
			.ok_or(Error::Unauthorized)?;

		let header = jsonwebtoken::decode_header(token).map_err(|_| Error::InvalidToken)?;
		let kid = header.kid.as_deref().ok_or(Error::InvalidToken)?;
		let unverified: UnverifiedHeader = idp_types::utils::decode_jwt_no_verify(token)?;

		let jwks = state.trusted_issuers.jwks_for(&unverified.iss).ok_or(Error::Unauthorized)?;
		let jwk = jwks.keys.iter().find(|k| k.kid.as_ref() == kid).ok_or(Error::Unauthorized)?;

		let decoding_key = idp_token::decoding_key_from_jwk(jwk)?;
		let mut validation = jsonwebtoken::Validation::new(jsonwebtoken_alg_from_jwk(&jwk.alg)?);
		validation.set_issuer(&[unverified.iss.as_ref()]);
		validation.validate_aud = false;
		let data = jsonwebtoken::decode::<TrustedClaims>(token, &decoding_key, &validation)
			.map_err(|_| Error::InvalidToken)?;

		Ok(TrustedSubject(data.claims.sub))
	}
}

pub async fn list_keys(
	State(app): State<App>,
	TrustedSubject(user_id): TrustedSubject,
) -> ClResult<Json<Vec<ServiceUserKeyResponse>>> {
	let keys = app.credential_store.get_user_keys(&user_id).await?;
	Ok(Json(
		keys.into_iter()
			.map(|key| ServiceUserKeyResponse {
				hash: key.hash,
				aaguid: key.aaguid,
				created: key.created.0,
				last_used: key.last_used.map(|t| t.0),
			})
			.collect(),
	))
}

pub async fn add_key(
	State(app): State<App>,
	TrustedSubject(user_id): TrustedSubject,
) -> ClResult<Json<ServiceCreateKeyResponse>> {
	app.credential_store.get_user(&user_id).await?;
	let (_user, webauthn_user) = load_webauthn_user(&app.credential_store, &user_id).await?;
	let engine = idp_webauthn::Engine::new(&app.config)?;
	let (ccr, reg_state) = engine.begin_registration(&webauthn_user)?;

	let state = SessionState::Registration { user_id: user_id.clone(), state: reg_state };
	let expire = idp_types::types::Timestamp::from_now(app.config.challenge_ttl_secs);
	// No OAuth2 client owns a self-service ceremony; `app_id` stores the
	// subject's own id since nothing downstream validates it against the
	// application store for this route.
	let (challenge_id, secret) = app
		.challenge_store
		.create_challenge(NewChallenge {
			typ: ChallengeType::WebauthnCreate,
			app_id: user_id.clone(),
			expire,
			public_data: serde_json::to_vec(&ccr)?.into(),
			private_data: state.encode()?,
			signature_text: None,
			signature_data: None,
			redirect_url: None,
			nonce: random_id(16).into(),
			explicit_id: None,
		})
		.await?;

	Ok(Json(ServiceCreateKeyResponse { user_id, challenge_id, secret }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteKeyRequest {
	pub hash: Box<str>,
}

pub async fn delete_key(
	State(app): State<App>,
	TrustedSubject(user_id): TrustedSubject,
	Json(req): Json<DeleteKeyRequest>,
) -> ClResult<Json<()>> {
	app.credential_store.delete_user_key(&user_id, &req.hash).await?;
	Ok(Json(()))
}

// vim: ts=4
