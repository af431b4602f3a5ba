//! OIDC discovery document and JWKS publication.

use axum::extract::State;
use axum::Json;

use crate::prelude::*;
use crate::types::DiscoveryDocument;
use idp_types::types::Jwks;

pub(crate) fn issuer(app: &App) -> Box<str> {
	app.config.issuer.clone().unwrap_or_else(|| format!("https://{}", app.config.rp_id).into())
}

pub async fn discovery(State(app): State<App>) -> ClResult<Json<DiscoveryDocument>> {
	let issuer = issuer(&app);
	let algs = app.key_store.get_available_algorithms().await?;
	Ok(Json(DiscoveryDocument {
		authorization_endpoint: format!("{issuer}/authorize").into(),
		token_endpoint: format!("{issuer}/api/v1/collect").into(),
		jwks_uri: format!("{issuer}/api/v1/oidc/jwkset.json").into(),
		backchannel_authentication_endpoint: format!("{issuer}/api/v1/sign").into(),
		backchannel_token_delivery_modes_supported: &["poll", "ping", "push"],
		userinfo_endpoint: format!("{issuer}/api/v1/oidc/userinfo").into(),
		acr_values_supported: &[
			"urn:webauthn:verify",
			"urn:webauthn:presence",
			"urn:webauthn:prefer-verify",
		],
		grant_types_supported: &["authorization_code", "urn:openid:params:grant-type:ciba"],
		token_endpoint_auth_methods_supported: &["client_secret_post", "client_secret_basic"],
		code_challenge_methods_supported: &["plain", "S256"],
		response_modes_supported: &["query"],
		response_types_supported: &["code"],
		subject_types_supported: &["public"],
		id_token_signing_alg_values_supported: algs.iter().map(|a| a.as_str()).collect(),
		issuer,
	}))
}

/// `GET /oidc/jwkset.json` — the published public-key set (C1).
pub async fn jwks(State(app): State<App>) -> ClResult<Json<Jwks>> {
	let keys = app.key_store.list_server_keys().await?;
	let keys = keys.into_iter().map(|key| crate::keyset::to_jwk(&key)).collect::<ClResult<Vec<_>>>()?;
	Ok(Json(Jwks { keys }))
}

// vim: ts=4
