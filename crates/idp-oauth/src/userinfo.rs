//! `GET /oidc/userinfo` — resolves the bearer access token back to its
//! subject. No profile claims exist in this data model beyond `sub`: nothing
//! in the system stores a human-readable username or email.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use idp_types::store::KeyStore;
use idp_token::AccessTokenClaims;

use crate::prelude::*;

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
	pub sub: Box<str>,
}

fn bearer_token(headers: &HeaderMap) -> ClResult<&str> {
	headers
		.get(axum::http::header::AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.strip_prefix("Bearer "))
		.ok_or(Error::Unauthorized)
}

pub async fn userinfo(State(app): State<App>, headers: HeaderMap) -> ClResult<Json<UserInfoResponse>> {
	let token = bearer_token(&headers)?;
	let header = jsonwebtoken::decode_header(token).map_err(|_| Error::InvalidToken)?;
	if header.typ.as_deref() != Some("at+jwt") {
		return Err(Error::InvalidToken);
	}
	let kid = header.kid.ok_or(Error::InvalidToken)?;
	let key = app.key_store.get_server_key(&kid).await.map_err(|err| {
		if matches!(err, Error::NotFound) {
			Error::InvalidToken
		} else {
			err
		}
	})?;

	let decoding_key = idp_token::decoding_key(&key)?;
	let mut validation = jsonwebtoken::Validation::new(idp_token::jsonwebtoken_alg(key.alg)?);
	validation.validate_aud = false;
	let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &decoding_key, &validation)
		.map_err(|_| Error::InvalidToken)?;

	Ok(Json(UserInfoResponse { sub: data.claims.sub }))
}

// vim: ts=4
