//! ID/access token construction and signing (C7).

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use idp_types::prelude::*;
use idp_types::types::ServerKey;

use crate::keys::{encoding_key, jsonwebtoken_alg};

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
	pub sub: Box<str>,
	pub iss: Box<str>,
	pub aud: Box<str>,
	pub exp: i64,
	pub nbf: i64,
	pub iat: i64,
	pub auth_time: Option<i64>,
	pub uv: bool,
	pub up: bool,
	pub sid: Option<Box<str>>,
	pub nonce: Option<Box<str>>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
	pub sub: Box<str>,
	pub iss: Box<str>,
	pub aud: Box<str>,
	pub exp: i64,
	pub nbf: i64,
	pub iat: i64,
	pub sid: Option<Box<str>>,
	pub scope: Option<Box<str>>,
}

const ACCESS_TOKEN_TYPE: &str = "at+jwt";

fn sign<T: Serialize>(claims: &T, key: &ServerKey, typ: Option<&str>) -> ClResult<Box<str>> {
	let alg = jsonwebtoken_alg(key.alg)?;
	let mut header = jsonwebtoken::Header::new(alg);
	header.kid = Some(key.kid.to_string());
	if let Some(typ) = typ {
		header.typ = Some(typ.into());
	}
	let encoding_key = encoding_key(key.alg, &key.private_jwk)?;
	let token = jsonwebtoken::encode(&header, claims, &encoding_key)?;
	Ok(token.into())
}

/// `start` is the signed-at time of the *original* authentication (kept
/// stable across refreshes); `now` is the current time used for `iat`.
pub fn mint_id_token(
	key: &ServerKey,
	issuer: &str,
	user_id: &str,
	app_id: &str,
	start: Timestamp,
	ttl_secs: i64,
	auth_time: Option<Timestamp>,
	user_verified: bool,
	user_present: bool,
	session_id: Option<&str>,
	nonce: Option<&str>,
) -> ClResult<Box<str>> {
	let claims = IdTokenClaims {
		sub: user_id.into(),
		iss: issuer.into(),
		aud: app_id.into(),
		exp: start.add_seconds(ttl_secs).0,
		nbf: start.0,
		iat: Timestamp::now().0,
		auth_time: auth_time.map(|t| t.0),
		uv: user_verified,
		up: user_present,
		sid: session_id.map(Into::into),
		nonce: nonce.map(Into::into),
	};
	sign(&claims, key, None)
}

pub fn mint_access_token(
	key: &ServerKey,
	issuer: &str,
	user_id: &str,
	app_id: &str,
	start: Timestamp,
	ttl_secs: i64,
	session_id: Option<&str>,
	scope: Option<&str>,
) -> ClResult<Box<str>> {
	let claims = AccessTokenClaims {
		sub: user_id.into(),
		iss: issuer.into(),
		aud: app_id.into(),
		exp: start.add_seconds(ttl_secs).0,
		nbf: start.0,
		iat: Timestamp::now().0,
		sid: session_id.map(Into::into),
		scope: scope.map(Into::into),
	};
	sign(&claims, key, Some(ACCESS_TOKEN_TYPE))
}

#[cfg(test)]
mod tests {
	use super::*;
	use idp_types::types::KeyAlg;

	fn unsupported_key() -> ServerKey {
		ServerKey {
			kid: "k1".into(),
			alg: KeyAlg::ES512,
			private_jwk: "".into(),
			public_jwk: "".into(),
			created: Timestamp::now(),
		}
	}

	#[test]
	fn minting_with_an_unsupported_alg_fails_before_touching_key_material() {
		let key = unsupported_key();
		let err = mint_id_token(&key, "iss", "user", "app", Timestamp::now(), 300, None, true, true, None, None)
			.unwrap_err();
		assert!(matches!(err, Error::UnsupportedAlg));
	}
}

// vim: ts=4
