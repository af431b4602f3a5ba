//! Maps a stored [`KeyAlg`]/PEM private key pair to a `jsonwebtoken` signing key,
//! and the reverse direction: a stored JWK back to a verification key.

use idp_types::prelude::*;
use idp_types::types::{Jwk, KeyAlg, ServerKey};

pub fn jsonwebtoken_alg(alg: KeyAlg) -> ClResult<jsonwebtoken::Algorithm> {
	Ok(match alg {
		KeyAlg::RS256 => jsonwebtoken::Algorithm::RS256,
		KeyAlg::RS384 => jsonwebtoken::Algorithm::RS384,
		KeyAlg::RS512 => jsonwebtoken::Algorithm::RS512,
		KeyAlg::ES256 => jsonwebtoken::Algorithm::ES256,
		KeyAlg::ES384 => jsonwebtoken::Algorithm::ES384,
		KeyAlg::EdDSA => jsonwebtoken::Algorithm::EdDSA,
		KeyAlg::ES512 => return Err(Error::UnsupportedAlg),
	})
}

pub fn encoding_key(alg: KeyAlg, private_pem: &str) -> ClResult<jsonwebtoken::EncodingKey> {
	let pem = private_pem.as_bytes();
	match alg {
		KeyAlg::RS256 | KeyAlg::RS384 | KeyAlg::RS512 => {
			jsonwebtoken::EncodingKey::from_rsa_pem(pem)
		}
		KeyAlg::ES256 | KeyAlg::ES384 => jsonwebtoken::EncodingKey::from_ec_pem(pem),
		KeyAlg::EdDSA => jsonwebtoken::EncodingKey::from_ed_pem(pem),
		KeyAlg::ES512 => return Err(Error::UnsupportedAlg),
	}
	.map_err(|err| Error::KeyError(format!("invalid signing key: {err}")))
}

/// Builds a verification key from `key.public_jwk` — a single serialized JWK
/// JSON object with no `kid`/`alg`/`use` overlay (those are publication-time
/// concerns; see `idp-oauth`'s `keyset` module).
pub fn decoding_key(key: &ServerKey) -> ClResult<jsonwebtoken::DecodingKey> {
	let raw: serde_json::Value = serde_json::from_str(&key.public_jwk)
		.map_err(|_| Error::KeyError("stored public_jwk is not valid JSON".into()))?;
	let field = |name: &str| raw.get(name).and_then(|v| v.as_str());

	match key.alg {
		KeyAlg::RS256 | KeyAlg::RS384 | KeyAlg::RS512 => {
			let n = field("n").ok_or_else(|| Error::KeyError("public_jwk missing n".into()))?;
			let e = field("e").ok_or_else(|| Error::KeyError("public_jwk missing e".into()))?;
			Ok(jsonwebtoken::DecodingKey::from_rsa_components(n, e))
		}
		KeyAlg::ES256 | KeyAlg::ES384 => {
			let x = field("x").ok_or_else(|| Error::KeyError("public_jwk missing x".into()))?;
			let y = field("y").ok_or_else(|| Error::KeyError("public_jwk missing y".into()))?;
			jsonwebtoken::DecodingKey::from_ec_components(x, y)
				.map_err(|err| Error::KeyError(format!("invalid public key: {err}")))
		}
		KeyAlg::EdDSA => {
			let x = field("x").ok_or_else(|| Error::KeyError("public_jwk missing x".into()))?;
			jsonwebtoken::DecodingKey::from_ed_components(x)
				.map_err(|err| Error::KeyError(format!("invalid public key: {err}")))
		}
		KeyAlg::ES512 => Err(Error::UnsupportedAlg),
	}
}

/// Same as [`decoding_key`] for a JWK already parsed into fields — used to
/// verify tokens from a trusted external issuer (§4.8's `id_token_hint`,
/// and the `/user/*` bearer surface), where the key never passes through a
/// local [`ServerKey`].
pub fn decoding_key_from_jwk(jwk: &Jwk) -> ClResult<jsonwebtoken::DecodingKey> {
	if let (Some(n), Some(e)) = (&jwk.n, &jwk.e) {
		return Ok(jsonwebtoken::DecodingKey::from_rsa_components(n, e));
	}
	if let (Some(x), Some(y)) = (&jwk.x, &jwk.y) {
		return jsonwebtoken::DecodingKey::from_ec_components(x, y)
			.map_err(|err| Error::KeyError(format!("invalid public key: {err}")));
	}
	if let Some(x) = &jwk.x {
		return jsonwebtoken::DecodingKey::from_ed_components(x)
			.map_err(|err| Error::KeyError(format!("invalid public key: {err}")));
	}
	Err(Error::KeyError("JWK carries no recognized key material".into()))
}

// vim: ts=4
