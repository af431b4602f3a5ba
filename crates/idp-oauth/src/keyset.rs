//! Assembles the published JWKS (C1's `publicSet()`) from stored server keys.
//!
//! `ServerKey::public_jwk` already holds a single serialized JWK JSON object
//! (`kty`/`crv`/`x`/`y` or `kty`/`n`/`e`, produced once at key-generation
//! time by whichever adapter generates the key); this only overlays the
//! publication-time fields (`kid`, `alg`, `use`) the generator doesn't own.

use idp_types::prelude::*;
use idp_types::types::{Jwk, ServerKey};

pub fn to_jwk(key: &ServerKey) -> ClResult<Jwk> {
	let raw: serde_json::Value = serde_json::from_str(&key.public_jwk)
		.map_err(|_| Error::KeyError("stored public_jwk is not valid JSON".into()))?;
	let field = |name: &str| -> Option<Box<str>> {
		raw.get(name).and_then(|v| v.as_str()).map(Into::into)
	};
	let kty = field("kty").ok_or_else(|| Error::KeyError("public_jwk missing kty".into()))?;
	Ok(Jwk {
		kid: key.kid.clone(),
		alg: key.alg.as_str().into(),
		usage: "sig",
		kty,
		crv: field("crv"),
		x: field("x"),
		y: field("y"),
		n: field("n"),
		e: field("e"),
	})
}

// vim: ts=4
