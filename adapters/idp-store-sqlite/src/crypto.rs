//! Server signing key generation (C1). Only the EC algorithms this crate
//! actually carries key material support for are implemented; everything
//! else is rejected with [`Error::UnsupportedAlg`] rather than faked.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{EncodePrivateKey, LineEnding};
use rand::rngs::OsRng;
use serde_json::json;

use idp_types::prelude::*;
use idp_types::types::KeyAlg;
use idp_types::worker::WorkerPool;

/// PEM-encoded private key and a single serialized public JWK JSON object
/// (`kty`/`crv`/`x`/`y`, no `kid`/`alg`/`use` overlay — that's publication-time).
pub(crate) struct GeneratedKey {
	pub private_pem: Box<str>,
	pub public_jwk: Box<str>,
}

fn generate_es256_sync() -> ClResult<GeneratedKey> {
	let private = p256::SecretKey::random(&mut OsRng);
	let public = private.public_key();

	let private_pem: Box<str> = private
		.to_pkcs8_pem(LineEnding::LF)
		.map_err(|err| Error::KeyError(format!("failed to encode ES256 private key: {err}")))?
		.to_string()
		.into();

	let point = public.to_encoded_point(false);
	let x = point.x().ok_or_else(|| Error::KeyError("EC point missing x".into()))?;
	let y = point.y().ok_or_else(|| Error::KeyError("EC point missing y".into()))?;
	let public_jwk = json!({
		"kty": "EC",
		"crv": "P-256",
		"x": URL_SAFE_NO_PAD.encode(x),
		"y": URL_SAFE_NO_PAD.encode(y),
	})
	.to_string()
	.into();

	Ok(GeneratedKey { private_pem, public_jwk })
}

fn generate_es384_sync() -> ClResult<GeneratedKey> {
	let private = p384::SecretKey::random(&mut OsRng);
	let public = private.public_key();

	let private_pem: Box<str> = private
		.to_pkcs8_pem(p384::pkcs8::LineEnding::LF)
		.map_err(|err| Error::KeyError(format!("failed to encode ES384 private key: {err}")))?
		.to_string()
		.into();

	let point = public.to_encoded_point(false);
	let x = point.x().ok_or_else(|| Error::KeyError("EC point missing x".into()))?;
	let y = point.y().ok_or_else(|| Error::KeyError("EC point missing y".into()))?;
	let public_jwk = json!({
		"kty": "EC",
		"crv": "P-384",
		"x": URL_SAFE_NO_PAD.encode(x),
		"y": URL_SAFE_NO_PAD.encode(y),
	})
	.to_string()
	.into();

	Ok(GeneratedKey { private_pem, public_jwk })
}

/// Generates a fresh keypair for `alg` off the async runtime: EC point
/// arithmetic is cheap but keeping the worker-pool boundary consistent with
/// every other CPU-bound operation in this adapter costs nothing.
pub(crate) async fn generate_key(worker: &WorkerPool, alg: KeyAlg) -> ClResult<GeneratedKey> {
	match alg {
		KeyAlg::ES256 => worker.try_run_immed(generate_es256_sync).await,
		KeyAlg::ES384 => worker.try_run_immed(generate_es384_sync).await,
		_ => Err(Error::UnsupportedAlg),
	}
}

// vim: ts=4
