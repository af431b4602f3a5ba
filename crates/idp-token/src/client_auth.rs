//! Client authentication and PKCE verification (C8).

use std::sync::Arc;

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

use idp_types::prelude::*;
use idp_types::store::ApplicationStore;
use idp_types::types::Application;
use idp_types::utils::constant_time_eq;

/// Client credentials pulled from either the `Authorization: Basic` header
/// or (form-urlencoded requests only) the `client_id`/`client_secret` body
/// fields. Basic auth wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct ClientCredentials {
	pub client_id: Box<str>,
	pub client_secret: Box<str>,
}

/// Decodes `Authorization: Basic base64(client_id:client_secret)`.
pub fn basic_auth(headers: &HeaderMap) -> Option<ClientCredentials> {
	let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
	let encoded = value.strip_prefix("Basic ")?;
	let decoded = STANDARD.decode(encoded).ok()?;
	let decoded = String::from_utf8(decoded).ok()?;
	let (id, secret) = decoded.split_once(':')?;
	Some(ClientCredentials { client_id: id.into(), client_secret: secret.into() })
}

/// Resolves client credentials for a form-urlencoded request: Basic auth
/// first, falling back to the `client_id`/`client_secret` form fields.
pub fn resolve_form_credentials(
	headers: &HeaderMap,
	form_client_id: Option<&str>,
	form_client_secret: Option<&str>,
) -> ClResult<ClientCredentials> {
	if let Some(creds) = basic_auth(headers) {
		return Ok(creds);
	}
	match (form_client_id, form_client_secret) {
		(Some(id), Some(secret)) => {
			Ok(ClientCredentials { client_id: id.into(), client_secret: secret.into() })
		}
		_ => Err(Error::InvalidClient),
	}
}

/// Loads the application and verifies `client_secret` in constant time.
/// Used by both the form-urlencoded and Basic-only authentication modes.
pub async fn authenticate(
	store: &Arc<dyn ApplicationStore>,
	credentials: &ClientCredentials,
) -> ClResult<Application> {
	let app = store.get_application(&credentials.client_id).await.map_err(|err| {
		if matches!(err, Error::NotFound) {
			Error::InvalidClient
		} else {
			err
		}
	})?;
	if !constant_time_eq(app.secret.as_bytes(), credentials.client_secret.as_bytes()) {
		return Err(Error::InvalidClient);
	}
	Ok(app)
}

/// Verifies a PKCE `code_verifier` against the `code_challenge` recorded at
/// authorization time. `method` is the stored `code_challenge_method`
/// (`"S256"` or `"plain"`); callers must only invoke this when a challenge
/// was actually recorded (a coherent PKCE pair is enforced at authorize
/// time, so its absence here means PKCE was never used).
pub fn verify_pkce(method: &str, verifier: &str, code_challenge: &str) -> ClResult<()> {
	let ok = match method {
		"S256" => {
			let digest = Sha256::digest(verifier.as_bytes());
			constant_time_eq(URL_SAFE_NO_PAD.encode(digest).as_bytes(), code_challenge.as_bytes())
		}
		"plain" => constant_time_eq(verifier.as_bytes(), code_challenge.as_bytes()),
		_ => false,
	};
	if ok {
		Ok(())
	} else {
		Err(Error::InvalidChallenge("PKCE verification failed".into()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pkce_s256_matches_known_vector() {
		// RFC 7636 appendix B.
		let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
		let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";
		assert!(verify_pkce("S256", verifier, challenge).is_ok());
	}

	#[test]
	fn pkce_s256_rejects_mismatch() {
		assert!(verify_pkce("S256", "wrong-verifier", "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM")
			.is_err());
	}

	#[test]
	fn pkce_plain_is_verbatim_constant_time_compare() {
		assert!(verify_pkce("plain", "same-value", "same-value").is_ok());
		assert!(verify_pkce("plain", "a", "b").is_err());
	}

	#[test]
	fn basic_auth_decodes_colon_separated_credentials() {
		let mut headers = HeaderMap::new();
		let encoded = STANDARD.encode("demo:demo-secret");
		headers.insert(
			axum::http::header::AUTHORIZATION,
			format!("Basic {encoded}").parse().unwrap(),
		);
		let creds = basic_auth(&headers).unwrap();
		assert_eq!(creds.client_id.as_ref(), "demo");
		assert_eq!(creds.client_secret.as_ref(), "demo-secret");
	}
}

// vim: ts=4
