//! The C5 bearer-token gate: the short-lived JWT the front-end presents to
//! prove it holds a specific challenge, and the checks run before any
//! time-sensitive operation on that challenge.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use idp_types::prelude::*;
use idp_types::store::ChallengeStore;
use idp_types::types::Challenge;
use idp_types::utils::decode_jwt_no_verify;

#[derive(Debug, Serialize, Deserialize)]
struct BearerClaims {
	challenge_id: Box<str>,
	/// Seconds the front-end believes have elapsed since challenge creation.
	duration: i64,
	/// When true, skip the clock-skew check (used for long-lived QR flows).
	persistent: bool,
}

/// Mints the per-challenge bearer token, HMAC-signed with the challenge's
/// own `secret`.
pub fn create_bearer_token(challenge: &Challenge, duration: i64, persistent: bool) -> ClResult<String> {
	let claims = BearerClaims { challenge_id: challenge.id.clone(), duration, persistent };
	jsonwebtoken::encode(
		&jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
		&claims,
		&jsonwebtoken::EncodingKey::from_secret(challenge.secret.as_bytes()),
	)
	.map_err(Error::from)
}

/// Resolves a bearer token to its challenge, enforcing the C5 gate:
/// the challenge must exist, the token's HMAC must verify against the
/// challenge's own secret, and — unless `persistent` — the claimed
/// `duration` must be within `max_time_diff` seconds of the challenge's
/// actual age. Does not run [`validate`]; callers choose the validation
/// variant appropriate to the operation.
pub async fn resolve_bearer_token(
	store: &Arc<dyn ChallengeStore>,
	token: &str,
	max_time_diff: i64,
) -> ClResult<Challenge> {
	#[derive(Deserialize)]
	struct Peek {
		challenge_id: Box<str>,
	}
	let peek: Peek = decode_jwt_no_verify(token)?;
	let challenge = store.get_challenge(&peek.challenge_id).await.map_err(|err| {
		if matches!(err, Error::NotFound) {
			Error::NotFound
		} else {
			err
		}
	})?;

	let validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
	let data = jsonwebtoken::decode::<BearerClaims>(
		token,
		&jsonwebtoken::DecodingKey::from_secret(challenge.secret.as_bytes()),
		&validation,
	)
	.map_err(|_| Error::Unauthorized)?;
	let claims = data.claims;

	if !claims.persistent {
		let age = Timestamp::now().0 - challenge.created.0;
		if (age - claims.duration).abs() > max_time_diff {
			return Err(Error::InvalidRequest("challenge token clock skew too large".into()));
		}
	}

	Ok(challenge)
}

/// Same as [`resolve_bearer_token`] but never enforces the clock-skew check,
/// regardless of the token's `persistent` claim. Used by the sign/reject
/// operations, which may run arbitrarily long after the initial retrieval.
pub async fn resolve_bearer_token_time_insensitive(
	store: &Arc<dyn ChallengeStore>,
	token: &str,
) -> ClResult<Challenge> {
	resolve_bearer_token(store, token, i64::MAX).await
}

// vim: ts=4
