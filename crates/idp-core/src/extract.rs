//! Custom extractors shared by every handler crate.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use idp_types::prelude::*;
use idp_types::types::Challenge;

/// The challenge a bearer token was verified against.
///
/// Inserted into `parts.extensions` by the handler that validated the
/// `Authorization: Bearer` token against the challenge's own `secret` (the
/// C5 bearer-token gate); extracted here so downstream handlers never touch
/// the raw token again.
#[derive(Debug, Clone)]
pub struct ChallengeAuth(pub Challenge);

#[async_trait]
impl<S> FromRequestParts<S> for ChallengeAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<ChallengeAuth>().cloned().ok_or(Error::Unauthorized)
	}
}

/// Request id for tracing and log correlation.
#[derive(Clone, Debug)]
pub struct RequestId(pub Box<str>);

#[derive(Clone, Debug)]
pub struct OptionalRequestId(pub Option<Box<str>>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalRequestId
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(OptionalRequestId(parts.extensions.get::<RequestId>().map(|r| r.0.clone())))
	}
}

// vim: ts=4
