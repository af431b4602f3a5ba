//! Client-authentication extractor (C8) for endpoints other than `/collect`.
//!
//! `/collect` branches on `Content-Type` and is authenticated inline by
//! `collect::collect` itself (it needs the grant_type-aware form.rs mode of
//! C8). Every other authenticated client endpoint (`/sign`, the admin
//! `/service/*` routes) carries no `grant_type` and so always falls under
//! C8's "any other content type: HTTP Basic only" rule.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use idp_core::App;
use idp_types::prelude::*;
use idp_types::types::Application;

#[derive(Debug, Clone)]
pub struct AuthenticatedClient(pub Application);

#[async_trait]
impl FromRequestParts<App> for AuthenticatedClient {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
		let credentials = idp_token::basic_auth(&parts.headers).ok_or(Error::InvalidClient)?;
		let application = idp_token::authenticate(&state.application_store, &credentials).await?;
		Ok(AuthenticatedClient(application))
	}
}

/// `AdminMiddleware`: the authenticated application must have `admin=true`.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub Application);

#[async_trait]
impl FromRequestParts<App> for AuthenticatedAdmin {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
		let AuthenticatedClient(application) = AuthenticatedClient::from_request_parts(parts, state).await?;
		if !application.admin {
			return Err(Error::NotAdmin);
		}
		Ok(AuthenticatedAdmin(application))
	}
}

// vim: ts=4
