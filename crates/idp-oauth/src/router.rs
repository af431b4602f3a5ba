//! Route-group assembly (C9). `server` composes these into one `Router`
//! alongside whatever TLS/CORS/static-asset layers it wants.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use crate::auth::AuthenticatedAdmin;
use crate::prelude::*;

/// Public, unauthenticated surface: challenge lifecycle, authorization-code
/// init, and the remote rendezvous socket.
pub fn public_routes() -> Router<App> {
	Router::new()
		.route("/challenge", post(crate::challenge::get_challenge))
		.route("/challenge", put(crate::challenge::sign_challenge))
		.route("/challenge", delete(crate::challenge::reject_challenge))
		.route("/oauth2", post(crate::authorize::authorize))
		.route("/remote/{id}", get(crate::remote::remote))
}

/// `POST /sign` dispatches the same way `/collect` does: JSON is the
/// app-local BID init, anything else is the CIBA backchannel-authentication
/// form. Authenticated the same way as `/collect` for the same reason — the
/// grant-type-aware body needs resolving before `AuthenticatedClient`'s
/// Basic-only extractor would apply.
async fn sign(State(app): State<App>, headers: HeaderMap, body: axum::body::Bytes) -> Response {
	let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();

	let credentials = match idp_token::basic_auth(&headers).ok_or(Error::InvalidClient) {
		Ok(credentials) => credentials,
		Err(err) => {
			return if content_type.starts_with("application/json") {
				err.into_response()
			} else {
				err.into_oauth2_response()
			};
		}
	};
	let client = match idp_token::authenticate(&app.application_store, &credentials).await {
		Ok(client) => client,
		Err(err) => {
			return if content_type.starts_with("application/json") {
				err.into_response()
			} else {
				err.into_oauth2_response()
			};
		}
	};

	if content_type.starts_with("application/json") {
		let result = async {
			let req = serde_json::from_slice(&body)?;
			crate::bid::bid_init_impl(&app, client, req).await
		}
		.await;
		match result {
			Ok(response) => Json(response).into_response(),
			Err(err) => err.into_response(),
		}
	} else {
		let result = async {
			let body = std::str::from_utf8(&body)
				.map_err(|_| Error::InvalidRequest("sign request body is not valid UTF-8".into()))?;
			let form = serde_urlencoded::from_str(body)
				.map_err(|_| Error::InvalidRequest("malformed sign request body".into()))?;
			crate::ciba::ciba_init_impl(&app, client, form).await
		}
		.await;
		match result {
			Ok(response) => Json(response).into_response(),
			Err(err) => err.into_oauth2_response(),
		}
	}
}

/// Authenticated-application surface: challenge init, collect, MDS lookup.
pub fn client_routes() -> Router<App> {
	Router::new()
		.route("/api/v1/sign", post(sign))
		.route("/api/v1/collect", post(crate::collect::collect))
		.route("/api/v1/mds/{aaguid}", get(crate::mds::get_mds_entry))
}

async fn create_user(
	State(app): State<App>,
	AuthenticatedAdmin(_admin): AuthenticatedAdmin,
) -> ClResult<Json<idp_types::types::User>> {
	use idp_types::store::CredentialStore;
	Ok(Json(app.credential_store.create_user().await?))
}

/// Admin-application surface (`admin=true`).
pub fn service_routes() -> Router<App> {
	Router::new()
		.route("/api/v1/service/list/users", get(crate::service::list_users))
		.route("/api/v1/service/create/user", post(create_user))
		.route("/api/v1/service/create/key", post(crate::service::create_key))
		.route("/api/v1/service/delete/user", post(crate::service::delete_user))
		.route("/api/v1/service/delete/key", post(crate::service::delete_key))
}

/// Trusted-issuer-bearer surface: a user managing their own keys.
pub fn user_routes() -> Router<App> {
	Router::new()
		.route("/api/v1/user/listKeys", get(crate::user::list_keys))
		.route("/api/v1/user/addKey", post(crate::user::add_key))
		.route("/api/v1/user/deleteKey", post(crate::user::delete_key))
}

/// OIDC discovery and publication surface.
pub fn well_known_routes() -> Router<App> {
	Router::new()
		.route("/.well-known/openid-configuration", get(crate::discovery::discovery))
		.route("/api/v1/oidc/jwkset.json", get(crate::discovery::jwks))
		.route("/api/v1/oidc/userinfo", get(crate::userinfo::userinfo))
}

pub fn all_routes() -> Router<App> {
	public_routes().merge(client_routes()).merge(service_routes()).merge(user_routes()).merge(well_known_routes())
}

// vim: ts=4
