//! Request/response bodies for the public, client, and well-known surfaces.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// `POST /oauth2` — authorization-code flow init, urlencoded.
#[derive(Debug, Deserialize, Serialize)]
pub struct AuthorizeForm {
	pub response_type: Box<str>,
	pub client_id: Box<str>,
	pub redirect_uri: Box<str>,
	pub state: Box<str>,
	pub scope: Option<Box<str>>,
	pub acr_values: Option<Box<str>>,
	pub login_hint: Option<Box<str>>,
	pub nonce: Option<Box<str>>,
	pub code_challenge: Option<Box<str>>,
	pub code_challenge_method: Option<Box<str>>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeInitResponse {
	pub challenge_id: Box<str>,
	pub secret: Box<str>,
}

/// `POST /sign`, urlencoded — CIBA backchannel-authentication init.
#[derive(Debug, Deserialize, Serialize)]
pub struct CibaForm {
	pub scope: Box<str>,
	pub acr_values: Option<Box<str>>,
	pub login_hint: Option<Box<str>>,
	pub id_token_hint: Option<Box<str>>,
	pub login_hint_token: Option<Box<str>>,
	pub client_notification_token: Option<Box<str>>,
	pub binding_message: Option<Box<str>>,
	pub requested_expiry: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct CibaInitResponse {
	pub auth_req_id: Box<str>,
	pub expires_in: i64,
	pub interval: Option<i64>,
	pub qr_data: Box<str>,
	pub qr_secret: Box<str>,
}

/// `POST /sign`, JSON — app-local BID (browser-initiated device) challenge init.
#[derive(Debug, Deserialize)]
pub struct BidChallengeRequest {
	pub user_id: Option<Box<str>>,
	pub user_verification: Option<Box<str>>,
	pub text: Option<Box<str>>,
	pub data: Option<Box<str>>,
	pub timeout: i64,
	pub redirect: Option<Box<str>>,
}

#[derive(Debug, Serialize)]
pub struct BidChallengeResponse {
	pub challenge_id: Box<str>,
	pub secret: Box<str>,
}

/// `POST /challenge` and `PUT/DELETE /challenge` — the bearer token gating
/// every public (unauthenticated) challenge operation.
#[derive(Debug, Deserialize)]
pub struct ChallengeTokenForm {
	pub token: Box<str>,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeSignForm {
	pub token: Box<str>,
	/// The authenticator response, serialized as a JSON string by the caller.
	pub response: Box<str>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct ChallengeOptionsResponse {
	#[serde(rename = "type")]
	pub typ: &'static str,
	pub public_key: serde_json::Value,
	pub expire: i64,
	pub app: Option<Box<str>>,
	pub sign_data: Option<Box<str>>,
}

#[derive(Debug, Serialize)]
pub struct RedirectResponse {
	pub redirect: Box<str>,
}

/// `POST /collect`, form-urlencoded — OAuth2/CIBA token exchange.
#[derive(Debug, Deserialize)]
pub struct CollectForm {
	pub grant_type: Box<str>,
	pub client_id: Option<Box<str>>,
	pub client_secret: Option<Box<str>>,
	pub code: Option<Box<str>>,
	pub code_verifier: Option<Box<str>>,
	pub refresh_token: Option<Box<str>>,
	pub auth_req_id: Option<Box<str>>,
}

/// `POST /collect`, JSON — BID flow collect.
#[derive(Debug, Deserialize)]
pub struct BidCollectRequest {
	pub challenge_id: Box<str>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct BidCollectResponse {
	pub user_id: Box<str>,
	pub signature: serde_json::Value,
	pub credential: Option<serde_json::Value>,
}

/// `GET /service/list/users`.
#[derive(Debug, Serialize)]
pub struct ServiceUserResponse {
	pub id: Box<str>,
	pub created: i64,
	pub keys: Vec<ServiceUserKeyResponse>,
}

#[derive(Debug, Serialize)]
pub struct ServiceUserKeyResponse {
	pub hash: Box<str>,
	pub aaguid: uuid::Uuid,
	pub created: i64,
	pub last_used: Option<i64>,
}

/// `POST /service/create/key` — starts a registration ceremony for a user
/// the admin already created (or is creating in the same call).
#[derive(Debug, Deserialize)]
pub struct ServiceCreateKeyRequest {
	pub user_id: Option<Box<str>>,
	pub redirect: Option<Box<str>>,
}

#[derive(Debug, Serialize)]
pub struct ServiceCreateKeyResponse {
	pub user_id: Box<str>,
	pub challenge_id: Box<str>,
	pub secret: Box<str>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceDeleteUserRequest {
	pub user_id: Box<str>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceDeleteKeyRequest {
	pub user_id: Box<str>,
	pub hash: Box<str>,
}

/// `GET /.well-known/openid-configuration`.
#[derive(Debug, Serialize)]
pub struct DiscoveryDocument {
	pub issuer: Box<str>,
	pub authorization_endpoint: Box<str>,
	pub token_endpoint: Box<str>,
	pub jwks_uri: Box<str>,
	pub backchannel_authentication_endpoint: Box<str>,
	pub backchannel_token_delivery_modes_supported: &'static [&'static str],
	pub userinfo_endpoint: Box<str>,
	pub acr_values_supported: &'static [&'static str],
	pub grant_types_supported: &'static [&'static str],
	pub token_endpoint_auth_methods_supported: &'static [&'static str],
	pub code_challenge_methods_supported: &'static [&'static str],
	pub response_modes_supported: &'static [&'static str],
	pub response_types_supported: &'static [&'static str],
	pub subject_types_supported: &'static [&'static str],
	pub id_token_signing_alg_values_supported: Vec<&'static str>,
}

// vim: ts=4
