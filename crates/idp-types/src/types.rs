//! Domain types for the identity provider: server keys, applications, users,
//! WebAuthn credentials, challenges, and refresh sessions.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}

	pub fn from_now(delta: i64) -> Timestamp {
		Timestamp(Timestamp::now().0 + delta)
	}

	pub fn add_seconds(&self, seconds: i64) -> Timestamp {
		Timestamp(self.0 + seconds)
	}

	pub fn has_passed(&self) -> bool {
		self.0 <= Timestamp::now().0
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::cmp::PartialEq for Timestamp {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}
impl std::cmp::Eq for Timestamp {}

impl std::cmp::PartialOrd for Timestamp {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::cmp::Ord for Timestamp {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.0.cmp(&other.0)
	}
}

// ServerKey (C1) //
//****************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyAlg {
	RS256,
	RS384,
	RS512,
	ES256,
	ES384,
	ES512,
	EdDSA,
}

impl KeyAlg {
	pub fn as_str(&self) -> &'static str {
		match self {
			KeyAlg::RS256 => "RS256",
			KeyAlg::RS384 => "RS384",
			KeyAlg::RS512 => "RS512",
			KeyAlg::ES256 => "ES256",
			KeyAlg::ES384 => "ES384",
			KeyAlg::ES512 => "ES512",
			KeyAlg::EdDSA => "EdDSA",
		}
	}

	pub fn parse(s: &str) -> Option<KeyAlg> {
		Some(match s {
			"RS256" => KeyAlg::RS256,
			"RS384" => KeyAlg::RS384,
			"RS512" => KeyAlg::RS512,
			"ES256" => KeyAlg::ES256,
			"ES384" => KeyAlg::ES384,
			"ES512" => KeyAlg::ES512,
			"EdDSA" => KeyAlg::EdDSA,
			_ => return None,
		})
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerKey {
	pub kid: Box<str>,
	pub alg: KeyAlg,
	/// PEM/PKCS8-encoded private key material.
	pub private_jwk: Box<str>,
	/// PEM-encoded public key, used to publish the JWKS.
	pub public_jwk: Box<str>,
	pub created: Timestamp,
}

/// A single entry of the published JSON Web Key Set.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jwk {
	pub kid: Box<str>,
	pub alg: Box<str>,
	#[serde(rename = "use")]
	pub usage: &'static str,
	pub kty: Box<str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub crv: Option<Box<str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub x: Option<Box<str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub y: Option<Box<str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub n: Option<Box<str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub e: Option<Box<str>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Jwks {
	pub keys: Vec<Jwk>,
}

// Application (C10) //
//*******************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CibaMode {
	Poll,
	Ping,
	Push,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Application {
	pub id: Box<str>,
	pub secret: Box<str>,
	pub name: Box<str>,
	pub description: Option<Box<str>>,
	pub icon: Option<Box<str>>,
	pub id_token_alg: KeyAlg,
	pub key_id: Box<str>,
	pub admin: bool,
	pub ciba_mode: CibaMode,
	pub notification_endpoint: Option<Box<str>>,
	pub redirect_uris: Vec<Box<str>>,
}

// User (C2) //
//***********//
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
	pub id: Box<str>,
	pub created: Timestamp,
}

/// A single WebAuthn credential bound to a user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserKey {
	/// Hex-encoded SHA-256 of `credential_id`; the stable primary key.
	pub hash: Box<str>,
	pub credential_id: Box<[u8]>,
	pub aaguid: uuid::Uuid,
	pub user_id: Box<str>,
	/// Opaque, versioned encoding of the webauthn-rs `Passkey`.
	pub credential: Box<[u8]>,
	pub created: Timestamp,
	pub last_used: Option<Timestamp>,
}

// Challenge (C3, C5) //
//********************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
	#[serde(rename = "webauthn.create")]
	WebauthnCreate,
	#[serde(rename = "webauthn.get")]
	WebauthnGet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
	Pending,
	Viewed,
	Signed,
	Collected,
	Rejected,
}

impl ChallengeStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ChallengeStatus::Pending => "pending",
			ChallengeStatus::Viewed => "viewed",
			ChallengeStatus::Signed => "signed",
			ChallengeStatus::Collected => "collected",
			ChallengeStatus::Rejected => "rejected",
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
	/// 16 hex chars (8 random bytes).
	pub id: Box<str>,
	/// HMAC key for the short-lived bearer token; a UUID.
	pub secret: Box<str>,
	#[serde(rename = "type")]
	pub typ: ChallengeType,
	pub app_id: Box<str>,
	pub created: Timestamp,
	pub expire: Timestamp,
	/// Opaque serialized `CreationChallengeResponse`/`RequestChallengeResponse`.
	pub public_data: Box<[u8]>,
	/// Opaque serialized RP session state (the library's internal session type).
	pub private_data: Box<[u8]>,
	/// Opaque serialized parsed authenticator response, once signed.
	pub signature: Option<Box<[u8]>>,
	/// Opaque serialized resolved credential, once signed.
	pub credential: Option<Box<[u8]>>,
	pub signature_text: Option<Box<str>>,
	pub signature_data: Option<Box<[u8]>>,
	pub signed: Option<Timestamp>,
	/// Whether the accepted assertion/attestation carried user verification.
	/// `None` until signed.
	pub user_verified: Option<bool>,
	pub status: ChallengeStatus,
	pub redirect_url: Option<Box<str>>,
	/// URL-encoded original authorize/CIBA-init query, when OAuth2-initiated.
	pub oauth2_context: Option<Box<str>>,
	pub nonce: Box<str>,
}

impl Challenge {
	pub fn is_expired(&self) -> bool {
		self.expire.has_passed()
	}
}

/// Parameters for creating a new challenge; mirrors `createChallenge` (§4.3).
pub struct NewChallenge {
	pub typ: ChallengeType,
	pub app_id: Box<str>,
	pub expire: Timestamp,
	pub public_data: Box<[u8]>,
	pub private_data: Box<[u8]>,
	pub signature_text: Option<Box<str>>,
	pub signature_data: Option<Box<[u8]>>,
	pub redirect_url: Option<Box<str>>,
	pub nonce: Box<str>,
	pub explicit_id: Option<Box<str>>,
}

// Session (C6) //
//**************//
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
	/// 16 hex chars.
	pub id: Box<str>,
	pub user_id: Box<str>,
	pub app_id: Box<str>,
	pub counter: u32,
	pub requested_scopes: Box<str>,
	pub created: Timestamp,
	pub expire_at: Option<Timestamp>,
}

// API envelopes (§6, §7) //
//************************//

/// Error response shape used by every non-OAuth2 API surface.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub code: u16,
	pub error: Box<str>,
	pub msg: Box<str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub technical_msg: Option<Box<str>>,
}

impl ErrorResponse {
	pub fn new(error: &str, msg: String) -> Self {
		Self { code: 400, error: error.into(), msg: msg.into(), technical_msg: None }
	}
}

/// Error response shape used by the OAuth2 authorize/token endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
	pub error: Box<str>,
	pub error_description: Box<str>,
}

impl OAuthErrorResponse {
	pub fn new(error: &str, description: String) -> Self {
		Self { error: error.into(), error_description: description.into() }
	}
}

/// Response body for `POST /collect` on the OAuth2/CIBA token endpoint.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TokenResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub access_token: Option<Box<str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id_token: Option<Box<str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<Box<str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scope: Option<Box<str>>,
	pub token_type: Box<str>,
}

// vim: ts=4
