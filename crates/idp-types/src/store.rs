//! Adapter traits the engine depends on for persistence.
//!
//! Every trait here corresponds to one of the stored-procedure groups of the
//! external interface: implementations are free to back them with literal
//! stored procedures, plain parameterized SQL, or anything else — the engine
//! only depends on the trait.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::{
	Application, Challenge, ChallengeStatus, KeyAlg, NewChallenge, ServerKey, Session, User,
	UserKey,
};

/// C1 — holds server signing keys and exposes the published JWKS material.
#[async_trait]
pub trait KeyStore: Debug + Send + Sync {
	async fn create_server_key(&self, alg: KeyAlg, key: &ServerKey) -> ClResult<()>;
	async fn get_server_key(&self, kid: &str) -> ClResult<ServerKey>;
	async fn get_server_key_with_alg(&self, alg: KeyAlg) -> ClResult<ServerKey>;
	async fn list_server_keys(&self) -> ClResult<Vec<ServerKey>>;
	async fn delete_server_key(&self, kid: &str) -> ClResult<()>;
	async fn get_available_algorithms(&self) -> ClResult<Vec<KeyAlg>>;
}

/// C10 — registered client applications.
#[async_trait]
pub trait ApplicationStore: Debug + Send + Sync {
	async fn get_application(&self, id: &str) -> ClResult<Application>;
}

/// C2 — users and their bound WebAuthn credentials.
#[async_trait]
pub trait CredentialStore: Debug + Send + Sync {
	async fn create_user(&self) -> ClResult<User>;
	async fn get_user(&self, id: &str) -> ClResult<User>;
	async fn get_user_with_keys(&self, id: &str) -> ClResult<(User, Vec<UserKey>)>;
	async fn list_users_with_keys(&self) -> ClResult<Vec<(User, Vec<UserKey>)>>;

	async fn add_user_key(&self, user_id: &str, key: &UserKey) -> ClResult<()>;
	/// Updates the stored sign counter, `last_used`, and the serialized
	/// credential itself (so the next lookup's monotonic-counter check runs
	/// against the counter this authentication just reported, not the
	/// registration-time baseline) after a successful assertion.
	async fn ping_user_key(&self, credential_id: &[u8], counter: u32, credential: &[u8]) -> ClResult<()>;
	async fn delete_user_key(&self, user_id: &str, hash: &str) -> ClResult<()>;
	async fn delete_user(&self, id: &str) -> ClResult<()>;

	async fn get_key(&self, credential_id: &[u8]) -> ClResult<UserKey>;
	async fn get_user_keys(&self, user_id: &str) -> ClResult<Vec<UserKey>>;
	/// `(type="public-key", credential_id)` pairs for the `allowCredentials` field.
	async fn get_user_key_descriptors(&self, user_id: &str) -> ClResult<Vec<Box<[u8]>>>;

	async fn update_auth_time(&self, user_id: &str, app_id: &str) -> ClResult<()>;
	async fn get_auth_time(&self, user_id: &str, app_id: &str) -> ClResult<Option<Timestamp>>;
}

/// C3/C5 — in-flight challenges, their lifecycle, and the one-shot
/// code/CIBA-request-id mappings derived from them.
#[async_trait]
pub trait ChallengeStore: Debug + Send + Sync {
	/// Returns `(challenge_id, secret)`.
	async fn create_challenge(&self, data: NewChallenge) -> ClResult<(Box<str>, Box<str>)>;
	async fn get_challenge(&self, id: &str) -> ClResult<Challenge>;
	async fn get_challenge_by_code(&self, code: &str) -> ClResult<Challenge>;
	async fn get_challenge_by_ciba_request_id(&self, request_id: &str) -> ClResult<Challenge>;

	async fn set_challenge_status(&self, id: &str, status: ChallengeStatus) -> ClResult<()>;
	async fn set_oauth2_context(&self, id: &str, oauth2_context: &str) -> ClResult<()>;

	/// Records the parsed authenticator response and resolved credential,
	/// sets `signed = now`, `user_verified`, and `status = signed`.
	async fn sign_challenge(
		&self,
		id: &str,
		signature: &[u8],
		credential: &[u8],
		user_verified: bool,
	) -> ClResult<()>;

	/// Allocates a fresh single-use code mapped to `challenge_id`.
	async fn create_code(&self, challenge_id: &str) -> ClResult<Box<str>>;
	/// Consumes the code. Returns `true` iff exactly one row was deleted —
	/// the sole authority on "already consumed", never a prior existence check.
	async fn delete_code(&self, code: &str) -> ClResult<bool>;

	/// Allocates a fresh single-use CIBA request id mapped to `challenge_id`.
	async fn create_ciba_request_id(&self, challenge_id: &str) -> ClResult<Box<str>>;
	async fn delete_ciba_request(&self, request_id: &str) -> ClResult<bool>;
}

/// C6 — refresh-token sessions.
#[async_trait]
pub trait SessionStore: Debug + Send + Sync {
	async fn create_session(&self, user_id: &str, app_id: &str, scopes: &str) -> ClResult<Session>;
	async fn get_session(&self, id: &str) -> ClResult<Session>;
	/// Increments the counter (and extends `expire_at` when configured) atomically.
	async fn rotate_session(&self, id: &str, new_expire_at: Option<Timestamp>) -> ClResult<Session>;
	async fn delete_session(&self, id: &str) -> ClResult<()>;
	async fn list_sessions_for_user(&self, user_id: &str) -> ClResult<Vec<Session>>;
}

// vim: ts=4
