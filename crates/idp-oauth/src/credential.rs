//! Converts between stored credential blobs and webauthn-rs's `Passkey`.

use std::sync::Arc;

use idp_types::prelude::*;
use idp_types::store::CredentialStore;
use idp_types::types::{User, UserKey};
use idp_webauthn::WebauthnUser;
use webauthn_rs::prelude::{AuthenticationResult, Passkey};

pub fn encode_passkey(passkey: &Passkey) -> ClResult<Box<[u8]>> {
	Ok(serde_json::to_vec(passkey)?.into())
}

pub fn decode_passkey(bytes: &[u8]) -> ClResult<Passkey> {
	serde_json::from_slice(bytes)
		.map_err(|_| Error::Internal("stored credential is not a valid passkey".into()))
}

/// Loads `user_id` and its credentials into the shape the engine expects.
/// Display fields are left empty; nothing in this system surfaces a
/// human-readable username.
pub async fn load_webauthn_user(
	store: &Arc<dyn CredentialStore>,
	user_id: &str,
) -> ClResult<(User, WebauthnUser)> {
	let (user, keys) = store.get_user_with_keys(user_id).await?;
	let credentials =
		keys.iter().map(|k| decode_passkey(&k.credential)).collect::<ClResult<Vec<_>>>()?;
	let webauthn_user = WebauthnUser {
		id: user.id.as_bytes().to_vec(),
		name: user.id.to_string(),
		display_name: user.id.to_string(),
		credentials,
	};
	Ok((user, webauthn_user))
}

/// Restricts login to a single known credential set, e.g. from `login_hint`.
pub fn restrict_to_user_keys(keys: &[UserKey]) -> ClResult<Vec<Passkey>> {
	keys.iter().map(|k| decode_passkey(&k.credential)).collect()
}

/// Folds a successful assertion's counter/backup-state back into the stored
/// `Passkey` so the next authentication's monotonic-counter check runs
/// against the counter this one just reported, not the registration-time
/// baseline. Returns the re-serialized credential for `ping_user_key`.
pub fn refreshed_passkey(stored: &[u8], result: &AuthenticationResult) -> ClResult<Box<[u8]>> {
	let mut passkey = decode_passkey(stored)?;
	passkey.update_credential(result);
	encode_passkey(&passkey)
}

// vim: ts=4
