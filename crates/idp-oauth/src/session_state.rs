//! The RP session state persisted as a challenge's opaque `private_data`.
//!
//! One challenge can be mid-registration, mid-discoverable-login, or
//! mid-hinted-login; this enum tags which, so `PUT /challenge` knows how to
//! finish the ceremony without guessing from the challenge's `type` alone.

use serde::{Deserialize, Serialize};
use webauthn_rs::prelude::{DiscoverableAuthentication, PasskeyAuthentication, PasskeyRegistration};

use idp_types::prelude::*;
use idp_webauthn::UserVerificationPolicy;

#[derive(Debug, Serialize, Deserialize)]
pub enum SessionState {
	Registration { user_id: Box<str>, state: PasskeyRegistration },
	Login { user_id: Box<str>, state: PasskeyAuthentication, uv_policy: UserVerificationPolicy },
	DiscoverableLogin { state: DiscoverableAuthentication, uv_policy: UserVerificationPolicy },
}

impl SessionState {
	pub fn encode(&self) -> ClResult<Box<[u8]>> {
		Ok(serde_json::to_vec(self)?.into())
	}

	pub fn decode(bytes: &[u8]) -> ClResult<SessionState> {
		serde_json::from_slice(bytes)
			.map_err(|_| Error::Internal("stored RP session state is corrupt".into()))
	}
}

// vim: ts=4
