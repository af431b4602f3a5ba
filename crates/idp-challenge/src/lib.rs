//! Challenge lifecycle state machine (C3, C5).
//!
//! Pure logic over [`idp_types::types::Challenge`] and
//! [`idp_types::store::ChallengeStore`]: the bearer-token gate, the three
//! validation gates, and nothing that talks to WebAuthn or HTTP directly.
//! `idp-oauth` wires this together with `idp-webauthn` and `idp-token`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod gate;
pub mod validate;

pub use gate::{create_bearer_token, resolve_bearer_token, resolve_bearer_token_time_insensitive};
pub use validate::{validate, validate_bid_collect, validate_oauth_collect};

// vim: ts=4
