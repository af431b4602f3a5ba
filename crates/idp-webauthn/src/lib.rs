//! WebAuthn relying-party engine (C4).
//!
//! Registration and assertion verification, decoupled from the HTTP layer:
//! `idp-oauth` drives this engine from the challenge state machine, never
//! the other way around.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod engine;

pub use engine::{Engine, UserVerificationPolicy, WebauthnUser};

// vim: ts=4
