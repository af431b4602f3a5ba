//! Core infrastructure for the identity provider: app state, config, and
//! the ambient caches every handler crate shares.
//!
//! This crate has no HTTP routes of its own; it exists so `idp-webauthn`,
//! `idp-challenge`, `idp-session`, `idp-token` and `idp-oauth` can all depend
//! on one shared `App` type without depending on each other.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod extract;
pub mod mds;
pub mod prelude;
pub mod rooms;

pub use app::{App, AppState, Stores};
pub use config::Config;
pub use extract::{ChallengeAuth, OptionalRequestId, RequestId};

// vim: ts=4
