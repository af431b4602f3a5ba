//! Shared types, adapter traits, and core utilities for the identity provider.
//!
//! This crate contains the foundational types shared between the engine
//! crates and all adapter implementations. Extracting these into a separate
//! crate allows adapter crates to compile in parallel with the rest of the
//! workspace.

pub mod error;
pub mod notifier;
pub mod prelude;
pub mod store;
pub mod types;
pub mod utils;
pub mod worker;

// vim: ts=4
