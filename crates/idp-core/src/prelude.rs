//! Common imports shared across the engine and handler crates.

pub use idp_types::prelude::*;

// vim: ts=4
