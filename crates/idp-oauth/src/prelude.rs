//! Common imports for the handler modules.

pub use idp_core::App;
pub use idp_types::prelude::*;

// vim: ts=4
