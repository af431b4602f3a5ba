//! Token minter (C7) and client authenticator (C8).

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod client_auth;
pub mod keys;
pub mod minter;

pub use client_auth::{authenticate, basic_auth, resolve_form_credentials, verify_pkce, ClientCredentials};
pub use keys::{decoding_key, decoding_key_from_jwk, encoding_key, jsonwebtoken_alg};
pub use minter::{mint_access_token, mint_id_token, AccessTokenClaims, IdTokenClaims};

// vim: ts=4
