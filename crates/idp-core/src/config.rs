//! Startup configuration.
//!
//! Loaded once, from a layered source (built-in defaults, then an optional
//! config file, then environment variables prefixed `IDP_`), into a single
//! immutable struct. There is no process-wide mutable config singleton:
//! every component that needs a setting receives it explicitly at
//! construction time.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Address to bind the HTTP listener to.
	pub listen: Box<str>,
	/// Issuer URL override. When absent it is derived per-request from
	/// `X-Forwarded-Proto`/TLS and the `Host` header.
	pub issuer: Option<Box<str>>,
	/// WebAuthn relying-party id (typically the bare domain).
	pub rp_id: Box<str>,
	/// WebAuthn relying-party display name.
	pub rp_name: Box<str>,
	/// Accepted origins for WebAuthn ceremonies.
	pub rp_origins: Vec<Box<str>>,
	/// Path to the SQLite database file.
	pub db_path: Box<str>,
	/// Challenge time-to-live, in seconds.
	pub challenge_ttl_secs: i64,
	/// Maximum clock skew tolerated between a challenge's bearer token and
	/// its own record when validating a time-sensitive operation.
	pub challenge_max_time_diff_secs: i64,
	/// Access/ID token lifetime, in seconds.
	pub token_ttl_secs: i64,
	/// Refresh-token session lifetime, in seconds. `None` means sessions
	/// never expire on their own (only explicit revocation ends them).
	pub session_ttl_secs: Option<i64>,
	/// Extend a session's expiry on every successful rotation.
	pub refresh_token_extend_on_use: bool,
	/// CIBA polling interval advertised to clients, in seconds.
	pub ciba_poll_interval_secs: i64,
	/// CIBA request expiry, in seconds.
	pub ciba_expires_in_secs: i64,
	/// Trusted external issuer JWKS refresh interval, in seconds.
	pub trust_refresh_interval_secs: u64,
	/// Default signing algorithm used for newly minted server keys.
	pub default_key_alg: Box<str>,
	pub log_filter: Box<str>,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			listen: "0.0.0.0:8080".into(),
			issuer: None,
			rp_id: "localhost".into(),
			rp_name: "Identity Provider".into(),
			rp_origins: vec!["https://localhost".into()],
			db_path: "./idp.db".into(),
			challenge_ttl_secs: 300,
			challenge_max_time_diff_secs: 5,
			token_ttl_secs: 3600,
			session_ttl_secs: None,
			refresh_token_extend_on_use: true,
			ciba_poll_interval_secs: 5,
			ciba_expires_in_secs: 300,
			trust_refresh_interval_secs: 3600,
			default_key_alg: "ES256".into(),
			log_filter: "info".into(),
		}
	}
}

impl Config {
	/// Loads defaults, then `path` (if it exists), then `IDP_*` environment
	/// overrides (e.g. `IDP_LISTEN`, `IDP_DB_PATH`).
	pub fn load(path: Option<&str>) -> ClResult<Config> {
		let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
		if let Some(path) = path {
			figment = figment.merge(Toml::file(path));
		}
		figment = figment.merge(Env::prefixed("IDP_"));
		figment
			.extract()
			.map_err(|err| Error::InvalidRequest(format!("invalid configuration: {err}")))
	}
}

// vim: ts=4
