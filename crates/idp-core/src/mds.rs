//! AAGUID metadata cache and trusted-issuer JWKS refresher (C11).
//!
//! Both caches are process-wide and lazily/periodically populated behind a
//! lock; neither is consulted by the core WebAuthn verification path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use parking_lot::Mutex;
use uuid::Uuid;

use idp_types::prelude::*;
use idp_types::types::Jwks;

/// Metadata for a single authenticator model, keyed by AAGUID.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct MdsEntry {
	pub aaguid: Uuid,
	pub description: Box<str>,
	pub icon: Option<Box<str>>,
}

#[derive(Debug, Clone, Default)]
pub struct MdsCache {
	entries: Arc<Mutex<HashMap<Uuid, Option<MdsEntry>>>>,
}

impl MdsCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached entry for `aaguid`, or `None` if this AAGUID has
	/// already been looked up and found absent from the metadata service.
	/// First lookup for a given AAGUID populates the cache under the lock;
	/// callers needing a live fetch should call [`MdsCache::insert`] first.
	pub fn get(&self, aaguid: &Uuid) -> Option<MdsEntry> {
		self.entries.lock().get(aaguid).cloned().flatten()
	}

	pub fn insert(&self, aaguid: Uuid, entry: Option<MdsEntry>) {
		self.entries.lock().insert(aaguid, entry);
	}
}

type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// Auto-refreshing cache of trusted external issuers' JWKS, used to validate
/// `id_token_hint`/`login_hint_token` in the CIBA flow. Refreshes on a fixed
/// interval via a background task; serves stale data between refreshes
/// rather than blocking a request on a live fetch.
#[derive(Clone)]
pub struct TrustedIssuerCache {
	sets: Arc<Mutex<HashMap<Box<str>, Jwks>>>,
	client: HttpsClient,
}

impl std::fmt::Debug for TrustedIssuerCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TrustedIssuerCache").field("issuers", &self.sets.lock().keys().collect::<Vec<_>>()).finish()
	}
}

impl TrustedIssuerCache {
	pub fn new() -> Self {
		let connector = HttpsConnectorBuilder::new()
			.with_webpki_roots()
			.https_only()
			.enable_http1()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(connector);
		TrustedIssuerCache { sets: Arc::new(Mutex::new(HashMap::new())), client }
	}

	pub fn jwks_for(&self, issuer: &str) -> Option<Jwks> {
		self.sets.lock().get(issuer).cloned()
	}

	async fn fetch(&self, jwks_uri: &str) -> ClResult<Jwks> {
		let uri: hyper::Uri =
			jwks_uri.parse().map_err(|_| Error::InvalidRequest("invalid jwks_uri".into()))?;
		let req = hyper::Request::builder()
			.method(hyper::Method::GET)
			.uri(uri)
			.body(Empty::<Bytes>::new())
			.map_err(|_| Error::InvalidRequest("invalid jwks_uri".into()))?;
		let res = self
			.client
			.request(req)
			.await
			.map_err(|err| Error::Internal(format!("jwks fetch failed: {err}")))?;
		let body = res
			.into_body()
			.collect()
			.await
			.map_err(|err| Error::Internal(format!("jwks body read failed: {err}")))?
			.to_bytes();
		Ok(serde_json::from_slice(&body)?)
	}

	/// Refreshes one issuer's JWKS, keeping the previous value on failure.
	pub async fn refresh_one(&self, issuer: &str, jwks_uri: &str) {
		match self.fetch(jwks_uri).await {
			Ok(jwks) => {
				self.sets.lock().insert(issuer.into(), jwks);
			}
			Err(err) => {
				warn!(issuer, %err, "trusted issuer jwks refresh failed, serving stale set");
			}
		}
	}

	/// Spawns the background refresh loop. `issuers` maps issuer URL to its
	/// `jwks_uri`; refreshed every `interval`.
	pub fn spawn_refresher(self, issuers: Vec<(Box<str>, Box<str>)>, interval: Duration) {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			loop {
				ticker.tick().await;
				for (issuer, jwks_uri) in &issuers {
					self.refresh_one(issuer, jwks_uri).await;
				}
			}
		});
	}
}

impl Default for TrustedIssuerCache {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
