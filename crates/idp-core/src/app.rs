//! App state type shared by every handler.

use std::sync::Arc;

use idp_types::notifier::Notifier;
use idp_types::store::{ApplicationStore, ChallengeStore, CredentialStore, KeyStore, SessionStore};
use idp_types::worker::WorkerPool;

use crate::config::Config;
use crate::mds::{MdsCache, TrustedIssuerCache};
use crate::rooms::RoomRegistry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub config: Config,
	pub worker: Arc<WorkerPool>,

	pub key_store: Arc<dyn KeyStore>,
	pub credential_store: Arc<dyn CredentialStore>,
	pub challenge_store: Arc<dyn ChallengeStore>,
	pub session_store: Arc<dyn SessionStore>,
	pub application_store: Arc<dyn ApplicationStore>,

	/// AAGUID metadata cache (C11); never consulted on the verification path.
	pub mds_cache: MdsCache,
	/// Trusted external issuer JWKS cache (C11), for `id_token_hint` parsing.
	pub trusted_issuers: TrustedIssuerCache,
	/// `/remote/:id` WebSocket rendezvous rooms.
	pub rooms: RoomRegistry,

	/// CIBA `push`-mode delivery (§4.8). `None` by default: the reference
	/// implementation never actually delivers a notification over this
	/// interface, so no concrete implementation is wired up unless the
	/// deployment supplies one.
	pub notifier: Option<Arc<dyn Notifier>>,
}

pub type App = Arc<AppState>;

pub struct Stores {
	pub key_store: Arc<dyn KeyStore>,
	pub credential_store: Arc<dyn CredentialStore>,
	pub challenge_store: Arc<dyn ChallengeStore>,
	pub session_store: Arc<dyn SessionStore>,
	pub application_store: Arc<dyn ApplicationStore>,
}

impl AppState {
	pub fn new(config: Config, worker: Arc<WorkerPool>, stores: Stores) -> App {
		Self::new_with_notifier(config, worker, stores, None)
	}

	/// Like [`AppState::new`], slotting a concrete CIBA `push` delivery
	/// implementation in. Builds that never call this run with `notifier`
	/// `None`, which is the default posture for this workspace.
	pub fn new_with_notifier(
		config: Config,
		worker: Arc<WorkerPool>,
		stores: Stores,
		notifier: Option<Arc<dyn Notifier>>,
	) -> App {
		Arc::new(AppState {
			config,
			worker,
			key_store: stores.key_store,
			credential_store: stores.credential_store,
			challenge_store: stores.challenge_store,
			session_store: stores.session_store,
			application_store: stores.application_store,
			mds_cache: MdsCache::new(),
			trusted_issuers: TrustedIssuerCache::new(),
			rooms: RoomRegistry::new(),
			notifier,
		})
	}
}

// vim: ts=4
