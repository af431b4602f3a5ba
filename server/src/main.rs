//! HTTP server binary (C12): loads configuration, opens the SQLite store,
//! wires the shared app state, and serves the OAuth2/WebAuthn router.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use idp_core::{AppState, Config, Stores};
use idp_store_sqlite::SqliteStore;
use idp_types::prelude::*;
use idp_types::store::{ApplicationStore, ChallengeStore, CredentialStore, KeyStore, SessionStore};
use idp_types::types::KeyAlg;
use idp_types::worker::WorkerPool;

#[tokio::main]
async fn main() -> ClResult<()> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();

	let config_path = env::var("IDP_CONFIG").ok();
	let config = Config::load(config_path.as_deref())?;

	let worker = Arc::new(WorkerPool::new(1, 3, 2));

	let store = Arc::new(SqliteStore::new(worker.clone(), &config.db_path).await?);
	let default_alg = KeyAlg::parse(&config.default_key_alg).unwrap_or(KeyAlg::ES256);
	store.ensure_server_key(default_alg).await?;

	let stores = Stores {
		key_store: store.clone() as Arc<dyn KeyStore>,
		credential_store: store.clone() as Arc<dyn CredentialStore>,
		challenge_store: store.clone() as Arc<dyn ChallengeStore>,
		session_store: store.clone() as Arc<dyn SessionStore>,
		application_store: store.clone() as Arc<dyn ApplicationStore>,
	};

	let listen = config.listen.clone();
	let trust_refresh_interval = Duration::from_secs(config.trust_refresh_interval_secs);
	let app = AppState::new(config, worker, stores);

	// C11: no trusted issuers are preconfigured; the refresher loop starts
	// immediately so future config-driven issuers only need the cache warmed.
	app.trusted_issuers.clone().spawn_refresher(Vec::new(), trust_refresh_interval);

	spawn_cleanup_task(store.clone());

	let router = idp_oauth::router::all_routes()
		.layer(tower_http::trace::TraceLayer::new_for_http())
		.with_state(app);
	let listener = tokio::net::TcpListener::bind(listen.as_ref())
		.await
		.map_err(|err| Error::Internal(format!("failed to bind {listen}: {err}")))?;
	info!("listening on {listen}");

	let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
	let serve = axum::serve(listener, router).with_graceful_shutdown(async {
		let _ = shutdown_rx.await;
	});
	let server_task = tokio::spawn(serve);

	tokio::signal::ctrl_c().await.map_err(|err| Error::Internal(format!("signal handler failed: {err}")))?;
	info!("shutdown signal received, draining in-flight requests");
	let _ = shutdown_tx.send(());

	match tokio::time::timeout(Duration::from_secs(5), server_task).await {
		Ok(Ok(Ok(()))) => {}
		Ok(Ok(Err(err))) => error!(%err, "server task exited with an error"),
		Ok(Err(err)) => error!(%err, "server task panicked"),
		Err(_) => warn!("graceful shutdown did not complete within 5s, exiting anyway"),
	}

	Ok(())
}

/// Periodically deletes expired challenges and their derived codes/CIBA
/// request ids. Grounded in the adapter's own `cleanup_expired`, not the
/// engine-facing store traits: only the concrete SQLite schema knows how to
/// do this as one bulk delete.
fn spawn_cleanup_task(store: Arc<SqliteStore>) {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(Duration::from_secs(300));
		loop {
			ticker.tick().await;
			match store.cleanup_expired().await {
				Ok(removed) if removed > 0 => info!(removed, "cleaned up expired challenges"),
				Ok(_) => {}
				Err(err) => warn!(%err, "expired-challenge cleanup failed"),
			}
		}
	});
}

// vim: ts=4
