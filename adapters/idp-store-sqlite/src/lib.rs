//! SQLite persistence adapter: one database file backing every store trait
//! (C1, C2, C3/C5, C6, C10) the engine depends on.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::fmt::Debug;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use idp_types::prelude::*;
use idp_types::types::{KeyAlg, ServerKey};
use idp_types::utils::random_id;
use idp_types::worker::WorkerPool;

mod application_store;
mod challenge_store;
mod credential_store;
mod crypto;
mod key_store;
mod schema;
mod session_store;
mod utils;

/// Backs every store trait off one SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
	pool: SqlitePool,
	worker: Arc<WorkerPool>,
}

impl Debug for SqliteStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SqliteStore").finish_non_exhaustive()
	}
}

impl SqliteStore {
	/// Opens (creating if missing) the database at `db_path` and runs the
	/// schema migration. Does not seed any key material; call
	/// [`SqliteStore::ensure_server_key`] for that.
	pub async fn new(worker: Arc<WorkerPool>, db_path: &str) -> ClResult<Self> {
		let options = SqliteConnectOptions::new()
			.filename(db_path)
			.create_if_missing(true)
			.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
		let pool = SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(options)
			.await
			.map_err(|err| Error::Internal(format!("failed to open database: {err}")))?;
		schema::init(&pool).await.map_err(|err| Error::Internal(format!("failed to init schema: {err}")))?;
		Ok(Self { pool, worker: worker.clone() })
	}

	/// Opens an in-memory database, for tests.
	#[cfg(test)]
	async fn new_in_memory(worker: Arc<WorkerPool>) -> ClResult<Self> {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await
			.map_err(|err| Error::Internal(format!("failed to open database: {err}")))?;
		schema::init(&pool).await.map_err(|err| Error::Internal(format!("failed to init schema: {err}")))?;
		Ok(Self { pool, worker })
	}

	/// Ensures at least one server key for `alg` exists, generating and
	/// persisting one if not. Called at startup so the JWKS is never empty.
	pub async fn ensure_server_key(&self, alg: KeyAlg) -> ClResult<ServerKey> {
		use idp_types::store::KeyStore;

		if let Ok(key) = self.get_server_key_with_alg(alg).await {
			return Ok(key);
		}

		let generated = crypto::generate_key(&self.worker, alg).await?;
		let key = ServerKey {
			kid: random_id(12).into(),
			alg,
			private_jwk: generated.private_pem,
			public_jwk: generated.public_jwk,
			created: Timestamp::now(),
		};
		self.create_server_key(alg, &key).await?;
		info!(kid = %key.kid, alg = ?alg, "generated new server signing key");
		Ok(key)
	}

	/// Deletes expired challenges (and their orphaned codes/CIBA request ids)
	/// in one pass. Not part of [`idp_types::store::ChallengeStore`]: no
	/// caller needs this across the trait boundary, only periodic server
	/// maintenance against this concrete adapter.
	pub async fn cleanup_expired(&self) -> ClResult<u64> {
		let now = Timestamp::now().0;
		let mut tx = self.pool.begin().await.map_err(|_| Error::DbError)?;

		sqlx::query(
			"DELETE FROM codes WHERE challenge_id IN (SELECT id FROM challenges WHERE expire < ?)",
		)
		.bind(now)
		.execute(&mut *tx)
		.await
		.map_err(|_| Error::DbError)?;
		sqlx::query(
			"DELETE FROM ciba_requests WHERE challenge_id IN (SELECT id FROM challenges WHERE expire < ?)",
		)
		.bind(now)
		.execute(&mut *tx)
		.await
		.map_err(|_| Error::DbError)?;
		let res = sqlx::query("DELETE FROM challenges WHERE expire < ?")
			.bind(now)
			.execute(&mut *tx)
			.await
			.map_err(|_| Error::DbError)?;

		tx.commit().await.map_err(|_| Error::DbError)?;
		Ok(res.rows_affected())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use idp_types::store::{ChallengeStore, CredentialStore, KeyStore, SessionStore};
	use idp_types::types::{ChallengeType, NewChallenge};

	async fn test_store() -> SqliteStore {
		let worker = Arc::new(WorkerPool::new(0, 1, 0));
		SqliteStore::new_in_memory(worker).await.expect("in-memory store")
	}

	#[tokio::test]
	async fn ensures_server_key_is_idempotent() {
		let store = test_store().await;
		let first = store.ensure_server_key(KeyAlg::ES256).await.expect("first key");
		let second = store.ensure_server_key(KeyAlg::ES256).await.expect("second key");
		assert_eq!(first.kid, second.kid);
	}

	#[tokio::test]
	async fn rejects_unsupported_algorithms() {
		let store = test_store().await;
		let err = store.ensure_server_key(KeyAlg::RS256).await.unwrap_err();
		assert!(matches!(err, Error::UnsupportedAlg));
	}

	#[tokio::test]
	async fn user_lifecycle_round_trips() {
		let store = test_store().await;
		let user = store.create_user().await.expect("create user");
		let (fetched, keys) = store.get_user_with_keys(&user.id).await.expect("fetch user");
		assert_eq!(fetched.id, user.id);
		assert!(keys.is_empty());
	}

	#[tokio::test]
	async fn challenge_code_is_single_use() {
		let store = test_store().await;
		let (id, _secret) = store
			.create_challenge(NewChallenge {
				typ: ChallengeType::WebauthnGet,
				app_id: "app".into(),
				expire: Timestamp::from_now(60),
				public_data: Box::from(&b""[..]),
				private_data: Box::from(&b""[..]),
				signature_text: None,
				signature_data: None,
				redirect_url: None,
				nonce: "nonce".into(),
				explicit_id: None,
			})
			.await
			.expect("create challenge");

		let code = store.create_code(&id).await.expect("create code");
		assert!(store.delete_code(&code).await.expect("first delete"));
		assert!(!store.delete_code(&code).await.expect("second delete"));
	}

	#[tokio::test]
	async fn cleanup_expired_removes_only_expired_challenges() {
		let store = test_store().await;
		let (expired_id, _) = store
			.create_challenge(NewChallenge {
				typ: ChallengeType::WebauthnGet,
				app_id: "app".into(),
				expire: Timestamp::from_now(-10),
				public_data: Box::from(&b""[..]),
				private_data: Box::from(&b""[..]),
				signature_text: None,
				signature_data: None,
				redirect_url: None,
				nonce: "nonce".into(),
				explicit_id: None,
			})
			.await
			.expect("create expired challenge");
		let (live_id, _) = store
			.create_challenge(NewChallenge {
				typ: ChallengeType::WebauthnGet,
				app_id: "app".into(),
				expire: Timestamp::from_now(60),
				public_data: Box::from(&b""[..]),
				private_data: Box::from(&b""[..]),
				signature_text: None,
				signature_data: None,
				redirect_url: None,
				nonce: "nonce".into(),
				explicit_id: None,
			})
			.await
			.expect("create live challenge");

		let removed = store.cleanup_expired().await.expect("cleanup");
		assert_eq!(removed, 1);
		assert!(store.get_challenge(&expired_id).await.is_err());
		assert!(store.get_challenge(&live_id).await.is_ok());
	}

	#[tokio::test]
	async fn session_rotation_increments_counter() {
		let store = test_store().await;
		let session = store.create_session("user", "app", "openid").await.expect("create session");
		assert_eq!(session.counter, 0);
		let rotated = store.rotate_session(&session.id, None).await.expect("rotate");
		assert_eq!(rotated.counter, 1);
	}

	#[tokio::test]
	async fn on_disk_database_survives_reopen() {
		let dir = tempfile::tempdir().expect("tempdir");
		let db_path = dir.path().join("idp.sqlite3");
		let db_path = db_path.to_str().expect("utf8 path");
		let worker = Arc::new(WorkerPool::new(0, 1, 0));

		let store = SqliteStore::new(worker.clone(), db_path).await.expect("open store");
		let key = store.ensure_server_key(KeyAlg::ES256).await.expect("generate key");
		drop(store);

		let reopened = SqliteStore::new(worker, db_path).await.expect("reopen store");
		let fetched = reopened.get_server_key(&key.kid).await.expect("fetch key");
		assert_eq!(fetched.kid, key.kid);
	}
}

// vim: ts=4
