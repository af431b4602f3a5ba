//! [`KeyStore`] backed by the `server_keys` table.

use async_trait::async_trait;
use sqlx::Row;

use idp_types::prelude::*;
use idp_types::store::KeyStore;
use idp_types::types::{KeyAlg, ServerKey};

use crate::utils::{collect_res, inspect, map_res, parse_alg};
use crate::SqliteStore;

fn row_to_key(row: &sqlx::sqlite::SqliteRow) -> Result<ServerKey, sqlx::Error> {
	let alg: String = row.try_get("alg")?;
	Ok(ServerKey {
		kid: row.try_get::<String, _>("kid")?.into(),
		alg: parse_alg(&alg).unwrap_or(KeyAlg::ES256),
		private_jwk: row.try_get::<String, _>("private_jwk")?.into(),
		public_jwk: row.try_get::<String, _>("public_jwk")?.into(),
		created: Timestamp(row.try_get("created")?),
	})
}

#[async_trait]
impl KeyStore for SqliteStore {
	async fn create_server_key(&self, alg: KeyAlg, key: &ServerKey) -> ClResult<()> {
		sqlx::query(
			"INSERT INTO server_keys (kid, alg, private_jwk, public_jwk, created)
			VALUES (?, ?, ?, ?, ?)",
		)
		.bind(&*key.kid)
		.bind(alg.as_str())
		.bind(&*key.private_jwk)
		.bind(&*key.public_jwk)
		.bind(key.created.0)
		.execute(&self.pool)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
		Ok(())
	}

	async fn get_server_key(&self, kid: &str) -> ClResult<ServerKey> {
		let row = sqlx::query("SELECT * FROM server_keys WHERE kid = ?")
			.bind(kid)
			.fetch_one(&self.pool)
			.await;
		map_res(row, row_to_key)
	}

	async fn get_server_key_with_alg(&self, alg: KeyAlg) -> ClResult<ServerKey> {
		let row = sqlx::query("SELECT * FROM server_keys WHERE alg = ? ORDER BY created DESC LIMIT 1")
			.bind(alg.as_str())
			.fetch_one(&self.pool)
			.await;
		map_res(row, row_to_key)
	}

	async fn list_server_keys(&self) -> ClResult<Vec<ServerKey>> {
		let rows = sqlx::query("SELECT * FROM server_keys ORDER BY created ASC")
			.fetch_all(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		collect_res(rows.iter().map(row_to_key))
	}

	async fn delete_server_key(&self, kid: &str) -> ClResult<()> {
		sqlx::query("DELETE FROM server_keys WHERE kid = ?")
			.bind(kid)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		Ok(())
	}

	async fn get_available_algorithms(&self) -> ClResult<Vec<KeyAlg>> {
		let rows = sqlx::query("SELECT DISTINCT alg FROM server_keys")
			.fetch_all(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		let mut algs = Vec::with_capacity(rows.len());
		for row in &rows {
			let alg: String = row.try_get("alg").inspect_err(inspect).map_err(|_| Error::DbError)?;
			algs.push(parse_alg(&alg)?);
		}
		Ok(algs)
	}
}

// vim: ts=4
