//! [`CredentialStore`] backed by the `users`, `user_keys`, and `auth_times`
//! tables.

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use idp_types::prelude::*;
use idp_types::store::CredentialStore;
use idp_types::types::{User, UserKey};
use idp_types::utils::sha256_hex;

use crate::utils::{collect_res, inspect, map_res};
use crate::SqliteStore;

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, sqlx::Error> {
	Ok(User { id: row.try_get::<String, _>("id")?.into(), created: Timestamp(row.try_get("created")?) })
}

fn row_to_user_key(row: &sqlx::sqlite::SqliteRow) -> Result<UserKey, sqlx::Error> {
	let aaguid: String = row.try_get("aaguid")?;
	let credential_id: Vec<u8> = row.try_get("credential_id")?;
	let credential: Vec<u8> = row.try_get("credential")?;
	Ok(UserKey {
		hash: row.try_get::<String, _>("hash")?.into(),
		credential_id: credential_id.into_boxed_slice(),
		aaguid: Uuid::parse_str(&aaguid).unwrap_or_default(),
		user_id: row.try_get::<String, _>("user_id")?.into(),
		credential: credential.into_boxed_slice(),
		created: Timestamp(row.try_get("created")?),
		last_used: row.try_get::<Option<i64>, _>("last_used")?.map(Timestamp),
	})
}

#[async_trait]
impl CredentialStore for SqliteStore {
	async fn create_user(&self) -> ClResult<User> {
		let user = User { id: idp_types::utils::random_id(16).into(), created: Timestamp::now() };
		sqlx::query("INSERT INTO users (id, created) VALUES (?, ?)")
			.bind(&*user.id)
			.bind(user.created.0)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		Ok(user)
	}

	async fn get_user(&self, id: &str) -> ClResult<User> {
		let row = sqlx::query("SELECT * FROM users WHERE id = ?").bind(id).fetch_one(&self.pool).await;
		map_res(row, row_to_user)
	}

	async fn get_user_with_keys(&self, id: &str) -> ClResult<(User, Vec<UserKey>)> {
		let user = self.get_user(id).await?;
		let keys = self.get_user_keys(id).await?;
		Ok((user, keys))
	}

	async fn list_users_with_keys(&self) -> ClResult<Vec<(User, Vec<UserKey>)>> {
		let rows = sqlx::query("SELECT * FROM users ORDER BY created ASC")
			.fetch_all(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		let users = collect_res(rows.iter().map(row_to_user))?;
		let mut out = Vec::with_capacity(users.len());
		for user in users {
			let keys = self.get_user_keys(&user.id).await?;
			out.push((user, keys));
		}
		Ok(out)
	}

	async fn add_user_key(&self, user_id: &str, key: &UserKey) -> ClResult<()> {
		sqlx::query(
			"INSERT INTO user_keys (hash, credential_id, aaguid, user_id, credential, created, last_used)
			VALUES (?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(&*key.hash)
		.bind(&*key.credential_id)
		.bind(key.aaguid.to_string())
		.bind(user_id)
		.bind(&*key.credential)
		.bind(key.created.0)
		.bind(key.last_used.map(|t| t.0))
		.execute(&self.pool)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
		Ok(())
	}

	async fn ping_user_key(&self, credential_id: &[u8], counter: u32, credential: &[u8]) -> ClResult<()> {
		let hash = sha256_hex(credential_id);
		let res = sqlx::query(
			"UPDATE user_keys SET last_used = ?, counter = ?, credential = ? WHERE hash = ?",
		)
		.bind(Timestamp::now().0)
		.bind(counter)
		.bind(credential)
		.bind(&hash)
		.execute(&self.pool)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
		Ok(())
	}

	async fn delete_user_key(&self, user_id: &str, hash: &str) -> ClResult<()> {
		let res = sqlx::query("DELETE FROM user_keys WHERE user_id = ? AND hash = ?")
			.bind(user_id)
			.bind(hash)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
		Ok(())
	}

	async fn delete_user(&self, id: &str) -> ClResult<()> {
		let mut tx = self.pool.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		sqlx::query("DELETE FROM user_keys WHERE user_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		sqlx::query("DELETE FROM auth_times WHERE user_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		let res = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
		Ok(())
	}

	async fn get_key(&self, credential_id: &[u8]) -> ClResult<UserKey> {
		let row = sqlx::query("SELECT * FROM user_keys WHERE credential_id = ?")
			.bind(credential_id)
			.fetch_one(&self.pool)
			.await;
		map_res(row, row_to_user_key)
	}

	async fn get_user_keys(&self, user_id: &str) -> ClResult<Vec<UserKey>> {
		let rows = sqlx::query("SELECT * FROM user_keys WHERE user_id = ? ORDER BY created ASC")
			.bind(user_id)
			.fetch_all(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		collect_res(rows.iter().map(row_to_user_key))
	}

	async fn get_user_key_descriptors(&self, user_id: &str) -> ClResult<Vec<Box<[u8]>>> {
		let rows = sqlx::query("SELECT credential_id FROM user_keys WHERE user_id = ?")
			.bind(user_id)
			.fetch_all(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		collect_res(rows.iter().map(|row| row.try_get::<Vec<u8>, _>("credential_id").map(Vec::into_boxed_slice)))
	}

	async fn update_auth_time(&self, user_id: &str, app_id: &str) -> ClResult<()> {
		sqlx::query(
			"INSERT INTO auth_times (user_id, app_id, auth_time) VALUES (?, ?, ?)
			ON CONFLICT(user_id, app_id) DO UPDATE SET auth_time = excluded.auth_time",
		)
		.bind(user_id)
		.bind(app_id)
		.bind(Timestamp::now().0)
		.execute(&self.pool)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
		Ok(())
	}

	async fn get_auth_time(&self, user_id: &str, app_id: &str) -> ClResult<Option<Timestamp>> {
		let row = sqlx::query("SELECT auth_time FROM auth_times WHERE user_id = ? AND app_id = ?")
			.bind(user_id)
			.bind(app_id)
			.fetch_optional(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		match row {
			Some(row) => {
				let auth_time: i64 =
					row.try_get("auth_time").inspect_err(inspect).map_err(|_| Error::DbError)?;
				Ok(Some(Timestamp(auth_time)))
			}
			None => Ok(None),
		}
	}
}

// vim: ts=4
