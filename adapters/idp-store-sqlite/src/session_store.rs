//! [`SessionStore`] backed by the `sessions` table.

use async_trait::async_trait;
use sqlx::Row;

use idp_types::prelude::*;
use idp_types::store::SessionStore;
use idp_types::types::Session;
use idp_types::utils::random_hex;

use crate::utils::{inspect, map_res};
use crate::SqliteStore;

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, sqlx::Error> {
	Ok(Session {
		id: row.try_get::<String, _>("id")?.into(),
		user_id: row.try_get::<String, _>("user_id")?.into(),
		app_id: row.try_get::<String, _>("app_id")?.into(),
		counter: row.try_get::<i64, _>("counter")?.try_into().unwrap_or(0),
		requested_scopes: row.try_get::<String, _>("requested_scopes")?.into(),
		created: Timestamp(row.try_get("created")?),
		expire_at: row.try_get::<Option<i64>, _>("expire_at")?.map(Timestamp),
	})
}

#[async_trait]
impl SessionStore for SqliteStore {
	async fn create_session(&self, user_id: &str, app_id: &str, scopes: &str) -> ClResult<Session> {
		let session = Session {
			id: random_hex(8).into(),
			user_id: user_id.into(),
			app_id: app_id.into(),
			counter: 0,
			requested_scopes: scopes.into(),
			created: Timestamp::now(),
			expire_at: None,
		};
		sqlx::query(
			"INSERT INTO sessions (id, user_id, app_id, counter, requested_scopes, created, expire_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(&*session.id)
		.bind(&*session.user_id)
		.bind(&*session.app_id)
		.bind(i64::from(session.counter))
		.bind(&*session.requested_scopes)
		.bind(session.created.0)
		.bind(session.expire_at.map(|t| t.0))
		.execute(&self.pool)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
		Ok(session)
	}

	async fn get_session(&self, id: &str) -> ClResult<Session> {
		let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
			.bind(id)
			.fetch_one(&self.pool)
			.await;
		map_res(row, row_to_session)
	}

	async fn rotate_session(&self, id: &str, new_expire_at: Option<Timestamp>) -> ClResult<Session> {
		let mut tx = self.pool.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
			.bind(id)
			.fetch_one(&mut *tx)
			.await;
		let current = map_res(row, row_to_session)?;

		let expire_at = new_expire_at.or(current.expire_at);
		let res = sqlx::query("UPDATE sessions SET counter = counter + 1, expire_at = ? WHERE id = ?")
			.bind(expire_at.map(|t| t.0))
			.bind(id)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}

		let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
			.bind(id)
			.fetch_one(&mut *tx)
			.await;
		let updated = map_res(row, row_to_session)?;
		tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		Ok(updated)
	}

	async fn delete_session(&self, id: &str) -> ClResult<()> {
		let res = sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
		Ok(())
	}

	async fn list_sessions_for_user(&self, user_id: &str) -> ClResult<Vec<Session>> {
		let rows = sqlx::query("SELECT * FROM sessions WHERE user_id = ? ORDER BY created ASC")
			.bind(user_id)
			.fetch_all(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		crate::utils::collect_res(rows.iter().map(row_to_session))
	}
}

// vim: ts=4
