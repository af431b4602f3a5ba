//! [`ApplicationStore`] backed by the `applications` table.
//!
//! Applications have no creation endpoint (C10 has none either): rows are
//! seeded out-of-band, directly into this table.

use async_trait::async_trait;
use sqlx::Row;

use idp_types::prelude::*;
use idp_types::store::ApplicationStore;
use idp_types::types::{Application, CibaMode, KeyAlg};

use crate::utils::{map_res, parse_alg};
use crate::SqliteStore;

fn parse_ciba_mode(s: &str) -> CibaMode {
	match s {
		"ping" => CibaMode::Ping,
		"push" => CibaMode::Push,
		_ => CibaMode::Poll,
	}
}

fn row_to_application(row: &sqlx::sqlite::SqliteRow) -> Result<Application, sqlx::Error> {
	let alg: String = row.try_get("id_token_alg")?;
	let ciba_mode: String = row.try_get("ciba_mode")?;
	let redirect_uris: String = row.try_get("redirect_uris")?;
	let redirect_uris: Vec<Box<str>> =
		serde_json::from_str(&redirect_uris).unwrap_or_default();

	Ok(Application {
		id: row.try_get::<String, _>("id")?.into(),
		secret: row.try_get::<String, _>("secret")?.into(),
		name: row.try_get::<String, _>("name")?.into(),
		description: row.try_get::<Option<String>, _>("description")?.map(Into::into),
		icon: row.try_get::<Option<String>, _>("icon")?.map(Into::into),
		id_token_alg: parse_alg(&alg).unwrap_or(KeyAlg::ES256),
		key_id: row.try_get::<String, _>("key_id")?.into(),
		admin: row.try_get::<i64, _>("admin")? != 0,
		ciba_mode: parse_ciba_mode(&ciba_mode),
		notification_endpoint: row.try_get::<Option<String>, _>("notification_endpoint")?.map(Into::into),
		redirect_uris,
	})
}

#[async_trait]
impl ApplicationStore for SqliteStore {
	async fn get_application(&self, id: &str) -> ClResult<Application> {
		let row = sqlx::query("SELECT * FROM applications WHERE id = ?")
			.bind(id)
			.fetch_one(&self.pool)
			.await;
		map_res(row, row_to_application)
	}
}

// vim: ts=4
