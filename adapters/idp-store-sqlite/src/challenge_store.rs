//! [`ChallengeStore`] backed by the `challenges`, `codes`, and
//! `ciba_requests` tables.

use async_trait::async_trait;
use sqlx::Row;

use idp_types::prelude::*;
use idp_types::store::ChallengeStore;
use idp_types::types::{Challenge, ChallengeStatus, ChallengeType, NewChallenge};
use idp_types::utils::{random_hex, random_id};

use crate::utils::{inspect, map_res};
use crate::SqliteStore;

fn parse_type(s: &str) -> ChallengeType {
	match s {
		"webauthn.create" => ChallengeType::WebauthnCreate,
		_ => ChallengeType::WebauthnGet,
	}
}

fn type_as_str(typ: ChallengeType) -> &'static str {
	match typ {
		ChallengeType::WebauthnCreate => "webauthn.create",
		ChallengeType::WebauthnGet => "webauthn.get",
	}
}

fn parse_status(s: &str) -> ChallengeStatus {
	match s {
		"viewed" => ChallengeStatus::Viewed,
		"signed" => ChallengeStatus::Signed,
		"collected" => ChallengeStatus::Collected,
		"rejected" => ChallengeStatus::Rejected,
		_ => ChallengeStatus::Pending,
	}
}

fn row_to_challenge(row: &sqlx::sqlite::SqliteRow) -> Result<Challenge, sqlx::Error> {
	let typ: String = row.try_get("typ")?;
	let status: String = row.try_get("status")?;
	let public_data: Vec<u8> = row.try_get("public_data")?;
	let private_data: Vec<u8> = row.try_get("private_data")?;
	Ok(Challenge {
		id: row.try_get::<String, _>("id")?.into(),
		secret: row.try_get::<String, _>("secret")?.into(),
		typ: parse_type(&typ),
		app_id: row.try_get::<String, _>("app_id")?.into(),
		created: Timestamp(row.try_get("created")?),
		expire: Timestamp(row.try_get("expire")?),
		public_data: public_data.into_boxed_slice(),
		private_data: private_data.into_boxed_slice(),
		signature: row.try_get::<Option<Vec<u8>>, _>("signature")?.map(Vec::into_boxed_slice),
		credential: row.try_get::<Option<Vec<u8>>, _>("credential")?.map(Vec::into_boxed_slice),
		signature_text: row.try_get::<Option<String>, _>("signature_text")?.map(Into::into),
		signature_data: row.try_get::<Option<Vec<u8>>, _>("signature_data")?.map(Vec::into_boxed_slice),
		signed: row.try_get::<Option<i64>, _>("signed")?.map(Timestamp),
		user_verified: row.try_get::<Option<i64>, _>("user_verified")?.map(|v| v != 0),
		status: parse_status(&status),
		redirect_url: row.try_get::<Option<String>, _>("redirect_url")?.map(Into::into),
		oauth2_context: row.try_get::<Option<String>, _>("oauth2_context")?.map(Into::into),
		nonce: row.try_get::<String, _>("nonce")?.into(),
	})
}

#[async_trait]
impl ChallengeStore for SqliteStore {
	async fn create_challenge(&self, data: NewChallenge) -> ClResult<(Box<str>, Box<str>)> {
		let id: Box<str> = data.explicit_id.unwrap_or_else(|| random_hex(8).into());
		let secret: Box<str> = uuid::Uuid::new_v4().to_string().into();
		sqlx::query(
			"INSERT INTO challenges
			(id, secret, typ, app_id, created, expire, public_data, private_data,
			signature_text, signature_data, status, redirect_url, nonce)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
		)
		.bind(&*id)
		.bind(&*secret)
		.bind(type_as_str(data.typ))
		.bind(&*data.app_id)
		.bind(Timestamp::now().0)
		.bind(data.expire.0)
		.bind(&*data.public_data)
		.bind(&*data.private_data)
		.bind(data.signature_text.as_deref())
		.bind(data.signature_data.as_deref())
		.bind(data.redirect_url.as_deref())
		.bind(&*data.nonce)
		.execute(&self.pool)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
		Ok((id, secret))
	}

	async fn get_challenge(&self, id: &str) -> ClResult<Challenge> {
		let row = sqlx::query("SELECT * FROM challenges WHERE id = ?")
			.bind(id)
			.fetch_one(&self.pool)
			.await;
		map_res(row, row_to_challenge)
	}

	async fn get_challenge_by_code(&self, code: &str) -> ClResult<Challenge> {
		let row = sqlx::query(
			"SELECT c.* FROM challenges c JOIN codes ON codes.challenge_id = c.id WHERE codes.code = ?",
		)
		.bind(code)
		.fetch_one(&self.pool)
		.await;
		map_res(row, row_to_challenge)
	}

	async fn get_challenge_by_ciba_request_id(&self, request_id: &str) -> ClResult<Challenge> {
		let row = sqlx::query(
			"SELECT c.* FROM challenges c JOIN ciba_requests ON ciba_requests.challenge_id = c.id
			WHERE ciba_requests.request_id = ?",
		)
		.bind(request_id)
		.fetch_one(&self.pool)
		.await;
		map_res(row, row_to_challenge)
	}

	async fn set_challenge_status(&self, id: &str, status: ChallengeStatus) -> ClResult<()> {
		let res = sqlx::query("UPDATE challenges SET status = ? WHERE id = ?")
			.bind(status.as_str())
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

	async fn set_oauth2_context(&self, id: &str, oauth2_context: &str) -> ClResult<()> {
		let res = sqlx::query("UPDATE challenges SET oauth2_context = ? WHERE id = ?")
			.bind(oauth2_context)
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

	async fn sign_challenge(
		&self,
		id: &str,
		signature: &[u8],
		credential: &[u8],
		user_verified: bool,
	) -> ClResult<()> {
		let res = sqlx::query(
			"UPDATE challenges SET signature = ?, credential = ?, signed = ?, user_verified = ?,
			status = 'signed' WHERE id = ?",
		)
		.bind(signature)
		.bind(credential)
		.bind(Timestamp::now().0)
		.bind(i64::from(user_verified))
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

	async fn create_code(&self, challenge_id: &str) -> ClResult<Box<str>> {
		let code: Box<str> = random_id(24).into();
		sqlx::query("INSERT INTO codes (code, challenge_id) VALUES (?, ?)")
			.bind(&*code)
			.bind(challenge_id)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		Ok(code)
	}

	async fn delete_code(&self, code: &str) -> ClResult<bool> {
		let res = sqlx::query("DELETE FROM codes WHERE code = ?")
			.bind(code)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		Ok(res.rows_affected() == 1)
	}

	async fn create_ciba_request_id(&self, challenge_id: &str) -> ClResult<Box<str>> {
		let request_id: Box<str> = uuid::Uuid::new_v4().to_string().into();
		sqlx::query("INSERT INTO ciba_requests (request_id, challenge_id) VALUES (?, ?)")
			.bind(&*request_id)
			.bind(challenge_id)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		Ok(request_id)
	}

	async fn delete_ciba_request(&self, request_id: &str) -> ClResult<bool> {
		let res = sqlx::query("DELETE FROM ciba_requests WHERE request_id = ?")
			.bind(request_id)
			.execute(&self.pool)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		Ok(res.rows_affected() == 1)
	}
}

// vim: ts=4
