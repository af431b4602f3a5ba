//! Table definitions, created idempotently on every startup.

use sqlx::SqlitePool;

pub(crate) async fn init(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS server_keys (
			kid text NOT NULL,
			alg text NOT NULL,
			private_jwk text NOT NULL,
			public_jwk text NOT NULL,
			created integer NOT NULL,
			PRIMARY KEY(kid)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_server_keys_alg ON server_keys (alg)")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS applications (
			id text NOT NULL,
			secret text NOT NULL,
			name text NOT NULL,
			description text,
			icon text,
			id_token_alg text NOT NULL,
			key_id text NOT NULL,
			admin integer NOT NULL DEFAULT 0,
			ciba_mode text NOT NULL DEFAULT 'poll',
			notification_endpoint text,
			redirect_uris text NOT NULL DEFAULT '',
			PRIMARY KEY(id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
			id text NOT NULL,
			created integer NOT NULL,
			PRIMARY KEY(id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS user_keys (
			hash text NOT NULL,
			credential_id blob NOT NULL,
			aaguid text NOT NULL,
			user_id text NOT NULL,
			credential blob NOT NULL,
			counter integer NOT NULL DEFAULT 0,
			created integer NOT NULL,
			last_used integer,
			PRIMARY KEY(hash)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_keys_user_id ON user_keys (user_id)")
		.execute(&mut *tx)
		.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_user_keys_credential_id ON user_keys (credential_id)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS auth_times (
			user_id text NOT NULL,
			app_id text NOT NULL,
			auth_time integer NOT NULL,
			PRIMARY KEY(user_id, app_id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS challenges (
			id text NOT NULL,
			secret text NOT NULL,
			typ text NOT NULL,
			app_id text NOT NULL,
			created integer NOT NULL,
			expire integer NOT NULL,
			public_data blob NOT NULL,
			private_data blob NOT NULL,
			signature blob,
			credential blob,
			signature_text text,
			signature_data blob,
			signed integer,
			user_verified integer,
			status text NOT NULL,
			redirect_url text,
			oauth2_context text,
			nonce text NOT NULL,
			PRIMARY KEY(id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_challenges_expire ON challenges (expire)")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS codes (
			code text NOT NULL,
			challenge_id text NOT NULL,
			PRIMARY KEY(code)
		)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS ciba_requests (
			request_id text NOT NULL,
			challenge_id text NOT NULL,
			PRIMARY KEY(request_id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS sessions (
			id text NOT NULL,
			user_id text NOT NULL,
			app_id text NOT NULL,
			counter integer NOT NULL DEFAULT 0,
			requested_scopes text NOT NULL,
			created integer NOT NULL,
			expire_at integer,
			PRIMARY KEY(id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions (user_id)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await
}

// vim: ts=4
