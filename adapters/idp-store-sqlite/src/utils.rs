//! Small helpers shared by every store implementation in this crate.

use sqlx::sqlite::SqliteRow;

use idp_types::prelude::*;
use idp_types::types::KeyAlg;

pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

pub(crate) fn parse_alg(s: &str) -> ClResult<KeyAlg> {
	KeyAlg::parse(s).ok_or_else(|| Error::KeyError(format!("unknown key algorithm in database: {s}")))
}

/// Map a query result to a value using a closure, translating a missing row
/// into [`Error::NotFound`] rather than the generic database error.
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> ClResult<T>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(ref row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>>,
) -> ClResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

// vim: ts=4
