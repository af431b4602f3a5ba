//! `GET /mds/:aaguid` — FIDO metadata lookup (C11). The cache itself is
//! populated out of band; this route only ever reads it.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use idp_core::mds::MdsEntry;

use crate::prelude::*;

pub async fn get_mds_entry(
	State(app): State<App>,
	Path(aaguid): Path<Uuid>,
) -> ClResult<Json<MdsEntry>> {
	app.mds_cache.get(&aaguid).map(Json).ok_or(Error::NotFound)
}

// vim: ts=4
