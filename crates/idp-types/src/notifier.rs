//! CIBA `push` delivery mode (§4.8 of the dispatcher). The interface exists
//! because the wire contract requires it; no concrete HTTP-delivery
//! implementation is wired up by default in this workspace.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait Notifier: Debug + Send + Sync {
	async fn notify(
		&self,
		notification_endpoint: &str,
		client_notification_token: &str,
		auth_req_id: &str,
	) -> ClResult<()>;
}

// vim: ts=4
