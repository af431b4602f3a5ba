//! Error handling subsystem. Implements a custom Error type and its HTTP mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::prelude::*;
use crate::types::{OAuthErrorResponse, ErrorResponse};

pub type ClResult<T> = std::result::Result<T, Error>;

/// Which wire shape an error should render as when it reaches the edge.
///
/// The OAuth2 token/authorize endpoints use `{error, error_description}`;
/// every other surface uses the `{code, error, msg}` API shape from §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSurface {
	Api,
	OAuth2,
}

#[derive(Debug)]
pub enum Error {
	// Client input
	InvalidRequest(String),
	InvalidGrantType,
	InvalidClient,
	InvalidToken,
	BadResponseType,
	NoKeys,
	UnknownUserId,
	InvalidChallenge(String),

	// Authorization
	Unauthorized,
	UnsupportedAuthMethod,
	NotAdmin,
	WrongApp,

	// Challenge state machine
	NotFound,
	Signed,
	Pending,
	Viewed,
	Rejected,
	Expired,
	Collected,
	AuthorizationPending,
	AccessDenied,

	// Security
	ReusedRefreshToken,
	MalformedRefreshToken,

	// Internal
	Internal(String),
	DbError,
	KeyError(String),
	NoServerKeys,
	UnsupportedAlg,

	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		warn!("io error: {}", err);
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		warn!("json error: {}", err);
		Error::Internal("serialization error".into())
	}
}

impl From<jsonwebtoken::errors::Error> for Error {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		warn!("jwt error: {}", err);
		Error::InvalidToken
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self)
	}
}

impl std::error::Error for Error {}

impl Error {
	/// HTTP status, short error code, and human message for the given kind.
	fn parts(&self) -> (StatusCode, &'static str, String) {
		match self {
			Error::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
			Error::InvalidGrantType => {
				(StatusCode::BAD_REQUEST, "invalid_grant_type", "Unsupported grant_type".into())
			}
			Error::InvalidClient => {
				(StatusCode::BAD_REQUEST, "invalid_client", "Unknown or unauthenticated client".into())
			}
			Error::InvalidToken => (StatusCode::BAD_REQUEST, "invalid_token", "Invalid token".into()),
			Error::BadResponseType => (
				StatusCode::BAD_REQUEST,
				"bad_response_type",
				"Unknown response type (only \"code\" supported)".into(),
			),
			Error::NoKeys => (StatusCode::BAD_REQUEST, "no_keys", "User has no keys".into()),
			Error::UnknownUserId => {
				(StatusCode::BAD_REQUEST, "unknown_user_id", "Unknown user id".into())
			}
			Error::InvalidChallenge(msg) => {
				(StatusCode::BAD_REQUEST, "invalid_challenge", msg.clone())
			}
			Error::Unauthorized => {
				(StatusCode::UNAUTHORIZED, "unauthorized", "Authentication required".into())
			}
			Error::UnsupportedAuthMethod => (
				StatusCode::UNAUTHORIZED,
				"unsupported_auth_method",
				"Unsupported client authentication method".into(),
			),
			Error::NotAdmin => {
				(StatusCode::FORBIDDEN, "not_admin", "Application is not an admin client".into())
			}
			Error::WrongApp => {
				(StatusCode::BAD_REQUEST, "wrong_app", "Session belongs to a different client".into())
			}
			Error::NotFound => (StatusCode::NOT_FOUND, "not_found", "Resource not found".into()),
			Error::Signed => {
				(StatusCode::BAD_REQUEST, "signed", "Challenge has already been signed".into())
			}
			Error::Pending => {
				(StatusCode::BAD_REQUEST, "pending", "Waiting for user to view the challenge".into())
			}
			Error::Viewed => {
				(StatusCode::BAD_REQUEST, "viewed", "Waiting for user to sign the challenge".into())
			}
			Error::Rejected => {
				(StatusCode::BAD_REQUEST, "rejected", "Challenge was rejected by the user".into())
			}
			Error::Expired => (StatusCode::BAD_REQUEST, "expired_token", "Challenge has expired".into()),
			Error::Collected => {
				(StatusCode::BAD_REQUEST, "collected", "Challenge has already been collected".into())
			}
			Error::AuthorizationPending => (
				StatusCode::BAD_REQUEST,
				"authorization_pending",
				"The end-user has not yet completed the authorization request".into(),
			),
			Error::AccessDenied => {
				(StatusCode::BAD_REQUEST, "access_denied", "User rejected the request".into())
			}
			Error::ReusedRefreshToken => (
				StatusCode::BAD_REQUEST,
				"reused_refresh_token",
				"Refresh token has already been used".into(),
			),
			Error::MalformedRefreshToken => {
				(StatusCode::BAD_REQUEST, "malformed_refresh_token", "Malformed refresh token".into())
			}
			Error::Internal(msg) => {
				warn!("internal error: {}", msg);
				(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error".into())
			}
			Error::DbError => {
				(StatusCode::INTERNAL_SERVER_ERROR, "db_error", "Internal server error".into())
			}
			Error::KeyError(msg) => {
				warn!("key error: {}", msg);
				(StatusCode::INTERNAL_SERVER_ERROR, "key_error", "Internal server error".into())
			}
			Error::NoServerKeys => (
				StatusCode::INTERNAL_SERVER_ERROR,
				"no_server_keys",
				"No signing key available".into(),
			),
			Error::UnsupportedAlg => {
				(StatusCode::BAD_REQUEST, "unsupported_alg", "Unsupported algorithm".into())
			}
			Error::Io(_) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error".into())
			}
		}
	}

	/// Render this error under the OAuth2 `{error, error_description}` shape
	/// instead of the default API shape. Used by handlers on the token and
	/// authorize endpoints.
	pub fn into_oauth2_response(self) -> axum::response::Response {
		let (status, code, message) = self.parts();
		(status, Json(OAuthErrorResponse::new(code, message))).into_response()
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let (status, code, message) = self.parts();
		(status, Json(ErrorResponse::new(code, message))).into_response()
	}
}

// vim: ts=4
