//! Redirect-URI allow-set comparison (part of C10's read surface).

use idp_types::types::Application;
use url::Url;

/// Compares `uri` against the application's `redirect_uris`, ignoring query
/// and fragment on both sides. `uri` must additionally carry no fragment of
/// its own — fragments are never meaningful on a redirect target.
pub fn is_allowed_redirect(app: &Application, uri: &Url) -> bool {
	if uri.fragment().is_some() {
		return false;
	}
	app.redirect_uris.iter().any(|allowed| {
		let Ok(allowed) = Url::parse(allowed) else {
			return false;
		};
		allowed.scheme() == uri.scheme() && allowed.host_str() == uri.host_str() && allowed.path() == uri.path()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use idp_types::types::{CibaMode, KeyAlg};

	fn app_with_redirects(uris: &[&str]) -> Application {
		Application {
			id: "demo".into(),
			secret: "demo-secret".into(),
			name: "Demo".into(),
			description: None,
			icon: None,
			id_token_alg: KeyAlg::ES256,
			key_id: "k1".into(),
			admin: false,
			ciba_mode: CibaMode::Poll,
			notification_endpoint: None,
			redirect_uris: uris.iter().map(|s| (*s).into()).collect(),
		}
	}

	#[test]
	fn ignores_query_and_fragment_on_the_candidate() {
		let app = app_with_redirects(&["https://example.test/cb"]);
		let uri = Url::parse("https://example.test/cb?state=abc").unwrap();
		assert!(is_allowed_redirect(&app, &uri));
	}

	#[test]
	fn rejects_a_fragment_on_the_candidate() {
		let app = app_with_redirects(&["https://example.test/cb"]);
		let uri = Url::parse("https://example.test/cb#frag").unwrap();
		assert!(!is_allowed_redirect(&app, &uri));
	}

	#[test]
	fn rejects_unlisted_path() {
		let app = app_with_redirects(&["https://example.test/cb"]);
		let uri = Url::parse("https://example.test/other").unwrap();
		assert!(!is_allowed_redirect(&app, &uri));
	}
}

// vim: ts=4
