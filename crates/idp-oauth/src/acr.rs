//! Maps an OAuth2 `acr_values` string to a WebAuthn user-verification policy.

use idp_webauthn::UserVerificationPolicy;

/// `acr_values` is a space-separated list in preference order. The first
/// recognized value wins; an unrecognized or absent list defaults to
/// `preferred`, matching the library's own default posture.
pub fn acr_values_to_uv_policy(acr_values: Option<&str>) -> UserVerificationPolicy {
	let Some(values) = acr_values else {
		return UserVerificationPolicy::Preferred;
	};
	for value in values.split_whitespace() {
		match value {
			"urn:webauthn:verify" => return UserVerificationPolicy::Required,
			"urn:webauthn:prefer-verify" => return UserVerificationPolicy::Preferred,
			"urn:webauthn:presence" => return UserVerificationPolicy::Discouraged,
			_ => continue,
		}
	}
	UserVerificationPolicy::Preferred
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verify_maps_to_required() {
		assert_eq!(acr_values_to_uv_policy(Some("urn:webauthn:verify")), UserVerificationPolicy::Required);
	}

	#[test]
	fn presence_maps_to_discouraged() {
		assert_eq!(
			acr_values_to_uv_policy(Some("urn:webauthn:presence")),
			UserVerificationPolicy::Discouraged
		);
	}

	#[test]
	fn unrecognized_or_missing_defaults_to_preferred() {
		assert_eq!(acr_values_to_uv_policy(None), UserVerificationPolicy::Preferred);
		assert_eq!(acr_values_to_uv_policy(Some("urn:unknown:value")), UserVerificationPolicy::Preferred);
	}

	#[test]
	fn first_recognized_value_in_list_wins() {
		assert_eq!(
			acr_values_to_uv_policy(Some("urn:unknown:value urn:webauthn:verify")),
			UserVerificationPolicy::Required
		);
	}
}

// vim: ts=4
