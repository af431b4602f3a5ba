//! Utility functions shared by the engine and adapter crates.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::prelude::*;
use rand::RngExt;

const ID_ALPHABET: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

/// A random, URL-safe id of `len` characters drawn from an alphanumeric alphabet.
/// Used for opaque identifiers (user id, session id) where length doesn't matter
/// for guessing resistance, since access still requires the bearer secret.
pub fn random_id(len: usize) -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(len);
	for _ in 0..len {
		result.push(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]);
	}
	result
}

/// A random hex string of `bytes * 2` characters. Used for challenge and code
/// ids, which are guessed-against directly and so need full entropy per byte.
pub fn random_hex(bytes: usize) -> String {
	let mut rng = rand::rng();
	let mut buf = vec![0u8; bytes];
	rng.fill(&mut buf[..]);
	buf.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hex-encoded SHA-256 of `data`. Used as the stable primary key for a
/// WebAuthn credential, derived from its (potentially large) credential id.
pub fn sha256_hex(data: &[u8]) -> String {
	let digest = Sha256::digest(data);
	digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Constant-time byte comparison, for client secrets and PKCE verifiers where
/// a timing side-channel would leak how many leading bytes matched.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}
	let mut diff = 0u8;
	for (x, y) in a.iter().zip(b.iter()) {
		diff |= x ^ y;
	}
	diff == 0
}

/// Decode a JWT payload without verifying the signature.
///
/// WARNING: this must always be followed by proper signature verification.
/// It only peeks at the payload to determine routing info (issuer, key id).
pub fn decode_jwt_no_verify<T: DeserializeOwned>(jwt: &str) -> ClResult<T> {
	let mut parts = jwt.splitn(3, '.');
	let _header = parts.next().ok_or(Error::InvalidToken)?;
	let payload = parts.next().ok_or(Error::InvalidToken)?;
	let _sig = parts.next().ok_or(Error::InvalidToken)?;
	let payload = URL_SAFE_NO_PAD.decode(payload.as_bytes()).map_err(|_| Error::InvalidToken)?;
	let payload: T = serde_json::from_slice(&payload).map_err(|_| Error::InvalidToken)?;
	Ok(payload)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn random_id_has_requested_length() {
		assert_eq!(random_id(24).len(), 24);
		assert_ne!(random_id(24), random_id(24));
	}

	#[test]
	fn random_hex_is_lowercase_hex_of_double_length() {
		let id = random_hex(8);
		assert_eq!(id.len(), 16);
		assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	}

	#[test]
	fn sha256_hex_is_stable_and_deterministic() {
		let a = sha256_hex(b"hello");
		let b = sha256_hex(b"hello");
		assert_eq!(a, b);
		assert_eq!(a.len(), 64);
		assert_ne!(a, sha256_hex(b"world"));
	}

	#[test]
	fn constant_time_eq_matches_naive_comparison() {
		assert!(constant_time_eq(b"abc", b"abc"));
		assert!(!constant_time_eq(b"abc", b"abd"));
		assert!(!constant_time_eq(b"abc", b"ab"));
	}
}

// vim: ts=4
