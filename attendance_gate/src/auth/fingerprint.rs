//! Browser fingerprint derivation.
//!
//! A fingerprint is a SHA-256 over a fixed, ordered subset of request headers.
//! It is a weak identifier: two browsers sending identical headers collide.

use sha2::{Digest, Sha256};

use super::models::RequestContext;

/// Headers contributing to the fingerprint, in hashing order
pub const FINGERPRINT_HEADERS: [&str; 4] = [
    "user-agent",
    "accept-language",
    "sec-ch-ua",
    "sec-ch-ua-platform",
];

/// Separator between header values
const SEPARATOR: &str = "|";

/// Lowercase hex SHA-256 of `input`
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Hash under which a session id is stored
pub fn hash_session_id(session_id: &str) -> String {
    sha256_hex(session_id)
}

/// Derive the fingerprint hash for a request.
///
/// Missing or blank headers are skipped. Returns `None` when none of the
/// headers is present, never the hash of an empty string.
pub fn derive(request: &RequestContext) -> Option<String> {
    let parts: Vec<&str> = FINGERPRINT_HEADERS
        .iter()
        .filter_map(|name| request.header(name))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(sha256_hex(&parts.join(SEPARATOR)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> RequestContext {
        RequestContext::new()
            .with_header("User-Agent", "Mozilla/5.0 Chrome/126")
            .with_header("Accept-Language", "ko-KR,ko;q=0.9")
            .with_header("Sec-CH-UA", "\"Chromium\";v=\"126\"")
            .with_header("Sec-CH-UA-Platform", "\"Android\"")
    }

    #[test]
    fn test_no_headers_no_fingerprint() {
        assert_eq!(derive(&RequestContext::new()), None);
        let blank = RequestContext::new().with_header("user-agent", "   ");
        assert_eq!(derive(&blank), None);
    }

    #[test]
    fn test_unrelated_headers_ignored() {
        let request = RequestContext::new().with_header("cookie", "a=b");
        assert_eq!(derive(&request), None);
    }

    #[test]
    fn test_identical_headers_collide() {
        assert_eq!(derive(&chrome()), derive(&chrome()));
    }

    #[test]
    fn test_any_header_change_changes_hash() {
        let other = chrome().with_header("accept-language", "en-US");
        assert_ne!(derive(&chrome()), derive(&other));
    }

    #[test]
    fn test_known_value() {
        let request = RequestContext::new()
            .with_header("user-agent", " UA ")
            .with_header("sec-ch-ua-platform", "Linux");
        assert_eq!(derive(&request), Some(sha256_hex("UA|Linux")));
    }

    #[test]
    fn test_session_id_hash_is_hex_sha256() {
        let hash = hash_session_id("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
