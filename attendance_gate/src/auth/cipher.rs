//! Symmetric authenticated encryption for the stored password and session
//! tokens.
//!
//! Key: SHA-256 of the operator secret. Cipher: AES-256-GCM with a random
//! 96-bit nonce per message. Envelope, base64url without padding so it can
//! sit in a query string untouched:
//!
//! ```text
//! version (1 byte) || nonce (12 bytes) || ciphertext + tag
//! ```
//!
//! The same key protects both the stored password and token payloads.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use super::{
    errors::{AuthError, AuthResult},
    models::TokenClaims,
};

/// Envelope format version
const ENVELOPE_VERSION: u8 = 1;

/// Nonce size for AES-256-GCM (12 bytes / 96 bits)
const NONCE_SIZE: usize = 12;

/// AES-GCM tag size
const TAG_SIZE: usize = 16;

/// Cipher keyed from the operator secret
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Derive the key from a secret string
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingEncryptionKey` - Secret is empty or whitespace
    pub fn from_secret(secret: &str) -> AuthResult<Self> {
        if secret.trim().is_empty() {
            return Err(AuthError::MissingEncryptionKey);
        }
        let key = Sha256::digest(secret.as_bytes());
        Ok(Self {
            cipher: Aes256Gcm::new(&key),
        })
    }

    /// Encrypt plaintext into a base64url envelope
    pub fn encrypt(&self, plaintext: &str) -> AuthResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AuthError::EncryptionFailed)?;

        let mut envelope = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
        envelope.push(ENVELOPE_VERSION);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(envelope))
    }

    /// Decrypt an envelope produced by [`SecretCipher::encrypt`]
    ///
    /// # Errors
    ///
    /// * `AuthError::DecryptionFailed` - Empty input, bad base64, unknown
    ///   version, truncated envelope, failed tag check or non-UTF-8 plaintext
    pub fn decrypt(&self, envelope: &str) -> AuthResult<String> {
        let envelope = envelope.trim();
        if envelope.is_empty() {
            return Err(AuthError::DecryptionFailed);
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(envelope)
            .map_err(|_| AuthError::DecryptionFailed)?;
        if bytes.len() < 1 + NONCE_SIZE + TAG_SIZE || bytes[0] != ENVELOPE_VERSION {
            return Err(AuthError::DecryptionFailed);
        }

        let (nonce, ciphertext) = bytes[1..].split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AuthError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| AuthError::DecryptionFailed)
    }

    /// Seal `{id, exp}` into a session token
    pub fn seal_token(&self, claims: &TokenClaims) -> AuthResult<String> {
        let payload = serde_json::to_string(claims).map_err(|_| AuthError::EncryptionFailed)?;
        self.encrypt(&payload)
    }

    /// Open a session token. Every failure mode yields `None`: a malformed
    /// token is treated exactly like no token.
    pub fn open_token(&self, token: &str) -> Option<TokenClaims> {
        let payload = self.decrypt(token).ok()?;
        serde_json::from_str(&payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> SecretCipher {
        SecretCipher::from_secret("operator secret").unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = cipher();
        let sealed = cipher.encrypt("abc").unwrap();
        assert_ne!(sealed, "abc");
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "abc");
    }

    #[test]
    fn test_envelope_is_query_safe() {
        let sealed = cipher().encrypt("welcome1").unwrap();
        assert!(
            sealed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_nonce_makes_ciphertexts_differ() {
        let cipher = cipher();
        assert_ne!(cipher.encrypt("same").unwrap(), cipher.encrypt("same").unwrap());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SecretCipher::from_secret(""),
            Err(AuthError::MissingEncryptionKey)
        ));
        assert!(matches!(
            SecretCipher::from_secret("   "),
            Err(AuthError::MissingEncryptionKey)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = cipher().encrypt("abc").unwrap();
        let other = SecretCipher::from_secret("another secret").unwrap();
        assert!(matches!(other.decrypt(&sealed), Err(AuthError::DecryptionFailed)));
    }

    #[test]
    fn test_token_roundtrip() {
        let cipher = cipher();
        let claims = TokenClaims {
            id: "session-id".to_string(),
            exp: 1_800_000_000,
        };
        let token = cipher.seal_token(&claims).unwrap();
        assert_eq!(cipher.open_token(&token), Some(claims));
    }

    #[test]
    fn test_flipped_byte_token_is_absent() {
        let cipher = cipher();
        let token = cipher
            .seal_token(&TokenClaims {
                id: "id".to_string(),
                exp: 42,
            })
            .unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);

        assert_eq!(cipher.open_token(&tampered), None);
    }

    #[test]
    fn test_garbage_tokens_are_absent() {
        let cipher = cipher();
        assert_eq!(cipher.open_token(""), None);
        assert_eq!(cipher.open_token("not base64 !!"), None);
        assert_eq!(cipher.open_token("AAAA"), None);
        // Valid envelope, but not a claims payload
        let sealed = cipher.encrypt("{\"id\":\"x\"}").unwrap();
        assert_eq!(cipher.open_token(&sealed), None);
    }
}
