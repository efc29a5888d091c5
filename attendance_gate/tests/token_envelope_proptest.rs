/// Property-based tests for the session token envelope using proptest
///
/// These tests verify that sealed tokens open to the same claims under the
/// same secret and are rejected after any single-byte corruption or under
/// another secret.
use attendance_gate::auth::{SecretCipher, TokenClaims};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use proptest::prelude::*;

// Strategy to generate token claims with realistic ids and expiries
fn claims_strategy() -> impl Strategy<Value = TokenClaims> {
    ("[A-Za-z0-9_-]{1,64}", 0i64..=4_102_444_800).prop_map(|(id, exp)| TokenClaims { id, exp })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_sealed_claims_open_unchanged(claims in claims_strategy(), secret in "[ -~]{1,32}") {
        prop_assume!(!secret.trim().is_empty());
        let cipher = SecretCipher::from_secret(&secret).unwrap();

        let token = cipher.seal_token(&claims).unwrap();
        prop_assert_eq!(cipher.open_token(&token), Some(claims));
    }

    #[test]
    fn test_any_flipped_byte_is_rejected(claims in claims_strategy(), index in any::<prop::sample::Index>(), bit in 0u8..8) {
        let cipher = SecretCipher::from_secret("proptest secret").unwrap();
        let token = cipher.seal_token(&claims).unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let i = index.index(bytes.len());
        bytes[i] ^= 1 << bit;
        let tampered = URL_SAFE_NO_PAD.encode(&bytes);

        prop_assert_eq!(cipher.open_token(&tampered), None);
    }

    #[test]
    fn test_other_secret_cannot_open(claims in claims_strategy()) {
        let cipher = SecretCipher::from_secret("first secret").unwrap();
        let other = SecretCipher::from_secret("second secret").unwrap();

        let token = cipher.seal_token(&claims).unwrap();
        prop_assert_eq!(other.open_token(&token), None);
    }
}
