//! Keyed HMAC-SHA256 verifiers for session token secrets.

use std::fmt::{self, Debug, Formatter};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted key length in bytes.
pub const MIN_HMAC_KEY_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenHasherError {
    #[error("token HMAC key is not valid base64")]
    InvalidKeyEncoding,

    #[error("token HMAC key must be at least {MIN_HMAC_KEY_BYTES} bytes")]
    KeyTooShort,
}

#[derive(Clone)]
pub struct TokenHasher {
    keyed: HmacSha256,
}

impl Debug for TokenHasher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("TokenHasher(**redacted**)")
    }
}

impl TokenHasher {
    /// Build a hasher from a base64-encoded key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not decode or is too short.
    pub fn from_base64(encoded: &str) -> Result<Self, TokenHasherError> {
        let key = Zeroizing::new(
            BASE64
                .decode(encoded.trim())
                .map_err(|_| TokenHasherError::InvalidKeyEncoding)?,
        );

        if key.len() < MIN_HMAC_KEY_BYTES {
            return Err(TokenHasherError::KeyTooShort);
        }

        let keyed =
            HmacSha256::new_from_slice(&key).map_err(|_| TokenHasherError::KeyTooShort)?;

        Ok(Self { keyed })
    }

    /// Hex-encoded verifier for `input`.
    #[must_use]
    pub fn hmac(&self, input: &[u8]) -> String {
        let mut mac = self.keyed.clone();

        mac.update(input);

        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time comparison of `input` against a stored verifier.
    #[must_use]
    pub fn verify(&self, input: &[u8], verifier: &str) -> bool {
        let Ok(expected) = hex::decode(verifier) else {
            return false;
        };

        let mut mac = self.keyed.clone();

        mac.update(input);

        mac.verify_slice(&expected).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> TokenHasher {
        TokenHasher::from_base64(&BASE64.encode([7_u8; 32])).expect("valid key")
    }

    #[test]
    fn verifier_matches_its_input_only() {
        let hasher = hasher();
        let verifier = hasher.hmac(b"token-input");

        assert_eq!(verifier.len(), 64);
        assert!(hasher.verify(b"token-input", &verifier));
        assert!(!hasher.verify(b"other-input", &verifier));
        assert!(!hasher.verify(b"token-input", "not-hex"));
    }

    #[test]
    fn different_keys_disagree() {
        let other = TokenHasher::from_base64(&BASE64.encode([8_u8; 32])).expect("valid key");

        assert_ne!(hasher().hmac(b"input"), other.hmac(b"input"));
    }

    #[test]
    fn short_or_malformed_keys_are_rejected() {
        assert_eq!(
            TokenHasher::from_base64(&BASE64.encode([1_u8; 16])).map(|_| ()),
            Err(TokenHasherError::KeyTooShort)
        );
        assert_eq!(
            TokenHasher::from_base64("%%%").map(|_| ()),
            Err(TokenHasherError::InvalidKeyEncoding)
        );
    }
}
