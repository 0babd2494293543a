// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HMAC-signed nonces for the wallet sign-in challenge.
//!
//! A nonce is 32 lowercase hex characters taken from a random UUID v4. The
//! signature is the hex-encoded HMAC-SHA256 of the nonce under
//! `HMAC_SECRET_KEY`.

use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use utoipa::ToSchema;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum NonceError {
    #[error("nonce secret must not be empty")]
    EmptySecret,
    #[error("nonce secret rejected by HMAC: {0}")]
    InvalidKey(String),
}

/// Response body for `GET /api/nonce`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedNonce {
    pub nonce: String,
    pub signed_nonce: String,
}

#[derive(Clone)]
pub struct NonceSigner {
    secret: Arc<[u8]>,
}

impl NonceSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, NonceError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(NonceError::EmptySecret);
        }
        Ok(Self {
            secret: Arc::from(secret),
        })
    }

    /// Fresh random nonce with its signature.
    pub fn issue(&self) -> Result<IssuedNonce, NonceError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let signed_nonce = self.sign(&nonce)?;
        Ok(IssuedNonce {
            nonce,
            signed_nonce,
        })
    }

    pub fn sign(&self, nonce: &str) -> Result<String, NonceError> {
        let mut mac = self.mac()?;
        mac.update(nonce.as_bytes());
        Ok(alloy::hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of a nonce against its hex signature.
    pub fn verify(&self, nonce: &str, signed_nonce: &str) -> bool {
        let Ok(expected) = alloy::hex::decode(signed_nonce) else {
            return false;
        };
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(nonce.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn mac(&self) -> Result<HmacSha256, NonceError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| NonceError::InvalidKey(e.to_string()))
    }
}

impl fmt::Debug for NonceSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_rfc4231_vector() {
        let signer = NonceSigner::new("Jefe").unwrap();
        assert_eq!(
            signer.sign("what do ya want for nothing?").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn issued_nonce_is_32_hex_chars_and_verifies() {
        let signer = NonceSigner::new("secret").unwrap();
        let issued = signer.issue().unwrap();

        assert_eq!(issued.nonce.len(), 32);
        assert!(issued.nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(issued.signed_nonce.len(), 64);
        assert!(signer.verify(&issued.nonce, &issued.signed_nonce));
    }

    #[test]
    fn nonces_are_fresh() {
        let signer = NonceSigner::new("secret").unwrap();
        assert_ne!(signer.issue().unwrap().nonce, signer.issue().unwrap().nonce);
    }

    #[test]
    fn verify_rejects_tampering() {
        let signer = NonceSigner::new("secret").unwrap();
        let issued = signer.issue().unwrap();

        assert!(!signer.verify("0000", &issued.signed_nonce));
        assert!(!signer.verify(&issued.nonce, "zz-not-hex"));
        let other = NonceSigner::new("other").unwrap();
        assert!(!other.verify(&issued.nonce, &issued.signed_nonce));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(NonceSigner::new(""), Err(NonceError::EmptySecret)));
    }

    #[test]
    fn debug_redacts_secret() {
        let signer = NonceSigner::new("super-secret").unwrap();
        assert!(!format!("{signer:?}").contains("super-secret"));
    }
}
