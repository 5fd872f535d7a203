//! Integrity token computation and verification.
//!
//! The token is a 32-bit value derived from the payload fields with
//! SHA3-256, truncated to the first four bytes. It detects tampering, bit
//! corruption from a non-lossless round-trip, and extraction from the wrong
//! region; it does not distinguish between those causes.
//!
//! Any key material is passed in explicitly through [`TokenKeyProvider`]
//! rather than read from process-wide state, so token computation stays
//! independently testable and thread-safe. [`UnkeyedToken`] (an empty key)
//! is the default; deployments that want the token to double as a light
//! authenticator use [`SecretTokenKey`].

use sha3::{Digest, Sha3_256};
use zeroize::Zeroizing;

use crate::error::{Result, SigilError};
use crate::payload::MemberPayload;

/// Source of the key mixed into the integrity token.
///
/// Implementations must be thread-safe (`Send + Sync`); the token functions
/// borrow the provider per call and hold no state between calls.
pub trait TokenKeyProvider: Send + Sync {
    /// Key bytes mixed into the token hash. May be empty.
    fn token_key(&self) -> &[u8];
}

/// The default, unkeyed token: a plain truncated hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnkeyedToken;

impl TokenKeyProvider for UnkeyedToken {
    fn token_key(&self) -> &[u8] {
        &[]
    }
}

/// A secret token key, zeroized on drop.
pub struct SecretTokenKey {
    key: Zeroizing<Vec<u8>>,
}

impl SecretTokenKey {
    pub fn new(key: Vec<u8>) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }
}

impl TokenKeyProvider for SecretTokenKey {
    fn token_key(&self) -> &[u8] {
        &self.key
    }
}

/// Compute the integrity token over version, tier, and member id, in that
/// order, prefixed by the provider's key.
///
/// The member id is length-prefixed before hashing so that field boundaries
/// are unambiguous.
pub fn token<K: TokenKeyProvider>(
    key: &K,
    version: u8,
    tier: u8,
    member_id: &[u8],
) -> u32 {
    let mut hasher = Sha3_256::new();
    hasher.update(key.token_key());
    hasher.update([version, tier]);
    hasher.update((member_id.len() as u32).to_be_bytes());
    hasher.update(member_id);
    let digest = hasher.finalize();

    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Recompute the token for a decoded payload and compare it against the
/// embedded one.
///
/// The token is always recomputed in full before the single comparison; no
/// field-by-field short-circuiting.
pub fn verify<K: TokenKeyProvider>(key: &K, payload: &MemberPayload) -> Result<()> {
    let expected = token(key, payload.version, payload.tier, &payload.member_id);
    if expected == payload.token {
        Ok(())
    } else {
        Err(SigilError::IntegrityMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_deterministic() {
        let a = token(&UnkeyedToken, 1, 2, b"M-00042");
        let b = token(&UnkeyedToken, 1, 2, b"M-00042");
        assert_eq!(a, b);
    }

    #[test]
    fn token_depends_on_every_field() {
        let base = token(&UnkeyedToken, 1, 2, b"M-00042");
        assert_ne!(base, token(&UnkeyedToken, 2, 2, b"M-00042"));
        assert_ne!(base, token(&UnkeyedToken, 1, 3, b"M-00042"));
        assert_ne!(base, token(&UnkeyedToken, 1, 2, b"M-00043"));
    }

    #[test]
    fn keyed_token_differs_from_unkeyed() {
        let keyed = SecretTokenKey::new(b"archive-sanctum".to_vec());
        assert_ne!(
            token(&UnkeyedToken, 1, 2, b"M-00042"),
            token(&keyed, 1, 2, b"M-00042"),
        );
    }

    #[test]
    fn verify_accepts_matching_token() {
        let payload = MemberPayload::new(1, 2, b"M-00042".to_vec(), &UnkeyedToken).unwrap();
        assert!(verify(&UnkeyedToken, &payload).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_field() {
        let mut payload = MemberPayload::new(1, 2, b"M-00042".to_vec(), &UnkeyedToken).unwrap();
        payload.tier = 3;
        assert!(matches!(
            verify(&UnkeyedToken, &payload),
            Err(SigilError::IntegrityMismatch)
        ));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let issue_key = SecretTokenKey::new(b"issuer".to_vec());
        let scan_key = SecretTokenKey::new(b"someone-else".to_vec());
        let payload = MemberPayload::new(1, 2, b"M-00042".to_vec(), &issue_key).unwrap();
        assert!(verify(&issue_key, &payload).is_ok());
        assert!(matches!(
            verify(&scan_key, &payload),
            Err(SigilError::IntegrityMismatch)
        ));
    }
}
