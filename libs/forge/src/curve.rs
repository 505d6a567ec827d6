//! Elliptic curves supported by Tezos implicit accounts
//!
//! Every curve signs the 32-byte generic hash of the message:
//!
//! - `Ed25519` (`tz1`): RFC 8032 signature over the digest
//! - `Secp256k1` (`tz2`): ECDSA with RFC 6979 nonces, low-S normalised, `r‖s`
//! - `NistP256` (`tz3`): ECDSA with RFC 6979 nonces, `r‖s`

use crate::hash;
use crate::prefix;
use crate::signature::Signature;
use ed25519_dalek::{Signer, Verifier};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use std::fmt;
use thiserror::Error;

/// Curve errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Secret bytes are not a valid scalar for the curve
    #[error("Key derivation failed on {curve}: {reason}")]
    KeyDerivation {
        /// Curve the key was meant for
        curve: CurveKind,
        /// Underlying failure
        reason: String,
    },

    /// Signing primitive failed
    #[error("Signing failed on {curve}: {reason}")]
    Signing {
        /// Curve used for signing
        curve: CurveKind,
        /// Underlying failure
        reason: String,
    },
}

/// Result type for curve operations
pub type Result<T> = std::result::Result<T, CurveError>;

/// Length of every raw secret key and Ed25519 seed
pub const SECRET_KEY_SIZE: usize = 32;

/// Curve family of an implicit account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    /// `tz1` accounts
    Ed25519,
    /// `tz2` accounts
    Secp256k1,
    /// `tz3` accounts
    NistP256,
}

impl CurveKind {
    /// All supported curves, in tag order
    pub const ALL: [Self; 3] = [Self::Ed25519, Self::Secp256k1, Self::NistP256];

    /// One-byte tag used in forged public keys and public key hashes
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Ed25519 => 0,
            Self::Secp256k1 => 1,
            Self::NistP256 => 2,
        }
    }

    /// Curve for a forged tag byte
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|curve| curve.tag() == tag)
    }

    /// Public key hash prefix (`tz1`/`tz2`/`tz3`)
    #[must_use]
    pub fn address_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => prefix::TZ1,
            Self::Secp256k1 => prefix::TZ2,
            Self::NistP256 => prefix::TZ3,
        }
    }

    /// Public key prefix (`edpk`/`sppk`/`p2pk`)
    #[must_use]
    pub fn public_key_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => prefix::EDPK,
            Self::Secp256k1 => prefix::SPPK,
            Self::NistP256 => prefix::P2PK,
        }
    }

    /// Secret key prefix (`edsk`/`spsk`/`p2sk`)
    ///
    /// Ed25519 secret keys are rendered in the 64-byte form (seed then public key).
    #[must_use]
    pub fn secret_key_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => prefix::EDSK,
            Self::Secp256k1 => prefix::SPSK,
            Self::NistP256 => prefix::P2SK,
        }
    }

    /// Signature prefix (`edsig`/`spsig1`/`p2sig`)
    #[must_use]
    pub fn signature_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => prefix::EDSIG,
            Self::Secp256k1 => prefix::SPSIG,
            Self::NistP256 => prefix::P2SIG,
        }
    }

    /// Encrypted secret prefix (`edesk`/`spesk`/`p2esk`)
    #[must_use]
    pub fn encrypted_secret_prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => prefix::EDESK,
            Self::Secp256k1 => prefix::SPESK,
            Self::NistP256 => prefix::P2ESK,
        }
    }

    /// Size of a raw public key (Ed25519 point, or compressed SEC1 point)
    #[must_use]
    pub fn public_key_size(self) -> usize {
        match self {
            Self::Ed25519 => 32,
            Self::Secp256k1 | Self::NistP256 => 33,
        }
    }

    /// Infer the curve from the leading characters of a Base58Check string
    ///
    /// Recognises secret keys, encrypted secrets, public keys, public key
    /// hashes and signatures.
    #[must_use]
    pub fn from_b58_prefix(s: &str) -> Option<Self> {
        const TAGS: [(&str, CurveKind); 15] = [
            ("edesk", CurveKind::Ed25519),
            ("spesk", CurveKind::Secp256k1),
            ("p2esk", CurveKind::NistP256),
            ("edsig", CurveKind::Ed25519),
            ("spsig", CurveKind::Secp256k1),
            ("p2sig", CurveKind::NistP256),
            ("edsk", CurveKind::Ed25519),
            ("spsk", CurveKind::Secp256k1),
            ("p2sk", CurveKind::NistP256),
            ("edpk", CurveKind::Ed25519),
            ("sppk", CurveKind::Secp256k1),
            ("p2pk", CurveKind::NistP256),
            ("tz1", CurveKind::Ed25519),
            ("tz2", CurveKind::Secp256k1),
            ("tz3", CurveKind::NistP256),
        ];
        TAGS.iter()
            .find(|(tag, _)| s.starts_with(tag))
            .map(|&(_, curve)| curve)
    }

    fn derivation_error(self, reason: impl fmt::Display) -> CurveError {
        CurveError::KeyDerivation {
            curve: self,
            reason: reason.to_string(),
        }
    }

    /// Derive the raw public key from a 32-byte secret
    pub fn derive_public_key(self, secret: &[u8; SECRET_KEY_SIZE]) -> Result<Vec<u8>> {
        match self {
            Self::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::from_bytes(secret);
                Ok(signing_key.verifying_key().to_bytes().to_vec())
            }
            Self::Secp256k1 => {
                let signing_key = k256::ecdsa::SigningKey::from_slice(secret)
                    .map_err(|e| self.derivation_error(e))?;
                Ok(signing_key.verifying_key().to_encoded_point(true).as_bytes().to_vec())
            }
            Self::NistP256 => {
                let signing_key = p256::ecdsa::SigningKey::from_slice(secret)
                    .map_err(|e| self.derivation_error(e))?;
                Ok(signing_key.verifying_key().to_encoded_point(true).as_bytes().to_vec())
            }
        }
    }

    /// Sign the generic hash of `message`
    ///
    /// No watermark is added here; see [`crate::watermark`].
    pub fn sign(self, message: &[u8], secret: &[u8; SECRET_KEY_SIZE]) -> Result<Signature> {
        let digest = hash::digest_256(&[message]);
        let signing_error = |e: k256::ecdsa::Error| CurveError::Signing {
            curve: self,
            reason: e.to_string(),
        };

        let mut bytes = [0u8; Signature::SIZE];
        match self {
            Self::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::from_bytes(secret);
                bytes.copy_from_slice(&signing_key.sign(&digest).to_bytes());
            }
            Self::Secp256k1 => {
                let signing_key = k256::ecdsa::SigningKey::from_slice(secret)
                    .map_err(|e| self.derivation_error(e))?;
                let signature =
                    PrehashSigner::<k256::ecdsa::Signature>::sign_prehash(&signing_key, &digest)
                        .map_err(signing_error)?;
                let signature = signature.normalize_s().unwrap_or(signature);
                bytes.copy_from_slice(&signature.to_bytes());
            }
            Self::NistP256 => {
                let signing_key = p256::ecdsa::SigningKey::from_slice(secret)
                    .map_err(|e| self.derivation_error(e))?;
                let signature =
                    PrehashSigner::<p256::ecdsa::Signature>::sign_prehash(&signing_key, &digest)
                        .map_err(signing_error)?;
                bytes.copy_from_slice(&signature.to_bytes());
            }
        }

        Ok(Signature::new(self, bytes))
    }

    /// Check a signature over the generic hash of `message`
    #[must_use]
    pub fn verify(
        self,
        message: &[u8],
        signature: &[u8; Signature::SIZE],
        public_key: &[u8],
    ) -> bool {
        let digest = hash::digest_256(&[message]);

        match self {
            Self::Ed25519 => {
                let Ok(public_key) = <&[u8; 32]>::try_from(public_key) else {
                    return false;
                };
                let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(public_key) else {
                    return false;
                };
                let signature = ed25519_dalek::Signature::from_bytes(signature);
                verifying_key.verify(&digest, &signature).is_ok()
            }
            Self::Secp256k1 => {
                let Ok(verifying_key) = k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
                else {
                    return false;
                };
                let Ok(signature) = k256::ecdsa::Signature::from_slice(signature) else {
                    return false;
                };
                // Signatures with a high S are rejected by the network
                if signature.normalize_s().is_some() {
                    return false;
                }
                verifying_key.verify_prehash(&digest, &signature).is_ok()
            }
            Self::NistP256 => {
                let Ok(verifying_key) = p256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
                else {
                    return false;
                };
                let Ok(signature) = p256::ecdsa::Signature::from_slice(signature) else {
                    return false;
                };
                verifying_key.verify_prehash(&digest, &signature).is_ok()
            }
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ed25519 => "ed25519",
            Self::Secp256k1 => "secp256k1",
            Self::NistP256 => "p256",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for CurveKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ed25519" | "tz1" => Ok(Self::Ed25519),
            "secp256k1" | "tz2" => Ok(Self::Secp256k1),
            "p256" | "nistp256" | "tz3" => Ok(Self::NistP256),
            other => Err(format!("Unknown curve: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_one() -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        secret
    }

    #[test]
    fn test_tags_roundtrip() {
        for curve in CurveKind::ALL {
            assert_eq!(CurveKind::from_tag(curve.tag()), Some(curve));
        }
        assert_eq!(CurveKind::from_tag(3), None);
    }

    #[test]
    fn test_ed25519_derivation() {
        let seed: [u8; 32] =
            hex::decode("7579c4881fb998d043417b7c04582aa15179f125c5303e1ee56a9678034d95b0")
                .unwrap()
                .try_into()
                .unwrap();
        let public_key = CurveKind::Ed25519.derive_public_key(&seed).unwrap();
        let encoded = crate::base58check::encode(prefix::EDPK, &public_key);
        assert_eq!(encoded, "edpkuHMDkMz46HdRXYwom3xRwqk3zQ5ihWX4j8dwo2R2h8o4gPcbN5");
    }

    #[test]
    fn test_generator_points() {
        // Secret scalar 1 yields the compressed generator point
        let secp = CurveKind::Secp256k1.derive_public_key(&scalar_one()).unwrap();
        assert_eq!(
            hex::encode(secp),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );

        let p256 = CurveKind::NistP256.derive_public_key(&scalar_one()).unwrap();
        assert_eq!(
            hex::encode(p256),
            "036b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"
        );
    }

    #[test]
    fn test_invalid_scalar_rejected() {
        for curve in [CurveKind::Secp256k1, CurveKind::NistP256] {
            let result = curve.derive_public_key(&[0u8; 32]);
            assert!(matches!(result, Err(CurveError::KeyDerivation { .. })));

            let result = curve.derive_public_key(&[0xff; 32]);
            assert!(matches!(result, Err(CurveError::KeyDerivation { .. })));
        }
    }

    #[test]
    fn test_sign_verify_all_curves() {
        let message = b"\x03forged operation bytes";
        for curve in CurveKind::ALL {
            let secret = [0x42u8; 32];
            let public_key = curve.derive_public_key(&secret).unwrap();
            assert_eq!(public_key.len(), curve.public_key_size());

            let signature = curve.sign(message, &secret).unwrap();
            assert_eq!(signature.curve(), curve);
            assert!(curve.verify(message, signature.as_bytes(), &public_key));
            assert!(!curve.verify(b"tampered", signature.as_bytes(), &public_key));
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let secret = [7u8; 32];
        for curve in CurveKind::ALL {
            let first = curve.sign(b"message", &secret).unwrap();
            let second = curve.sign(b"message", &secret).unwrap();
            assert_eq!(first, second, "{curve} signatures must be deterministic");
        }
    }

    #[test]
    fn test_secp256k1_signatures_are_low_s() {
        let secret = [9u8; 32];
        for i in 0..16u8 {
            let signature = CurveKind::Secp256k1.sign(&[i], &secret).unwrap();
            let parsed = k256::ecdsa::Signature::from_slice(signature.as_bytes()).unwrap();
            assert!(parsed.normalize_s().is_none());
        }
    }

    #[test]
    fn test_curve_inference() {
        assert_eq!(
            CurveKind::from_b58_prefix("edesk1fddn27"),
            Some(CurveKind::Ed25519)
        );
        assert_eq!(
            CurveKind::from_b58_prefix("spsk1RZgUW"),
            Some(CurveKind::Secp256k1)
        );
        assert_eq!(
            CurveKind::from_b58_prefix("p2pk67L57Q"),
            Some(CurveKind::NistP256)
        );
        assert_eq!(CurveKind::from_b58_prefix("KT1TpG"), None);
    }
}
