//! Public keys, public key hashes and contract addresses
//!
//! Forged layouts:
//! ```text
//! public key         [curve tag:1][key:32|33]
//! public key hash    [curve tag:1][hash:20]                  (source, delegate)
//! contract (tz1..3)  [0x00][curve tag:1][hash:20]            (destination)
//! contract (KT1)     [0x01][hash:20][0x00]
//! ```

use crate::base58check::{self, Base58Error};
use crate::curve::CurveKind;
use crate::hash;
use crate::prefix;
use crate::signature::Signature;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address and public key errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Input does not start with a known prefix
    #[error("Unknown address prefix: {0}")]
    UnknownPrefix(String),

    /// Base58Check decoding failed
    #[error("Base58 error: {0}")]
    Base58(#[from] Base58Error),

    /// Raw key has the wrong length for its curve
    #[error("Invalid public key length for {curve}: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Curve of the key
        curve: CurveKind,
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// An originated contract was given where an implicit account is required
    #[error("{0} is not an implicit account")]
    NotImplicit(String),
}

/// Result type for address operations
pub type Result<T> = std::result::Result<T, AddressError>;

/// Size of a public key hash or contract hash
pub const HASH_SIZE: usize = 20;

/// A raw public key tagged with its curve
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PublicKey {
    curve: CurveKind,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Wrap raw public key bytes, checking their length
    pub fn from_bytes(curve: CurveKind, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != curve.public_key_size() {
            return Err(AddressError::InvalidKeyLength {
                curve,
                expected: curve.public_key_size(),
                actual: bytes.len(),
            });
        }
        Ok(Self {
            curve,
            bytes: bytes.to_vec(),
        })
    }

    /// Curve of the key
    #[must_use]
    pub fn curve(&self) -> CurveKind {
        self.curve
    }

    /// Raw key bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Public key hash (the account address)
    #[must_use]
    pub fn hash(&self) -> Address {
        Address::Implicit {
            curve: self.curve,
            hash: hash::digest_160(&[&self.bytes]),
        }
    }

    /// Forged form: curve tag followed by the raw key
    #[must_use]
    pub fn forge(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.curve.tag());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Check a signature made by the matching secret key
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.curve
            .verify(message, signature.as_bytes(), &self.bytes)
    }

    /// Encode to base58check (`edpk`/`sppk`/`p2pk`)
    #[must_use]
    pub fn to_b58check(&self) -> String {
        base58check::encode(self.curve.public_key_prefix(), &self.bytes)
    }

    /// Decode from base58check
    pub fn from_b58check(s: &str) -> Result<Self> {
        let curve = ["edpk", "sppk", "p2pk"]
            .iter()
            .any(|tag| s.starts_with(tag))
            .then(|| CurveKind::from_b58_prefix(s))
            .flatten()
            .ok_or_else(|| AddressError::UnknownPrefix(s.chars().take(4).collect()))?;
        let bytes = base58check::decode(s, curve.public_key_prefix())?;
        Self::from_bytes(curve, &bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58check())
    }
}

/// An account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Address {
    /// Key-controlled account (`tz1`/`tz2`/`tz3`)
    Implicit {
        /// Curve of the controlling key
        curve: CurveKind,
        /// 20-byte hash of the public key
        hash: [u8; HASH_SIZE],
    },
    /// Smart contract (`KT1`)
    Originated {
        /// 20-byte contract hash
        hash: [u8; HASH_SIZE],
    },
}

impl Address {
    /// Decode any `tz1`/`tz2`/`tz3`/`KT1` address
    pub fn from_b58check(s: &str) -> Result<Self> {
        if s.starts_with("KT1") {
            let hash = base58check::decode_fixed::<HASH_SIZE>(s, prefix::KT1)?;
            return Ok(Self::Originated { hash });
        }

        let curve = ["tz1", "tz2", "tz3"]
            .iter()
            .any(|tag| s.starts_with(tag))
            .then(|| CurveKind::from_b58_prefix(s))
            .flatten()
            .ok_or_else(|| AddressError::UnknownPrefix(s.chars().take(3).collect()))?;
        let hash = base58check::decode_fixed::<HASH_SIZE>(s, curve.address_prefix())?;
        Ok(Self::Implicit { curve, hash })
    }

    /// Encode to base58check
    #[must_use]
    pub fn to_b58check(&self) -> String {
        match self {
            Self::Implicit { curve, hash } => base58check::encode(curve.address_prefix(), hash),
            Self::Originated { hash } => base58check::encode(prefix::KT1, hash),
        }
    }

    /// The 20-byte hash without any tag
    #[must_use]
    pub fn hash(&self) -> &[u8; HASH_SIZE] {
        match self {
            Self::Implicit { hash, .. } | Self::Originated { hash } => hash,
        }
    }

    /// Whether this is a `tz` account
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        matches!(self, Self::Implicit { .. })
    }

    /// 21-byte public key hash encoding, used for sources and delegates
    pub fn forge_public_key_hash(&self) -> Result<[u8; 1 + HASH_SIZE]> {
        match self {
            Self::Implicit { curve, hash } => {
                let mut out = [0u8; 1 + HASH_SIZE];
                out[0] = curve.tag();
                out[1..].copy_from_slice(hash);
                Ok(out)
            }
            Self::Originated { .. } => Err(AddressError::NotImplicit(self.to_b58check())),
        }
    }

    /// 22-byte contract encoding, used for destinations and packed addresses
    #[must_use]
    pub fn forge_contract(&self) -> [u8; 2 + HASH_SIZE] {
        let mut out = [0u8; 2 + HASH_SIZE];
        match self {
            Self::Implicit { curve, hash } => {
                out[0] = 0x00;
                out[1] = curve.tag();
                out[2..].copy_from_slice(hash);
            }
            Self::Originated { hash } => {
                out[0] = 0x01;
                out[1..=HASH_SIZE].copy_from_slice(hash);
                out[1 + HASH_SIZE] = 0x00;
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58check())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_b58check(s)
    }
}
