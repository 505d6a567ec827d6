//! Curve-tagged signatures
//!
//! All three curves produce 64-byte signatures; the curve only decides the
//! Base58Check prefix used to render them.

use crate::base58check::{self, Base58Error};
use crate::curve::CurveKind;
use crate::prefix;
use std::fmt;

/// A 64-byte signature produced by one of the supported curves
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Signature {
    curve: CurveKind,
    bytes: [u8; Self::SIZE],
}

impl Signature {
    /// Size of every signature in bytes
    pub const SIZE: usize = 64;

    /// Wrap raw signature bytes
    #[must_use]
    pub fn new(curve: CurveKind, bytes: [u8; Self::SIZE]) -> Self {
        Self { curve, bytes }
    }

    /// Curve that produced the signature
    #[must_use]
    pub fn curve(&self) -> CurveKind {
        self.curve
    }

    /// Raw `r‖s` (or Ed25519) bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.bytes
    }

    /// Lowercase hex rendering, as appended to forged operations before injection
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Encode with the curve-specific prefix (`edsig`/`spsig1`/`p2sig`)
    #[must_use]
    pub fn to_b58check(&self) -> String {
        base58check::encode(self.curve.signature_prefix(), &self.bytes)
    }

    /// Encode with the curve-agnostic `sig` prefix
    #[must_use]
    pub fn to_generic_b58check(&self) -> String {
        base58check::encode(prefix::GENERIC_SIG, &self.bytes)
    }

    /// Decode a curve-specific signature
    pub fn from_b58check(s: &str) -> Result<Self, Base58Error> {
        let curve = CurveKind::from_b58_prefix(s).ok_or(Base58Error::InvalidPrefix)?;
        let bytes = base58check::decode_fixed::<{ Self::SIZE }>(s, curve.signature_prefix())?;
        Ok(Self { curve, bytes })
    }
}

/// Decode the raw bytes of any signature, including the curve-agnostic `sig` form
pub fn decode_raw(s: &str) -> Result<[u8; Signature::SIZE], Base58Error> {
    if s.starts_with("sig") {
        base58check::decode_fixed::<{ Signature::SIZE }>(s, prefix::GENERIC_SIG)
    } else {
        Signature::from_b58check(s).map(|signature| signature.bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b58check())
    }
}
