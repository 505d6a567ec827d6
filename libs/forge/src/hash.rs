//! `Blake2B` generic hashes
//!
//! Tezos calls Blake2B its "generic hash": 20-byte digests identify public keys
//! and contracts, 32-byte digests are signed and address script expressions.

use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};

type Blake2b20 = Blake2b<U20>;
type Blake2b32 = Blake2b<U32>;

/// 20-byte digest used for public key hashes
#[must_use]
pub fn digest_160(data: &[&[u8]]) -> [u8; 20] {
    let mut hasher = Blake2b20::new();
    for bytes in data {
        hasher.update(bytes);
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// 32-byte digest used for signing and script expressions
#[must_use]
pub fn digest_256(data: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b32::new();
    for bytes in data {
        hasher.update(bytes);
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}
