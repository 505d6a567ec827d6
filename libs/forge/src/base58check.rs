//! `Base58Check` encoding/decoding for Tezos
//!
//! Tezos uses a custom base58check format similar to Bitcoin's,
//! but with specific prefixes for different key types.

use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

/// Base58Check errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Base58Error {
    /// Input is not valid base58
    #[error("Base58 decode error: {0}")]
    Base58(String),

    /// Decoded data cannot hold the prefix and checksum
    #[error("Invalid length: expected at least {expected} bytes, got {actual}")]
    InvalidLength {
        /// Minimum decoded length
        expected: usize,
        /// Actual decoded length
        actual: usize,
    },

    /// Decoded data does not start with the expected version prefix
    #[error("Invalid prefix")]
    InvalidPrefix,

    /// Trailing 4 bytes do not match the double SHA-256 of the data
    #[error("Invalid checksum")]
    ChecksumMismatch,
}

/// Result type for Base58Check operations
pub type Result<T> = std::result::Result<T, Base58Error>;

/// Encode data with base58check (double SHA256 checksum)
#[must_use]
pub fn encode(prefix: &[u8], data: &[u8]) -> String {
    let mut payload = Vec::with_capacity(prefix.len() + data.len() + 4);
    payload.extend_from_slice(prefix);
    payload.extend_from_slice(data);

    // Compute double SHA256 checksum
    let checksum = compute_checksum(&payload);
    payload.extend_from_slice(&checksum[..4]);

    bs58::encode(&payload).into_string()
}

/// Decode base58check encoded string, returning the data without its prefix
pub fn decode(s: &str, prefix: &[u8]) -> Result<Vec<u8>> {
    // May hold secret key material
    let decoded = Zeroizing::new(
        bs58::decode(s)
            .into_vec()
            .map_err(|e| Base58Error::Base58(e.to_string()))?,
    );

    if decoded.len() < prefix.len() + 4 {
        return Err(Base58Error::InvalidLength {
            expected: prefix.len() + 4,
            actual: decoded.len(),
        });
    }

    // Verify prefix
    if &decoded[..prefix.len()] != prefix {
        return Err(Base58Error::InvalidPrefix);
    }

    // Verify checksum
    let data_end = decoded.len() - 4;
    let data_with_prefix = &decoded[..data_end];
    let checksum = &decoded[data_end..];

    let computed_checksum = compute_checksum(data_with_prefix);
    if checksum != &computed_checksum[..4] {
        return Err(Base58Error::ChecksumMismatch);
    }

    // Return data without prefix and checksum
    Ok(decoded[prefix.len()..data_end].to_vec())
}

/// Decode into a fixed-size payload
pub fn decode_fixed<const N: usize>(s: &str, prefix: &[u8]) -> Result<[u8; N]> {
    let data = decode(s, prefix)?;
    data.try_into().map_err(|data: Vec<u8>| Base58Error::InvalidLength {
        expected: prefix.len() + N + 4,
        actual: prefix.len() + data.len() + 4,
    })
}

/// Compute double SHA256 checksum (first 4 bytes)
fn compute_checksum(data: &[u8]) -> [u8; 32] {
    let first_hash = Sha256::digest(data);
    let second_hash = Sha256::digest(first_hash);
    let mut checksum = [0u8; 32];
    checksum.copy_from_slice(&second_hash);
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix;

    #[test]
    fn test_encode_decode_roundtrip() {
        let data = &[
            1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20,
        ];

        let encoded = encode(prefix::TZ1, data);
        assert!(encoded.starts_with("tz1"));
        let decoded = decode(&encoded, prefix::TZ1).unwrap();

        assert_eq!(data, &decoded[..]);
    }

    #[test]
    fn test_decode_secret_key_payload() {
        let secret = [0x42u8; 64];
        let encoded = encode(prefix::EDSK, &secret);
        assert!(encoded.starts_with("edsk"));
        assert_eq!(decode(&encoded, prefix::EDSK).unwrap(), secret.to_vec());
    }

    #[test]
    fn test_known_block_hash() {
        let branch = decode_fixed::<32>(
            "BLQMkH2PSTuAJgVm6rGHshY5z6Z6SAmqXv6q1LDzhX6fchJ12Up",
            prefix::BLOCK_HASH,
        )
        .unwrap();
        assert_eq!(
            hex::encode(branch),
            "5aff622d53d32a8bae591627718c60a35b16737e301c57a13b6f1765483d88ff"
        );
    }

    #[test]
    fn test_invalid_checksum() {
        let mut encoded = encode(prefix::TZ1, &[7u8; 20]).into_bytes();
        // Flip the last character to another valid base58 digit
        let last = encoded.len() - 1;
        encoded[last] = if encoded[last] == b'2' { b'3' } else { b'2' };
        let encoded = String::from_utf8(encoded).unwrap();

        assert_eq!(
            decode(&encoded, prefix::TZ1),
            Err(Base58Error::ChecksumMismatch)
        );
    }

    #[test]
    fn test_wrong_prefix() {
        let encoded = encode(prefix::TZ1, &[7u8; 20]);
        assert_eq!(
            decode(&encoded, prefix::TZ2),
            Err(Base58Error::InvalidPrefix)
        );
    }

    #[test]
    fn test_invalid_characters() {
        // '0', 'O', 'I' and 'l' are not part of the alphabet
        assert!(matches!(
            decode("tz10OIl", prefix::TZ1),
            Err(Base58Error::Base58(_))
        ));
    }

    #[test]
    fn test_fixed_length_mismatch() {
        let encoded = encode(prefix::BLOCK_HASH, &[1u8; 31]);
        assert!(matches!(
            decode_fixed::<32>(&encoded, prefix::BLOCK_HASH),
            Err(Base58Error::InvalidLength { .. })
        ));
    }
}
