//! Zarith variable-length integers
//!
//! Natural numbers are split into 7-bit groups, least significant first, with
//! bit 0x80 set on every byte but the last. Signed integers (Michelson `int`
//! literals) keep only 6 magnitude bits in the first byte and use 0x40 as the
//! sign bit; the following bytes are plain 7-bit groups.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use thiserror::Error;

const CONTINUATION: u8 = 0x80;
const SIGN: u8 = 0x40;

/// Zarith decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZarithError {
    /// Input ended while the continuation bit was still set
    #[error("Malformed integer: {consumed} bytes read without a terminating byte")]
    MalformedInteger {
        /// Bytes read before the input ran out
        consumed: usize,
    },
}

/// Result type for zarith decoding
pub type Result<T> = std::result::Result<T, ZarithError>;

#[allow(clippy::cast_possible_truncation)]
fn low_bits(n: &BigUint, mask: u32) -> u8 {
    // The mask keeps at most 7 bits
    (n.iter_u32_digits().next().unwrap_or(0) & mask) as u8
}

/// Append the unsigned encoding of `n` to `out`
pub fn write_unsigned(out: &mut Vec<u8>, n: &BigUint) {
    let mut n = n.clone();
    loop {
        let byte = low_bits(&n, 0x7f);
        n >>= 7;
        if n.is_zero() {
            out.push(byte);
            return;
        }
        out.push(byte | CONTINUATION);
    }
}

/// Append the signed encoding of `n` to `out`
pub fn write_signed(out: &mut Vec<u8>, n: &BigInt) {
    let mut magnitude = n.magnitude().clone();
    let sign = if n.sign() == Sign::Minus { SIGN } else { 0 };

    let first = low_bits(&magnitude, 0x3f) | sign;
    magnitude >>= 6;
    if magnitude.is_zero() {
        out.push(first);
    } else {
        out.push(first | CONTINUATION);
        write_unsigned(out, &magnitude);
    }
}

/// Encode a natural number
#[must_use]
pub fn encode_unsigned(n: &BigUint) -> Vec<u8> {
    let mut out = Vec::new();
    write_unsigned(&mut out, n);
    out
}

/// Encode a machine-sized natural number (fees, counters, limits, amounts)
#[must_use]
pub fn encode_u64(n: u64) -> Vec<u8> {
    encode_unsigned(&BigUint::from(n))
}

/// Encode a signed integer
#[must_use]
pub fn encode_signed(n: &BigInt) -> Vec<u8> {
    let mut out = Vec::new();
    write_signed(&mut out, n);
    out
}

/// Decode a natural number, returning it with the number of bytes consumed
pub fn decode_unsigned(bytes: &[u8]) -> Result<(BigUint, usize)> {
    let mut value = BigUint::zero();
    let mut shift = 0usize;

    for (i, &byte) in bytes.iter().enumerate() {
        value |= BigUint::from(byte & 0x7f) << shift;
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    Err(ZarithError::MalformedInteger {
        consumed: bytes.len(),
    })
}

/// Decode a signed integer, returning it with the number of bytes consumed
pub fn decode_signed(bytes: &[u8]) -> Result<(BigInt, usize)> {
    let Some(&first) = bytes.first() else {
        return Err(ZarithError::MalformedInteger { consumed: 0 });
    };

    let sign = if first & SIGN == 0 {
        Sign::Plus
    } else {
        Sign::Minus
    };
    let mut magnitude = BigUint::from(first & 0x3f);
    let mut consumed = 1;

    if first & CONTINUATION != 0 {
        let (rest, used) =
            decode_unsigned(&bytes[1..]).map_err(|_| ZarithError::MalformedInteger {
                consumed: bytes.len(),
            })?;
        magnitude |= rest << 6;
        consumed += used;
    }

    Ok((BigInt::from_biguint(sign, magnitude), consumed))
}
