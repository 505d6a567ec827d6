//! Script expression hashes (`expr…`)
//!
//! Big-map entries are addressed by the hash of their packed key. Packing is
//! the `0x05` watermark followed by the binary Micheline of the value; the
//! hash is the 32-byte generic hash of that, Base58Check-encoded with `expr`.
//!
//! Addresses and key hashes pack as Micheline bytes holding their forged form:
//! 22 bytes for an address, 21 for a key hash.

use crate::address::{Address, AddressError};
use crate::base58check;
use crate::hash;
use crate::micheline::{self, Micheline, MichelineError};
use crate::prefix;
use crate::zarith;
use num_bigint::{BigInt, BigUint};
use thiserror::Error;

/// Watermark of packed Michelson data
pub const PACK_WATERMARK: u8 = 0x05;

const TAG_INT: u8 = 0x00;
const TAG_STRING: u8 = 0x01;
const TAG_BYTES: u8 = 0x0a;

/// Expression hashing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// Value is not valid Micheline
    #[error("Micheline error: {0}")]
    Micheline(#[from] MichelineError),

    /// Address or key hash could not be decoded
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Bytes value is not valid hex
    #[error("Hex decode error: {0}")]
    Hex(String),
}

/// Result type for expression hashing
pub type Result<T> = std::result::Result<T, ExpressionError>;

/// Pack a Micheline value
pub fn pack(value: &Micheline) -> std::result::Result<Vec<u8>, MichelineError> {
    let mut out = vec![PACK_WATERMARK];
    value.write(&mut out)?;
    Ok(out)
}

/// Hash already-packed bytes into an `expr` string
#[must_use]
pub fn expression_from_packed(packed: &[u8]) -> String {
    base58check::encode(prefix::SCRIPT_EXPR, &hash::digest_256(&[packed]))
}

/// Pack a literal: watermark, Micheline literal tag, payload
fn pack_literal(tag: u8, write: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut packed = vec![PACK_WATERMARK, tag];
    write(&mut packed);
    expression_from_packed(&packed)
}

/// Expression of an `int` key
#[must_use]
pub fn int_expression(value: impl Into<BigInt>) -> String {
    pack_literal(TAG_INT, |out| zarith::write_signed(out, &value.into()))
}

/// Expression of a `nat` key
///
/// Naturals pack as Micheline int literals, exactly like `int`.
#[must_use]
pub fn nat_expression(value: impl Into<BigUint>) -> String {
    pack_literal(TAG_INT, |out| {
        zarith::write_signed(out, &BigInt::from(value.into()));
    })
}

/// Expression of a `string` key
#[must_use]
pub fn string_expression(value: &str) -> String {
    pack_literal(TAG_STRING, |out| micheline::write_bytes(out, value.as_bytes()))
}

/// Expression of a `bytes` key given as raw bytes
#[must_use]
pub fn bytes_expression(value: &[u8]) -> String {
    pack_literal(TAG_BYTES, |out| micheline::write_bytes(out, value))
}

/// Expression of a `bytes` key given as hex
pub fn hex_bytes_expression(value: &str) -> Result<String> {
    let bytes = hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| ExpressionError::Hex(e.to_string()))?;
    Ok(bytes_expression(&bytes))
}

/// Expression of an `address` key (`tz1`/`tz2`/`tz3`/`KT1`)
pub fn address_expression(address: &str) -> Result<String> {
    let address = Address::from_b58check(address)?;
    Ok(bytes_expression(&address.forge_contract()))
}

/// Expression of a `key_hash` key (`tz1`/`tz2`/`tz3`)
pub fn key_hash_expression(key_hash: &str) -> Result<String> {
    let address = Address::from_b58check(key_hash)?;
    Ok(bytes_expression(&address.forge_public_key_hash()?))
}

/// Expression of an arbitrary Micheline value given as JSON
pub fn michelson_expression(json: &str) -> Result<String> {
    let value = Micheline::from_json_str(json)?;
    Ok(expression_from_packed(&pack(&value)?))
}
