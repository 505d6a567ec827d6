//! Micheline trees and their binary encoding
//!
//! Micheline is the generic tree syntax of Michelson. The JSON form is the one
//! exchanged with nodes (`{"prim":..,"args":[..],"annots":[..]}`, `{"int":".."}`,
//! `{"string":".."}`, `{"bytes":".."}` or a bare array); the binary form is the
//! one forged into operations and packed for hashing:
//!
//! ```text
//! 0x00  int           signed zarith
//! 0x01  string        [len:u32][utf-8]
//! 0x02  sequence      [len:u32][node..]
//! 0x03  prim          [prim]
//! 0x04  prim + annots [prim][annots]
//! 0x05  prim 1 arg    [prim][arg]
//! 0x06  ... + annots  [prim][arg][annots]
//! 0x07  prim 2 args   [prim][arg][arg]
//! 0x08  ... + annots  [prim][arg][arg][annots]
//! 0x09  prim n args   [prim][len:u32][args..][annots]
//! 0x0a  bytes         [len:u32][bytes]
//! ```
//!
//! Annotations are joined with spaces and written as `[len:u32][utf-8]`.

use crate::zarith;
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

/// Micheline errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MichelineError {
    /// JSON text or structure is not valid Micheline
    #[error("Parse error: {0}")]
    Parse(String),

    /// Primitive name has no binary opcode
    #[error("Unknown primitive: {0}")]
    UnknownPrimitive(String),
}

/// Result type for Micheline operations
pub type Result<T> = std::result::Result<T, MichelineError>;

/// Primitive names indexed by their binary opcode
pub const PRIMITIVES: [&str; 157] = [
    "parameter", "storage", "code", "False", "Elt", "Left", "None", "Pair", "Right", "Some",
    "True", "Unit", "PACK", "UNPACK", "BLAKE2B", "SHA256", "SHA512", "ABS", "ADD", "AMOUNT",
    "AND", "BALANCE", "CAR", "CDR", "CHECK_SIGNATURE", "COMPARE", "CONCAT", "CONS",
    "CREATE_ACCOUNT", "CREATE_CONTRACT", "IMPLICIT_ACCOUNT", "DIP", "DROP", "DUP", "EDIV",
    "EMPTY_MAP", "EMPTY_SET", "EQ", "EXEC", "FAILWITH", "GE", "GET", "GT", "HASH_KEY", "IF",
    "IF_CONS", "IF_LEFT", "IF_NONE", "INT", "LAMBDA", "LE", "LEFT", "LOOP", "LSL", "LSR",
    "LT", "MAP", "MEM", "MUL", "NEG", "NEQ", "NIL", "NONE", "NOT", "NOW", "OR", "PAIR",
    "PUSH", "RIGHT", "SIZE", "SOME", "SOURCE", "SENDER", "SELF", "STEPS_TO_QUOTA", "SUB",
    "SWAP", "TRANSFER_TOKENS", "SET_DELEGATE", "UNIT", "UPDATE", "XOR", "ITER", "LOOP_LEFT",
    "ADDRESS", "CONTRACT", "ISNAT", "CAST", "RENAME", "bool", "contract", "int", "key",
    "key_hash", "lambda", "list", "map", "big_map", "nat", "option", "or", "pair", "set",
    "signature", "string", "bytes", "mutez", "timestamp", "unit", "operation", "address",
    "SLICE", "DIG", "DUG", "EMPTY_BIG_MAP", "APPLY", "chain_id", "CHAIN_ID", "LEVEL",
    "SELF_ADDRESS", "never", "NEVER", "UNPAIR", "VOTING_POWER", "TOTAL_VOTING_POWER",
    "KECCAK", "SHA3", "PAIRING_CHECK", "bls12_381_g1", "bls12_381_g2", "bls12_381_fr",
    "sapling_state", "sapling_transaction_deprecated", "SAPLING_EMPTY_STATE",
    "SAPLING_VERIFY_UPDATE", "ticket", "TICKET_DEPRECATED", "READ_TICKET", "SPLIT_TICKET",
    "JOIN_TICKETS", "GET_AND_UPDATE", "chest", "chest_key", "OPEN_CHEST", "VIEW", "view",
    "constant", "SUB_MUTEZ", "tx_rollup_l2_address", "MIN_BLOCK_TIME", "sapling_transaction",
    "EMIT", "Lambda_rec", "LAMBDA_REC", "TICKET", "BYTES", "NAT",
];

/// Look up the binary opcode of a primitive
#[must_use]
pub fn primitive_code(name: &str) -> Option<u8> {
    PRIMITIVES
        .iter()
        .position(|&prim| prim == name)
        .and_then(|code| u8::try_from(code).ok())
}

const TAG_INT: u8 = 0x00;
const TAG_STRING: u8 = 0x01;
const TAG_SEQUENCE: u8 = 0x02;
const TAG_PRIM: u8 = 0x03;
const TAG_PRIM_GENERIC: u8 = 0x09;
const TAG_BYTES: u8 = 0x0a;

/// A Micheline node
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Micheline {
    /// Integer literal
    Int(BigInt),
    /// String literal
    String(String),
    /// Bytes literal
    Bytes(Vec<u8>),
    /// Bare sequence, e.g. a code block
    Seq(Vec<Micheline>),
    /// Primitive application
    Prim {
        /// Primitive name (`Pair`, `PUSH`, `nat`, ...)
        prim: String,
        /// Arguments in order
        args: Vec<Micheline>,
        /// Annotations including their sigil (`%from`, `:t`, `@x`)
        annots: Vec<String>,
    },
}

impl Micheline {
    /// Primitive application without annotations
    #[must_use]
    pub fn prim(prim: &str, args: Vec<Micheline>) -> Self {
        Self::Prim {
            prim: prim.to_string(),
            args,
            annots: Vec::new(),
        }
    }

    /// Integer literal
    #[must_use]
    pub fn int(value: impl Into<BigInt>) -> Self {
        Self::Int(value.into())
    }

    /// Parse Micheline JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| MichelineError::Parse(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Convert a parsed Micheline JSON value
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(Self::Seq),
            Value::Object(object) => Self::from_object(object),
            other => Err(MichelineError::Parse(format!(
                "expected an object or an array, got {other}"
            ))),
        }
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self> {
        if let Some(int) = object.get("int") {
            let text = int
                .as_str()
                .ok_or_else(|| MichelineError::Parse("int literal must be a string".into()))?;
            return BigInt::from_str(text)
                .map(Self::Int)
                .map_err(|_| MichelineError::Parse(format!("invalid int literal: {text}")));
        }
        if let Some(string) = object.get("string") {
            return string
                .as_str()
                .map(|s| Self::String(s.to_string()))
                .ok_or_else(|| MichelineError::Parse("string literal must be a string".into()));
        }
        if let Some(bytes) = object.get("bytes") {
            let text = bytes
                .as_str()
                .ok_or_else(|| MichelineError::Parse("bytes literal must be a string".into()))?;
            return hex::decode(text)
                .map(Self::Bytes)
                .map_err(|e| MichelineError::Parse(format!("invalid bytes literal: {e}")));
        }

        let prim = object
            .get("prim")
            .and_then(Value::as_str)
            .ok_or_else(|| MichelineError::Parse(format!("missing prim in {object:?}")))?;

        let args = match object.get("args") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(MichelineError::Parse("args must be an array".into())),
        };

        let annots = match object.get("annots") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| MichelineError::Parse("annots must be strings".into()))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(MichelineError::Parse("annots must be an array".into())),
        };

        Ok(Self::Prim {
            prim: prim.to_string(),
            args,
            annots,
        })
    }

    /// Render as Micheline JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(n) => serde_json::json!({ "int": n.to_string() }),
            Self::String(s) => serde_json::json!({ "string": s }),
            Self::Bytes(b) => serde_json::json!({ "bytes": hex::encode(b) }),
            Self::Seq(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Prim { prim, args, annots } => {
                let mut object = Map::new();
                object.insert("prim".into(), Value::String(prim.clone()));
                if !args.is_empty() {
                    object.insert(
                        "args".into(),
                        Value::Array(args.iter().map(Self::to_json).collect()),
                    );
                }
                if !annots.is_empty() {
                    object.insert(
                        "annots".into(),
                        Value::Array(annots.iter().cloned().map(Value::String).collect()),
                    );
                }
                Value::Object(object)
            }
        }
    }

    /// Binary encoding
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }

    /// Append the binary encoding to `out`
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Int(n) => {
                out.push(TAG_INT);
                zarith::write_signed(out, n);
            }
            Self::String(s) => {
                out.push(TAG_STRING);
                write_bytes(out, s.as_bytes());
            }
            Self::Bytes(b) => {
                out.push(TAG_BYTES);
                write_bytes(out, b);
            }
            Self::Seq(items) => {
                out.push(TAG_SEQUENCE);
                write_length_prefixed(out, |body| {
                    items.iter().try_for_each(|item| item.write(body))
                })?;
            }
            Self::Prim { prim, args, annots } => {
                let code = primitive_code(prim)
                    .ok_or_else(|| MichelineError::UnknownPrimitive(prim.clone()))?;

                if args.len() <= 2 {
                    // 0x03..0x08: two tags per arity, odd without annots
                    let arity = u8::try_from(args.len()).unwrap_or(2);
                    let tag = TAG_PRIM + arity * 2 + u8::from(!annots.is_empty());
                    out.push(tag);
                    out.push(code);
                    for arg in args {
                        arg.write(out)?;
                    }
                    if !annots.is_empty() {
                        write_bytes(out, annots.join(" ").as_bytes());
                    }
                } else {
                    out.push(TAG_PRIM_GENERIC);
                    out.push(code);
                    write_length_prefixed(out, |body| {
                        args.iter().try_for_each(|arg| arg.write(body))
                    })?;
                    write_bytes(out, annots.join(" ").as_bytes());
                }
            }
        }
        Ok(())
    }
}

/// Append `[len:u32][bytes]`
pub(crate) fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    // Lengths beyond u32 cannot occur in an operation the network accepts
    #[allow(clippy::cast_possible_truncation)]
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Reserve a u32 length, run `body`, then patch the length in
pub(crate) fn write_length_prefixed<E>(
    out: &mut Vec<u8>,
    body: impl FnOnce(&mut Vec<u8>) -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    let start = out.len();
    out.extend_from_slice(&[0u8; 4]);
    body(out)?;
    #[allow(clippy::cast_possible_truncation)]
    let len = (out.len() - start - 4) as u32;
    out[start..start + 4].copy_from_slice(&len.to_be_bytes());
    Ok(())
}

impl FromStr for Micheline {
    type Err = MichelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}

impl Serialize for Micheline {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Micheline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
