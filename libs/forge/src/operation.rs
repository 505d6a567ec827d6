//! Operation contents
//!
//! Typed counterparts of the `contents` entries the node RPC accepts. Contents
//! are usually built from RPC-shaped JSON with [`OperationContent::from_value`],
//! which reports an unknown `kind` or a missing or malformed field precisely.

use crate::address::{Address, PublicKey};
use crate::base58check;
use crate::forge::ForgeError;
use crate::micheline::Micheline;
use crate::prefix;
use crate::signature;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Size of block, protocol, context and nonce hashes
pub const HASH_SIZE: usize = 32;

/// Result type for parsing contents
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Fields shared by every manager operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerFields {
    /// Implicit account paying for the operation
    pub source: Address,
    /// Fee in mutez
    pub fee: u64,
    /// Source counter
    pub counter: u64,
    /// Gas limit
    pub gas_limit: u64,
    /// Storage limit in bytes
    pub storage_limit: u64,
}

/// Transaction parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    /// Entrypoint name (`default` when unspecified)
    pub entrypoint: String,
    /// Argument value
    pub value: Micheline,
}

/// Contract script of an origination
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    /// Contract code, usually a `parameter`/`storage`/`code` sequence
    pub code: Micheline,
    /// Initial storage
    pub storage: Micheline,
}

/// Vote cast in a ballot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Vote {
    /// In favour
    Yay = 0,
    /// Against
    Nay = 1,
    /// Abstain
    Pass = 2,
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "yay" => Ok(Self::Yay),
            "nay" => Ok(Self::Nay),
            "pass" => Ok(Self::Pass),
            other => Err(format!("expected yay, nay or pass, got {other}")),
        }
    }
}

/// Signed endorsement embedded in double endorsement evidence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlinedEndorsement {
    /// Block hash the endorsement was made on
    pub branch: [u8; HASH_SIZE],
    /// Endorsed level
    pub level: i32,
    /// Baker signature
    pub signature: [u8; 64],
}

/// Signed block header embedded in double baking evidence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block level
    pub level: i32,
    /// Protocol activation index
    pub proto: u8,
    /// Predecessor block hash
    pub predecessor: [u8; HASH_SIZE],
    /// Block timestamp
    pub timestamp: DateTime<Utc>,
    /// Number of validation passes
    pub validation_pass: u8,
    /// Operation list list hash
    pub operations_hash: [u8; HASH_SIZE],
    /// Fitness components
    pub fitness: Vec<Vec<u8>>,
    /// Context hash
    pub context: [u8; HASH_SIZE],
    /// Baking priority
    pub priority: u16,
    /// Proof-of-work nonce
    pub proof_of_work_nonce: [u8; 8],
    /// Committed seed nonce hash, if any
    pub seed_nonce_hash: Option<[u8; HASH_SIZE]>,
    /// Baker signature
    pub signature: [u8; 64],
}

/// One entry of an operation's `contents`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationContent {
    /// Consensus vote for a level
    Endorsement {
        /// Endorsed level
        level: i32,
    },
    /// Reveal of a committed seed nonce
    SeedNonceRevelation {
        /// Level the nonce was committed at
        level: i32,
        /// Revealed nonce
        nonce: [u8; HASH_SIZE],
    },
    /// Proof that a baker endorsed twice at one level
    DoubleEndorsementEvidence {
        /// First endorsement
        op1: InlinedEndorsement,
        /// Conflicting endorsement
        op2: InlinedEndorsement,
    },
    /// Proof that a baker baked twice at one level
    DoubleBakingEvidence {
        /// First header
        bh1: BlockHeader,
        /// Conflicting header
        bh2: BlockHeader,
    },
    /// Fundraiser account activation
    ActivateAccount {
        /// Ed25519 account to activate
        pkh: Address,
        /// 20-byte activation secret
        secret: [u8; 20],
    },
    /// Protocol amendment proposals
    Proposals {
        /// Delegate submitting the proposals
        source: Address,
        /// Voting period index
        period: i32,
        /// Proposed protocol hashes
        proposals: Vec<[u8; HASH_SIZE]>,
    },
    /// Vote on the current proposal
    Ballot {
        /// Voting delegate
        source: Address,
        /// Voting period index
        period: i32,
        /// Protocol hash voted on
        proposal: [u8; HASH_SIZE],
        /// The vote
        ballot: Vote,
    },
    /// Publication of the source's public key
    Reveal {
        /// Manager fields
        manager: ManagerFields,
        /// Public key being revealed
        public_key: PublicKey,
    },
    /// Token transfer or contract call
    Transaction {
        /// Manager fields
        manager: ManagerFields,
        /// Amount in mutez
        amount: u64,
        /// Receiving account or contract
        destination: Address,
        /// Contract call parameters
        parameters: Option<Parameters>,
    },
    /// Contract deployment
    Origination {
        /// Manager fields
        manager: ManagerFields,
        /// Initial balance in mutez
        balance: u64,
        /// Optional delegate of the new contract
        delegate: Option<Address>,
        /// Contract script
        script: Script,
    },
    /// Delegate change, or withdrawal when `delegate` is `None`
    Delegation {
        /// Manager fields
        manager: ManagerFields,
        /// New delegate
        delegate: Option<Address>,
    },
}

impl OperationContent {
    /// Wire tag of the content kind
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            Self::Endorsement { .. } => 0,
            Self::SeedNonceRevelation { .. } => 1,
            Self::DoubleEndorsementEvidence { .. } => 2,
            Self::DoubleBakingEvidence { .. } => 3,
            Self::ActivateAccount { .. } => 4,
            Self::Proposals { .. } => 5,
            Self::Ballot { .. } => 6,
            Self::Reveal { .. } => 107,
            Self::Transaction { .. } => 108,
            Self::Origination { .. } => 109,
            Self::Delegation { .. } => 110,
        }
    }

    /// RPC `kind` name
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Endorsement { .. } => "endorsement",
            Self::SeedNonceRevelation { .. } => "seed_nonce_revelation",
            Self::DoubleEndorsementEvidence { .. } => "double_endorsement_evidence",
            Self::DoubleBakingEvidence { .. } => "double_baking_evidence",
            Self::ActivateAccount { .. } => "activate_account",
            Self::Proposals { .. } => "proposals",
            Self::Ballot { .. } => "ballot",
            Self::Reveal { .. } => "reveal",
            Self::Transaction { .. } => "transaction",
            Self::Origination { .. } => "origination",
            Self::Delegation { .. } => "delegation",
        }
    }

    /// Parse one RPC-shaped content object
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ForgeError::Json(format!("content must be an object, got {value}")))?;
        let kind = object
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| ForgeError::UnknownOperationKind("<missing>".into()))?;

        match kind {
            "endorsement" => {
                let fields = Fields::new("endorsement", object);
                Ok(Self::Endorsement {
                    level: fields.i32("level")?,
                })
            }
            "seed_nonce_revelation" => {
                let fields = Fields::new("seed_nonce_revelation", object);
                Ok(Self::SeedNonceRevelation {
                    level: fields.i32("level")?,
                    nonce: fields.hex_fixed("nonce")?,
                })
            }
            "double_endorsement_evidence" => {
                let fields = Fields::new("double_endorsement_evidence", object);
                Ok(Self::DoubleEndorsementEvidence {
                    op1: fields.inlined_endorsement("op1")?,
                    op2: fields.inlined_endorsement("op2")?,
                })
            }
            "double_baking_evidence" => {
                let fields = Fields::new("double_baking_evidence", object);
                Ok(Self::DoubleBakingEvidence {
                    bh1: fields.block_header("bh1")?,
                    bh2: fields.block_header("bh2")?,
                })
            }
            "activate_account" => {
                let fields = Fields::new("activate_account", object);
                Ok(Self::ActivateAccount {
                    pkh: fields.address("pkh")?,
                    secret: fields.hex_fixed("secret")?,
                })
            }
            "proposals" => {
                let fields = Fields::new("proposals", object);
                let proposals = fields
                    .array("proposals")?
                    .iter()
                    .map(|item| {
                        let hash = item
                            .as_str()
                            .ok_or_else(|| fields.invalid("proposals", "expected strings"))?;
                        fields.decode_hash("proposals", hash, prefix::PROTOCOL_HASH)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Proposals {
                    source: fields.address("source")?,
                    period: fields.i32("period")?,
                    proposals,
                })
            }
            "ballot" => {
                let fields = Fields::new("ballot", object);
                let ballot = fields
                    .str("ballot")?
                    .parse()
                    .map_err(|e: String| fields.invalid("ballot", &e))?;
                Ok(Self::Ballot {
                    source: fields.address("source")?,
                    period: fields.i32("period")?,
                    proposal: fields.hash("proposal", prefix::PROTOCOL_HASH)?,
                    ballot,
                })
            }
            "reveal" => {
                let fields = Fields::new("reveal", object);
                let public_key = PublicKey::from_b58check(fields.str("public_key")?)
                    .map_err(|e| fields.invalid("public_key", &e.to_string()))?;
                Ok(Self::Reveal {
                    manager: fields.manager()?,
                    public_key,
                })
            }
            "transaction" => {
                let fields = Fields::new("transaction", object);
                Ok(Self::Transaction {
                    manager: fields.manager()?,
                    amount: fields.u64("amount")?,
                    destination: fields.address("destination")?,
                    parameters: fields.parameters("parameters")?,
                })
            }
            "origination" => {
                let fields = Fields::new("origination", object);
                Ok(Self::Origination {
                    manager: fields.manager()?,
                    balance: fields.u64("balance")?,
                    delegate: fields.optional_address("delegate")?,
                    script: fields.script("script")?,
                })
            }
            "delegation" => {
                let fields = Fields::new("delegation", object);
                Ok(Self::Delegation {
                    manager: fields.manager()?,
                    delegate: fields.optional_address("delegate")?,
                })
            }
            other => Err(ForgeError::UnknownOperationKind(other.to_string())),
        }
    }

    /// Parse a JSON array of contents
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        let value: Value = serde_json::from_str(json).map_err(|e| ForgeError::Json(e.to_string()))?;
        match &value {
            Value::Array(items) => items.iter().map(Self::from_value).collect(),
            Value::Object(_) => Self::from_value(&value).map(|content| vec![content]),
            other => Err(ForgeError::Json(format!(
                "expected an array of contents, got {other}"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for OperationContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Field accessors that name the offending kind and field on failure
struct Fields<'a> {
    kind: &'static str,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(kind: &'static str, object: &'a Map<String, Value>) -> Self {
        Self { kind, object }
    }

    fn invalid(&self, field: &str, reason: &str) -> ForgeError {
        ForgeError::InvalidField {
            kind: self.kind.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    fn get(&self, field: &str) -> Result<&'a Value> {
        match self.object.get(field) {
            None | Some(Value::Null) => Err(self.invalid(field, "missing")),
            Some(value) => Ok(value),
        }
    }

    fn optional(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    fn str(&self, field: &str) -> Result<&'a str> {
        self.get(field)?
            .as_str()
            .ok_or_else(|| self.invalid(field, "expected a string"))
    }

    fn array(&self, field: &str) -> Result<&'a Vec<Value>> {
        self.get(field)?
            .as_array()
            .ok_or_else(|| self.invalid(field, "expected an array"))
    }

    /// Mutez and counters arrive as decimal strings; plain numbers are accepted too
    fn u64(&self, field: &str) -> Result<u64> {
        match self.get(field)? {
            Value::String(s) => s
                .parse()
                .map_err(|_| self.invalid(field, &format!("not a natural number: {s}"))),
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| self.invalid(field, &format!("not a natural number: {n}"))),
            _ => Err(self.invalid(field, "expected a number")),
        }
    }

    fn i32(&self, field: &str) -> Result<i32> {
        match self.get(field)? {
            Value::String(s) => s
                .parse()
                .map_err(|_| self.invalid(field, &format!("not a 32-bit integer: {s}"))),
            Value::Number(n) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| self.invalid(field, &format!("not a 32-bit integer: {n}"))),
            _ => Err(self.invalid(field, "expected a number")),
        }
    }

    fn small<T: TryFrom<u64>>(&self, field: &str) -> Result<T> {
        let n = self.u64(field)?;
        T::try_from(n).map_err(|_| self.invalid(field, &format!("out of range: {n}")))
    }

    fn address(&self, field: &str) -> Result<Address> {
        Address::from_b58check(self.str(field)?)
            .map_err(|e| self.invalid(field, &e.to_string()))
    }

    fn optional_address(&self, field: &str) -> Result<Option<Address>> {
        self.optional(field)
            .map(|_| self.address(field))
            .transpose()
    }

    fn decode_hash(&self, field: &str, encoded: &str, prefix: &[u8]) -> Result<[u8; HASH_SIZE]> {
        base58check::decode_fixed::<HASH_SIZE>(encoded, prefix)
            .map_err(|e| self.invalid(field, &e.to_string()))
    }

    fn hash(&self, field: &str, prefix: &[u8]) -> Result<[u8; HASH_SIZE]> {
        self.decode_hash(field, self.str(field)?, prefix)
    }

    fn hex_fixed<const N: usize>(&self, field: &str) -> Result<[u8; N]> {
        let bytes = hex::decode(self.str(field)?).map_err(|e| self.invalid(field, &e.to_string()))?;
        bytes
            .try_into()
            .map_err(|bytes: Vec<u8>| {
                self.invalid(field, &format!("expected {N} bytes, got {}", bytes.len()))
            })
    }

    fn signature(&self, field: &str) -> Result<[u8; 64]> {
        signature::decode_raw(self.str(field)?).map_err(|e| self.invalid(field, &e.to_string()))
    }

    fn micheline(&self, field: &str) -> Result<Micheline> {
        Micheline::from_json(self.get(field)?).map_err(|e| self.invalid(field, &e.to_string()))
    }

    fn nested(&self, field: &str) -> Result<Fields<'a>> {
        let object = self
            .get(field)?
            .as_object()
            .ok_or_else(|| self.invalid(field, "expected an object"))?;
        Ok(Fields::new(self.kind, object))
    }

    fn manager(&self) -> Result<ManagerFields> {
        Ok(ManagerFields {
            source: self.address("source")?,
            fee: self.u64("fee")?,
            counter: self.u64("counter")?,
            gas_limit: self.u64("gas_limit")?,
            storage_limit: self.u64("storage_limit")?,
        })
    }

    fn parameters(&self, field: &str) -> Result<Option<Parameters>> {
        if self.optional(field).is_none() {
            return Ok(None);
        }
        let parameters = self.nested(field)?;
        let entrypoint = match parameters.optional("entrypoint") {
            None => "default".to_string(),
            Some(_) => parameters.str("entrypoint")?.to_string(),
        };
        Ok(Some(Parameters {
            entrypoint,
            value: parameters.micheline("value")?,
        }))
    }

    fn script(&self, field: &str) -> Result<Script> {
        let script = self.nested(field)?;
        Ok(Script {
            code: script.micheline("code")?,
            storage: script.micheline("storage")?,
        })
    }

    fn inlined_endorsement(&self, field: &str) -> Result<InlinedEndorsement> {
        let inlined = self.nested(field)?;
        let operation = inlined.nested("operations")?;
        match operation.str("kind")? {
            "endorsement" => {}
            other => {
                return Err(self.invalid(
                    field,
                    &format!("expected an inlined endorsement, got {other}"),
                ));
            }
        }
        Ok(InlinedEndorsement {
            branch: inlined.hash("branch", prefix::BLOCK_HASH)?,
            level: operation.i32("level")?,
            signature: inlined.signature("signature")?,
        })
    }

    fn block_header(&self, field: &str) -> Result<BlockHeader> {
        let header = self.nested(field)?;

        let timestamp = header.str("timestamp")?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| header.invalid("timestamp", &e.to_string()))?
            .with_timezone(&Utc);

        let fitness = header
            .array("fitness")?
            .iter()
            .map(|item| {
                item.as_str()
                    .and_then(|s| hex::decode(s).ok())
                    .ok_or_else(|| header.invalid("fitness", "expected hex strings"))
            })
            .collect::<Result<Vec<_>>>()?;

        let seed_nonce_hash = header
            .optional("seed_nonce_hash")
            .map(|_| header.hash("seed_nonce_hash", prefix::NONCE_HASH))
            .transpose()?;

        Ok(BlockHeader {
            level: header.i32("level")?,
            proto: header.small("proto")?,
            predecessor: header.hash("predecessor", prefix::BLOCK_HASH)?,
            timestamp,
            validation_pass: header.small("validation_pass")?,
            operations_hash: header.hash("operations_hash", prefix::OPERATION_LIST_LIST_HASH)?,
            fitness,
            context: header.hash("context", prefix::CONTEXT_HASH)?,
            priority: header.small("priority")?,
            proof_of_work_nonce: header.hex_fixed("proof_of_work_nonce")?,
            seed_nonce_hash,
            signature: header.signature("signature")?,
        })
    }
}
