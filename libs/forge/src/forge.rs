//! Operation forging
//!
//! A forged operation is the 32-byte branch followed by each content's
//! encoding in list order. Manager operations share one header:
//!
//! ```text
//! [tag:1][source:21][fee:zarith][counter:zarith][gas_limit:zarith][storage_limit:zarith]
//! ```
//!
//! followed by the kind-specific fields. Optional fields are flagged with
//! `0xff` when present and `0x00` when absent.

use crate::address::Address;
use crate::base58check::{self, Base58Error};
use crate::curve::CurveKind;
use crate::hash;
use crate::key::{Key, KeyError};
use crate::micheline::{self, MichelineError};
use crate::operation::{
    BlockHeader, InlinedEndorsement, ManagerFields, OperationContent, Parameters,
};
use crate::prefix;
use crate::signature::Signature;
use crate::watermark::Watermark;
use crate::zarith;
use log::debug;
use thiserror::Error;

/// Forging errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForgeError {
    /// Content `kind` is not a known operation kind
    #[error("Unknown operation kind: {0}")]
    UnknownOperationKind(String),

    /// A field required by the content kind is missing or malformed
    #[error("Invalid field {field} in {kind}: {reason}")]
    InvalidField {
        /// Content kind
        kind: String,
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Contents are not valid JSON
    #[error("JSON error: {0}")]
    Json(String),

    /// Branch is not a valid block hash
    #[error("Invalid branch: {0}")]
    Branch(#[from] Base58Error),

    /// Script or parameters could not be encoded
    #[error("Micheline error: {0}")]
    Micheline(#[from] MichelineError),
}

/// Result type for forging
pub type Result<T> = std::result::Result<T, ForgeError>;

const FLAG_PRESENT: u8 = 0xff;
const FLAG_ABSENT: u8 = 0x00;

/// Longest entrypoint name accepted by the network
pub const MAX_ENTRYPOINT_LEN: usize = 31;

/// Forged operation bytes, ready to be signed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForgedOperation {
    bytes: Vec<u8>,
}

impl ForgedOperation {
    /// Raw forged bytes (branch included)
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex, as returned by the node's forge RPC
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Sign under the generic operation watermark
    pub fn sign(&self, key: &Key) -> std::result::Result<SignedOperation, KeyError> {
        // The branch may itself start with 0x03
        let signature = key.sign_with_watermark(Watermark::GenericOperation, &self.bytes)?;
        Ok(self.with_signature(signature))
    }

    /// Attach a signature obtained elsewhere
    #[must_use]
    pub fn with_signature(&self, signature: Signature) -> SignedOperation {
        SignedOperation {
            forged: self.bytes.clone(),
            signature,
        }
    }
}

/// Forged bytes followed by their signature, as injected into the network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedOperation {
    forged: Vec<u8>,
    signature: Signature,
}

impl SignedOperation {
    /// The signature
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// `forged‖signature` bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.forged.len() + Signature::SIZE);
        out.extend_from_slice(&self.forged);
        out.extend_from_slice(self.signature.as_bytes());
        out
    }

    /// Hex of the injectable bytes
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Operation hash (`o…`)
    #[must_use]
    pub fn operation_hash(&self) -> String {
        let digest = hash::digest_256(&[&self.forged, self.signature.as_bytes()]);
        base58check::encode(prefix::OPERATION_HASH, &digest)
    }
}

/// Forge `contents` on top of the block `branch`
pub fn forge(branch: &str, contents: &[OperationContent]) -> Result<ForgedOperation> {
    let branch = base58check::decode_fixed::<32>(branch, prefix::BLOCK_HASH)?;

    let mut bytes = branch.to_vec();
    for content in contents {
        forge_content(&mut bytes, content)?;
    }

    debug!(
        "Forged {} content(s) into {} bytes",
        contents.len(),
        bytes.len()
    );
    Ok(ForgedOperation { bytes })
}

/// Forge RPC-shaped JSON contents (an array, or a single object)
pub fn forge_json(branch: &str, contents: &str) -> Result<ForgedOperation> {
    let contents = OperationContent::list_from_json(contents)?;
    forge(branch, &contents)
}

/// Forge contents without a branch
pub fn forge_contents(contents: &[OperationContent]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for content in contents {
        forge_content(&mut bytes, content)?;
    }
    Ok(bytes)
}

/// Append one content's encoding to `out`
///
/// On error `out` is left exactly as it was passed in.
pub fn forge_content(out: &mut Vec<u8>, content: &OperationContent) -> Result<()> {
    let start = out.len();
    let result = write_content(out, content);
    if result.is_err() {
        out.truncate(start);
    }
    result
}

fn write_content(out: &mut Vec<u8>, content: &OperationContent) -> Result<()> {
    let kind = content.kind();
    out.push(content.tag());

    match content {
        OperationContent::Endorsement { level } => {
            out.extend_from_slice(&level.to_be_bytes());
        }
        OperationContent::SeedNonceRevelation { level, nonce } => {
            out.extend_from_slice(&level.to_be_bytes());
            out.extend_from_slice(nonce);
        }
        OperationContent::DoubleEndorsementEvidence { op1, op2 } => {
            for inlined in [op1, op2] {
                micheline::write_length_prefixed(out, |body| {
                    forge_inlined_endorsement(body, inlined);
                    Ok::<(), ForgeError>(())
                })?;
            }
        }
        OperationContent::DoubleBakingEvidence { bh1, bh2 } => {
            for header in [bh1, bh2] {
                micheline::write_length_prefixed(out, |body| {
                    forge_block_header(body, header);
                    Ok::<(), ForgeError>(())
                })?;
            }
        }
        OperationContent::ActivateAccount { pkh, secret } => {
            match pkh {
                Address::Implicit {
                    curve: CurveKind::Ed25519,
                    hash,
                } => out.extend_from_slice(hash),
                _ => return Err(invalid(kind, "pkh", "expected a tz1 address")),
            }
            out.extend_from_slice(secret);
        }
        OperationContent::Proposals {
            source,
            period,
            proposals,
        } => {
            forge_source(out, kind, "source", source)?;
            out.extend_from_slice(&period.to_be_bytes());
            micheline::write_length_prefixed(out, |body| {
                for proposal in proposals {
                    body.extend_from_slice(proposal);
                }
                Ok::<(), ForgeError>(())
            })?;
        }
        OperationContent::Ballot {
            source,
            period,
            proposal,
            ballot,
        } => {
            forge_source(out, kind, "source", source)?;
            out.extend_from_slice(&period.to_be_bytes());
            out.extend_from_slice(proposal);
            out.push(*ballot as u8);
        }
        OperationContent::Reveal {
            manager,
            public_key,
        } => {
            forge_manager(out, kind, manager)?;
            out.extend_from_slice(&public_key.forge());
        }
        OperationContent::Transaction {
            manager,
            amount,
            destination,
            parameters,
        } => {
            forge_manager(out, kind, manager)?;
            zarith::write_unsigned(out, &(*amount).into());
            out.extend_from_slice(&destination.forge_contract());
            match parameters {
                Some(parameters) => {
                    out.push(FLAG_PRESENT);
                    forge_parameters(out, kind, parameters)?;
                }
                None => out.push(FLAG_ABSENT),
            }
        }
        OperationContent::Origination {
            manager,
            balance,
            delegate,
            script,
        } => {
            forge_manager(out, kind, manager)?;
            zarith::write_unsigned(out, &(*balance).into());
            forge_delegate(out, kind, delegate.as_ref())?;
            micheline::write_length_prefixed(out, |body| script.code.write(body))?;
            micheline::write_length_prefixed(out, |body| script.storage.write(body))?;
        }
        OperationContent::Delegation { manager, delegate } => {
            forge_manager(out, kind, manager)?;
            forge_delegate(out, kind, delegate.as_ref())?;
        }
    }

    Ok(())
}

fn invalid(kind: &str, field: &str, reason: &str) -> ForgeError {
    ForgeError::InvalidField {
        kind: kind.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn forge_source(out: &mut Vec<u8>, kind: &str, field: &str, source: &Address) -> Result<()> {
    let pkh = source
        .forge_public_key_hash()
        .map_err(|e| invalid(kind, field, &e.to_string()))?;
    out.extend_from_slice(&pkh);
    Ok(())
}

fn forge_manager(out: &mut Vec<u8>, kind: &str, manager: &ManagerFields) -> Result<()> {
    forge_source(out, kind, "source", &manager.source)?;
    zarith::write_unsigned(out, &manager.fee.into());
    zarith::write_unsigned(out, &manager.counter.into());
    zarith::write_unsigned(out, &manager.gas_limit.into());
    zarith::write_unsigned(out, &manager.storage_limit.into());
    Ok(())
}

fn forge_delegate(out: &mut Vec<u8>, kind: &str, delegate: Option<&Address>) -> Result<()> {
    match delegate {
        Some(delegate) => {
            out.push(FLAG_PRESENT);
            forge_source(out, kind, "delegate", delegate)
        }
        None => {
            out.push(FLAG_ABSENT);
            Ok(())
        }
    }
}

/// Named entrypoints with a one-byte encoding
fn entrypoint_tag(name: &str) -> Option<u8> {
    match name {
        "default" => Some(0),
        "root" => Some(1),
        "do" => Some(2),
        "set_delegate" => Some(3),
        "remove_delegate" => Some(4),
        _ => None,
    }
}

fn forge_parameters(out: &mut Vec<u8>, kind: &str, parameters: &Parameters) -> Result<()> {
    let name = parameters.entrypoint.as_str();
    if let Some(tag) = entrypoint_tag(name) {
        out.push(tag);
    } else {
        let len = u8::try_from(name.len())
            .ok()
            .filter(|&len| len > 0 && usize::from(len) <= MAX_ENTRYPOINT_LEN)
            .ok_or_else(|| {
                invalid(
                    kind,
                    "entrypoint",
                    &format!("name must be 1 to {MAX_ENTRYPOINT_LEN} bytes long"),
                )
            })?;
        out.push(0xff);
        out.push(len);
        out.extend_from_slice(name.as_bytes());
    }

    micheline::write_length_prefixed(out, |body| parameters.value.write(body))?;
    Ok(())
}

fn forge_inlined_endorsement(out: &mut Vec<u8>, inlined: &InlinedEndorsement) {
    out.extend_from_slice(&inlined.branch);
    out.push(0);
    out.extend_from_slice(&inlined.level.to_be_bytes());
    out.extend_from_slice(&inlined.signature);
}

fn forge_block_header(out: &mut Vec<u8>, header: &BlockHeader) {
    out.extend_from_slice(&header.level.to_be_bytes());
    out.push(header.proto);
    out.extend_from_slice(&header.predecessor);
    out.extend_from_slice(&header.timestamp.timestamp().to_be_bytes());
    out.push(header.validation_pass);
    out.extend_from_slice(&header.operations_hash);

    let mut fitness = Vec::new();
    for component in &header.fitness {
        micheline::write_bytes(&mut fitness, component);
    }
    micheline::write_bytes(out, &fitness);

    out.extend_from_slice(&header.context);
    out.extend_from_slice(&header.priority.to_be_bytes());
    out.extend_from_slice(&header.proof_of_work_nonce);
    match &header.seed_nonce_hash {
        Some(hash) => {
            out.push(FLAG_PRESENT);
            out.extend_from_slice(hash);
        }
        None => out.push(FLAG_ABSENT),
    }
    out.extend_from_slice(&header.signature);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::PublicKey;
    use crate::micheline::Micheline;
    use crate::operation::{Script, Vote};

    const BRANCH: &str = "BLQMkH2PSTuAJgVm6rGHshY5z6Z6SAmqXv6q1LDzhX6fchJ12Up";
    const BRANCH_HEX: &str = "5aff622d53d32a8bae591627718c60a35b16737e301c57a13b6f1765483d88ff";
    const SOURCE: &str = "tz1XJ1UNechmHKhQo4tvVX6qztnVuQuSFKgd";
    const SOURCE_HEX: &str = "007fd82c06cf5a203f18faaf562447ed1efcc6c010";
    const DESTINATION: &str = "tz1aWXP237BLwNHJcCD4b3DutCevhqq2T1Z9";
    const CONTRACT: &str = "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D";

    fn address(s: &str) -> Address {
        Address::from_b58check(s).unwrap()
    }

    fn manager(fee: u64, counter: u64, gas_limit: u64, storage_limit: u64) -> ManagerFields {
        ManagerFields {
            source: address(SOURCE),
            fee,
            counter,
            gas_limit,
            storage_limit,
        }
    }

    fn forge_hex(contents: &[OperationContent]) -> String {
        forge(BRANCH, contents).unwrap().to_hex()
    }

    #[test]
    fn test_forge_transaction() {
        let content = OperationContent::Transaction {
            manager: manager(1283, 7, 10307, 0),
            amount: 20_000_000_000,
            destination: address(DESTINATION),
            parameters: None,
        };
        assert_eq!(
            forge_hex(&[content]),
            format!(
                "{BRANCH_HEX}6c{SOURCE_HEX}830a07c350008090dfc04a0000a31e81ac3425310e3274a4698a793b2839dc0afa00"
            )
        );
    }

    #[test]
    fn test_forge_reveal_without_branch() {
        let content = OperationContent::Reveal {
            manager: ManagerFields {
                source: address("tz1f2MeahW6XMLcfHJSU5VH8USC4EuFiwdhx"),
                fee: 1257,
                counter: 5,
                gas_limit: 10000,
                storage_limit: 0,
            },
            public_key: PublicKey::from_b58check(
                "edpkuEmaQSYKgDj5k9wfE3bTxjfjoG9k5YvRmYZsGf2bjEymZKkzNn",
            )
            .unwrap(),
        };
        assert_eq!(
            hex::encode(forge_contents(&[content]).unwrap()),
            "6b00d4a35d6c49ffbaa32b40e96c844dc485b0cdb5fae90905904e00004e7097e206a9afa864475095b58009014f9c24efd54c5d40240c1e807b4ab80c"
        );
    }

    #[test]
    fn test_forge_delegation() {
        let delegate = OperationContent::Delegation {
            manager: manager(1257, 8, 10000, 0),
            delegate: Some(address(DESTINATION)),
        };
        assert_eq!(
            forge_hex(&[delegate]),
            format!("{BRANCH_HEX}6e{SOURCE_HEX}e90908904e00ff00a31e81ac3425310e3274a4698a793b2839dc0afa")
        );

        let withdraw = OperationContent::Delegation {
            manager: manager(1257, 8, 10000, 0),
            delegate: None,
        };
        assert_eq!(
            forge_hex(&[withdraw]),
            format!("{BRANCH_HEX}6e{SOURCE_HEX}e90908904e0000")
        );
    }

    #[test]
    fn test_forge_origination() {
        let code = Micheline::from_json_str(
            r#"[{"prim":"parameter","args":[{"prim":"unit"}]},
                {"prim":"storage","args":[{"prim":"unit"}]},
                {"prim":"code","args":[[{"prim":"CDR"},{"prim":"NIL","args":[{"prim":"operation"}]},{"prim":"PAIR"}]]}]"#,
        )
        .unwrap();
        let content = OperationContent::Origination {
            manager: manager(1400, 9, 12000, 500),
            balance: 0,
            delegate: None,
            script: Script {
                code,
                storage: Micheline::prim("Unit", vec![]),
            },
        };
        assert_eq!(
            forge_hex(&[content]),
            format!(
                "{BRANCH_HEX}6d{SOURCE_HEX}f80a09e05df40300000000001c02000000170500036c0501036c050202000000080317053d036d034200000002030b"
            )
        );
    }

    #[test]
    fn test_forge_contract_call_with_entrypoint() {
        let value = Micheline::prim(
            "Pair",
            vec![
                Micheline::String(DESTINATION.into()),
                Micheline::int(10),
            ],
        );
        let content = OperationContent::Transaction {
            manager: manager(3000, 10, 20000, 100),
            amount: 0,
            destination: address(CONTRACT),
            parameters: Some(Parameters {
                entrypoint: "transfer".into(),
                value,
            }),
        };
        assert_eq!(
            forge_hex(&[content]),
            format!(
                "{BRANCH_HEX}6c{SOURCE_HEX}b8170aa09c016400\
                 01000102030405060708090a0b0c0d0e0f1011121300\
                 ffff087472616e736665720000002d07070100000024\
                 747a3161575850323337424c774e484a6343443462334475744365766871713254315a39000a"
            )
        );
    }

    #[test]
    fn test_forge_default_entrypoint() {
        let content = OperationContent::Transaction {
            manager: manager(3000, 10, 20000, 100),
            amount: 0,
            destination: address(CONTRACT),
            parameters: Some(Parameters {
                entrypoint: "default".into(),
                value: Micheline::prim("Unit", vec![]),
            }),
        };
        assert_eq!(
            forge_hex(&[content]),
            format!(
                "{BRANCH_HEX}6c{SOURCE_HEX}b8170aa09c016400\
                 01000102030405060708090a0b0c0d0e0f1011121300ff0000000002030b"
            )
        );
    }

    #[test]
    fn test_forge_activation() {
        let content = OperationContent::ActivateAccount {
            pkh: address(DESTINATION),
            secret: hex::decode("41f98b15efc63fa893d61d7d6eee4a2ce9427ac4")
                .unwrap()
                .try_into()
                .unwrap(),
        };
        assert_eq!(
            forge_hex(&[content]),
            format!(
                "{BRANCH_HEX}04a31e81ac3425310e3274a4698a793b2839dc0afa41f98b15efc63fa893d61d7d6eee4a2ce9427ac4"
            )
        );
    }

    #[test]
    fn test_forge_voting() {
        let proposal = [0x07u8; 32];
        let ballot = OperationContent::Ballot {
            source: address(SOURCE),
            period: 42,
            proposal,
            ballot: Vote::Yay,
        };
        assert_eq!(
            forge_hex(&[ballot]),
            format!("{BRANCH_HEX}06{SOURCE_HEX}0000002a{}00", "07".repeat(32))
        );

        let proposals = OperationContent::Proposals {
            source: address(SOURCE),
            period: 42,
            proposals: vec![proposal],
        };
        assert_eq!(
            forge_hex(&[proposals]),
            format!("{BRANCH_HEX}05{SOURCE_HEX}0000002a00000020{}", "07".repeat(32))
        );
    }

    #[test]
    fn test_forge_anonymous() {
        assert_eq!(
            forge_hex(&[OperationContent::Endorsement { level: 1234 }]),
            format!("{BRANCH_HEX}00000004d2")
        );
        assert_eq!(
            forge_hex(&[OperationContent::SeedNonceRevelation {
                level: 1234,
                nonce: [0xab; 32],
            }]),
            format!("{BRANCH_HEX}01000004d2{}", "ab".repeat(32))
        );
    }

    #[test]
    fn test_forge_double_endorsement_evidence() {
        let branch = base58check::decode_fixed::<32>(BRANCH, prefix::BLOCK_HASH).unwrap();
        let inlined = |byte: u8| InlinedEndorsement {
            branch,
            level: 1234,
            signature: [byte; 64],
        };
        let content = OperationContent::DoubleEndorsementEvidence {
            op1: inlined(0x11),
            op2: inlined(0x22),
        };
        assert_eq!(
            forge_hex(&[content]),
            format!(
                "{BRANCH_HEX}0200000065{BRANCH_HEX}00000004d2{}00000065{BRANCH_HEX}00000004d2{}",
                "11".repeat(64),
                "22".repeat(64)
            )
        );
    }

    #[test]
    fn test_forge_double_baking_evidence() {
        let predecessor = base58check::decode_fixed::<32>(BRANCH, prefix::BLOCK_HASH).unwrap();
        let header = |seconds: i64| BlockHeader {
            level: 1000,
            proto: 1,
            predecessor,
            timestamp: chrono::DateTime::from_timestamp(seconds, 0).unwrap(),
            validation_pass: 4,
            operations_hash: [0x01; 32],
            fitness: vec![vec![0x01], vec![0, 0, 0, 0, 0, 0, 0, 0x0a]],
            context: [0x02; 32],
            priority: 0,
            proof_of_work_nonce: [1, 2, 3, 4, 5, 6, 7, 8],
            seed_nonce_hash: None,
            signature: [0x03; 64],
        };
        let content = OperationContent::DoubleBakingEvidence {
            bh1: header(1_567_782_509),
            bh2: header(1_567_782_510),
        };

        let expected_header = |timestamp: &str| {
            format!(
                "000000ce000003e801{BRANCH_HEX}{timestamp}04{}\
                 00000011000000010100000008000000000000000a{}\
                 0000010203040506070800{}",
                "01".repeat(32),
                "02".repeat(32),
                "03".repeat(64)
            )
        };
        assert_eq!(
            forge_hex(&[content]),
            format!(
                "{BRANCH_HEX}03{}{}",
                expected_header("000000005d72766d"),
                expected_header("000000005d72766e")
            )
        );
    }

    #[test]
    fn test_forge_batch_preserves_order() {
        let reveal = OperationContent::Reveal {
            manager: manager(1257, 5, 10000, 0),
            public_key: PublicKey::from_b58check(
                "edpkuEmaQSYKgDj5k9wfE3bTxjfjoG9k5YvRmYZsGf2bjEymZKkzNn",
            )
            .unwrap(),
        };
        let transaction = OperationContent::Transaction {
            manager: manager(1283, 6, 10307, 0),
            amount: 20_000_000_000,
            destination: address(DESTINATION),
            parameters: None,
        };
        assert_eq!(
            forge_hex(&[reveal, transaction]),
            format!(
                "{BRANCH_HEX}6b{SOURCE_HEX}e90905904e00004e7097e206a9afa864475095b58009014f9c24efd54c5d40240c1e807b4ab80c\
                 6c{SOURCE_HEX}830a06c350008090dfc04a0000a31e81ac3425310e3274a4698a793b2839dc0afa00"
            )
        );
    }

    #[test]
    fn test_forge_json_matches_typed() {
        let json = format!(
            r#"[{{"kind":"transaction","source":"{SOURCE}","fee":"1283","counter":"7",
                "gas_limit":"10307","storage_limit":"0","amount":"20000000000",
                "destination":"{DESTINATION}"}}]"#
        );
        let forged = forge_json(BRANCH, &json).unwrap();
        assert!(forged.to_hex().ends_with("8090dfc04a0000a31e81ac3425310e3274a4698a793b2839dc0afa00"));
        assert_eq!(forge_json(BRANCH, &json).unwrap(), forged);
    }

    #[test]
    fn test_forge_errors() {
        assert!(matches!(
            forge("not-a-branch", &[]),
            Err(ForgeError::Branch(_))
        ));

        let from_contract = OperationContent::Delegation {
            manager: ManagerFields {
                source: address(CONTRACT),
                fee: 0,
                counter: 0,
                gas_limit: 0,
                storage_limit: 0,
            },
            delegate: None,
        };
        assert!(matches!(
            forge(BRANCH, &[from_contract]),
            Err(ForgeError::InvalidField { ref field, .. }) if field == "source"
        ));

        let long_entrypoint = OperationContent::Transaction {
            manager: manager(0, 0, 0, 0),
            amount: 0,
            destination: address(CONTRACT),
            parameters: Some(Parameters {
                entrypoint: "x".repeat(32),
                value: Micheline::prim("Unit", vec![]),
            }),
        };
        assert!(matches!(
            forge(BRANCH, &[long_entrypoint]),
            Err(ForgeError::InvalidField { ref field, .. }) if field == "entrypoint"
        ));

        let bad_script = OperationContent::Origination {
            manager: manager(0, 0, 0, 0),
            balance: 0,
            delegate: None,
            script: Script {
                code: Micheline::prim("NOPE", vec![]),
                storage: Micheline::prim("Unit", vec![]),
            },
        };
        assert!(matches!(
            forge(BRANCH, &[bad_script]),
            Err(ForgeError::Micheline(MichelineError::UnknownPrimitive(_)))
        ));
    }

    #[test]
    fn test_forge_content_leaves_buffer_untouched_on_error() {
        let from_contract = OperationContent::Delegation {
            manager: ManagerFields {
                source: address(CONTRACT),
                fee: 1,
                counter: 1,
                gas_limit: 1,
                storage_limit: 0,
            },
            delegate: None,
        };
        let mut out = vec![0xaa];
        assert!(matches!(
            forge_content(&mut out, &from_contract),
            Err(ForgeError::InvalidField { ref field, .. }) if field == "source"
        ));
        assert_eq!(out, vec![0xaa]);

        // Failure after the manager header was already written
        let bad_script = OperationContent::Origination {
            manager: manager(1400, 9, 12000, 500),
            balance: 0,
            delegate: None,
            script: Script {
                code: Micheline::prim("NOPE", vec![]),
                storage: Micheline::prim("Unit", vec![]),
            },
        };
        assert!(forge_content(&mut out, &bad_script).is_err());
        assert_eq!(out, vec![0xaa]);

        forge_content(&mut out, &OperationContent::Endorsement { level: 1 }).unwrap();
        assert_eq!(out, vec![0xaa, 0x00, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_signed_operation() {
        let key = crate::test_utils::ed25519_key();
        let forged = forge(BRANCH, &[OperationContent::Endorsement { level: 1 }]).unwrap();
        let signed = forged.sign(&key).unwrap();

        assert!(key.verify(forged.as_bytes(), signed.signature()));
        assert_eq!(signed.to_bytes().len(), forged.as_bytes().len() + 64);
        assert!(signed.to_hex().starts_with(&forged.to_hex()));
        assert!(signed.operation_hash().starts_with('o'));
        assert_eq!(signed.operation_hash().len(), 51);
    }

    #[test]
    fn test_branch_starting_with_watermark_is_still_marked() {
        let key = crate::test_utils::ed25519_key();
        let branch = base58check::encode(prefix::BLOCK_HASH, &[0x03; 32]);
        let forged = forge(&branch, &[OperationContent::Endorsement { level: 1 }]).unwrap();
        let signed = forged.sign(&key).unwrap();

        let mut marked = vec![0x03];
        marked.extend_from_slice(forged.as_bytes());
        assert!(key.public_key().verify(&marked, signed.signature()));
        assert!(!key.public_key().verify(forged.as_bytes(), signed.signature()));
    }
}
