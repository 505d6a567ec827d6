//! Test utilities for building keys and operation contents
//!
//! Fixtures are fixed values with known encodings, so tests and benchmarks can
//! compare against literal hex and Base58Check strings.

use crate::address::{Address, PublicKey};
use crate::curve::CurveKind;
use crate::key::Key;
use crate::micheline::Micheline;
use crate::operation::{ManagerFields, OperationContent, Parameters, Script};

/// Block hash used as branch throughout the fixtures
pub const BRANCH: &str = "BLQMkH2PSTuAJgVm6rGHshY5z6Z6SAmqXv6q1LDzhX6fchJ12Up";

/// Raw bytes of [`BRANCH`] in hex
pub const BRANCH_HEX: &str = "5aff622d53d32a8bae591627718c60a35b16737e301c57a13b6f1765483d88ff";

/// Manager operation source
pub const SOURCE: &str = "tz1XJ1UNechmHKhQo4tvVX6qztnVuQuSFKgd";

/// Transfer destination
pub const DESTINATION: &str = "tz1aWXP237BLwNHJcCD4b3DutCevhqq2T1Z9";

/// Originated contract whose hash is the bytes `00..13`
pub const CONTRACT: &str = "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D";

/// Ed25519 seed behind `tz1L8fUQLuwRuywTZUP5JUw9LL3kJa8LMfoo`
pub const ED25519_SEED_HEX: &str =
    "7579c4881fb998d043417b7c04582aa15179f125c5303e1ee56a9678034d95b0";

/// Password-encrypted form of [`ED25519_SEED_HEX`]
pub const ENCRYPTED_SECRET: &str =
    "edesk1fddn27MaLcQVEdZpAYiyGQNm6UjtWiBfNP2ZenTy3CFsoSVJgeHM9pP9cvLJ2r5Xp2quQ5mYexW1LRKee2";

/// Password of [`ENCRYPTED_SECRET`]
pub const ENCRYPTED_SECRET_PASSWORD: &str = "password12345##";

/// Public key revealed by the reveal fixture
pub const REVEAL_PUBLIC_KEY: &str = "edpkuEmaQSYKgDj5k9wfE3bTxjfjoG9k5YvRmYZsGf2bjEymZKkzNn";

fn scalar_one() -> [u8; 32] {
    let mut secret = [0u8; 32];
    secret[31] = 1;
    secret
}

/// Ed25519 key from [`ED25519_SEED_HEX`]
///
/// # Panics
/// Never, the seed is a valid Ed25519 seed.
#[must_use]
pub fn ed25519_key() -> Key {
    Key::from_hex(ED25519_SEED_HEX, CurveKind::Ed25519).expect("fixture seed is valid")
}

/// Secp256k1 key with secret scalar 1
///
/// # Panics
/// Never, 1 is a valid scalar.
#[must_use]
pub fn secp256k1_key() -> Key {
    Key::from_raw_bytes(&scalar_one(), CurveKind::Secp256k1).expect("scalar 1 is valid")
}

/// P-256 key with secret scalar 1
///
/// # Panics
/// Never, 1 is a valid scalar.
#[must_use]
pub fn p256_key() -> Key {
    Key::from_raw_bytes(&scalar_one(), CurveKind::NistP256).expect("scalar 1 is valid")
}

/// One fixture key per curve
#[must_use]
pub fn keys() -> [Key; 3] {
    [ed25519_key(), secp256k1_key(), p256_key()]
}

/// Parse a fixture address
///
/// # Panics
/// If `s` is not a valid address.
#[must_use]
pub fn address(s: &str) -> Address {
    Address::from_b58check(s).expect("fixture address is valid")
}

/// Manager fields with [`SOURCE`] as source
#[must_use]
pub fn manager(fee: u64, counter: u64, gas_limit: u64, storage_limit: u64) -> ManagerFields {
    ManagerFields {
        source: address(SOURCE),
        fee,
        counter,
        gas_limit,
        storage_limit,
    }
}

/// Plain transfer of 20000 tez to [`DESTINATION`]
#[must_use]
pub fn transaction() -> OperationContent {
    OperationContent::Transaction {
        manager: manager(1283, 7, 10307, 0),
        amount: 20_000_000_000,
        destination: address(DESTINATION),
        parameters: None,
    }
}

/// Reveal of [`REVEAL_PUBLIC_KEY`]
///
/// # Panics
/// Never, the public key constant is well-formed.
#[must_use]
pub fn reveal() -> OperationContent {
    OperationContent::Reveal {
        manager: manager(1257, 5, 10000, 0),
        public_key: PublicKey::from_b58check(REVEAL_PUBLIC_KEY).expect("fixture key is valid"),
    }
}

/// `transfer` call on [`CONTRACT`] with a `Pair` argument
#[must_use]
pub fn contract_call() -> OperationContent {
    OperationContent::Transaction {
        manager: manager(3000, 10, 20000, 100),
        amount: 0,
        destination: address(CONTRACT),
        parameters: Some(Parameters {
            entrypoint: "transfer".into(),
            value: Micheline::prim(
                "Pair",
                vec![Micheline::String(DESTINATION.into()), Micheline::int(10)],
            ),
        }),
    }
}

/// Origination of a contract that ignores its parameter
#[must_use]
pub fn origination() -> OperationContent {
    let unit_type = || Micheline::prim("unit", vec![]);
    let code = Micheline::Seq(vec![
        Micheline::prim("parameter", vec![unit_type()]),
        Micheline::prim("storage", vec![unit_type()]),
        Micheline::prim(
            "code",
            vec![Micheline::Seq(vec![
                Micheline::prim("CDR", vec![]),
                Micheline::prim("NIL", vec![Micheline::prim("operation", vec![])]),
                Micheline::prim("PAIR", vec![]),
            ])],
        ),
    ]);
    OperationContent::Origination {
        manager: manager(1400, 9, 12000, 500),
        balance: 0,
        delegate: None,
        script: Script {
            code,
            storage: Micheline::prim("Unit", vec![]),
        },
    }
}

/// A reveal followed by a transfer, as sent by a fresh account
#[must_use]
pub fn batch() -> Vec<OperationContent> {
    vec![reveal(), transaction()]
}
