//! Golden vector tests
//!
//! Literal hex and Base58Check values produced by the network's own encoders.
//! Any drift here means forged bytes would be rejected or, worse, mean
//! something else on chain.

use tzforge::address::PublicKey;
use tzforge::forge::{self, forge_contents};
use tzforge::operation::ManagerFields;
use tzforge::test_utils::{
    self, BRANCH, ED25519_SEED_HEX, ENCRYPTED_SECRET, ENCRYPTED_SECRET_PASSWORD,
};
use tzforge::{CurveKind, Key, KeyError, OperationContent, expression};

const GOLDEN_EDSK: &str = "edskRsPBsKuULoLTEQV2R9UbvSZbzFqvoESvp1mYyQJU8xi9mJamt88r5uTXbWQpVHjSiPWWtnoyqTCuSLQLxbEKUXfwwTccsF";
const GOLDEN_EDPK: &str = "edpkuHMDkMz46HdRXYwom3xRwqk3zQ5ihWX4j8dwo2R2h8o4gPcbN5";
const GOLDEN_ADDRESS: &str = "tz1L8fUQLuwRuywTZUP5JUw9LL3kJa8LMfoo";

const TRANSACTION_HEX: &str = "5aff622d53d32a8bae591627718c60a35b16737e301c57a13b6f1765483d88ff6c007fd82c06cf5a203f18faaf562447ed1efcc6c010830a07c350008090dfc04a0000a31e81ac3425310e3274a4698a793b2839dc0afa00";

// ============================================================================
// Forging
// ============================================================================

#[test]
fn test_transaction() {
    let forged = forge::forge(BRANCH, &[test_utils::transaction()]).unwrap();
    assert_eq!(forged.to_hex(), TRANSACTION_HEX);
}

#[test]
fn test_reveal() {
    let reveal = OperationContent::Reveal {
        manager: ManagerFields {
            source: test_utils::address("tz1f2MeahW6XMLcfHJSU5VH8USC4EuFiwdhx"),
            fee: 1257,
            counter: 5,
            gas_limit: 10000,
            storage_limit: 0,
        },
        public_key: PublicKey::from_b58check(test_utils::REVEAL_PUBLIC_KEY).unwrap(),
    };
    assert_eq!(
        hex::encode(forge_contents(&[reveal]).unwrap()),
        "6b00d4a35d6c49ffbaa32b40e96c844dc485b0cdb5fae90905904e00004e7097e206a9afa864475095b58009014f9c24efd54c5d40240c1e807b4ab80c"
    );
}

#[test]
fn test_transaction_from_rpc_json() {
    let json = r#"{
        "kind": "transaction",
        "source": "tz1XJ1UNechmHKhQo4tvVX6qztnVuQuSFKgd",
        "fee": "1283",
        "counter": "7",
        "gas_limit": "10307",
        "storage_limit": "0",
        "amount": "20000000000",
        "destination": "tz1aWXP237BLwNHJcCD4b3DutCevhqq2T1Z9"
    }"#;
    assert_eq!(forge::forge_json(BRANCH, json).unwrap().to_hex(), TRANSACTION_HEX);
}

#[test]
fn test_forging_is_deterministic() {
    let first = forge::forge(BRANCH, &test_utils::batch()).unwrap();
    let second = forge::forge(BRANCH, &test_utils::batch()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_signed_transaction() {
    let key = test_utils::ed25519_key();
    let signed = forge::forge(BRANCH, &[test_utils::transaction()])
        .unwrap()
        .sign(&key)
        .unwrap();

    assert_eq!(
        signed.signature().to_string(),
        "edsigu5TxWx3ddWFroXhWmFMgEhGggRjd6tsU8Z7XSg8UWxVsC95ZCVNJXo5oN1LocwwUYQMvNggTX4QwTjvbc6SvhfA2Q8R2wA"
    );
    assert_eq!(
        signed.to_hex(),
        format!(
            "{TRANSACTION_HEX}f1fc3092c9aec1eb7075e85af05d04e346ef2a44b176d3a4ee8db30294df33209b7eeea4040754af66d849e4a650d78510e5c10102d47fbaf4f855b2177b9e0d"
        )
    );
    assert_eq!(
        signed.operation_hash(),
        "onrCU8Juya6hpDEoC9wJPKPME6LVTiZPRFfXL5SMuYtzW8STRfF"
    );
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_int_expressions() {
    assert_eq!(
        expression::int_expression(9),
        "exprtvAzqNE9zfpBLL9nKEaY1Dd2rznyG9iTFtECJvDkuub1bj3XvW"
    );
    assert_eq!(
        expression::int_expression(-9),
        "exprvH9jru3NJN4ZTNwwkCdC1PPLkWLWCoe6JxhcJ3a39mD5Bd4NH4"
    );
}

#[test]
fn test_address_expression() {
    // Address packs as the 22-byte forged contract id. The commonly quoted
    // `expruwEtkquVj9E92Wc7KTFMSnCqVGZ4KPngpspNmRTm6rX6KZbcvH` matches no
    // packing of this address (string, 20/21/22-byte bytes, with or without 0x05)
    assert_eq!(
        expression::address_expression("tz1S82rGFZK8cVbNDpP1Hf9VhTUa4W8oc2WV").unwrap(),
        "expru1LH1CafV3yYgs9BkbrMWWfAE9ye3RdWwyndr9MKYN8w5VQ7Rt"
    );
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn test_encrypted_secret_import() {
    let key = Key::from_encrypted_secret(ENCRYPTED_SECRET, ENCRYPTED_SECRET_PASSWORD).unwrap();
    assert_eq!(key.secret_key().as_str(), GOLDEN_EDSK);
    assert_eq!(key.public_key_string(), GOLDEN_EDPK);
    assert_eq!(key.address().to_string(), GOLDEN_ADDRESS);
}

#[test]
fn test_encrypted_secret_wrong_password() {
    for password in ["", "password12345#", "password12345##x", "PASSWORD12345##"] {
        assert_eq!(
            Key::from_encrypted_secret(ENCRYPTED_SECRET, password).unwrap_err(),
            KeyError::InvalidPassword,
            "password {password:?} must be rejected"
        );
    }
}

#[test]
fn test_address_from_own_secret() {
    for key in test_utils::keys() {
        let again = Key::from_b58_secret(&key.secret_key(), None).unwrap();
        assert_eq!(again.address(), key.address());
        assert_eq!(again.public_key_string(), key.public_key_string());
    }
}

#[test]
fn test_every_import_path_agrees() {
    let from_hex = Key::from_hex(ED25519_SEED_HEX, CurveKind::Ed25519).unwrap();
    let from_base64 = Key::from_base64(
        "dXnEiB+5mNBDQXt8BFgqoVF58SXFMD4e5WqWeANNlbA=",
        CurveKind::Ed25519,
    )
    .unwrap();
    let from_b58 = Key::from_b58_secret(GOLDEN_EDSK, None).unwrap();

    for key in [from_hex, from_base64, from_b58] {
        assert_eq!(key.address().to_string(), GOLDEN_ADDRESS);
    }
}

// ============================================================================
// Signatures
// ============================================================================

#[test]
fn test_fixed_signatures() {
    let expected = [
        (
            test_utils::ed25519_key(),
            "979fe5fd4cfbcbd537fa9c9c91c8aa331837601b8b8bf3a92236dc828455a02ebc2c12ce413bda1ad049c80be4c264a0f4593ceff99b3cb794293c877011e409",
        ),
        (
            test_utils::secp256k1_key(),
            "400d91a183648198ce9571e3f4e3cda027380d65cc8bf6e9f79a0ffaebd82ab27c208c38029973a0bc4d5a5db7e366af24c848b568dabec04959532ea8a30cf8",
        ),
        (
            test_utils::p256_key(),
            "ae0826632f1864d14ec34ea10a4d546bada4d06da5be20d0357f7808f3ce0594bca60a99c24fb6cff5c838922e423cbc081dc739d4aafc34d16439992e7a670f",
        ),
    ];

    for (key, signature_hex) in expected {
        let signature = key.sign_hex("deadbeef").unwrap();
        assert_eq!(signature.to_hex(), signature_hex, "{} signature", key.curve());
        assert_eq!(key.sign_hex("deadbeef").unwrap(), signature);
        assert!(key.verify(&[0xde, 0xad, 0xbe, 0xef], &signature));
    }
}
