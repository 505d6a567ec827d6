//! Cryptographic identities
//!
//! A [`Key`] holds a curve, its 32-byte secret and the public key derived from
//! it. Every constructor funnels into the same derivation, so the public key
//! always matches the secret. The secret lives in a [`Zeroizing`] buffer and is
//! wiped when the key is dropped.
//!
//! Supported sources:
//! - raw bytes, hex or base64 secrets
//! - Base58Check secrets (`edsk` seed or 64-byte form, `spsk`, `p2sk`)
//! - BIP-39 mnemonics, with `email + password` as the passphrase
//! - password-encrypted secrets (`edesk`, `spesk`, `p2esk`)

use crate::address::{Address, AddressError, PublicKey};
use crate::base58check::{self, Base58Error};
use crate::curve::{CurveError, CurveKind, SECRET_KEY_SIZE};
use crate::prefix;
use crate::signature::Signature;
use crate::watermark::{self, Watermark};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bip39::Mnemonic;
use log::{debug, warn};
use std::fmt;
use thiserror::Error;
use tzforge_crypto::CryptoError;
use zeroize::Zeroizing;

/// Key errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Malformed hex input
    #[error("Hex decode error: {0}")]
    Hex(String),

    /// Malformed base64 input
    #[error("Base64 decode error: {0}")]
    Base64(String),

    /// Secret has the wrong number of bytes
    #[error("Invalid secret key length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Public half of a 64-byte Ed25519 secret does not belong to its seed
    #[error("Ed25519 secret key carries a public key that does not match its seed")]
    PublicKeyMismatch,

    /// Base58Check decoding failed
    #[error("Base58 error: {0}")]
    Base58(#[from] Base58Error),

    /// Curve could not be inferred from the input
    #[error("Unknown secret key prefix: {0}")]
    UnknownPrefix(String),

    /// Curve arithmetic failed
    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    /// Derived public key was rejected
    #[error("Public key error: {0}")]
    PublicKey(#[from] AddressError),

    /// Mnemonic has an unknown word, a bad word count or a bad checksum
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Encrypted secret did not authenticate under the given password
    #[error("Invalid password")]
    InvalidPassword,

    /// Encrypted secret could not be processed
    #[error("Encrypted secret error: {0}")]
    Crypto(String),

    /// The OS random source failed
    #[error("Random generation failed: {0}")]
    Random(String),
}

impl From<CryptoError> for KeyError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidPassword => Self::InvalidPassword,
            other => Self::Crypto(other.to_string()),
        }
    }
}

/// Result type for key operations
pub type Result<T> = std::result::Result<T, KeyError>;

/// Attempts at drawing a valid ECDSA scalar before giving up
const GENERATE_ATTEMPTS: usize = 16;

/// A secret key with its derived public key
#[derive(Clone)]
pub struct Key {
    curve: CurveKind,
    secret: Zeroizing<[u8; SECRET_KEY_SIZE]>,
    public_key: PublicKey,
}

impl Key {
    fn from_seed(curve: CurveKind, seed: &[u8; SECRET_KEY_SIZE]) -> Result<Self> {
        let raw_public_key = curve.derive_public_key(seed)?;
        let public_key = PublicKey::from_bytes(curve, &raw_public_key)?;
        Ok(Self {
            curve,
            secret: Zeroizing::new(*seed),
            public_key,
        })
    }

    /// Build a key from raw secret bytes
    ///
    /// Ed25519 also accepts the 64-byte `seed‖public key` form.
    pub fn from_raw_bytes(bytes: &[u8], curve: CurveKind) -> Result<Self> {
        match (curve, bytes.len()) {
            (_, SECRET_KEY_SIZE) => {
                let mut seed = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
                seed.copy_from_slice(bytes);
                Self::from_seed(curve, &seed)
            }
            (CurveKind::Ed25519, 64) => {
                let mut seed = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
                seed.copy_from_slice(&bytes[..SECRET_KEY_SIZE]);
                let key = Self::from_seed(curve, &seed)?;
                if key.public_key.as_bytes() != &bytes[SECRET_KEY_SIZE..] {
                    warn!("Rejecting Ed25519 secret key whose public half does not match the seed");
                    return Err(KeyError::PublicKeyMismatch);
                }
                Ok(key)
            }
            (_, actual) => Err(KeyError::InvalidLength {
                expected: SECRET_KEY_SIZE,
                actual,
            }),
        }
    }

    /// Build a key from a hex secret
    pub fn from_hex(secret: &str, curve: CurveKind) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(secret.trim()).map_err(|e| KeyError::Hex(e.to_string()))?,
        );
        Self::from_raw_bytes(&bytes, curve)
    }

    /// Build a key from a base64 secret
    pub fn from_base64(secret: &str, curve: CurveKind) -> Result<Self> {
        let bytes = Zeroizing::new(
            BASE64
                .decode(secret.trim())
                .map_err(|e| KeyError::Base64(e.to_string()))?,
        );
        Self::from_raw_bytes(&bytes, curve)
    }

    /// Build a key from a Base58Check secret key
    ///
    /// When `curve` is `None` it is inferred from the prefix.
    pub fn from_b58_secret(secret: &str, curve: Option<CurveKind>) -> Result<Self> {
        let secret = secret.trim();
        let curve = curve
            .or_else(|| CurveKind::from_b58_prefix(secret))
            .ok_or_else(|| KeyError::UnknownPrefix(secret.chars().take(4).collect()))?;
        debug!("Importing {curve} secret key");

        let bytes = match curve {
            // The 32-byte seed form is 54 characters, the 64-byte form 98
            CurveKind::Ed25519 if secret.len() == 54 => {
                base58check::decode(secret, prefix::EDSK_SEED)?
            }
            _ => base58check::decode(secret, curve.secret_key_prefix())?,
        };
        let bytes = Zeroizing::new(bytes);
        Self::from_raw_bytes(&bytes, curve)
    }

    /// Derive a key from a BIP-39 mnemonic
    ///
    /// The BIP-39 passphrase is `email` immediately followed by `password`,
    /// and the first 32 bytes of the resulting seed become the secret.
    pub fn from_mnemonic(
        words: &str,
        email: &str,
        password: &str,
        curve: CurveKind,
    ) -> Result<Self> {
        let mnemonic = Mnemonic::parse_normalized(words)
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        let passphrase = Zeroizing::new(format!("{email}{password}"));
        let seed = Zeroizing::new(mnemonic.to_seed_normalized(&passphrase));
        debug!("Derived {curve} key from a {}-word mnemonic", mnemonic.word_count());
        Self::from_raw_bytes(&seed[..SECRET_KEY_SIZE], curve)
    }

    /// Decrypt a password-protected secret (`edesk`/`spesk`/`p2esk`)
    pub fn from_encrypted_secret(encrypted: &str, password: &str) -> Result<Self> {
        let encrypted = encrypted.trim();
        let curve = ["edesk", "spesk", "p2esk"]
            .iter()
            .any(|tag| encrypted.starts_with(tag))
            .then(|| CurveKind::from_b58_prefix(encrypted))
            .flatten()
            .ok_or_else(|| KeyError::UnknownPrefix(encrypted.chars().take(5).collect()))?;
        debug!("Importing encrypted {curve} secret key");

        let payload = base58check::decode(encrypted, curve.encrypted_secret_prefix())?;
        let seed = tzforge_crypto::decrypt(password.as_bytes(), &payload)?;
        Self::from_raw_bytes(&seed, curve)
    }

    /// Generate a fresh key from the OS random source
    pub fn generate(curve: CurveKind) -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
        let mut last_error = None;

        for _ in 0..GENERATE_ATTEMPTS {
            getrandom::fill(&mut seed[..]).map_err(|e| KeyError::Random(e.to_string()))?;
            match Self::from_seed(curve, &seed) {
                Ok(key) => return Ok(key),
                // Out-of-range ECDSA scalar, draw again
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| KeyError::Random("no attempts made".into())))
    }

    /// Generate a fresh English BIP-39 mnemonic with 12, 15, 18, 21 or 24 words
    pub fn generate_mnemonic(word_count: usize) -> Result<Zeroizing<String>> {
        if !(12..=24).contains(&word_count) || word_count % 3 != 0 {
            return Err(KeyError::InvalidMnemonic(format!(
                "unsupported word count {word_count}"
            )));
        }

        let mut entropy = Zeroizing::new(vec![0u8; word_count * 4 / 3]);
        getrandom::fill(&mut entropy[..]).map_err(|e| KeyError::Random(e.to_string()))?;
        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        Ok(Zeroizing::new(mnemonic.to_string()))
    }

    /// Curve of the key
    #[must_use]
    pub fn curve(&self) -> CurveKind {
        self.curve
    }

    /// Base58Check secret key (`edsk` 64-byte form, `spsk`, `p2sk`)
    #[must_use]
    pub fn secret_key(&self) -> Zeroizing<String> {
        let encoded = match self.curve {
            CurveKind::Ed25519 => {
                let mut full = Zeroizing::new(Vec::with_capacity(64));
                full.extend_from_slice(&self.secret[..]);
                full.extend_from_slice(self.public_key.as_bytes());
                base58check::encode(self.curve.secret_key_prefix(), &full)
            }
            CurveKind::Secp256k1 | CurveKind::NistP256 => {
                base58check::encode(self.curve.secret_key_prefix(), &self.secret[..])
            }
        };
        Zeroizing::new(encoded)
    }

    /// Derived public key
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Base58Check public key (`edpk`/`sppk`/`p2pk`)
    #[must_use]
    pub fn public_key_string(&self) -> String {
        self.public_key.to_b58check()
    }

    /// Account address (`tz1`/`tz2`/`tz3`)
    #[must_use]
    pub fn address(&self) -> Address {
        self.public_key.hash()
    }

    /// Sign raw bytes under the generic operation watermark
    pub fn sign_bytes(&self, message: &[u8]) -> Result<Signature> {
        let watermarked = watermark::apply(message);
        Ok(self.curve.sign(&watermarked, &self.secret)?)
    }

    /// Sign `message` with `watermark` always prepended
    ///
    /// Unlike [`Key::sign_bytes`] this never inspects the first byte, so data
    /// that happens to start with a watermark byte is still marked.
    pub fn sign_with_watermark(&self, watermark: Watermark, message: &[u8]) -> Result<Signature> {
        let mut data = Vec::with_capacity(1 + message.len());
        data.push(watermark.byte());
        data.extend_from_slice(message);
        Ok(self.curve.sign(&data, &self.secret)?)
    }

    /// Sign a hex message (typically a forged operation) under the generic
    /// operation watermark
    pub fn sign_hex(&self, message: &str) -> Result<Signature> {
        let bytes = hex::decode(message.trim()).map_err(|e| KeyError::Hex(e.to_string()))?;
        self.sign_bytes(&bytes)
    }

    /// Check a signature produced by [`Key::sign_bytes`]
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        signature.curve() == self.curve
            && self
                .public_key
                .verify(&watermark::apply(message), signature)
    }

    /// Encrypt the secret under `password` (`edesk`/`spesk`/`p2esk`)
    pub fn to_encrypted_secret(&self, password: &str) -> Result<String> {
        let payload = tzforge_crypto::encrypt(password.as_bytes(), &self.secret[..])?;
        Ok(base58check::encode(
            self.curve.encrypted_secret_prefix(),
            &payload,
        ))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("curve", &self.curve)
            .field("public_key", &self.public_key.to_b58check())
            .finish_non_exhaustive()
    }
}
