//! Password-encrypted secret keys as produced by `octez-client`
//!
//! An encrypted secret (`edesk…`, `spesk…`, `p2esk…`) carries, after its
//! Base58Check prefix is stripped:
//! ```text
//! [salt:8][tag:16][ciphertext:32]
//! ```
//!
//! - **PBKDF2-HMAC-SHA512** (32768 rounds) stretches the password into a 32-byte key
//! - **XSalsa20-Poly1305** (NaCl `secretbox`) with an all-zero nonce seals the seed
//!
//! The zero nonce is part of the format: every secret gets its own salt and
//! therefore its own key, so a nonce is never reused under one key.

use crypto_secretbox::XSalsa20Poly1305;
use crypto_secretbox::aead::{Aead, KeyInit, Nonce};
use log::debug;
use sha2::Sha512;
use thiserror::Error;
use zeroize::Zeroizing;

/// Salt length in bytes
pub const SALT_LEN: usize = 8;

/// Poly1305 authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// PBKDF2 iteration count fixed by the encrypted-key format
pub const PBKDF2_ROUNDS: u32 = 32_768;

/// Length of the derived symmetric key
pub const KEY_LEN: usize = 32;

/// Encrypted secret errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Payload cannot hold a salt and an authentication tag
    #[error("Encrypted secret too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum payload length
        expected: usize,
        /// Actual payload length
        actual: usize,
    },

    /// Authentication failed, which means the password is wrong or the data was altered
    #[error("Decryption failed (wrong password?)")]
    InvalidPassword,

    /// Cipher could not be initialised or could not seal the plaintext
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// The OS random source failed
    #[error("Random generation failed: {0}")]
    Random(String),
}

/// Result type for encrypted secret operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Derive the 32-byte secretbox key from a password and salt
#[must_use]
pub fn derive_key(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    debug!("Deriving key using PBKDF2-HMAC-SHA512 ({PBKDF2_ROUNDS} rounds)...");
    let start = std::time::Instant::now();

    pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, PBKDF2_ROUNDS, &mut key[..]);

    debug!("Key derived in {:?}", start.elapsed());
    key
}

fn cipher(key: &[u8; KEY_LEN]) -> Result<XSalsa20Poly1305> {
    XSalsa20Poly1305::new_from_slice(key)
        .map_err(|e| CryptoError::Cipher(format!("secretbox initialization failed: {e}")))
}

/// Decrypt an encrypted secret payload (prefix already stripped)
///
/// Expects bytes in format: `[salt:8][tag:16][ciphertext:variable]`
pub fn decrypt(password: &[u8], encrypted: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    debug!("Decrypting secret ({} bytes)...", encrypted.len());

    if encrypted.len() < SALT_LEN + TAG_LEN {
        return Err(CryptoError::TooShort {
            expected: SALT_LEN + TAG_LEN,
            actual: encrypted.len(),
        });
    }

    let (salt, sealed) = encrypted.split_at(SALT_LEN);
    let key = derive_key(password, salt);

    let nonce = Nonce::<XSalsa20Poly1305>::default();
    let plaintext = cipher(&key)?
        .decrypt(&nonce, sealed)
        .map_err(|_| CryptoError::InvalidPassword)?;

    Ok(Zeroizing::new(plaintext))
}

/// Encrypt a secret under a fresh random salt
///
/// Returns bytes in format: `[salt:8][tag:16][ciphertext:variable]`
pub fn encrypt(password: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt).map_err(|e| CryptoError::Random(e.to_string()))?;
    encrypt_with_salt(password, &salt, secret)
}

/// Encrypt a secret under a caller-chosen salt
pub fn encrypt_with_salt(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    secret: &[u8],
) -> Result<Vec<u8>> {
    let key = derive_key(password, salt);

    let nonce = Nonce::<XSalsa20Poly1305>::default();
    let sealed = cipher(&key)?
        .encrypt(&nonce, secret)
        .map_err(|e| CryptoError::Cipher(format!("Encryption failed: {e}")))?;

    let mut output = Vec::with_capacity(SALT_LEN + sealed.len());
    output.extend_from_slice(salt);
    output.extend_from_slice(&sealed);

    debug!("Encryption complete: {} bytes", output.len());
    Ok(output)
}
