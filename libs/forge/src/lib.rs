//! Tezos operation forging and multi-curve key management
//!
//! This library turns structured operation contents into the exact bytes the
//! network expects, and manages the keys that sign them on all three implicit
//! account curves (Ed25519, Secp256k1, NIST P-256).
//!
//! # Layout
//!
//! - `base58check`, `zarith`, `hash` - leaf codecs
//! - `curve`, `signature`, `address` - per-curve derivation, signing and encodings
//! - `key` - identities from raw, hex, base64, Base58Check, mnemonic or encrypted secrets
//! - `micheline` - Micheline JSON and binary encoding
//! - `operation`, `forge` - operation contents and their forged form
//! - `expression` - `expr…` hashes of packed values
//! - `watermark` - signing domain separation
//!
//! # Example Usage
//!
//! ```rust
//! use tzforge::{CurveKind, Key, OperationContent, forge};
//!
//! let key = Key::from_hex(
//!     "7579c4881fb998d043417b7c04582aa15179f125c5303e1ee56a9678034d95b0",
//!     CurveKind::Ed25519,
//! )
//! .unwrap();
//! assert_eq!(key.address().to_string(), "tz1L8fUQLuwRuywTZUP5JUw9LL3kJa8LMfoo");
//!
//! let forged = forge::forge(
//!     "BLQMkH2PSTuAJgVm6rGHshY5z6Z6SAmqXv6q1LDzhX6fchJ12Up",
//!     &[OperationContent::Endorsement { level: 1234 }],
//! )
//! .unwrap();
//! let signed = forged.sign(&key).unwrap();
//! println!("{} {}", signed.to_hex(), signed.operation_hash());
//! ```

#![warn(missing_docs)]

pub mod address;
pub mod base58check;
pub mod curve;
pub mod expression;
pub mod forge;
pub mod hash;
pub mod key;
pub mod micheline;
pub mod operation;
pub mod prefix;
pub mod signature;
/// Fixture keys and contents shared by tests and benchmarks
pub mod test_utils;
pub mod watermark;
pub mod zarith;

// Re-export commonly used types
pub use address::{Address, AddressError, PublicKey};
pub use base58check::Base58Error;
pub use curve::{CurveError, CurveKind};
pub use expression::ExpressionError;
pub use forge::{ForgeError, ForgedOperation, SignedOperation};
pub use key::{Key, KeyError};
pub use micheline::{Micheline, MichelineError};
pub use operation::OperationContent;
pub use signature::Signature;
pub use watermark::Watermark;
pub use zarith::ZarithError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
