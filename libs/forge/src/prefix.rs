//! Base58Check version prefixes
//!
//! Each prefix is chosen so that the encoded string starts with a readable
//! tag. The number in parentheses is the encoded length for a well-formed
//! payload.

/// Ed25519 public key hash `tz1(36)`
pub const TZ1: &[u8] = &[0x06, 0xa1, 0x9f];
/// Secp256k1 public key hash `tz2(36)`
pub const TZ2: &[u8] = &[0x06, 0xa1, 0xa1];
/// P-256 public key hash `tz3(36)`
pub const TZ3: &[u8] = &[0x06, 0xa1, 0xa4];
/// Originated contract hash `KT1(36)`
pub const KT1: &[u8] = &[0x02, 0x5a, 0x79];

/// Ed25519 public key `edpk(54)`
pub const EDPK: &[u8] = &[0x0d, 0x0f, 0x25, 0xd9];
/// Secp256k1 public key `sppk(55)`
pub const SPPK: &[u8] = &[0x03, 0xfe, 0xe2, 0x56];
/// P-256 public key `p2pk(55)`
pub const P2PK: &[u8] = &[0x03, 0xb2, 0x8b, 0x7f];

/// Ed25519 seed `edsk(54)`
pub const EDSK_SEED: &[u8] = &[0x0d, 0x0f, 0x3a, 0x07];
/// Ed25519 secret key, seed followed by public key `edsk(98)`
pub const EDSK: &[u8] = &[0x2b, 0xf6, 0x4e, 0x07];
/// Secp256k1 secret key `spsk(54)`
pub const SPSK: &[u8] = &[0x11, 0xa2, 0xe0, 0xc9];
/// P-256 secret key `p2sk(54)`
pub const P2SK: &[u8] = &[0x10, 0x51, 0xee, 0xbd];

/// Encrypted Ed25519 seed `edesk(88)`
pub const EDESK: &[u8] = &[0x07, 0x5a, 0x3c, 0xb3, 0x29];
/// Encrypted Secp256k1 secret key `spesk(88)`
pub const SPESK: &[u8] = &[0x09, 0xed, 0xf1, 0xae, 0x96];
/// Encrypted P-256 secret key `p2esk(88)`
pub const P2ESK: &[u8] = &[0x09, 0x30, 0x39, 0x73, 0xab];

/// Ed25519 signature `edsig(99)`
pub const EDSIG: &[u8] = &[0x09, 0xf5, 0xcd, 0x86, 0x12];
/// Secp256k1 signature `spsig1(99)`
pub const SPSIG: &[u8] = &[0x0d, 0x73, 0x65, 0x13, 0x3f];
/// P-256 signature `p2sig(98)`
pub const P2SIG: &[u8] = &[0x36, 0xf0, 0x2c, 0x34];
/// Curve-agnostic signature `sig(96)`
pub const GENERIC_SIG: &[u8] = &[0x04, 0x82, 0x2b];

/// Block hash `B(51)`
pub const BLOCK_HASH: &[u8] = &[0x01, 0x34];
/// Operation hash `o(51)`
pub const OPERATION_HASH: &[u8] = &[0x05, 0x74];
/// Operation list list hash `LLo(53)`
pub const OPERATION_LIST_LIST_HASH: &[u8] = &[0x1d, 0x9f, 0x6d];
/// Protocol hash `P(51)`
pub const PROTOCOL_HASH: &[u8] = &[0x02, 0xaa];
/// Context hash `Co(52)`
pub const CONTEXT_HASH: &[u8] = &[0x4f, 0xc7];
/// Seed nonce hash `nce(53)`
pub const NONCE_HASH: &[u8] = &[0x45, 0xdc, 0xa9];
/// Script expression hash `expr(54)`
pub const SCRIPT_EXPR: &[u8] = &[0x0d, 0x2c, 0x40, 0x1b];
