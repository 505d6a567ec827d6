//! Signing watermarks
//!
//! A watermark is a single leading byte that separates the signing domains of
//! blocks, endorsements and ordinary operations. Forged operations are signed
//! under the generic operation watermark.

use std::borrow::Cow;

/// Watermark bytes prepended to data before signing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Watermark {
    /// Block header - 0x01
    Block = 0x01,

    /// Endorsement - 0x02
    Endorsement = 0x02,

    /// Manager, voting and anonymous operations - 0x03
    GenericOperation = 0x03,
}

impl Watermark {
    /// Convert byte to `Watermark` if valid
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Block),
            0x02 => Some(Self::Endorsement),
            0x03 => Some(Self::GenericOperation),
            _ => None,
        }
    }

    /// The raw watermark byte
    #[must_use]
    pub fn byte(self) -> u8 {
        self as u8
    }
}

/// Prepend the generic operation watermark unless `data` already starts with it
#[must_use]
pub fn apply(data: &[u8]) -> Cow<'_, [u8]> {
    let byte = Watermark::GenericOperation.byte();
    if data.first() == Some(&byte) {
        Cow::Borrowed(data)
    } else {
        let mut out = Vec::with_capacity(data.len() + 1);
        out.push(byte);
        out.extend_from_slice(data);
        Cow::Owned(out)
    }
}
