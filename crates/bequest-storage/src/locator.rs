//! Storage-locator encodings.
//!
//! The contract stores a raw 32-byte locator, but the permanent-storage
//! network addresses content by text identifier, and the canonical textual
//! form has drifted across historical record formats. No single transform is
//! guaranteed correct, so resolution tries a fixed ordered list of pure
//! encodings until one probes successfully. Adding a fourth encoding is a
//! one-line change to [`LocatorEncoding::ORDER`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::fmt;

/// A textual encoding of the 32-byte on-chain locator, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorEncoding {
    /// Lowercase hex, no prefix.
    Hex,
    /// URL-safe base64, padding stripped.
    Base64Url,
    /// Lowercase hex with leading zero bytes stripped.
    TrimmedHex,
}

impl LocatorEncoding {
    /// The fixed fallback order.
    pub const ORDER: [LocatorEncoding; 3] = [
        LocatorEncoding::Hex,
        LocatorEncoding::Base64Url,
        LocatorEncoding::TrimmedHex,
    ];

    /// Render the locator under this encoding.
    pub fn encode(&self, locator: &[u8; 32]) -> String {
        match self {
            LocatorEncoding::Hex => hex::encode(locator),
            LocatorEncoding::Base64Url => URL_SAFE_NO_PAD.encode(locator),
            LocatorEncoding::TrimmedHex => {
                let first = locator.iter().position(|&b| b != 0);
                match first {
                    Some(i) => hex::encode(&locator[i..]),
                    // All-zero locator: keep one byte rather than an empty id
                    None => "00".to_string(),
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorEncoding::Hex => "hex",
            LocatorEncoding::Base64Url => "base64url",
            LocatorEncoding::TrimmedHex => "trimmed-hex",
        }
    }
}

impl fmt::Display for LocatorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
