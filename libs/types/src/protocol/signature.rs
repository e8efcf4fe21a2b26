//! Wire type signature newtype
//!
//! A signature is the compact string encoding of the ordered value types in a
//! message body (`"s"` = one string, `"a(su)"` = array of string+u32 structs).
//! Construction checks the character set, length and container nesting depth;
//! full structural parsing into [`ArgType`](super::value::ArgType) lists is
//! protocol logic and lives in `codec::sig`.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Maximum signature length in bytes (wire limit; the length prefix is a u8).
pub const MAX_SIGNATURE_LEN: usize = 255;

/// Maximum container nesting depth accepted in a signature.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Signature syntax violations.
///
/// Charset/length/depth variants are raised at construction; structural
/// variants are raised by the parser in `codec::sig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature is {len} bytes, maximum is {MAX_SIGNATURE_LEN}")]
    TooLong { len: usize },

    #[error("invalid type code '{code}' at byte {position}")]
    InvalidTypeCode { code: char, position: usize },

    #[error("container nesting exceeds {MAX_NESTING_DEPTH} levels at byte {position}")]
    DepthExceeded { position: usize },

    #[error("unmatched struct parenthesis at byte {position}")]
    UnmatchedParen { position: usize },

    #[error("empty struct at byte {position}")]
    EmptyStruct { position: usize },

    #[error("array type code at byte {position} has no element type")]
    MissingArrayElement { position: usize },

    #[error("expected a single complete type, found {count}")]
    NotSingle { count: usize },
}

/// A charset-validated wire type signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Validate charset, length, paren balance and nesting depth.
    pub fn new(sig: impl Into<String>) -> Result<Self, SignatureError> {
        let sig = sig.into();
        if sig.len() > MAX_SIGNATURE_LEN {
            return Err(SignatureError::TooLong { len: sig.len() });
        }
        // Charset and paren balance only. Array/struct nesting depth against
        // MAX_NESTING_DEPTH is enforced by the structural parser in codec::sig.
        let mut open_positions = Vec::new();
        for (position, code) in sig.char_indices() {
            match code {
                'y' | 'b' | 'n' | 'q' | 'i' | 'u' | 'x' | 't' | 'd' | 's' | 'o' | 'g' | 'v'
                | 'a' => {}
                '(' => open_positions.push(position),
                ')' => {
                    if open_positions.pop().is_none() {
                        return Err(SignatureError::UnmatchedParen { position });
                    }
                }
                other => {
                    return Err(SignatureError::InvalidTypeCode {
                        code: other,
                        position,
                    });
                }
            }
        }
        if let Some(position) = open_positions.pop() {
            return Err(SignatureError::UnmatchedParen { position });
        }
        Ok(Self(sig))
    }

    /// The empty signature (no body values).
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Signature::new(raw).map_err(D::Error::custom)
    }
}
