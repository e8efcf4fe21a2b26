//! Validated object path newtype
//!
//! Every signal is emitted from an object path. Path syntax follows the bus
//! rule: absolute, `/`-separated, element characters restricted to
//! `[A-Za-z0-9_]`, no empty elements and no trailing separator (the root path
//! `/` is the single exception).

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Object path syntax violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("object path is empty")]
    Empty,

    #[error("object path '{path}' must start with '/'")]
    NotAbsolute { path: String },

    #[error("object path '{path}' contains an empty element")]
    EmptyElement { path: String },

    #[error("object path '{path}' contains invalid character '{ch}' at byte {position}")]
    InvalidCharacter {
        path: String,
        ch: char,
        position: usize,
    },

    #[error("object path '{path}' must not end with '/'")]
    TrailingSeparator { path: String },
}

/// An absolute, syntax-checked bus object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Validate and wrap a path string.
    pub fn new(path: impl Into<String>) -> Result<Self, PathError> {
        let path = path.into();
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        if !path.starts_with('/') {
            return Err(PathError::NotAbsolute { path });
        }
        if path == "/" {
            return Ok(Self(path));
        }
        if path.ends_with('/') {
            return Err(PathError::TrailingSeparator { path });
        }
        for (position, ch) in path.char_indices().skip(1) {
            match ch {
                '/' => {
                    if path.as_bytes()[position - 1] == b'/' {
                        return Err(PathError::EmptyElement { path });
                    }
                }
                'A'..='Z' | 'a'..='z' | '0'..='9' | '_' => {}
                _ => {
                    return Err(PathError::InvalidCharacter { path, ch, position });
                }
            }
        }
        Ok(Self(path))
    }

    /// The root object path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Deserialization re-runs validation so malformed paths cannot enter through
// a config or test fixture side door.
impl<'de> Deserialize<'de> for ObjectPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ObjectPath::new(raw).map_err(D::Error::custom)
    }
}
