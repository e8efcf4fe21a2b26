//! Wire-level signal record
//!
//! A [`SignalRecord`] is what the transport hands to the dispatch layer: one
//! received signal, generically decoded. It is created per received message
//! and discarded after rehydration, successful or not.

use std::fmt;

use super::path::ObjectPath;
use super::signature::Signature;
use super::value::Value;

/// A received signal in wire-level form, immutable once built.
#[derive(Clone, PartialEq)]
pub struct SignalRecord {
    /// Unique bus name of the emitting connection, when the SENDER header
    /// field was present.
    pub source: Option<String>,
    /// Object path the signal was emitted from.
    pub path: ObjectPath,
    /// Fully qualified wire interface name.
    pub interface: String,
    /// Member (signal) name.
    pub member: String,
    /// Body type signature, when the SIGNATURE header field was present.
    pub signature: Option<Signature>,
    /// Per-connection serial assigned by the sender.
    pub serial: u32,
    /// Generically decoded body arguments.
    pub raw_args: Vec<Value>,
    /// Complete envelope bytes as received, kept for diagnostics.
    pub wire_bytes: Vec<u8>,
}

impl SignalRecord {
    /// Total received envelope size in bytes.
    pub fn byte_len(&self) -> usize {
        self.wire_bytes.len()
    }
}

impl fmt::Debug for SignalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Wire bytes render as truncated hex; full dumps belong in tooling.
        const HEX_PREVIEW: usize = 32;
        let preview = &self.wire_bytes[..self.wire_bytes.len().min(HEX_PREVIEW)];
        let suffix = if self.wire_bytes.len() > HEX_PREVIEW { ".." } else { "" };
        f.debug_struct("SignalRecord")
            .field("source", &self.source)
            .field("path", &self.path)
            .field("interface", &self.interface)
            .field("member", &self.member)
            .field("signature", &self.signature)
            .field("serial", &self.serial)
            .field("raw_args", &self.raw_args)
            .field(
                "wire_bytes",
                &format_args!("[{} bytes: {}{}]", self.wire_bytes.len(), hex::encode(preview), suffix),
            )
            .finish()
    }
}
