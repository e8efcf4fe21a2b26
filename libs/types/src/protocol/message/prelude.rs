//! Envelope prelude implementation
//!
//! The prelude is identical for all signal envelopes and carries the
//! backpatched body length and the per-connection serial.

use zerocopy::{AsBytes, FromBytes, FromZeroes};

/// Envelope prelude (8 bytes, little-endian)
///
/// **CRITICAL**: Field ordering is wire format. `body_len` MUST be first so
/// the builder can reserve it at offset 0 and backpatch it in place after the
/// body is encoded. DO NOT REORDER.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct EnvelopePrelude {
    /// Exact byte count of the serialized body, measured from the 8-aligned
    /// body start. Zero when the signal carries no signature.
    pub body_len: u32,
    /// Per-connection strictly increasing message serial.
    pub serial: u32,
}

impl EnvelopePrelude {
    /// Prelude size in bytes
    pub const SIZE: usize = 8;
}
