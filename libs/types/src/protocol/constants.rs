//! Protocol constants and basic types
//!
//! These are fundamental definitions that should remain in the types crate
//! to avoid circular dependencies. Protocol logic remains in codec.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// Width of the backpatched body-length field at the start of every envelope.
pub const LENGTH_WIDTH: usize = 4;

/// The body of a signal envelope always begins on this alignment boundary.
pub const BODY_ALIGNMENT: usize = 8;

/// Header field codes carried in the envelope's field array.
///
/// PATH, INTERFACE and MEMBER are mandatory for signals and always emitted in
/// that order; SENDER and SIGNATURE are conditionally present and, when
/// present, follow in that order. Codes are wire values and must not be
/// renumbered.
#[repr(u8)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
pub enum HeaderFieldCode {
    /// Object path the signal is emitted from (object-path value).
    Path = 1,
    /// Fully qualified interface name (string value).
    Interface = 2,
    /// Member (signal) name within the interface (string value).
    Member = 3,
    /// Unique bus name of the emitting connection (string value).
    Sender = 7,
    /// Type signature of the body (signature value).
    Signature = 8,
}
