//! # Signet Type System - Wire Protocol Data Types
//!
//! Unified type definitions for the Signet signal wire protocol.
//!
//! ## Design Philosophy
//!
//! - **Pure Data**: This crate holds data structures and their local validation
//!   rules only. Protocol logic (marshalling, envelope construction, type
//!   resolution) lives in `codec`.
//! - **Validated Newtypes**: Object paths and signatures are constructed through
//!   fallible constructors so invalid wire names cannot circulate.
//! - **Dynamic Value Model**: Signal bodies are dynamically typed on the wire;
//!   [`Value`](protocol::Value) and [`ArgType`](protocol::ArgType) carry the
//!   runtime and declared sides of that model.
//! - **Zero-Copy Prelude**: The fixed 8-byte envelope prelude is a zerocopy
//!   struct so receivers can reject malformed frames without allocation.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → dispatch / transport
//!     ↑             ↓
//! Pure Data    Protocol Rules
//! Structures   Marshalling/Resolution
//! ```

pub mod protocol;

// Re-export key types for convenience
pub use protocol::constants::{HeaderFieldCode, BODY_ALIGNMENT, LENGTH_WIDTH};
pub use protocol::event::{BusEvent, EventMeta};
pub use protocol::message::EnvelopePrelude;
pub use protocol::path::{ObjectPath, PathError};
pub use protocol::record::SignalRecord;
pub use protocol::signature::{Signature, SignatureError, MAX_SIGNATURE_LEN};
pub use protocol::value::{ArgType, Value};
