//! # Signet Signal Protocol Codec
//!
//! ## Purpose
//!
//! This crate contains the "Rules" layer of the Signet signal path:
//! - Envelope construction with length backpatching and deferred bodies
//! - Generic envelope decoding into wire-level signal records
//! - Wire name to concrete type resolution with nested-name fallback
//! - Constructor candidate caching and argument matching
//! - Typed event rehydration
//! - Value marshalling with bus alignment rules
//! - Signature derivation and parsing
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → dispatch / transport
//!     ↑           ↓
//! Pure Data   Protocol Rules
//! Structures  Envelope/Resolution
//! ```
//!
//! ## Control Flow
//!
//! Outbound: application event → [`SignalEnvelope`] → byte envelope.
//! Inbound: raw envelope → [`decode_signal`] → [`SignalRecord`] →
//! [`rehydrate`] → typed event, or a non-fatal no-match outcome.
//!
//! ## What This Crate Does NOT Contain
//! - Network transport logic (sockets, connection ownership)
//! - Raw data structure definitions (belongs in `libs/types`)
//! - Dispatch policy (which handler receives which event)

pub mod builder;
pub mod catalog;
pub mod context;
pub mod error;
pub mod marshal;
pub mod parser;
pub mod registry;
pub mod rehydrate;
pub mod sig;

// Re-export key types for convenience
pub use builder::{BodyState, SignalEnvelope};
pub use catalog::{candidates_for, match_constructor, CachedConstructor};
pub use context::BusContext;
pub use error::{ProtocolError, ProtocolResult};
pub use marshal::{deserialize_arguments, WireDecoder, WireEncoder};
pub use parser::{decode_signal, parse_prelude};
pub use registry::{ConstructorSpec, SignalAliases, SignalFactory, SignalTypeEntry, SignalTypeRegistry};
pub use rehydrate::{rehydrate, Rehydrated};
pub use sig::{derive_signature, parse_signature};

// Convenience re-exports from the types crate for downstream callers.
pub use types::protocol::record::SignalRecord;
