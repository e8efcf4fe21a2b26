//! Protocol-level errors for signal envelope processing
//!
//! Construction-time format and path errors are fatal to the single build
//! call that raised them and never leave partially written envelopes in a
//! shared buffer. Inbound resolution and construction failures propagate to
//! the dispatch layer, which logs and drops the offending signal; they must
//! never terminate the connection. The no-constructor-matches outcome is NOT
//! an error: see [`crate::rehydrate::Rehydrated::NoMatch`].

use thiserror::Error;
use types::protocol::constants::HeaderFieldCode;
use types::protocol::path::PathError;
use types::protocol::signature::SignatureError;

/// Signal protocol errors with diagnostic context.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A mandatory construction input was empty.
    #[error("signal construction requires object path, interface and member; '{missing}' is empty")]
    MessageFormat { missing: &'static str },

    /// Object path failed the bus path-syntax rule.
    #[error("invalid object path: {0}")]
    InvalidPath(#[from] PathError),

    /// Signature string failed charset or structural validation.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    /// No concrete signal type was found for a wire interface/member pair
    /// after the nested-name fallback search was exhausted.
    #[error("no concrete signal type for interface '{interface}', member '{member}' ({attempts} name(s) probed)")]
    Resolution {
        interface: String,
        member: String,
        attempts: usize,
    },

    /// Instantiation or argument conversion failed for a resolved type.
    #[error("failed to construct signal type '{type_name}'")]
    Construction {
        type_name: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A signal type was registered with an unusable constructor list.
    #[error("invalid registration for signal type '{type_name}': {detail}")]
    InvalidRegistration {
        type_name: String,
        detail: &'static str,
    },

    /// A type-derived build was requested for a type name that is not nested
    /// in an owning interface type.
    #[error("signal type '{type_name}' is not declared as a member of an owning interface type")]
    OrphanSignalType { type_name: String },

    /// Envelope bytes were requested before the deferred body was encoded.
    #[error("signal body has not been finalized")]
    BodyNotFinalized,

    /// Buffer ended before a required read.
    #[error("truncated envelope: need {need} byte(s) at offset {offset}, buffer has {have} (context: {context})")]
    Truncated {
        need: usize,
        offset: usize,
        have: usize,
        context: &'static str,
    },

    /// A mandatory header field was absent from a decoded envelope.
    #[error("missing mandatory header field {field:?}")]
    MissingHeaderField { field: HeaderFieldCode },

    /// A header field carried a value of the wrong kind.
    #[error("header field {field:?} carries a {actual} value")]
    UnexpectedHeaderValue {
        field: HeaderFieldCode,
        actual: String,
    },

    /// The prelude declares body bytes but no SIGNATURE field was present.
    #[error("envelope declares {body_len} body byte(s) but carries no signature header")]
    BodyWithoutSignature { body_len: u32 },

    /// A declared region length disagrees with the bytes actually consumed.
    #[error("{region} length mismatch: declared {declared} byte(s), consumed {actual}")]
    LengthMismatch {
        region: &'static str,
        declared: usize,
        actual: usize,
    },

    /// An argument value does not conform to its declared parameter type.
    #[error("argument {index} does not match declared type: expected {expected}, got {actual}")]
    ArgumentMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    /// A boolean wire value was neither 0 nor 1.
    #[error("invalid boolean wire value {value}")]
    InvalidBool { value: u32 },

    /// A wire string was not valid UTF-8.
    #[error("{context} is not valid UTF-8")]
    InvalidUtf8 {
        context: &'static str,
        #[source]
        cause: std::string::FromUtf8Error,
    },
}

impl ProtocolError {
    /// Create a Truncated error with read context.
    pub fn truncated(need: usize, offset: usize, have: usize, context: &'static str) -> Self {
        Self::Truncated {
            need,
            offset,
            have,
            context,
        }
    }

    /// Create a Resolution error after an exhausted fallback search.
    pub fn resolution(interface: impl Into<String>, member: impl Into<String>, attempts: usize) -> Self {
        Self::Resolution {
            interface: interface.into(),
            member: member.into(),
            attempts,
        }
    }

    /// Wrap an underlying instantiation or conversion failure.
    pub fn construction(
        type_name: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Construction {
            type_name: type_name.into(),
            cause: cause.into(),
        }
    }
}

/// Result type for protocol operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
