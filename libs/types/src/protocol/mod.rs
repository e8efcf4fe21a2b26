//! Protocol layer data types for the Signet signal path
//!
//! This module contains the wire-facing data model: header field codes, the
//! dynamic value model, validated name newtypes, the envelope prelude and the
//! wire-level signal record. Encoding and resolution rules live in `codec`.

pub mod constants;
pub mod event;
pub mod message;
pub mod path;
pub mod record;
pub mod signature;
pub mod value;

pub use constants::{HeaderFieldCode, BODY_ALIGNMENT, LENGTH_WIDTH};
pub use event::{BusEvent, EventMeta};
pub use message::EnvelopePrelude;
pub use path::{ObjectPath, PathError};
pub use record::SignalRecord;
pub use signature::{Signature, SignatureError, MAX_SIGNATURE_LEN};
pub use value::{ArgType, Value};
