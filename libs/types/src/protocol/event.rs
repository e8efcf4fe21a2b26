//! Typed application event surface
//!
//! A rehydrated signal becomes a concrete application type implementing
//! [`BusEvent`]. The trait is deliberately small: the dispatch layer needs the
//! header-derived metadata and a way to downcast to the concrete type;
//! everything else belongs to the application.

use std::any::Any;
use std::fmt;

use super::path::ObjectPath;

/// Header-derived metadata copied onto every rehydrated event instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMeta {
    /// Unique bus name of the emitting connection, when known.
    pub source: Option<String>,
    /// Object path the signal was emitted from.
    pub path: ObjectPath,
    /// Fully qualified wire interface name.
    pub interface: String,
    /// Member (signal) name.
    pub member: String,
    /// Sender-assigned message serial.
    pub serial: u32,
    /// Raw envelope bytes, attached for diagnostics.
    pub wire_bytes: Vec<u8>,
}

impl EventMeta {
    /// Metadata seeded with the construction-time path; the remaining fields
    /// are filled in from the wire record after instantiation.
    pub fn new(path: ObjectPath) -> Self {
        Self {
            source: None,
            path,
            interface: String::new(),
            member: String::new(),
            serial: 0,
            wire_bytes: Vec::new(),
        }
    }

    /// Received envelope size in bytes.
    pub fn byte_len(&self) -> usize {
        self.wire_bytes.len()
    }
}

/// A strongly typed application event produced by signal rehydration.
pub trait BusEvent: Any + Send + Sync + fmt::Debug {
    /// Header-derived metadata for this instance.
    fn meta(&self) -> &EventMeta;

    /// Mutable metadata access, used once after construction to copy the
    /// record's header fields onto the instance.
    fn meta_mut(&mut self) -> &mut EventMeta;

    /// Downcast support for the dispatch layer.
    fn as_any(&self) -> &dyn Any;
}
