//! Connection-scoped protocol context
//!
//! A [`BusContext`] bundles what the signal path needs from a live
//! connection: the strictly increasing outbound serial counter and shared
//! handles to the process-wide alias table and type registry. Registries are
//! `Arc`-shared so multiple connections resolve against the same caches.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::registry::{SignalAliases, SignalTypeRegistry};

/// Per-connection state consulted by envelope construction and rehydration.
#[derive(Debug)]
pub struct BusContext {
    aliases: Arc<SignalAliases>,
    registry: Arc<SignalTypeRegistry>,
    serial: AtomicU32,
}

impl BusContext {
    /// Context with fresh (empty) registries; useful for tests and tools.
    pub fn new() -> Self {
        Self::with_registries(
            Arc::new(SignalAliases::default()),
            Arc::new(SignalTypeRegistry::default()),
        )
    }

    /// Context sharing existing process-wide registries.
    pub fn with_registries(
        aliases: Arc<SignalAliases>,
        registry: Arc<SignalTypeRegistry>,
    ) -> Self {
        Self {
            aliases,
            registry,
            serial: AtomicU32::new(0),
        }
    }

    pub fn aliases(&self) -> &SignalAliases {
        &self.aliases
    }

    pub fn registry(&self) -> &SignalTypeRegistry {
        &self.registry
    }

    /// Advance the connection serial counter and return the new value.
    ///
    /// Serials start at 1 and are assigned exactly once per outbound signal.
    pub fn next_serial(&self) -> u32 {
        self.serial.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for BusContext {
    fn default() -> Self {
        Self::new()
    }
}
