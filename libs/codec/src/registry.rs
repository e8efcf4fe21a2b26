//! # Signal Type Registry - Wire Name to Concrete Type Resolution
//!
//! ## Purpose
//!
//! Maps opaque (interface, member) wire pairs to registered concrete event
//! types without any compile-time linkage. Registration replaces runtime
//! class loading: applications (or generated code) register each concrete
//! signal type under its nested local name together with an ordered list of
//! typed constructor variants.
//!
//! ## Resolution Algorithm
//!
//! 1. Alias lookup maps wire names to local names (verbatim fallback).
//! 2. The composite key `local_interface + "$" + local_member` is checked
//!    against the process-wide resolution cache.
//! 3. On a miss, the composite key is probed against registered type names
//!    directly, then with the **rightmost** remaining `.` progressively
//!    rewritten to `$`, until a registration matches or no `.` remains in
//!    the interface portion. Concrete event types are conventionally
//!    declared nested inside their owning interface type, and the owning
//!    interface's qualified name may itself be multiply nested.
//! 4. Success is memoized under the original composite key. Cache entries
//!    are append-only and never invalidated.
//!
//! ## Concurrency
//!
//! Alias tables, registrations and the resolution cache are read-mostly
//! after warm-up and shared process-wide. Lookups take a read lock; the
//! get-or-compute-and-insert on first resolution is idempotent: concurrent
//! first callers may duplicate the (pure) search but the first inserted
//! entry wins and is returned to every caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;
use tracing::debug;
use types::protocol::path::ObjectPath;
use types::protocol::value::{ArgType, Value};
use types::BusEvent;

use crate::catalog::CachedConstructor;
use crate::error::{ProtocolError, ProtocolResult};

/// Factory invoked to instantiate a concrete event: `(object path, converted
/// arguments) -> instance`. Failures are wrapped by the rehydrator into
/// [`ProtocolError::Construction`].
pub type SignalFactory = fn(
    ObjectPath,
    Vec<Value>,
) -> Result<Box<dyn BusEvent>, Box<dyn std::error::Error + Send + Sync>>;

/// One declared constructor variant of a registered signal type.
///
/// `params` is the full declared parameter list; the first parameter is
/// always the object path and the remainder correspond 1:1, in order, to the
/// signal's body arguments.
#[derive(Clone)]
pub struct ConstructorSpec {
    pub params: Vec<ArgType>,
    pub factory: SignalFactory,
}

impl fmt::Debug for ConstructorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorSpec")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A registered concrete signal type with its constructor variants, in
/// declaration order (order is significant: first structural match wins).
#[derive(Debug)]
pub struct SignalTypeEntry {
    type_name: String,
    constructors: Vec<ConstructorSpec>,
    // Stripped/normalized candidates with derived signatures, built on first
    // use and never mutated after.
    pub(crate) candidates: OnceCell<Vec<CachedConstructor>>,
}

impl SignalTypeEntry {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }
}

/// Bidirectional-use wire/local name mapping, keyed by wire name.
///
/// Pure lookup tables; duplicate registration is last-write-wins. When no
/// alias exists the wire name is used verbatim as the local name.
#[derive(Debug, Default)]
pub struct SignalAliases {
    interfaces: RwLock<HashMap<String, String>>,
    members: RwLock<HashMap<String, String>>,
}

impl SignalAliases {
    pub fn alias_interface(&self, local: impl Into<String>, wire: impl Into<String>) {
        self.interfaces
            .write()
            .expect("interface alias table poisoned")
            .insert(wire.into(), local.into());
    }

    pub fn alias_member(&self, local: impl Into<String>, wire: impl Into<String>) {
        self.members
            .write()
            .expect("member alias table poisoned")
            .insert(wire.into(), local.into());
    }

    pub fn interface_for(&self, wire: &str) -> Option<String> {
        self.interfaces
            .read()
            .expect("interface alias table poisoned")
            .get(wire)
            .cloned()
    }

    pub fn member_for(&self, wire: &str) -> Option<String> {
        self.members
            .read()
            .expect("member alias table poisoned")
            .get(wire)
            .cloned()
    }
}

/// Process-wide registry of concrete signal types plus the memoizing
/// resolution cache.
#[derive(Debug, Default)]
pub struct SignalTypeRegistry {
    types: RwLock<HashMap<String, Arc<SignalTypeEntry>>>,
    resolved: RwLock<HashMap<String, Arc<SignalTypeEntry>>>,
}

impl SignalTypeRegistry {
    /// Register a concrete signal type under its nested local name, e.g.
    /// `"org.test.Iface$Changed"`.
    ///
    /// Every constructor must declare the object path as its first
    /// parameter. Re-registering a name is last-write-wins for future
    /// resolutions; already-memoized resolutions keep the entry they cached.
    pub fn register(
        &self,
        type_name: impl Into<String>,
        constructors: Vec<ConstructorSpec>,
    ) -> ProtocolResult<()> {
        let type_name = type_name.into();
        if type_name.is_empty() {
            return Err(ProtocolError::InvalidRegistration {
                type_name,
                detail: "type name is empty",
            });
        }
        if constructors.is_empty() {
            return Err(ProtocolError::InvalidRegistration {
                type_name,
                detail: "no constructors declared",
            });
        }
        for spec in &constructors {
            if spec.params.first() != Some(&ArgType::Path) {
                return Err(ProtocolError::InvalidRegistration {
                    type_name,
                    detail: "first constructor parameter must be the object path",
                });
            }
        }
        let entry = Arc::new(SignalTypeEntry {
            type_name: type_name.clone(),
            constructors,
            candidates: OnceCell::new(),
        });
        self.types
            .write()
            .expect("type registry poisoned")
            .insert(type_name, entry);
        Ok(())
    }

    /// Direct lookup of a registered type name, no fallback.
    pub fn lookup(&self, type_name: &str) -> Option<Arc<SignalTypeEntry>> {
        self.types
            .read()
            .expect("type registry poisoned")
            .get(type_name)
            .cloned()
    }

    /// Resolve a wire (interface, member) pair to a registered concrete type.
    pub fn resolve(
        &self,
        aliases: &SignalAliases,
        interface: &str,
        member: &str,
    ) -> ProtocolResult<Arc<SignalTypeEntry>> {
        let local_interface = aliases
            .interface_for(interface)
            .unwrap_or_else(|| interface.to_string());
        let local_member = aliases
            .member_for(member)
            .unwrap_or_else(|| member.to_string());
        let key = format!("{local_interface}${local_member}");

        if let Some(hit) = self
            .resolved
            .read()
            .expect("resolution cache poisoned")
            .get(&key)
        {
            return Ok(hit.clone());
        }

        let mut name = key.clone();
        let mut attempts = 0usize;
        loop {
            attempts += 1;
            if let Some(entry) = self.lookup(&name) {
                debug!(wire = %key, resolved = %name, "resolved signal type");
                // Idempotent insert: a concurrent first caller may have won
                // the race; return whichever entry landed first.
                let mut cache = self.resolved.write().expect("resolution cache poisoned");
                let cached = cache.entry(key).or_insert(entry);
                return Ok(cached.clone());
            }
            // Rewrite the trailing namespace separator into a nesting
            // separator and retry; the search stops once the interface
            // portion has no namespace separators left.
            let Some(dot) = name.rfind('.') else { break };
            name.replace_range(dot..=dot, "$");
            if !name.contains('.') {
                break;
            }
        }
        Err(ProtocolError::resolution(interface, member, attempts))
    }
}
