//! # Signal Rehydrator - Typed Event Instantiation
//!
//! ## Purpose
//!
//! Turns a generically decoded [`SignalRecord`] into a strongly typed
//! application event: resolve the concrete type, pick a constructor by the
//! runtime argument types, convert the arguments to the declared parameter
//! types, instantiate, and copy the wire header fields onto the instance.
//!
//! ## Outcomes
//!
//! - `Ok(Rehydrated::Event(..))`: a typed instance carrying the record's
//!   header fields and raw wire bytes.
//! - `Ok(Rehydrated::NoMatch)`: no constructor matched the deserialized
//!   argument types. This is an expected, silent outcome (a local type
//!   definition drifted from the bus-visible one); it is logged and the
//!   signal is dropped.
//! - `Err(ProtocolError::Resolution)`: no concrete type anywhere in the
//!   fallback chain.
//! - `Err(ProtocolError::Construction)`: argument conversion or factory
//!   instantiation failed; the underlying cause is wrapped, never retried.
//!
//! Inbound failures must never terminate the connection or affect the
//! processing of subsequent signals; the dispatch layer logs and drops.

use tracing::{debug, warn};
use types::protocol::record::SignalRecord;
use types::protocol::value::{ArgType, Value};
use types::BusEvent;

use crate::catalog;
use crate::context::BusContext;
use crate::error::{ProtocolError, ProtocolResult};
use crate::marshal;

/// Result of rehydrating one received signal.
#[derive(Debug)]
pub enum Rehydrated {
    /// A typed event instance, header fields and wire bytes attached.
    Event(Box<dyn BusEvent>),
    /// No constructor matched the argument types; skip this signal.
    NoMatch,
}

/// Rehydrate a received signal into a typed event instance.
pub fn rehydrate(record: &SignalRecord, ctx: &BusContext) -> ProtocolResult<Rehydrated> {
    let entry = ctx
        .registry()
        .resolve(ctx.aliases(), &record.interface, &record.member)?;
    debug!(type_name = %entry.type_name(), serial = record.serial, "converting signal to concrete type");

    let candidates = catalog::candidates_for(&entry)?;
    let actual: Vec<ArgType> = record.raw_args.iter().map(Value::arg_type).collect();
    let Some(matched) = catalog::match_constructor(candidates, &actual) else {
        warn!(
            type_name = %entry.type_name(),
            argument_types = ?actual,
            "no suitable constructor for signal argument types"
        );
        return Ok(Rehydrated::NoMatch);
    };

    let args = marshal::deserialize_arguments(&record.raw_args, &matched.params, ctx)
        .map_err(|cause| ProtocolError::construction(entry.type_name(), cause))?;

    let spec = &entry.constructors()[matched.index];
    let mut event = (spec.factory)(record.path.clone(), args)
        .map_err(|cause| ProtocolError::Construction {
            type_name: entry.type_name().to_string(),
            cause,
        })?;

    let meta = event.meta_mut();
    meta.source = record.source.clone();
    meta.path = record.path.clone();
    meta.interface = record.interface.clone();
    meta.member = record.member.clone();
    meta.serial = record.serial;
    meta.wire_bytes = record.wire_bytes.clone();

    Ok(Rehydrated::Event(event))
}
