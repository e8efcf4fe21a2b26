//! # Constructor Catalog - Candidate Caching and Argument Matching
//!
//! ## Purpose
//!
//! Precomputes, once per registered type, the metadata needed to pick a
//! constructor for a received signal: each variant's declared parameter
//! types with the leading object-path parameter stripped, plus the wire
//! signature derived from the remainder (used to deserialize the body
//! arguments against the declared types).
//!
//! Matching is a linear scan in declaration order: the first variant whose
//! parameter list has equal length and position-by-position assignability
//! wins. No ambiguity resolution beyond declaration order is attempted, and
//! a miss is an expected outcome (wire/local type-definition drift), not an
//! error.

use types::protocol::signature::Signature;
use types::protocol::value::ArgType;

use crate::error::ProtocolResult;
use crate::registry::SignalTypeEntry;
use crate::sig;

/// One cached constructor candidate: declared parameters with the leading
/// object-path stripped, and the wire signature derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedConstructor {
    /// Declared parameter types, object-path parameter stripped.
    pub params: Vec<ArgType>,
    /// Wire signature of `params`, the descriptor for body deserialization.
    pub signature: Signature,
    /// Index of the originating variant in the entry's declaration order.
    pub index: usize,
}

impl CachedConstructor {
    /// Equal arity and position-wise assignability against runtime argument
    /// types. No widening beyond assignability, no coercion.
    pub fn matches(&self, actual: &[ArgType]) -> bool {
        self.params.len() == actual.len()
            && self.params.iter().zip(actual).all(|(d, a)| d.accepts(a))
    }
}

/// Candidate constructors for a registered type, computed at most once per
/// type and cached for the process lifetime.
pub fn candidates_for(entry: &SignalTypeEntry) -> ProtocolResult<&[CachedConstructor]> {
    let cached = entry.candidates.get_or_try_init(|| {
        entry
            .constructors()
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let params = spec.params[1..].to_vec();
                let signature = sig::derive_signature(&params)?;
                Ok(CachedConstructor {
                    params,
                    signature,
                    index,
                })
            })
            .collect::<ProtocolResult<Vec<_>>>()
    })?;
    Ok(cached)
}

/// First candidate, in declaration order, accepting the runtime argument
/// types; `None` is the non-error "no match" outcome.
pub fn match_constructor<'a>(
    candidates: &'a [CachedConstructor],
    actual: &[ArgType],
) -> Option<&'a CachedConstructor> {
    candidates.iter().find(|candidate| candidate.matches(actual))
}
