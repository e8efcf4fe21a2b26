//! # Signal Envelope Builder - Header Emission and Body Backpatch
//!
//! ## Purpose
//!
//! Assembles the binary envelope for an outbound signal:
//!
//! ```text
//! [body_len: u32] [serial: u32] [header fields: a(yv)] [pad to 8] [body]
//!      ↑ reserved first, backpatched once the body is encoded
//! ```
//!
//! Header fields are emitted in fixed order (PATH, INTERFACE, MEMBER, then
//! SENDER if a source is present, then SIGNATURE if a signature is present),
//! each as an 8-aligned `(field-code: u8, variant)` pair. The field array's
//! byte length is measured at its known absolute alignment before emission,
//! so the body-length placeholder is the only byte range revisited.
//!
//! ## Deferred Bodies
//!
//! [`SignalEnvelope::build`] encodes the body immediately. When the declared
//! argument values still need conversion against a live connection context,
//! [`SignalEnvelope::build_deferred`] emits the prelude, header and padding
//! up front and leaves body encoding to [`SignalEnvelope::finalize`]:
//!
//! ```text
//! NOT_BUILT → HEADER_EMITTED → BODY_DONE
//! ```
//!
//! The `HEADER_EMITTED → BODY_DONE` transition happens exactly once;
//! `BODY_DONE` is terminal and repeated finalize calls are no-ops.

use tracing::debug;
use types::protocol::constants::{HeaderFieldCode, BODY_ALIGNMENT};
use types::protocol::path::ObjectPath;
use types::protocol::signature::Signature;
use types::protocol::value::{ArgType, Value};

use crate::context::BusContext;
use crate::error::{ProtocolError, ProtocolResult};
use crate::marshal::{self, WireEncoder};
use crate::sig;

/// Body encoding progress of one envelope instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Prelude, header fields and padding are emitted; body bytes pending.
    HeaderEmitted,
    /// Body encoded and length backpatched; terminal.
    BodyDone,
}

/// A signal envelope under construction or completed.
///
/// Instances are owned by a single producer until sent; the state flag is not
/// designed for concurrent mutation of one instance from multiple threads.
#[derive(Debug)]
pub struct SignalEnvelope {
    enc: WireEncoder,
    blen_offset: usize,
    body_start: usize,
    serial: u32,
    signature: Option<Signature>,
    // Deferred-build conversion inputs, consumed by finalize.
    declared: Vec<ArgType>,
    pending: Vec<Value>,
    state: BodyState,
}

impl SignalEnvelope {
    /// Build a complete signal envelope, encoding the body immediately.
    ///
    /// Requires non-empty `path`, `interface` and `member`. When `signature`
    /// is present, `args` are encoded under it directly after the padding;
    /// when absent, the body is empty and the length field is zero (any
    /// supplied arguments are not emitted). Advances the connection serial
    /// counter exactly once.
    pub fn build(
        ctx: &BusContext,
        source: Option<&str>,
        path: &str,
        interface: &str,
        member: &str,
        signature: Option<Signature>,
        args: Vec<Value>,
    ) -> ProtocolResult<Self> {
        if let Some(signature) = &signature {
            marshal::check_body(signature, &args)?;
        }
        let mut envelope = Self::emit_header(ctx, source, path, interface, member, signature)?;
        envelope.encode_body(args)?;
        Ok(envelope)
    }

    /// Build the envelope for a registered concrete type, deriving the wire
    /// interface and member from its nested local name (`$` nesting becomes
    /// `.` namespacing; the last segment is the member).
    pub fn build_for_type(
        ctx: &BusContext,
        type_name: &str,
        source: Option<&str>,
        path: &str,
        signature: Option<Signature>,
        args: Vec<Value>,
    ) -> ProtocolResult<Self> {
        let Some(split) = type_name.rfind('$') else {
            return Err(ProtocolError::OrphanSignalType {
                type_name: type_name.to_string(),
            });
        };
        let interface = type_name[..split].replace('$', ".");
        let member = &type_name[split + 1..];
        Self::build(ctx, source, path, &interface, member, signature, args)
    }

    /// Emit the prelude, header fields and padding now, deferring body
    /// encoding to [`finalize`](Self::finalize).
    ///
    /// The wire signature is derived from the declared parameter descriptors
    /// (so it can be announced in the header immediately) while the argument
    /// values themselves are converted against the live context at
    /// finalization time.
    pub fn build_deferred(
        ctx: &BusContext,
        source: Option<&str>,
        path: &str,
        interface: &str,
        member: &str,
        declared: &[ArgType],
        args: Vec<Value>,
    ) -> ProtocolResult<Self> {
        let signature = if declared.is_empty() {
            None
        } else {
            Some(sig::derive_signature(declared)?)
        };
        let mut envelope = Self::emit_header(ctx, source, path, interface, member, signature)?;
        envelope.declared = declared.to_vec();
        envelope.pending = args;
        Ok(envelope)
    }

    /// Encode the deferred body and backpatch the length field.
    ///
    /// Idempotent: once the body has been encoded, subsequent calls are
    /// no-ops.
    pub fn finalize(&mut self, ctx: &BusContext) -> ProtocolResult<()> {
        if self.state == BodyState::BodyDone {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.pending);
        let declared = std::mem::take(&mut self.declared);
        let args = marshal::deserialize_arguments(&pending, &declared, ctx)?;
        self.encode_body(args)
    }

    /// Serial assigned to this envelope.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Body signature announced in the header, if any.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn state(&self) -> BodyState {
        self.state
    }

    /// Absolute offset where the body begins (a multiple of 8).
    pub fn body_start(&self) -> usize {
        self.body_start
    }

    /// Completed envelope bytes. Fails if a deferred body has not been
    /// finalized yet.
    pub fn into_bytes(self) -> ProtocolResult<Vec<u8>> {
        if self.state != BodyState::BodyDone {
            return Err(ProtocolError::BodyNotFinalized);
        }
        Ok(self.enc.into_bytes())
    }

    fn emit_header(
        ctx: &BusContext,
        source: Option<&str>,
        path: &str,
        interface: &str,
        member: &str,
        signature: Option<Signature>,
    ) -> ProtocolResult<Self> {
        for (name, value) in [("path", path), ("interface", interface), ("member", member)] {
            if value.is_empty() {
                return Err(ProtocolError::MessageFormat { missing: name });
            }
        }
        let path = ObjectPath::new(path)?;

        let mut fields: Vec<(HeaderFieldCode, Value)> = vec![
            (HeaderFieldCode::Path, Value::Path(path)),
            (HeaderFieldCode::Interface, Value::Str(interface.to_string())),
            (HeaderFieldCode::Member, Value::Str(member.to_string())),
        ];
        if let Some(source) = source {
            fields.push((HeaderFieldCode::Sender, Value::Str(source.to_string())));
        }
        if let Some(signature) = &signature {
            fields.push((HeaderFieldCode::Signature, Value::Sig(signature.clone())));
        }

        let serial = ctx.next_serial();
        let mut enc = WireEncoder::new();
        let blen_offset = enc.reserve_u32();
        enc.put_u32(serial);
        put_header_fields(&mut enc, &fields)?;
        enc.align_to(BODY_ALIGNMENT);
        let body_start = enc.offset();

        debug!(serial, interface, member, body_start, "signal header emitted");
        Ok(Self {
            enc,
            blen_offset,
            body_start,
            serial,
            signature,
            declared: Vec::new(),
            pending: Vec::new(),
            state: BodyState::HeaderEmitted,
        })
    }

    fn encode_body(&mut self, args: Vec<Value>) -> ProtocolResult<()> {
        if let Some(signature) = &self.signature {
            self.enc.put_body(signature, &args)?;
        }
        let body_len = self.enc.offset() - self.body_start;
        self.enc.patch_u32(self.blen_offset, body_len as u32);
        self.state = BodyState::BodyDone;
        Ok(())
    }
}

/// Encode the header-field array: aligned u32 byte length, padding to the
/// 8-aligned first element, then one `(field-code, variant)` struct per
/// field. The length is measured before emission so nothing is backpatched.
fn put_header_fields(
    enc: &mut WireEncoder,
    fields: &[(HeaderFieldCode, Value)],
) -> ProtocolResult<()> {
    enc.align_to(4);
    let data_start = (enc.offset() + 4).div_ceil(8) * 8;
    let mut elements = WireEncoder::at_offset(data_start);
    for (code, value) in fields {
        elements.align_to(8);
        elements.put_u8(u8::from(*code));
        elements.put_signature_str(&sig::signature_of(&value.arg_type()));
        elements.put_value(value)?;
    }
    enc.put_u32(elements.len() as u32);
    enc.align_to(8);
    enc.extend_from(elements);
    Ok(())
}
