//! # Signal Envelope Parser - Generic Wire Decode
//!
//! ## Purpose
//!
//! Decodes a raw signal envelope into a wire-level [`SignalRecord`]: prelude
//! first (zero-copy), then the header-field array, then the body under the
//! announced signature. This is the generic half of inbound processing; the
//! typed half (constructor matching and instantiation) lives in
//! [`crate::rehydrate`].
//!
//! ## Validation
//!
//! Every read is bounds-checked. The declared header-array and body lengths
//! must match the bytes actually consumed, mandatory fields (PATH,
//! INTERFACE, MEMBER) must be present with the right value kinds, and a
//! non-zero body length without a SIGNATURE field is rejected. Unknown
//! header field codes are skipped so the envelope format can grow.

use tracing::debug;
use types::protocol::constants::{HeaderFieldCode, BODY_ALIGNMENT};
use types::protocol::message::EnvelopePrelude;
use types::protocol::record::SignalRecord;
use types::protocol::signature::Signature;
use types::protocol::value::Value;
use zerocopy::Ref;

use crate::error::{ProtocolError, ProtocolResult};
use crate::marshal::WireDecoder;
use crate::sig;

/// Decode a complete signal envelope into a [`SignalRecord`].
pub fn decode_signal(data: &[u8]) -> ProtocolResult<SignalRecord> {
    let prelude = parse_prelude(data)?;

    let mut dec = WireDecoder::at(data, EnvelopePrelude::SIZE);
    let header_len = dec.get_u32("header array length")? as usize;
    dec.align_to(BODY_ALIGNMENT, "header array elements")?;
    let header_end = dec.position() + header_len;
    if header_end > data.len() {
        return Err(ProtocolError::truncated(
            header_len,
            dec.position(),
            data.len(),
            "header array elements",
        ));
    }

    let mut source = None;
    let mut path = None;
    let mut interface = None;
    let mut member = None;
    let mut signature = None;

    while dec.position() < header_end {
        dec.align_to(8, "header field")?;
        if dec.position() >= header_end {
            break;
        }
        let code = dec.get_u8("header field code")?;
        let raw_sig = dec.get_signature_str("header field signature")?;
        let content = sig::parse_single(&Signature::new(raw_sig)?)?;
        let value = dec.get_value(&content)?;
        match HeaderFieldCode::try_from(code) {
            Ok(HeaderFieldCode::Path) => match value {
                Value::Path(p) => path = Some(p),
                other => return Err(unexpected(HeaderFieldCode::Path, &other)),
            },
            Ok(HeaderFieldCode::Interface) => match value {
                Value::Str(s) => interface = Some(s),
                other => return Err(unexpected(HeaderFieldCode::Interface, &other)),
            },
            Ok(HeaderFieldCode::Member) => match value {
                Value::Str(s) => member = Some(s),
                other => return Err(unexpected(HeaderFieldCode::Member, &other)),
            },
            Ok(HeaderFieldCode::Sender) => match value {
                Value::Str(s) => source = Some(s),
                other => return Err(unexpected(HeaderFieldCode::Sender, &other)),
            },
            Ok(HeaderFieldCode::Signature) => match value {
                Value::Sig(s) => signature = Some(s),
                other => return Err(unexpected(HeaderFieldCode::Signature, &other)),
            },
            Err(_) => {
                debug!(code, "skipping unknown header field");
            }
        }
    }
    if dec.position() != header_end {
        return Err(ProtocolError::LengthMismatch {
            region: "header array",
            declared: header_len,
            actual: dec.position() + header_len - header_end,
        });
    }

    dec.align_to(BODY_ALIGNMENT, "body padding")?;
    let body_start = dec.position();
    let body_len = prelude.body_len as usize;
    if body_start + body_len > data.len() {
        return Err(ProtocolError::truncated(
            body_len,
            body_start,
            data.len(),
            "body",
        ));
    }

    let raw_args = match &signature {
        Some(signature) => {
            let mut body = WireDecoder::at(&data[..body_start + body_len], body_start);
            let args = body.get_body(signature)?;
            if body.position() != body_start + body_len {
                return Err(ProtocolError::LengthMismatch {
                    region: "body",
                    declared: body_len,
                    actual: body.position() - body_start,
                });
            }
            args
        }
        None => {
            if body_len != 0 {
                return Err(ProtocolError::BodyWithoutSignature {
                    body_len: prelude.body_len,
                });
            }
            Vec::new()
        }
    };

    let record = SignalRecord {
        source,
        path: path.ok_or(ProtocolError::MissingHeaderField {
            field: HeaderFieldCode::Path,
        })?,
        interface: interface.ok_or(ProtocolError::MissingHeaderField {
            field: HeaderFieldCode::Interface,
        })?,
        member: member.ok_or(ProtocolError::MissingHeaderField {
            field: HeaderFieldCode::Member,
        })?,
        signature,
        serial: prelude.serial,
        raw_args,
        wire_bytes: data.to_vec(),
    };
    Ok(record)
}

/// Zero-copy parse of the fixed 8-byte prelude.
pub fn parse_prelude(data: &[u8]) -> ProtocolResult<&EnvelopePrelude> {
    if data.len() < EnvelopePrelude::SIZE {
        return Err(ProtocolError::truncated(
            EnvelopePrelude::SIZE,
            0,
            data.len(),
            "envelope prelude",
        ));
    }
    let prelude = Ref::<_, EnvelopePrelude>::new(&data[..EnvelopePrelude::SIZE])
        .ok_or(ProtocolError::Truncated {
            need: EnvelopePrelude::SIZE,
            offset: 0,
            have: data.len(),
            context: "envelope prelude zerocopy conversion",
        })?
        .into_ref();
    Ok(prelude)
}

fn unexpected(field: HeaderFieldCode, value: &Value) -> ProtocolError {
    ProtocolError::UnexpectedHeaderValue {
        field,
        actual: value.arg_type().to_string(),
    }
}
