//! # Value Marshaller - Aligned Wire Encoding and Decoding
//!
//! ## Purpose
//!
//! Low-level encode/decode of dynamically typed values with the bus alignment
//! rules. The encoder supports the two primitives every envelope needs:
//! reserving a length field before its value is known and backpatching it in
//! place once computed, and measuring a sub-region (the header-field array) at
//! its known absolute alignment before emission so no second backpatch is
//! required.
//!
//! ## Alignment Rules
//!
//! Every value is aligned to its natural boundary before encoding: 1 for
//! bytes/signatures/variants, 2 for 16-bit integers, 4 for 32-bit integers,
//! booleans, strings, object paths and array length fields, 8 for 64-bit
//! values and structs. Array lengths count element bytes including internal
//! padding but excluding the padding between the length field and the first
//! element. All integers are little-endian.

use byteorder::{ByteOrder, LittleEndian};
use types::protocol::path::ObjectPath;
use types::protocol::signature::Signature;
use types::protocol::value::{ArgType, Value};

use crate::context::BusContext;
use crate::error::{ProtocolError, ProtocolResult};
use crate::sig;

/// Growable aligned wire encoder.
///
/// `base` is the absolute stream offset this encoder starts at; alignment is
/// always computed against absolute offsets so a child encoder can measure a
/// sub-region before it is spliced into its parent.
#[derive(Debug, Default)]
pub struct WireEncoder {
    buf: Vec<u8>,
    base: usize,
}

impl WireEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder whose first byte will land at absolute offset `base`.
    pub fn at_offset(base: usize) -> Self {
        Self {
            buf: Vec::new(),
            base,
        }
    }

    /// Absolute offset of the next byte to be written.
    pub fn offset(&self) -> usize {
        self.base + self.buf.len()
    }

    /// Bytes written by this encoder (excluding the base region).
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Zero-pad until the absolute offset is a multiple of `align`.
    pub fn align_to(&mut self, align: usize) {
        while self.offset() % align != 0 {
            self.buf.push(0);
        }
    }

    /// Reserve a 4-byte length placeholder and return its absolute offset for
    /// a later [`patch_u32`](Self::patch_u32).
    pub fn reserve_u32(&mut self) -> usize {
        self.align_to(4);
        let offset = self.offset();
        self.buf.extend_from_slice(&[0u8; 4]);
        offset
    }

    /// Backpatch a previously reserved length field in place.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        let rel = offset - self.base;
        LittleEndian::write_u32(&mut self.buf[rel..rel + 4], value);
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.align_to(2);
        let mut tmp = [0u8; 2];
        LittleEndian::write_u16(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn put_i16(&mut self, v: i16) {
        self.put_u16(v as u16);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.align_to(4);
        let mut tmp = [0u8; 4];
        LittleEndian::write_u32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn put_i32(&mut self, v: i32) {
        self.put_u32(v as u32);
    }

    pub fn put_u64(&mut self, v: u64) {
        self.align_to(8);
        let mut tmp = [0u8; 8];
        LittleEndian::write_u64(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn put_i64(&mut self, v: i64) {
        self.put_u64(v as u64);
    }

    pub fn put_f64(&mut self, v: f64) {
        self.put_u64(v.to_bits());
    }

    /// UTF-8 string: aligned u32 byte length, bytes, NUL terminator.
    pub fn put_string(&mut self, s: &str) {
        self.put_u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }

    /// Signature string: u8 byte length, bytes, NUL terminator (1-aligned).
    pub fn put_signature_str(&mut self, s: &str) {
        self.put_u8(s.len() as u8);
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }

    /// Append a measured child region. The child must have been created with
    /// [`at_offset`](Self::at_offset) matching the current offset.
    pub fn extend_from(&mut self, child: WireEncoder) {
        debug_assert_eq!(child.base, self.offset(), "child encoder base drifted");
        self.buf.extend_from_slice(&child.buf);
    }

    /// Encode one dynamically typed value at its natural alignment.
    pub fn put_value(&mut self, value: &Value) -> ProtocolResult<()> {
        match value {
            Value::Byte(v) => self.put_u8(*v),
            Value::Bool(v) => self.put_u32(u32::from(*v)),
            Value::I16(v) => self.put_i16(*v),
            Value::U16(v) => self.put_u16(*v),
            Value::I32(v) => self.put_i32(*v),
            Value::U32(v) => self.put_u32(*v),
            Value::I64(v) => self.put_i64(*v),
            Value::U64(v) => self.put_u64(*v),
            Value::F64(v) => self.put_f64(*v),
            Value::Str(v) => self.put_string(v),
            Value::Path(v) => self.put_string(v.as_str()),
            Value::Sig(v) => self.put_signature_str(v.as_str()),
            Value::Array(elem, items) => self.put_array(elem, items)?,
            Value::Struct(fields) => {
                self.align_to(8);
                for field in fields {
                    self.put_value(field)?;
                }
            }
            Value::Variant(inner) => {
                self.put_signature_str(&sig::signature_of(&inner.arg_type()));
                self.put_value(inner)?;
            }
        }
        Ok(())
    }

    /// Array: aligned u32 element-byte length, padding to the element
    /// alignment, then the elements. The length is measured at the elements'
    /// absolute offset before emission, so nothing is backpatched.
    fn put_array(&mut self, elem: &ArgType, items: &[Value]) -> ProtocolResult<()> {
        self.align_to(4);
        let elem_align = sig::alignment_of(elem);
        let data_start = next_multiple(self.offset() + 4, elem_align);
        let mut child = WireEncoder::at_offset(data_start);
        for (index, item) in items.iter().enumerate() {
            let actual = item.arg_type();
            if actual != *elem {
                return Err(ProtocolError::ArgumentMismatch {
                    index,
                    expected: elem.to_string(),
                    actual: actual.to_string(),
                });
            }
            child.put_value(item)?;
        }
        self.put_u32(child.len() as u32);
        self.align_to(elem_align);
        self.extend_from(child);
        Ok(())
    }

    /// Encode a body: the values of `args` in order, under `signature`.
    ///
    /// The signature is parsed and checked against the runtime argument types
    /// before any byte is written.
    pub fn put_body(&mut self, signature: &Signature, args: &[Value]) -> ProtocolResult<()> {
        check_body(signature, args)?;
        for arg in args {
            self.put_value(arg)?;
        }
        Ok(())
    }
}

/// Validate that `args` conforms to `signature` without encoding anything.
pub fn check_body(signature: &Signature, args: &[Value]) -> ProtocolResult<()> {
    let declared = sig::parse_signature(signature)?;
    if declared.len() != args.len() {
        return Err(ProtocolError::LengthMismatch {
            region: "body argument list",
            declared: declared.len(),
            actual: args.len(),
        });
    }
    for (index, (ty, arg)) in declared.iter().zip(args).enumerate() {
        let actual = arg.arg_type();
        if !ty.accepts(&actual) {
            return Err(ProtocolError::ArgumentMismatch {
                index,
                expected: ty.to_string(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}

fn next_multiple(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

/// Bounds-checked aligned wire decoder.
#[derive(Debug)]
pub struct WireDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Decoder positioned at an absolute offset into `buf`.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn need(&self, n: usize, context: &'static str) -> ProtocolResult<()> {
        if self.pos + n > self.buf.len() {
            return Err(ProtocolError::truncated(n, self.pos, self.buf.len(), context));
        }
        Ok(())
    }

    /// Advance past alignment padding (bounds-checked).
    pub fn align_to(&mut self, align: usize, context: &'static str) -> ProtocolResult<()> {
        let aligned = next_multiple(self.pos, align);
        if aligned > self.buf.len() {
            return Err(ProtocolError::truncated(
                aligned - self.pos,
                self.pos,
                self.buf.len(),
                context,
            ));
        }
        self.pos = aligned;
        Ok(())
    }

    pub fn get_u8(&mut self, context: &'static str) -> ProtocolResult<u8> {
        self.need(1, context)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn get_u16(&mut self, context: &'static str) -> ProtocolResult<u16> {
        self.align_to(2, context)?;
        self.need(2, context)?;
        let v = LittleEndian::read_u16(&self.buf[self.pos..self.pos + 2]);
        self.pos += 2;
        Ok(v)
    }

    pub fn get_u32(&mut self, context: &'static str) -> ProtocolResult<u32> {
        self.align_to(4, context)?;
        self.need(4, context)?;
        let v = LittleEndian::read_u32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(v)
    }

    pub fn get_u64(&mut self, context: &'static str) -> ProtocolResult<u64> {
        self.align_to(8, context)?;
        self.need(8, context)?;
        let v = LittleEndian::read_u64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(v)
    }

    /// UTF-8 string with u32 length prefix and NUL terminator.
    pub fn get_string(&mut self, context: &'static str) -> ProtocolResult<String> {
        let len = self.get_u32(context)? as usize;
        self.need(len + 1, context)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        let s = String::from_utf8(bytes.to_vec())
            .map_err(|cause| ProtocolError::InvalidUtf8 { context, cause })?;
        self.pos += len + 1;
        Ok(s)
    }

    /// Signature string with u8 length prefix and NUL terminator.
    pub fn get_signature_str(&mut self, context: &'static str) -> ProtocolResult<String> {
        let len = self.get_u8(context)? as usize;
        self.need(len + 1, context)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        let s = String::from_utf8(bytes.to_vec())
            .map_err(|cause| ProtocolError::InvalidUtf8 { context, cause })?;
        self.pos += len + 1;
        Ok(s)
    }

    /// Decode one value of the given declared type.
    pub fn get_value(&mut self, ty: &ArgType) -> ProtocolResult<Value> {
        let value = match ty {
            ArgType::Byte => Value::Byte(self.get_u8("byte value")?),
            ArgType::Bool => {
                let raw = self.get_u32("bool value")?;
                match raw {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    other => return Err(ProtocolError::InvalidBool { value: other }),
                }
            }
            ArgType::I16 => Value::I16(self.get_u16("i16 value")? as i16),
            ArgType::U16 => Value::U16(self.get_u16("u16 value")?),
            ArgType::I32 => Value::I32(self.get_u32("i32 value")? as i32),
            ArgType::U32 => Value::U32(self.get_u32("u32 value")?),
            ArgType::I64 => Value::I64(self.get_u64("i64 value")? as i64),
            ArgType::U64 => Value::U64(self.get_u64("u64 value")?),
            ArgType::F64 => Value::F64(f64::from_bits(self.get_u64("f64 value")?)),
            ArgType::Str => Value::Str(self.get_string("string value")?),
            ArgType::Path => {
                let raw = self.get_string("object path value")?;
                Value::Path(ObjectPath::new(raw)?)
            }
            ArgType::Sig => {
                let raw = self.get_signature_str("signature value")?;
                Value::Sig(Signature::new(raw)?)
            }
            ArgType::Array(elem) => {
                let len = self.get_u32("array length")? as usize;
                self.align_to(sig::alignment_of(elem), "array elements")?;
                let end = self.pos + len;
                if end > self.buf.len() {
                    return Err(ProtocolError::truncated(
                        len,
                        self.pos,
                        self.buf.len(),
                        "array elements",
                    ));
                }
                let mut items = Vec::new();
                while self.pos < end {
                    items.push(self.get_value(elem)?);
                }
                if self.pos != end {
                    return Err(ProtocolError::LengthMismatch {
                        region: "array",
                        declared: len,
                        actual: self.pos + len - end,
                    });
                }
                Value::Array((**elem).clone(), items)
            }
            ArgType::Struct(fields) => {
                self.align_to(8, "struct value")?;
                let mut out = Vec::with_capacity(fields.len());
                for field in fields {
                    out.push(self.get_value(field)?);
                }
                Value::Struct(out)
            }
            ArgType::Variant => {
                let raw = self.get_signature_str("variant signature")?;
                let content = sig::parse_single(&Signature::new(raw)?)?;
                Value::Variant(Box::new(self.get_value(&content)?))
            }
        };
        Ok(value)
    }

    /// Decode a full body under `signature`.
    pub fn get_body(&mut self, signature: &Signature) -> ProtocolResult<Vec<Value>> {
        let declared = sig::parse_signature(signature)?;
        let mut out = Vec::with_capacity(declared.len());
        for ty in &declared {
            out.push(self.get_value(ty)?);
        }
        Ok(out)
    }
}

/// Convert generically decoded arguments to a matched constructor's declared
/// parameter types.
///
/// The conversion rules are deliberately narrow: a declared `Variant` wraps a
/// bare value (or passes an existing one through), a received variant is
/// unwrapped when the declared type is concrete, containers convert
/// element-wise, and everything else must match exactly. `_ctx` is threaded
/// through for declared types that need live connection state to resolve;
/// none of the current descriptor kinds do.
pub fn deserialize_arguments(
    raw: &[Value],
    declared: &[ArgType],
    _ctx: &BusContext,
) -> ProtocolResult<Vec<Value>> {
    if raw.len() != declared.len() {
        return Err(ProtocolError::LengthMismatch {
            region: "argument list",
            declared: declared.len(),
            actual: raw.len(),
        });
    }
    raw.iter()
        .zip(declared)
        .enumerate()
        .map(|(index, (value, ty))| convert(value, ty, index))
        .collect()
}

fn convert(value: &Value, declared: &ArgType, index: usize) -> ProtocolResult<Value> {
    match (declared, value) {
        (ArgType::Variant, Value::Variant(_)) => Ok(value.clone()),
        (ArgType::Variant, bare) => Ok(Value::Variant(Box::new(bare.clone()))),
        (_, Value::Variant(inner)) => convert(inner, declared, index),
        (ArgType::Array(elem), Value::Array(_, items)) => {
            let converted = items
                .iter()
                .map(|item| convert(item, elem, index))
                .collect::<ProtocolResult<Vec<_>>>()?;
            Ok(Value::Array((**elem).clone(), converted))
        }
        (ArgType::Struct(fields), Value::Struct(values)) if fields.len() == values.len() => {
            let converted = fields
                .iter()
                .zip(values)
                .map(|(field, v)| convert(v, field, index))
                .collect::<ProtocolResult<Vec<_>>>()?;
            Ok(Value::Struct(converted))
        }
        _ => {
            let actual = value.arg_type();
            if *declared == actual {
                Ok(value.clone())
            } else {
                Err(ProtocolError::ArgumentMismatch {
                    index,
                    expected: declared.to_string(),
                    actual: actual.to_string(),
                })
            }
        }
    }
}
