//! Signature derivation and structural parsing
//!
//! Two directions over the same grammar: [`derive_signature`] turns a
//! registered constructor's declared parameter descriptors into the wire
//! signature used for body encoding, and [`parse_signature`] turns a received
//! signature string back into descriptors that drive generic body decoding.
//!
//! Type codes: `y` u8, `b` bool, `n` i16, `q` u16, `i` i32, `u` u32, `x` i64,
//! `t` u64, `d` f64, `s` string, `o` object path, `g` signature, `a` array,
//! `(`..`)` struct, `v` variant.

use types::protocol::signature::{Signature, SignatureError, MAX_NESTING_DEPTH};
use types::protocol::value::ArgType;

use crate::error::{ProtocolError, ProtocolResult};

/// Wire alignment for a declared type.
pub fn alignment_of(ty: &ArgType) -> usize {
    match ty {
        ArgType::Byte | ArgType::Sig | ArgType::Variant => 1,
        ArgType::I16 | ArgType::U16 => 2,
        ArgType::Bool | ArgType::I32 | ArgType::U32 | ArgType::Str | ArgType::Path => 4,
        ArgType::I64 | ArgType::U64 | ArgType::F64 | ArgType::Struct(_) => 8,
        ArgType::Array(_) => 4,
    }
}

/// Signature string of a single declared type.
pub fn signature_of(ty: &ArgType) -> String {
    let mut out = String::new();
    write_code(ty, &mut out);
    out
}

fn write_code(ty: &ArgType, out: &mut String) {
    match ty {
        ArgType::Byte => out.push('y'),
        ArgType::Bool => out.push('b'),
        ArgType::I16 => out.push('n'),
        ArgType::U16 => out.push('q'),
        ArgType::I32 => out.push('i'),
        ArgType::U32 => out.push('u'),
        ArgType::I64 => out.push('x'),
        ArgType::U64 => out.push('t'),
        ArgType::F64 => out.push('d'),
        ArgType::Str => out.push('s'),
        ArgType::Path => out.push('o'),
        ArgType::Sig => out.push('g'),
        ArgType::Variant => out.push('v'),
        ArgType::Array(elem) => {
            out.push('a');
            write_code(elem, out);
        }
        ArgType::Struct(fields) => {
            out.push('(');
            for field in fields {
                write_code(field, out);
            }
            out.push(')');
        }
    }
}

/// Derive the wire signature for an ordered declared parameter list.
///
/// This is the collaborator the envelope builder uses to announce body types
/// for registered constructors.
pub fn derive_signature(params: &[ArgType]) -> ProtocolResult<Signature> {
    let mut out = String::new();
    for param in params {
        write_code(param, &mut out);
    }
    Ok(Signature::new(out)?)
}

/// Parse a signature into its ordered sequence of complete types.
pub fn parse_signature(sig: &Signature) -> ProtocolResult<Vec<ArgType>> {
    let bytes = sig.as_str().as_bytes();
    let mut types = Vec::new();
    let mut position = 0usize;
    while position < bytes.len() {
        types.push(parse_one(bytes, &mut position, 0)?);
    }
    Ok(types)
}

/// Parse exactly one complete type, e.g. a variant's announced content type.
pub fn parse_single(sig: &Signature) -> ProtocolResult<ArgType> {
    let types = parse_signature(sig)?;
    if types.len() != 1 {
        return Err(SignatureError::NotSingle { count: types.len() }.into());
    }
    Ok(types.into_iter().next().expect("length checked above"))
}

fn parse_one(bytes: &[u8], position: &mut usize, depth: usize) -> Result<ArgType, ProtocolError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(SignatureError::DepthExceeded {
            position: *position,
        }
        .into());
    }
    let start = *position;
    let code = bytes[start];
    *position += 1;
    let parsed = match code {
        b'y' => ArgType::Byte,
        b'b' => ArgType::Bool,
        b'n' => ArgType::I16,
        b'q' => ArgType::U16,
        b'i' => ArgType::I32,
        b'u' => ArgType::U32,
        b'x' => ArgType::I64,
        b't' => ArgType::U64,
        b'd' => ArgType::F64,
        b's' => ArgType::Str,
        b'o' => ArgType::Path,
        b'g' => ArgType::Sig,
        b'v' => ArgType::Variant,
        b'a' => {
            if *position >= bytes.len() {
                return Err(SignatureError::MissingArrayElement { position: start }.into());
            }
            ArgType::Array(Box::new(parse_one(bytes, position, depth + 1)?))
        }
        b'(' => {
            let mut fields = Vec::new();
            loop {
                if *position >= bytes.len() {
                    return Err(SignatureError::UnmatchedParen { position: start }.into());
                }
                if bytes[*position] == b')' {
                    *position += 1;
                    break;
                }
                fields.push(parse_one(bytes, position, depth + 1)?);
            }
            if fields.is_empty() {
                return Err(SignatureError::EmptyStruct { position: start }.into());
            }
            ArgType::Struct(fields)
        }
        other => {
            return Err(SignatureError::InvalidTypeCode {
                code: other as char,
                position: start,
            }
            .into());
        }
    };
    Ok(parsed)
}
