//! Dynamic wire value model
//!
//! Signal bodies are dynamically typed on the wire. [`Value`] is the runtime
//! side of that model: what the marshaller produces when it decodes a body
//! generically. [`ArgType`] is the declared side: the parameter-type
//! descriptors attached to registered signal constructors, against which
//! received arguments are matched and converted.
//!
//! Matching uses [`ArgType::accepts`]: position-by-position assignability with
//! no widening and no coercion. The declared `Variant` type is the single
//! "accepts anything" point in the system, mirroring the wire's own escape
//! hatch for dynamically typed fields.

use std::fmt;

use super::path::ObjectPath;
use super::signature::Signature;

/// Declared parameter type descriptor for a registered signal constructor.
///
/// These replace runtime reflection: every constructor variant registered with
/// the type registry carries its parameter descriptors explicitly, and the
/// wire signature for body deserialization is derived from them once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    Byte,
    Bool,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F64,
    Str,
    Path,
    Sig,
    Array(Box<ArgType>),
    Struct(Vec<ArgType>),
    Variant,
}

impl ArgType {
    /// Assignability check used for constructor matching: equal length
    /// containers match element-wise, `Variant` accepts any argument, and
    /// everything else requires an exact kind match.
    pub fn accepts(&self, actual: &ArgType) -> bool {
        match (self, actual) {
            (ArgType::Variant, _) => true,
            (ArgType::Array(declared), ArgType::Array(actual)) => declared.accepts(actual),
            (ArgType::Struct(declared), ArgType::Struct(actual)) => {
                declared.len() == actual.len()
                    && declared.iter().zip(actual).all(|(d, a)| d.accepts(a))
            }
            _ => self == actual,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Byte => f.write_str("byte"),
            ArgType::Bool => f.write_str("bool"),
            ArgType::I16 => f.write_str("i16"),
            ArgType::U16 => f.write_str("u16"),
            ArgType::I32 => f.write_str("i32"),
            ArgType::U32 => f.write_str("u32"),
            ArgType::I64 => f.write_str("i64"),
            ArgType::U64 => f.write_str("u64"),
            ArgType::F64 => f.write_str("f64"),
            ArgType::Str => f.write_str("string"),
            ArgType::Path => f.write_str("object_path"),
            ArgType::Sig => f.write_str("signature"),
            ArgType::Array(elem) => write!(f, "array<{elem}>"),
            ArgType::Struct(fields) => {
                f.write_str("struct(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
            ArgType::Variant => f.write_str("variant"),
        }
    }
}

/// A dynamically typed wire value.
///
/// Arrays carry their element descriptor explicitly so empty arrays stay
/// typed and re-encodable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(u8),
    Bool(bool),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Path(ObjectPath),
    Sig(Signature),
    Array(ArgType, Vec<Value>),
    Struct(Vec<Value>),
    Variant(Box<Value>),
}

impl Value {
    /// Runtime type of this value, as used for constructor matching.
    pub fn arg_type(&self) -> ArgType {
        match self {
            Value::Byte(_) => ArgType::Byte,
            Value::Bool(_) => ArgType::Bool,
            Value::I16(_) => ArgType::I16,
            Value::U16(_) => ArgType::U16,
            Value::I32(_) => ArgType::I32,
            Value::U32(_) => ArgType::U32,
            Value::I64(_) => ArgType::I64,
            Value::U64(_) => ArgType::U64,
            Value::F64(_) => ArgType::F64,
            Value::Str(_) => ArgType::Str,
            Value::Path(_) => ArgType::Path,
            Value::Sig(_) => ArgType::Sig,
            Value::Array(elem, _) => ArgType::Array(Box::new(elem.clone())),
            Value::Struct(fields) => {
                ArgType::Struct(fields.iter().map(Value::arg_type).collect())
            }
            Value::Variant(_) => ArgType::Variant,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
