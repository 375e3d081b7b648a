// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host-side values marshalled under a TypeCode.

use crate::fixed::Fixed;
use crate::typecode::TypeCode;
use parking_lot::{RwLock, RwLockReadGuard};
use std::fmt;
use std::sync::Arc;

/// Size of an IEEE 754 quad-precision `long double`, carried as raw octets.
pub const LONG_DOUBLE_SIZE: usize = 16;

/// A value of any IDL type.
///
/// Struct and exception values hold their members in declaration order.
/// Union values hold the discriminator (see [`UnionLabel`](crate::typecode::UnionLabel)
/// for the `i64` mapping) and the selected member, or [`Value::Void`] when no
/// member is selected. Enums hold the ordinal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Void,
    Boolean(bool),
    Char(char),
    WChar(char),
    Octet(u8),
    Short(i16),
    UShort(u16),
    Long(i32),
    ULong(u32),
    LongLong(i64),
    ULongLong(u64),
    Float(f32),
    Double(f64),
    LongDouble([u8; LONG_DOUBLE_SIZE]),
    String(String),
    WString(String),
    Fixed(Fixed),
    Enum(u32),
    TypeCode(TypeCode),
    Any(Box<Any>),
    Principal(Vec<u8>),
    Object(Option<Ior>),
    Struct(Vec<Value>),
    Union { discriminator: i64, value: Box<Value> },
    Sequence(Vec<Value>),
    Array(Vec<Value>),
    /// Value type or value box instance; `None` is the null value.
    Value(Option<ValueRef>),
    AbstractInterface(AbstractInterface),
}

/// Generate `as_*` accessors for copyable scalar variants.
macro_rules! scalar_accessor {
    ($($name:ident => $variant:ident : $type:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Option<$type> {
                match self {
                    Self::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        )*
    };
}

impl Value {
    scalar_accessor! {
        as_boolean => Boolean: bool,
        as_char => Char: char,
        as_wchar => WChar: char,
        as_octet => Octet: u8,
        as_short => Short: i16,
        as_ushort => UShort: u16,
        as_long => Long: i32,
        as_ulong => ULong: u32,
        as_longlong => LongLong: i64,
        as_ulonglong => ULongLong: u64,
        as_float => Float: f32,
        as_double => Double: f64,
        as_enum => Enum: u32,
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) | Self::WString(v) => Some(v),
            _ => None,
        }
    }

    /// Members of a struct, elements of a sequence or array.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::Struct(v) | Self::Sequence(v) | Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value_ref(&self) -> Option<&ValueRef> {
        match self {
            Self::Value(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Variant name, for error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Void => "void",
            Self::Boolean(_) => "boolean",
            Self::Char(_) => "char",
            Self::WChar(_) => "wchar",
            Self::Octet(_) => "octet",
            Self::Short(_) => "short",
            Self::UShort(_) => "unsigned short",
            Self::Long(_) => "long",
            Self::ULong(_) => "unsigned long",
            Self::LongLong(_) => "long long",
            Self::ULongLong(_) => "unsigned long long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::LongDouble(_) => "long double",
            Self::String(_) => "string",
            Self::WString(_) => "wstring",
            Self::Fixed(_) => "fixed",
            Self::Enum(_) => "enum",
            Self::TypeCode(_) => "TypeCode",
            Self::Any(_) => "any",
            Self::Principal(_) => "Principal",
            Self::Object(_) => "Object",
            Self::Struct(_) => "struct",
            Self::Union { .. } => "union",
            Self::Sequence(_) => "sequence",
            Self::Array(_) => "array",
            Self::Value(_) => "valuetype",
            Self::AbstractInterface(_) => "abstract interface",
        }
    }
}

/// Generate `From<host>` for `Value` and `Any`.
macro_rules! host_conversions {
    ($($type:ty => $variant:ident, $tc:ident);* $(;)?) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Value::$variant(v)
                }
            }

            impl From<$type> for Any {
                fn from(v: $type) -> Self {
                    Any::new(TypeCode::$tc(), Value::$variant(v))
                }
            }
        )*
    };
}

host_conversions! {
    bool => Boolean, boolean;
    u8 => Octet, octet;
    i16 => Short, short;
    u16 => UShort, ushort;
    i32 => Long, long;
    u32 => ULong, ulong;
    i64 => LongLong, longlong;
    u64 => ULongLong, ulonglong;
    f32 => Float, float;
    f64 => Double, double;
    char => Char, char;
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Any {
    fn from(v: &str) -> Self {
        Any::new(TypeCode::string(0), Value::String(v.to_string()))
    }
}

/// Self-describing value: a TypeCode plus a value of that type.
#[derive(Debug, Clone, PartialEq)]
pub struct Any {
    type_code: TypeCode,
    value: Value,
}

impl Any {
    pub fn new(type_code: TypeCode, value: Value) -> Self {
        Self { type_code, value }
    }

    /// An `any` holding nothing (`tk_null`).
    pub fn empty() -> Self {
        Self::new(TypeCode::null(), Value::Null)
    }

    pub fn type_code(&self) -> &TypeCode {
        &self.type_code
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_parts(self) -> (TypeCode, Value) {
        (self.type_code, self.value)
    }
}

/// Interoperable object reference: type id plus tagged profiles.
///
/// Profile bodies are opaque octets; their interpretation belongs to the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ior {
    pub type_id: String,
    pub profiles: Vec<TaggedProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedProfile {
    pub tag: u32,
    pub data: Vec<u8>,
}

impl Ior {
    pub fn new(type_id: impl Into<String>, profiles: Vec<TaggedProfile>) -> Self {
        Self {
            type_id: type_id.into(),
            profiles,
        }
    }

    /// The nil reference: empty type id, no profiles.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.type_id.is_empty() && self.profiles.is_empty()
    }
}

/// Value of an abstract interface: an object reference or a value instance.
#[derive(Debug, Clone, PartialEq)]
pub enum AbstractInterface {
    Object(Option<Ior>),
    Value(Option<ValueRef>),
}

/// Shared handle to a value type instance.
///
/// Handles compare by identity: two handles are equal when they designate
/// the same instance. The encoder writes an instance once per message and
/// indirects every further reference to it.
///
/// Self-referential graphs are reference cycles and are never freed.
#[derive(Clone)]
pub struct ValueRef(Arc<ValueObject>);

/// A value type instance: its most derived TypeCode and its state.
///
/// State holds the members of every base in inheritance order, then the
/// type's own members. A value box holds exactly one element.
pub struct ValueObject {
    type_code: TypeCode,
    state: RwLock<Vec<Value>>,
}

impl ValueRef {
    pub fn new(type_code: TypeCode, state: Vec<Value>) -> Self {
        ValueRef(Arc::new(ValueObject {
            type_code,
            state: RwLock::new(state),
        }))
    }

    /// Instance of a value box.
    pub fn boxed(type_code: TypeCode, value: Value) -> Self {
        Self::new(type_code, vec![value])
    }

    pub fn type_code(&self) -> &TypeCode {
        &self.0.type_code
    }

    pub fn state(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.state.read()
    }

    /// Replace the state (used to complete an instance after it was
    /// registered for back-references).
    pub fn set_state(&self, state: Vec<Value>) {
        *self.0.state.write() = state;
    }

    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &ValueRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ValueRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ValueRef {
    // State is not printed: graphs may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueRef")
            .field("type", &self.type_code().to_string())
            .field("identity", &format_args!("{:#x}", self.identity()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_accessors() {
        let v = Value::from(42i32);
        assert_eq!(v.as_long(), Some(42));
        assert_eq!(v.as_ulong(), None);
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::Enum(2).as_enum(), Some(2));
    }

    #[test]
    fn test_any_from_host() {
        let any = Any::from(7u16);
        assert_eq!(any.type_code(), &TypeCode::ushort());
        assert_eq!(any.value(), &Value::UShort(7));
        assert_eq!(Any::empty().value(), &Value::Null);
    }

    #[test]
    fn test_value_refs_compare_by_identity() {
        let tc = TypeCode::value_box("IDL:Name:1.0", "Name", TypeCode::string(0));
        let a = ValueRef::boxed(tc.clone(), Value::from("x"));
        let b = ValueRef::boxed(tc, Value::from("x"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        b.set_state(vec![Value::from("y")]);
        assert_eq!(b.state()[0].as_str(), Some("y"));
    }

    #[test]
    fn test_null_ior() {
        assert!(Ior::null().is_null());
        let ior = Ior::new(
            "IDL:Echo:1.0",
            vec![TaggedProfile {
                tag: 0,
                data: vec![1, 2],
            }],
        );
        assert!(!ior.is_null());
    }
}
