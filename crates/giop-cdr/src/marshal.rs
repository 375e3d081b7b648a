// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed host marshalling.
//!
//! [`CdrEncode`] and [`CdrDecode`] map host types onto their IDL
//! counterparts without going through a TypeCode: `bool` is `boolean`,
//! `u8` is `octet`, `i32` is `long`, `String` is `string`, `Vec<T>` is an
//! unbounded `sequence<T>`, and so on.
//!
//! ```
//! use giop_cdr::OutputStream;
//!
//! let mut out = OutputStream::default();
//! out.write(&vec![String::from("a"), String::from("b")]).unwrap();
//! out.write(&-3i16).unwrap();
//!
//! let mut input = out.input();
//! let names: Vec<String> = input.read().unwrap();
//! assert_eq!(names, ["a", "b"]);
//! assert_eq!(input.read::<i16>().unwrap(), -3);
//! ```

use crate::decoder::InputStream;
use crate::encoder::{wire_len, OutputStream};
use crate::error::Result;
use crate::fixed::Fixed;
use crate::typecode::TypeCode;
use crate::value::{Any, Ior};

/// A host type with a fixed CDR encoding.
pub trait CdrEncode {
    fn encode(&self, out: &mut OutputStream) -> Result<()>;
}

/// A host type that can be decoded from its CDR encoding.
pub trait CdrDecode: Sized {
    fn decode(input: &mut InputStream<'_>) -> Result<Self>;
}

macro_rules! impl_primitive {
    ($type:ty, $write:ident, $read:ident) => {
        impl CdrEncode for $type {
            fn encode(&self, out: &mut OutputStream) -> Result<()> {
                out.$write(*self)
            }
        }

        impl CdrDecode for $type {
            fn decode(input: &mut InputStream<'_>) -> Result<Self> {
                input.$read()
            }
        }
    };
}

impl_primitive!(bool, write_boolean, read_boolean);
impl_primitive!(u8, write_octet, read_octet);
impl_primitive!(i16, write_short, read_short);
impl_primitive!(u16, write_ushort, read_ushort);
impl_primitive!(i32, write_long, read_long);
impl_primitive!(u32, write_ulong, read_ulong);
impl_primitive!(i64, write_longlong, read_longlong);
impl_primitive!(u64, write_ulonglong, read_ulonglong);
impl_primitive!(f32, write_float, read_float);
impl_primitive!(f64, write_double, read_double);
impl_primitive!(char, write_char, read_char);

impl CdrEncode for str {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        out.write_string(self)
    }
}

impl CdrEncode for String {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        out.write_string(self)
    }
}

impl CdrDecode for String {
    fn decode(input: &mut InputStream<'_>) -> Result<Self> {
        input.read_string()
    }
}

impl<T: CdrEncode> CdrEncode for [T] {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        out.write_ulong(wire_len(self.len())?)?;
        for item in self {
            item.encode(out)?;
        }
        Ok(())
    }
}

impl<T: CdrEncode> CdrEncode for Vec<T> {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        self.as_slice().encode(out)
    }
}

impl<T: CdrDecode> CdrDecode for Vec<T> {
    fn decode(input: &mut InputStream<'_>) -> Result<Self> {
        let count = input.read_count()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode(input)?);
        }
        Ok(items)
    }
}

impl CdrEncode for Any {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        out.write_any(self)
    }
}

impl CdrDecode for Any {
    fn decode(input: &mut InputStream<'_>) -> Result<Self> {
        input.read_any()
    }
}

impl CdrEncode for TypeCode {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        out.write_typecode(self)
    }
}

impl CdrDecode for TypeCode {
    fn decode(input: &mut InputStream<'_>) -> Result<Self> {
        input.read_typecode()
    }
}

/// A nil [`Ior`] encodes as the nil reference and decodes back to one.
impl CdrEncode for Ior {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        out.write_object(Some(self))
    }
}

impl CdrDecode for Ior {
    fn decode(input: &mut InputStream<'_>) -> Result<Self> {
        Ok(input.read_object()?.unwrap_or_else(Ior::null))
    }
}

/// Encoded at its own digit count. There is no [`CdrDecode`]: the digit
/// count and scale come from the TypeCode, see
/// [`InputStream::read_fixed`].
impl CdrEncode for Fixed {
    fn encode(&self, out: &mut OutputStream) -> Result<()> {
        out.write_fixed(self)
    }
}

impl OutputStream {
    /// Encode a host value through its [`CdrEncode`] mapping.
    pub fn write<T: CdrEncode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.encode(self)
    }
}

impl InputStream<'_> {
    /// Decode a host value through its [`CdrDecode`] mapping.
    pub fn read<T: CdrDecode>(&mut self) -> Result<T> {
        T::decode(self)
    }
}
