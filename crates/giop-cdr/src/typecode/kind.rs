// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TCKind enumeration (CORBA 3.x Sec.10.7.1).

use std::fmt;

/// TypeCode kind, with its 4-byte wire value as discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TCKind {
    Null = 0,
    Void = 1,
    Short = 2,
    Long = 3,
    UShort = 4,
    ULong = 5,
    Float = 6,
    Double = 7,
    Boolean = 8,
    Char = 9,
    Octet = 10,
    Any = 11,
    TypeCode = 12,
    Principal = 13,
    Objref = 14,
    Struct = 15,
    Union = 16,
    Enum = 17,
    String = 18,
    Sequence = 19,
    Array = 20,
    Alias = 21,
    Except = 22,
    LongLong = 23,
    ULongLong = 24,
    LongDouble = 25,
    WChar = 26,
    WString = 27,
    Fixed = 28,
    Value = 29,
    ValueBox = 30,
    Native = 31,
    AbstractInterface = 32,
    LocalInterface = 33,
}

impl TCKind {
    /// Every kind, in wire-value order.
    pub const ALL: [TCKind; 34] = [
        TCKind::Null,
        TCKind::Void,
        TCKind::Short,
        TCKind::Long,
        TCKind::UShort,
        TCKind::ULong,
        TCKind::Float,
        TCKind::Double,
        TCKind::Boolean,
        TCKind::Char,
        TCKind::Octet,
        TCKind::Any,
        TCKind::TypeCode,
        TCKind::Principal,
        TCKind::Objref,
        TCKind::Struct,
        TCKind::Union,
        TCKind::Enum,
        TCKind::String,
        TCKind::Sequence,
        TCKind::Array,
        TCKind::Alias,
        TCKind::Except,
        TCKind::LongLong,
        TCKind::ULongLong,
        TCKind::LongDouble,
        TCKind::WChar,
        TCKind::WString,
        TCKind::Fixed,
        TCKind::Value,
        TCKind::ValueBox,
        TCKind::Native,
        TCKind::AbstractInterface,
        TCKind::LocalInterface,
    ];

    pub const fn value(self) -> u32 {
        self as u32
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Kinds whose TypeCode is the bare 4-byte tag. These are never
    /// indirected.
    pub const fn is_basic(self) -> bool {
        matches!(
            self,
            TCKind::Null
                | TCKind::Void
                | TCKind::Short
                | TCKind::Long
                | TCKind::UShort
                | TCKind::ULong
                | TCKind::Float
                | TCKind::Double
                | TCKind::Boolean
                | TCKind::Char
                | TCKind::Octet
                | TCKind::Any
                | TCKind::TypeCode
                | TCKind::Principal
                | TCKind::LongLong
                | TCKind::ULongLong
                | TCKind::LongDouble
                | TCKind::WChar
        )
    }

    /// Kinds whose parameters follow the tag inline (no encapsulation).
    pub const fn has_simple_params(self) -> bool {
        matches!(self, TCKind::String | TCKind::WString | TCKind::Fixed)
    }

    /// Kinds whose parameters are wrapped in an encapsulation.
    pub const fn has_complex_params(self) -> bool {
        !self.is_basic() && !self.has_simple_params()
    }

    /// Fixed-size scalars that sequences and arrays can bulk-copy.
    ///
    /// Returns the element size in bytes.
    pub const fn scalar_size(self) -> Option<usize> {
        match self {
            TCKind::Boolean | TCKind::Char | TCKind::Octet => Some(1),
            TCKind::Short | TCKind::UShort => Some(2),
            TCKind::Long | TCKind::ULong | TCKind::Float | TCKind::Enum => Some(4),
            TCKind::LongLong | TCKind::ULongLong | TCKind::Double => Some(8),
            _ => None,
        }
    }

    /// Kinds legal as a union discriminator.
    pub const fn is_discriminator(self) -> bool {
        matches!(
            self,
            TCKind::Short
                | TCKind::Long
                | TCKind::UShort
                | TCKind::ULong
                | TCKind::LongLong
                | TCKind::ULongLong
                | TCKind::Boolean
                | TCKind::Char
                | TCKind::WChar
                | TCKind::Enum
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            TCKind::Null => "tk_null",
            TCKind::Void => "tk_void",
            TCKind::Short => "tk_short",
            TCKind::Long => "tk_long",
            TCKind::UShort => "tk_ushort",
            TCKind::ULong => "tk_ulong",
            TCKind::Float => "tk_float",
            TCKind::Double => "tk_double",
            TCKind::Boolean => "tk_boolean",
            TCKind::Char => "tk_char",
            TCKind::Octet => "tk_octet",
            TCKind::Any => "tk_any",
            TCKind::TypeCode => "tk_TypeCode",
            TCKind::Principal => "tk_Principal",
            TCKind::Objref => "tk_objref",
            TCKind::Struct => "tk_struct",
            TCKind::Union => "tk_union",
            TCKind::Enum => "tk_enum",
            TCKind::String => "tk_string",
            TCKind::Sequence => "tk_sequence",
            TCKind::Array => "tk_array",
            TCKind::Alias => "tk_alias",
            TCKind::Except => "tk_except",
            TCKind::LongLong => "tk_longlong",
            TCKind::ULongLong => "tk_ulonglong",
            TCKind::LongDouble => "tk_longdouble",
            TCKind::WChar => "tk_wchar",
            TCKind::WString => "tk_wstring",
            TCKind::Fixed => "tk_fixed",
            TCKind::Value => "tk_value",
            TCKind::ValueBox => "tk_value_box",
            TCKind::Native => "tk_native",
            TCKind::AbstractInterface => "tk_abstract_interface",
            TCKind::LocalInterface => "tk_local_interface",
        }
    }
}

impl fmt::Display for TCKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_match_table() {
        for (i, kind) in TCKind::ALL.iter().enumerate() {
            assert_eq!(kind.value() as usize, i);
            assert_eq!(TCKind::from_value(i as u32), Some(*kind));
        }
        assert_eq!(TCKind::Long.value(), 3);
        assert_eq!(TCKind::from_value(34), None);
    }

    #[test]
    fn test_param_classes_are_disjoint() {
        for kind in TCKind::ALL {
            let classes = [
                kind.is_basic(),
                kind.has_simple_params(),
                kind.has_complex_params(),
            ];
            assert_eq!(classes.iter().filter(|c| **c).count(), 1, "{kind}");
        }
        assert!(TCKind::Struct.has_complex_params());
        assert!(TCKind::Fixed.has_simple_params());
        assert!(TCKind::WChar.is_basic());
    }

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(TCKind::Octet.scalar_size(), Some(1));
        assert_eq!(TCKind::UShort.scalar_size(), Some(2));
        assert_eq!(TCKind::Enum.scalar_size(), Some(4));
        assert_eq!(TCKind::Double.scalar_size(), Some(8));
        assert_eq!(TCKind::WChar.scalar_size(), None);
        assert_eq!(TCKind::String.scalar_size(), None);
    }
}
