// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode-directed value encoding and `any`.

use super::{wire_len, OutputStream};
use crate::error::{CdrError, Result};
use crate::fixed::Fixed;
use crate::typecode::{TCKind, TypeCode, TypeCodeBody};
use crate::value::{AbstractInterface, Any, Value};

fn mismatch(tc: &TypeCode, value: &Value) -> CdrError {
    CdrError::bad_param(format!(
        "{} value does not match {}",
        value.variant_name(),
        tc
    ))
}

fn check_bound(what: &str, len: usize, bound: u32) -> Result<()> {
    if bound != 0 && len > bound as usize {
        return Err(CdrError::bad_param(format!(
            "{} of length {} exceeds bound {}",
            what, len, bound
        )));
    }
    Ok(())
}

impl OutputStream {
    /// Encode an `any`: its TypeCode, then its value.
    pub fn write_any(&mut self, any: &Any) -> Result<()> {
        self.write_typecode(any.type_code())?;
        self.write_typed(any.type_code(), any.value())
    }

    /// Encode `value` as described by `tc`.
    pub fn write_typed(&mut self, tc: &TypeCode, value: &Value) -> Result<()> {
        let origin = tc.origin()?;
        match (origin.body(), value) {
            (TypeCodeBody::Basic(kind), _) => self.write_basic(*kind, &origin, value),
            (TypeCodeBody::String { bound }, Value::String(s)) => {
                check_bound("string", s.chars().count(), *bound)?;
                self.write_string(s)
            }
            (TypeCodeBody::WString { bound }, Value::WString(s)) => {
                check_bound("wstring", s.chars().count(), *bound)?;
                self.write_wstring(s)
            }
            (TypeCodeBody::Fixed { digits, scale }, Value::Fixed(f)) => {
                self.write_fixed_typed(f, *digits, *scale)
            }
            (TypeCodeBody::Interface { kind, .. }, _) => match (kind, value) {
                (TCKind::Objref, Value::Object(ior)) => self.write_object(ior.as_ref()),
                (TCKind::AbstractInterface, Value::AbstractInterface(ai)) => {
                    self.write_abstract_interface(ai)
                }
                (TCKind::AbstractInterface, Value::Object(ior)) => self
                    .write_abstract_interface(&AbstractInterface::Object(ior.clone())),
                _ => Err(mismatch(&origin, value)),
            },
            (TypeCodeBody::Struct(s), Value::Struct(members)) => {
                if members.len() != s.members.len() {
                    return Err(CdrError::bad_param(format!(
                        "{} has {} members, value has {}",
                        origin,
                        s.members.len(),
                        members.len()
                    )));
                }
                for (m, v) in s.members.iter().zip(members) {
                    self.write_typed(&m.member_type, v)?;
                }
                Ok(())
            }
            (TypeCodeBody::Except(s), Value::Struct(members)) => {
                if members.len() != s.members.len() {
                    return Err(mismatch(&origin, value));
                }
                self.write_string(&s.id)?;
                for (m, v) in s.members.iter().zip(members) {
                    self.write_typed(&m.member_type, v)?;
                }
                Ok(())
            }
            (
                TypeCodeBody::Union(u),
                Value::Union {
                    discriminator,
                    value: member,
                },
            ) => {
                let disc_kind = u.discriminator.origin()?.kind();
                self.write_label(disc_kind, *discriminator)?;
                match u.member_for(*discriminator) {
                    Some((_, m)) => self.write_typed(&m.member_type, member),
                    None => Ok(()),
                }
            }
            (TypeCodeBody::Enum { members, .. }, Value::Enum(ordinal)) => {
                if *ordinal as usize >= members.len() {
                    return Err(CdrError::bad_param(format!(
                        "enum ordinal {} out of range for {}",
                        ordinal, origin
                    )));
                }
                self.write_enum(*ordinal)
            }
            (TypeCodeBody::Sequence { element, bound }, Value::Sequence(items)) => {
                check_bound("sequence", items.len(), *bound)?;
                self.write_ulong(wire_len(items.len())?)?;
                for item in items {
                    self.write_typed(element, item)?;
                }
                Ok(())
            }
            (TypeCodeBody::Array { element, length }, Value::Array(items)) => {
                if items.len() != *length as usize {
                    return Err(CdrError::bad_param(format!(
                        "array of length {} given {} elements",
                        length,
                        items.len()
                    )));
                }
                for item in items {
                    self.write_typed(element, item)?;
                }
                Ok(())
            }
            (TypeCodeBody::ValueBox { .. }, Value::Value(v)) => self.write_value_box(v.as_ref()),
            (TypeCodeBody::Value(_), Value::Value(v)) => self.write_value(v.as_ref()),
            (TypeCodeBody::Alias { .. } | TypeCodeBody::Recursive(_), _) => Err(
                CdrError::invalid_tc(format!("{} survived alias resolution", origin.kind())),
            ),
            _ => Err(mismatch(&origin, value)),
        }
    }

    fn write_basic(&mut self, kind: TCKind, tc: &TypeCode, value: &Value) -> Result<()> {
        match (kind, value) {
            (TCKind::Null | TCKind::Void, _) => Ok(()),
            (TCKind::Short, Value::Short(v)) => self.write_short(*v),
            (TCKind::UShort, Value::UShort(v)) => self.write_ushort(*v),
            (TCKind::Long, Value::Long(v)) => self.write_long(*v),
            (TCKind::ULong, Value::ULong(v)) => self.write_ulong(*v),
            (TCKind::LongLong, Value::LongLong(v)) => self.write_longlong(*v),
            (TCKind::ULongLong, Value::ULongLong(v)) => self.write_ulonglong(*v),
            (TCKind::Float, Value::Float(v)) => self.write_float(*v),
            (TCKind::Double, Value::Double(v)) => self.write_double(*v),
            (TCKind::LongDouble, Value::LongDouble(v)) => self.write_longdouble(v),
            (TCKind::Boolean, Value::Boolean(v)) => self.write_boolean(*v),
            (TCKind::Char, Value::Char(v)) => self.write_char(*v),
            (TCKind::WChar, Value::WChar(v)) => self.write_wchar(*v),
            (TCKind::Octet, Value::Octet(v)) => self.write_octet(*v),
            (TCKind::Any, Value::Any(any)) => self.write_any(any),
            (TCKind::TypeCode, Value::TypeCode(tc)) => self.write_typecode(tc),
            (TCKind::Principal, Value::Principal(p)) => self.write_principal(p),
            _ => Err(mismatch(tc, value)),
        }
    }

    /// Fixed-point value under a `fixed<digits, scale>` TypeCode: rescaled
    /// to `scale` and zero-extended to `digits` digits.
    pub fn write_fixed_typed(&mut self, value: &Fixed, digits: u16, scale: i16) -> Result<()> {
        let scale = u16::try_from(scale)
            .map_err(|_| CdrError::bad_param(format!("negative fixed scale {}", scale)))?;
        let value = value.rescale(scale)?;
        if value.digits().len() > usize::from(digits) {
            return Err(CdrError::bad_param(format!(
                "{} does not fit fixed<{},{}>",
                value, digits, scale
            )));
        }
        let bytes = value.to_bcd(usize::from(digits));
        self.write_octet_array(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typecode::{UnionMember, VM_NONE};

    #[test]
    fn test_union_default_member_written_after_discriminator() {
        let tc = TypeCode::union_tc(
            "IDL:U:1.0",
            "U",
            TypeCode::short(),
            vec![
                UnionMember::new(1, "a", TypeCode::long()),
                UnionMember::default_case("other", TypeCode::octet()),
            ],
        )
        .unwrap();
        let mut out = OutputStream::default();
        out.write_typed(
            &tc,
            &Value::Union {
                discriminator: 9,
                value: Box::new(Value::Octet(0xAB)),
            },
        )
        .unwrap();
        assert_eq!(out.as_bytes(), &[0x00, 0x09, 0xAB]);
    }

    #[test]
    fn test_union_without_selected_member_writes_only_discriminator() {
        let tc = TypeCode::union_tc(
            "IDL:U:1.0",
            "U",
            TypeCode::long(),
            vec![UnionMember::new(1, "a", TypeCode::long())],
        )
        .unwrap();
        let mut out = OutputStream::default();
        out.write_typed(
            &tc,
            &Value::Union {
                discriminator: 5,
                value: Box::new(Value::Void),
            },
        )
        .unwrap();
        assert_eq!(out.as_bytes(), &[0, 0, 0, 5]);
    }

    #[test]
    fn test_mismatched_value_is_bad_param() {
        let mut out = OutputStream::default();
        let err = out.write_typed(&TypeCode::long(), &Value::Short(1)).unwrap_err();
        assert!(matches!(err, CdrError::BadParam(_)));

        let err = out
            .write_typed(&TypeCode::string(2), &Value::from("abc"))
            .unwrap_err();
        assert!(matches!(err, CdrError::BadParam(_)));
    }

    #[test]
    fn test_alias_is_transparent() {
        let alias = TypeCode::alias("IDL:Count:1.0", "Count", TypeCode::ulong());
        let mut out = OutputStream::default();
        out.write_typed(&alias, &Value::ULong(3)).unwrap();
        assert_eq!(out.as_bytes(), &[0, 0, 0, 3]);
    }

    #[test]
    fn test_fixed_typed_pads_to_digit_count() {
        let mut out = OutputStream::default();
        let value: Fixed = "-12.5".parse().unwrap();
        out.write_typed(&TypeCode::fixed(5, 2), &Value::Fixed(value))
            .unwrap();
        // 5 digits at scale 2: 01250 -> 00 12 50 0D
        assert_eq!(out.as_bytes(), &[0x00, 0x12, 0x50, 0x0D]);
    }

    #[test]
    fn test_value_member_count_checked() {
        let tc = TypeCode::value_tc("IDL:V:1.0", "V", VM_NONE, None, Vec::new());
        let v = crate::value::ValueRef::new(tc.clone(), vec![Value::Long(1)]);
        let mut out = OutputStream::default();
        assert!(matches!(
            out.write_typed(&tc, &Value::Value(Some(v))),
            Err(CdrError::BadParam(_))
        ));
    }
}
