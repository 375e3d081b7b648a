// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode-directed value decoding and `any`.

use super::InputStream;
use crate::error::{CdrError, Result};
use crate::typecode::{TCKind, TypeCode, TypeCodeBody};
use crate::value::{Any, Value};

fn check_bound(what: &str, at: usize, len: usize, bound: u32) -> Result<()> {
    if bound != 0 && len > bound as usize {
        return Err(CdrError::malformed(
            at,
            format!("{} of length {} exceeds bound {}", what, len, bound),
        ));
    }
    Ok(())
}

impl InputStream<'_> {
    /// Decode an `any`: its TypeCode, then its value.
    pub fn read_any(&mut self) -> Result<Any> {
        let tc = self.read_typecode()?;
        let value = self.read_typed(&tc)?;
        Ok(Any::new(tc, value))
    }

    /// Decode a value described by `tc`.
    pub fn read_typed(&mut self, tc: &TypeCode) -> Result<Value> {
        self.descend()?;
        let start = self.position();
        let value = self.read_typed_level(tc);
        self.ascend();
        let value = value?;
        self.note_typed_read(start)?;
        Ok(value)
    }

    fn read_typed_level(&mut self, tc: &TypeCode) -> Result<Value> {
        let origin = tc.origin()?;
        let at = self.position();
        match origin.body() {
            TypeCodeBody::Basic(kind) => self.read_basic(*kind),
            TypeCodeBody::String { bound } => {
                let s = self.read_string()?;
                check_bound("string", at, s.chars().count(), *bound)?;
                Ok(Value::String(s))
            }
            TypeCodeBody::WString { bound } => {
                let s = self.read_wstring()?;
                check_bound("wstring", at, s.chars().count(), *bound)?;
                Ok(Value::WString(s))
            }
            TypeCodeBody::Fixed { digits, scale } => {
                self.read_fixed(*digits, *scale).map(Value::Fixed)
            }
            TypeCodeBody::Interface { kind, .. } => match kind {
                TCKind::Objref => self.read_object().map(Value::Object),
                TCKind::AbstractInterface => self
                    .read_abstract_interface(None)
                    .map(Value::AbstractInterface),
                other => Err(CdrError::bad_param(format!(
                    "{} cannot be unmarshalled",
                    other
                ))),
            },
            TypeCodeBody::Struct(s) => s
                .members
                .iter()
                .map(|m| self.read_typed(&m.member_type))
                .collect::<Result<Vec<_>>>()
                .map(Value::Struct),
            TypeCodeBody::Except(s) => {
                let id = self.read_string()?;
                if id != s.id {
                    log::debug!(
                        "[InputStream] exception id {} read as {}",
                        id,
                        s.id
                    );
                }
                s.members
                    .iter()
                    .map(|m| self.read_typed(&m.member_type))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Struct)
            }
            TypeCodeBody::Union(u) => {
                let disc_kind = u.discriminator.origin()?.kind();
                let discriminator = self.read_label(disc_kind)?;
                let value = match u.member_for(discriminator) {
                    Some((_, m)) => self.read_typed(&m.member_type)?,
                    None => Value::Void,
                };
                Ok(Value::Union {
                    discriminator,
                    value: Box::new(value),
                })
            }
            TypeCodeBody::Enum { members, .. } => {
                let ordinal = self.read_enum()?;
                if ordinal as usize >= members.len() {
                    return Err(CdrError::malformed(
                        at,
                        format!("enum ordinal {} out of range for {}", ordinal, origin),
                    ));
                }
                Ok(Value::Enum(ordinal))
            }
            TypeCodeBody::Sequence { element, bound } => {
                let count = self.read_count()?;
                check_bound("sequence", at, count, *bound)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_typed(element)?);
                }
                Ok(Value::Sequence(items))
            }
            TypeCodeBody::Array { element, length } => {
                self.check_element_count(*length as usize, at)?;
                let mut items = Vec::with_capacity((*length as usize).min(self.remaining()));
                for _ in 0..*length {
                    items.push(self.read_typed(element)?);
                }
                Ok(Value::Array(items))
            }
            TypeCodeBody::ValueBox { .. } => self.read_value_box(&origin).map(Value::Value),
            TypeCodeBody::Value(_) => self.read_value(&origin).map(Value::Value),
            TypeCodeBody::Alias { .. } | TypeCodeBody::Recursive(_) => Err(
                CdrError::invalid_tc(format!("{} survived alias resolution", origin.kind())),
            ),
        }
    }

    fn read_basic(&mut self, kind: TCKind) -> Result<Value> {
        Ok(match kind {
            TCKind::Null => Value::Null,
            TCKind::Void => Value::Void,
            TCKind::Short => Value::Short(self.read_short()?),
            TCKind::UShort => Value::UShort(self.read_ushort()?),
            TCKind::Long => Value::Long(self.read_long()?),
            TCKind::ULong => Value::ULong(self.read_ulong()?),
            TCKind::LongLong => Value::LongLong(self.read_longlong()?),
            TCKind::ULongLong => Value::ULongLong(self.read_ulonglong()?),
            TCKind::Float => Value::Float(self.read_float()?),
            TCKind::Double => Value::Double(self.read_double()?),
            TCKind::LongDouble => Value::LongDouble(self.read_longdouble()?),
            TCKind::Boolean => Value::Boolean(self.read_boolean()?),
            TCKind::Char => Value::Char(self.read_char()?),
            TCKind::WChar => Value::WChar(self.read_wchar()?),
            TCKind::Octet => Value::Octet(self.read_octet()?),
            TCKind::Any => Value::Any(Box::new(self.read_any()?)),
            TCKind::TypeCode => Value::TypeCode(self.read_typecode()?),
            TCKind::Principal => Value::Principal(self.read_principal()?),
            other => {
                return Err(CdrError::invalid_tc(format!(
                    "{} is not a basic kind",
                    other
                )))
            }
        })
    }
}
