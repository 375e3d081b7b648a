// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode decoding with per-call indirection.

use super::InputStream;
use crate::align::Alignment;
use crate::config::INDIRECTION_TAG;
use crate::error::{CdrError, Result};
use crate::indirection::indirection_target;
use crate::typecode::{StructMember, TCKind, TypeCode, UnionMember, ValueMember};
use std::collections::HashMap;

/// TypeCodes seen by one top-level [`InputStream::read_typecode`] call,
/// keyed by the position of their kind tag.
#[derive(Default)]
struct TypeCodeScope {
    complete: HashMap<usize, TypeCode>,
    /// Named TypeCodes whose body is still being read.
    pending: HashMap<usize, String>,
}

impl InputStream<'_> {
    /// Decode a TypeCode.
    ///
    /// An indirection to a TypeCode whose body is still being read yields
    /// a recursive placeholder, bound when that TypeCode completes.
    pub fn read_typecode(&mut self) -> Result<TypeCode> {
        let mut scope = TypeCodeScope::default();
        self.read_typecode_in(&mut scope)
    }

    fn read_typecode_in(&mut self, scope: &mut TypeCodeScope) -> Result<TypeCode> {
        self.descend()?;
        let tc = self.read_typecode_level(scope);
        self.ascend();
        tc
    }

    fn read_typecode_level(&mut self, scope: &mut TypeCodeScope) -> Result<TypeCode> {
        self.check(Alignment::Four)?;
        let start = self.position();
        let tag = self.read_ulong()?;

        if tag == INDIRECTION_TAG {
            let field = self.position();
            let offset = self.read_long()?;
            let target = indirection_target(field, offset)
                .ok_or_else(|| CdrError::malformed(field, "typecode indirection is not backward"))?;
            if let Some(tc) = scope.complete.get(&target) {
                return Ok(tc.clone());
            }
            return match scope.pending.get(&target) {
                Some(id) if !id.is_empty() => Ok(TypeCode::recursive(id.clone())),
                Some(_) => Err(CdrError::malformed(
                    field,
                    "recursive reference to an anonymous typecode",
                )),
                None => Err(CdrError::malformed(
                    field,
                    format!("typecode indirection to unknown offset {}", target),
                )),
            };
        }

        let kind = TCKind::from_value(tag)
            .ok_or_else(|| CdrError::malformed(start, format!("unknown typecode kind {}", tag)))?;
        if kind.is_basic() {
            return TypeCode::basic(kind);
        }

        let tc = match kind {
            TCKind::String => TypeCode::string(self.read_ulong()?),
            TCKind::WString => TypeCode::wstring(self.read_ulong()?),
            TCKind::Fixed => {
                let digits = self.read_ushort()?;
                let scale = self.read_short()?;
                TypeCode::fixed(digits, scale)
            }
            _ => {
                let mut enc = self.open_encapsulation()?;
                let tc = enc.read_complex_typecode(kind, start, scope)?;
                enc.finish()?;
                tc
            }
        };
        scope.pending.remove(&start);
        scope.complete.insert(start, tc.clone());
        Ok(tc)
    }

    /// Body of a complex-parameter TypeCode, inside its encapsulation.
    fn read_complex_typecode(
        &mut self,
        kind: TCKind,
        start: usize,
        scope: &mut TypeCodeScope,
    ) -> Result<TypeCode> {
        match kind {
            TCKind::Objref
            | TCKind::AbstractInterface
            | TCKind::Native
            | TCKind::LocalInterface => {
                let id = self.read_string()?;
                let name = self.read_string()?;
                Ok(match kind {
                    TCKind::Objref => TypeCode::objref(id, name),
                    TCKind::AbstractInterface => TypeCode::abstract_interface(id, name),
                    TCKind::Native => TypeCode::native(id, name),
                    _ => TypeCode::local_interface(id, name),
                })
            }
            TCKind::Struct | TCKind::Except => {
                let id = self.read_string()?;
                scope.pending.insert(start, id.clone());
                let name = self.read_string()?;
                let count = self.read_count()?;
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    let member_name = self.read_string()?;
                    let member_type = self.read_typecode_in(scope)?;
                    members.push(StructMember::new(member_name, member_type));
                }
                Ok(if kind == TCKind::Struct {
                    TypeCode::struct_tc(id, name, members)
                } else {
                    TypeCode::exception_tc(id, name, members)
                })
            }
            TCKind::Union => {
                let id = self.read_string()?;
                scope.pending.insert(start, id.clone());
                let name = self.read_string()?;
                let at = self.position();
                let discriminator = self.read_typecode_in(scope)?;
                let disc_kind = discriminator.origin()?.kind();
                if !disc_kind.is_discriminator() {
                    return Err(CdrError::malformed(
                        at,
                        format!("{} is not a legal union discriminator", disc_kind),
                    ));
                }
                let default_index = self.read_long()?;
                let count = self.read_count()?;
                let mut members = Vec::with_capacity(count);
                for i in 0..count {
                    let label = self.read_label(disc_kind)?;
                    let member_name = self.read_string()?;
                    let member_type = self.read_typecode_in(scope)?;
                    members.push(if i as i64 == i64::from(default_index) {
                        UnionMember::default_case(member_name, member_type)
                    } else {
                        UnionMember::new(label, member_name, member_type)
                    });
                }
                TypeCode::union_tc(id, name, discriminator, members)
            }
            TCKind::Enum => {
                let id = self.read_string()?;
                let name = self.read_string()?;
                let count = self.read_count()?;
                let members = (0..count)
                    .map(|_| self.read_string())
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeCode::enum_tc(id, name, members))
            }
            TCKind::Sequence => {
                let element = self.read_typecode_in(scope)?;
                let bound = self.read_ulong()?;
                Ok(TypeCode::sequence(element, bound))
            }
            TCKind::Array => {
                let element = self.read_typecode_in(scope)?;
                let length = self.read_ulong()?;
                Ok(TypeCode::array(element, length))
            }
            TCKind::Alias => {
                let id = self.read_string()?;
                let name = self.read_string()?;
                let original = self.read_typecode_in(scope)?;
                Ok(TypeCode::alias(id, name, original))
            }
            TCKind::ValueBox => {
                let id = self.read_string()?;
                let name = self.read_string()?;
                let boxed = self.read_typecode_in(scope)?;
                Ok(TypeCode::value_box(id, name, boxed))
            }
            TCKind::Value => {
                let id = self.read_string()?;
                scope.pending.insert(start, id.clone());
                let name = self.read_string()?;
                let modifier = self.read_short()?;
                let base = self.read_typecode_in(scope)?;
                let concrete_base = (base.kind() != TCKind::Null).then_some(base);
                let count = self.read_count()?;
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    let member_name = self.read_string()?;
                    let member_type = self.read_typecode_in(scope)?;
                    let access = self.read_short()?;
                    members.push(ValueMember {
                        name: member_name,
                        member_type,
                        access,
                    });
                }
                Ok(TypeCode::value_tc(id, name, modifier, concrete_base, members))
            }
            other => Err(CdrError::invalid_tc(format!(
                "{} has no encapsulated parameters",
                other
            ))),
        }
    }

    /// Union label (or discriminator) at the width of `kind`, widened to
    /// `i64`.
    pub fn read_label(&mut self, kind: TCKind) -> Result<i64> {
        Ok(match kind {
            TCKind::Short => i64::from(self.read_short()?),
            TCKind::UShort => i64::from(self.read_ushort()?),
            TCKind::Long => i64::from(self.read_long()?),
            TCKind::ULong | TCKind::Enum => i64::from(self.read_ulong()?),
            TCKind::LongLong => self.read_longlong()?,
            TCKind::ULongLong => self.read_ulonglong()? as i64,
            TCKind::Boolean => i64::from(self.read_boolean()?),
            TCKind::Char => i64::from(u32::from(self.read_char()?)),
            TCKind::WChar => i64::from(u32::from(self.read_wchar()?)),
            other => {
                return Err(CdrError::invalid_tc(format!(
                    "{} is not a discriminator kind",
                    other
                )))
            }
        })
    }
}
