// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode encoding with per-call indirection.

use super::{wire_len, OutputStream};
use crate::align::Alignment;
use crate::error::{CdrError, Result};
use crate::indirection::IndirectionTable;
use crate::typecode::{TCKind, TypeCode, TypeCodeBody, UnionLabel};

impl OutputStream {
    /// Encode a TypeCode.
    ///
    /// Basic kinds are the bare kind tag. Every other TypeCode instance is
    /// encoded in full the first time it appears within this call and as
    /// `-1` plus a back offset afterwards; recursive placeholders are
    /// replaced by their target, so a recursive type always ends in an
    /// indirection to its enclosing encoding.
    pub fn write_typecode(&mut self, tc: &TypeCode) -> Result<()> {
        let mut table = IndirectionTable::new();
        self.write_typecode_in(tc, &mut table)
    }

    fn write_typecode_in(
        &mut self,
        tc: &TypeCode,
        table: &mut IndirectionTable<TypeCode>,
    ) -> Result<()> {
        let tc = tc.resolve()?;
        let kind = tc.kind();
        if kind.is_basic() {
            return self.write_ulong(kind.value());
        }
        if let Some(target) = table.offset_of(&tc) {
            log::trace!("[OutputStream] typecode {} repeated, indirecting", tc);
            return self.write_indirection(target);
        }

        self.check(4, Alignment::Four)?;
        table.record(&tc, self.position());
        self.write_ulong(kind.value())?;

        match tc.body() {
            TypeCodeBody::String { bound } | TypeCodeBody::WString { bound } => {
                self.write_ulong(*bound)
            }
            TypeCodeBody::Fixed { digits, scale } => {
                self.write_ushort(*digits)?;
                self.write_short(*scale)
            }
            TypeCodeBody::Interface { id, name, .. } => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_string(id)?;
                enc.write_string(name)
            }
            TypeCodeBody::Struct(s) | TypeCodeBody::Except(s) => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_string(&s.id)?;
                enc.write_string(&s.name)?;
                enc.write_ulong(wire_len(s.members.len())?)?;
                for m in &s.members {
                    enc.write_string(&m.name)?;
                    enc.write_typecode_in(&m.member_type, table)?;
                }
                Ok(())
            }
            TypeCodeBody::Union(u) => {
                let disc_kind = u.discriminator.origin()?.kind();
                let mut enc = self.begin_encapsulation()?;
                enc.write_string(&u.id)?;
                enc.write_string(&u.name)?;
                enc.write_typecode_in(&u.discriminator, table)?;
                enc.write_long(u.default_index())?;
                enc.write_ulong(wire_len(u.members.len())?)?;
                for m in &u.members {
                    // The default member has no label of its own: a zero of
                    // the discriminator's width stands in for it.
                    let label = match m.label {
                        UnionLabel::Value(v) => v,
                        UnionLabel::Default => 0,
                    };
                    enc.write_label(disc_kind, label)?;
                    enc.write_string(&m.name)?;
                    enc.write_typecode_in(&m.member_type, table)?;
                }
                Ok(())
            }
            TypeCodeBody::Enum { id, name, members } => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_string(id)?;
                enc.write_string(name)?;
                enc.write_ulong(wire_len(members.len())?)?;
                for m in members {
                    enc.write_string(m)?;
                }
                Ok(())
            }
            TypeCodeBody::Sequence { element, bound } => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_typecode_in(element, table)?;
                enc.write_ulong(*bound)
            }
            TypeCodeBody::Array { element, length } => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_typecode_in(element, table)?;
                enc.write_ulong(*length)
            }
            TypeCodeBody::Alias { id, name, original } => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_string(id)?;
                enc.write_string(name)?;
                enc.write_typecode_in(original, table)
            }
            TypeCodeBody::ValueBox { id, name, boxed } => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_string(id)?;
                enc.write_string(name)?;
                enc.write_typecode_in(boxed, table)
            }
            TypeCodeBody::Value(v) => {
                let mut enc = self.begin_encapsulation()?;
                enc.write_string(&v.id)?;
                enc.write_string(&v.name)?;
                enc.write_short(v.modifier)?;
                match &v.concrete_base {
                    Some(base) => enc.write_typecode_in(base, table)?,
                    None => enc.write_typecode_in(&TypeCode::null(), table)?,
                }
                enc.write_ulong(wire_len(v.members.len())?)?;
                for m in &v.members {
                    enc.write_string(&m.name)?;
                    enc.write_typecode_in(&m.member_type, table)?;
                    enc.write_short(m.access)?;
                }
                Ok(())
            }
            TypeCodeBody::Basic(_) | TypeCodeBody::Recursive(_) => Err(CdrError::invalid_tc(
                format!("{} reached the complex typecode path", kind),
            )),
        }
    }

    /// Union label (or discriminator) at the width of `kind`.
    pub(crate) fn write_label(&mut self, kind: TCKind, label: i64) -> Result<()> {
        match kind {
            TCKind::Short => self.write_short(label as i16),
            TCKind::UShort => self.write_ushort(label as u16),
            TCKind::Long => self.write_long(label as i32),
            TCKind::ULong | TCKind::Enum => self.write_ulong(label as u32),
            TCKind::LongLong => self.write_longlong(label),
            TCKind::ULongLong => self.write_ulonglong(label as u64),
            TCKind::Boolean => self.write_boolean(label != 0),
            TCKind::Char | TCKind::WChar => {
                let c = u32::try_from(label)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        CdrError::bad_param(format!("{} is not a character label", label))
                    })?;
                if kind == TCKind::Char {
                    self.write_char(c)
                } else {
                    self.write_wchar(c)
                }
            }
            other => Err(CdrError::invalid_tc(format!(
                "{} is not a discriminator kind",
                other
            ))),
        }
    }
}
