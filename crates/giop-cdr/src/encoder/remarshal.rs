// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Copy encoded values from an [`InputStream`] without building host
//! values, guided only by the TypeCode.

use super::OutputStream;
use crate::config::INDIRECTION_TAG;
use crate::decoder::InputStream;
use crate::error::{CdrError, Result};
use crate::typecode::{TCKind, TypeCode, TypeCodeBody};

impl OutputStream {
    /// Copy one value of type `tc` from `input`.
    ///
    /// Scalars are read and rewritten one by one; runs of scalar sequence
    /// or array elements are copied as raw bytes when both streams share a
    /// byte order. Value types are decoded and re-encoded so that their
    /// indirections are rebuilt for this stream.
    pub fn remarshal(&mut self, tc: &TypeCode, input: &mut InputStream<'_>) -> Result<()> {
        input.descend()?;
        let start = input.position();
        let copied = self.remarshal_level(tc, input);
        input.ascend();
        copied?;
        input.note_typed_read(start)
    }

    fn remarshal_level(&mut self, tc: &TypeCode, input: &mut InputStream<'_>) -> Result<()> {
        let origin = tc.origin()?;
        match origin.body() {
            TypeCodeBody::Basic(kind) => match kind {
                TCKind::Null | TCKind::Void => Ok(()),
                TCKind::Any => self.remarshal_any(input),
                TCKind::TypeCode => self.copy_typecode(input),
                TCKind::Principal => {
                    let principal = input.read_octet_sequence()?;
                    self.write_principal(&principal)
                }
                scalar => self.copy_scalar(*scalar, input),
            },
            TypeCodeBody::String { .. } => {
                let s = input.read_string()?;
                self.write_string(&s)
            }
            TypeCodeBody::WString { .. } => {
                let s = input.read_wstring()?;
                self.write_wstring(&s)
            }
            TypeCodeBody::Fixed { digits, scale } => {
                let value = input.read_fixed(*digits, *scale)?;
                self.write_fixed_typed(&value, *digits, *scale)
            }
            TypeCodeBody::Interface { kind, .. } => match kind {
                TCKind::Objref => {
                    let ior = input.read_object()?;
                    self.write_object(ior.as_ref())
                }
                TCKind::AbstractInterface => self.copy_abstract_interface(input),
                other => Err(CdrError::bad_param(format!("{} cannot be marshalled", other))),
            },
            TypeCodeBody::Struct(s) => {
                for m in &s.members {
                    self.remarshal(&m.member_type, input)?;
                }
                Ok(())
            }
            TypeCodeBody::Except(s) => {
                let id = input.read_string()?;
                self.write_string(&id)?;
                for m in &s.members {
                    self.remarshal(&m.member_type, input)?;
                }
                Ok(())
            }
            TypeCodeBody::Union(u) => {
                let disc_kind = u.discriminator.origin()?.kind();
                let discriminator = input.read_label(disc_kind)?;
                self.write_label(disc_kind, discriminator)?;
                match u.member_for(discriminator) {
                    Some((_, m)) => self.remarshal(&m.member_type, input),
                    None => Ok(()),
                }
            }
            TypeCodeBody::Enum { .. } => {
                let ordinal = input.read_ulong()?;
                self.write_ulong(ordinal)
            }
            TypeCodeBody::Sequence { element, bound } => {
                let at = input.position();
                let count = input.read_count()?;
                if *bound != 0 && count > *bound as usize {
                    return Err(CdrError::malformed(
                        at,
                        format!("sequence length {} exceeds bound {}", count, bound),
                    ));
                }
                self.write_ulong(count as u32)?;
                self.copy_elements(element, count, input)
            }
            TypeCodeBody::Array { element, length } => {
                input.check_element_count(*length as usize, input.position())?;
                self.copy_elements(element, *length as usize, input)
            }
            TypeCodeBody::ValueBox { .. } => {
                let value = input.read_value_box(&origin)?;
                self.write_value_box(value.as_ref())
            }
            TypeCodeBody::Value(_) => {
                let value = input.read_value(&origin)?;
                self.write_value(value.as_ref())
            }
            TypeCodeBody::Alias { .. } | TypeCodeBody::Recursive(_) => Err(CdrError::invalid_tc(
                format!("{} survived alias resolution", origin.kind()),
            )),
        }
    }

    /// Copy an `any`: its TypeCode, then its value.
    pub fn remarshal_any(&mut self, input: &mut InputStream<'_>) -> Result<()> {
        let tc = input.read_typecode()?;
        self.write_typecode(&tc)?;
        self.remarshal(&tc, input)
    }

    fn copy_elements(
        &mut self,
        element: &TypeCode,
        count: usize,
        input: &mut InputStream<'_>,
    ) -> Result<()> {
        let element = element.origin()?;
        let kind = element.kind();
        if count == 0 {
            return Ok(());
        }
        if let Some(size) = kind.scalar_size() {
            let converting = kind == TCKind::Char
                && (self.config.narrow.requires_conversion()
                    || input.config().narrow.requires_conversion());
            let bulk = !converting
                && input.endian() == self.endian()
                && !self.chunking_active()
                && !input.in_chunked_value();
            if bulk {
                // The first element aligns both streams; the rest is
                // contiguous.
                self.copy_scalar(kind, input)?;
                let rest = input.read_raw((count - 1) * size)?;
                return self.write_octet_array(rest);
            }
        }
        for _ in 0..count {
            self.remarshal(&element, input)?;
        }
        Ok(())
    }

    fn copy_scalar(&mut self, kind: TCKind, input: &mut InputStream<'_>) -> Result<()> {
        match kind {
            TCKind::Octet => self.write_octet(input.read_octet()?),
            TCKind::Boolean => self.write_boolean(input.read_boolean()?),
            TCKind::Char => self.write_char(input.read_char()?),
            TCKind::WChar => self.write_wchar(input.read_wchar()?),
            TCKind::Short | TCKind::UShort => self.write_ushort(input.read_ushort()?),
            TCKind::Long | TCKind::ULong | TCKind::Float | TCKind::Enum => {
                self.write_ulong(input.read_ulong()?)
            }
            TCKind::LongLong | TCKind::ULongLong | TCKind::Double => {
                self.write_ulonglong(input.read_ulonglong()?)
            }
            TCKind::LongDouble => self.write_longdouble(&input.read_longdouble()?),
            other => Err(CdrError::invalid_tc(format!(
                "{} is not a scalar kind",
                other
            ))),
        }
    }

    /// Copy a TypeCode on raw kind tags: parameters of complex kinds are
    /// copied as the encapsulated bytes they are.
    fn copy_typecode(&mut self, input: &mut InputStream<'_>) -> Result<()> {
        let at = input.position();
        let tag = input.read_ulong()?;
        if tag == INDIRECTION_TAG {
            return Err(CdrError::malformed(
                at,
                "indirection at the top level of a typecode",
            ));
        }
        let kind = TCKind::from_value(tag)
            .ok_or_else(|| CdrError::malformed(at, format!("unknown typecode kind {}", tag)))?;
        self.write_ulong(tag)?;
        if kind.is_basic() {
            return Ok(());
        }
        match kind {
            TCKind::String | TCKind::WString => self.write_ulong(input.read_ulong()?),
            TCKind::Fixed => {
                self.write_ushort(input.read_ushort()?)?;
                self.write_ushort(input.read_ushort()?)
            }
            _ => {
                let body = input.read_encapsulation_bytes()?;
                self.write_octet_sequence(body)
            }
        }
    }

    fn copy_abstract_interface(&mut self, input: &mut InputStream<'_>) -> Result<()> {
        let is_object = input.read_boolean()?;
        self.write_boolean(is_object)?;
        if is_object {
            let ior = input.read_object()?;
            self.write_object(ior.as_ref())
        } else {
            let value = input.read_value(&TypeCode::value_base())?;
            self.write_value(value.as_ref())
        }
    }
}
