// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value type framing: tags, repository ids, chunking and sharing.
//!
//! A value starts with a tag in `0x7fffff00..=0x7fffffff` whose low bits
//! announce the repository-id layout and chunking. Chunked state is split
//! into chunks, each prefixed by its byte size; a chunk is opened lazily by
//! the first state write and closed before a nested value header and before
//! the end tag. The end tag is the negated nesting level.

use super::{wire_len, OutputStream};
use crate::align::Alignment;
use crate::config::{
    MIN_VALUE_TAG, NULL_VALUE_TAG, VALUE_TAG_CHUNKED, VALUE_TAG_ID_LIST, VALUE_TAG_SINGLE_ID,
};
use crate::error::{CdrError, Result};
use crate::typecode::{TCKind, TypeCode, TypeCodeBody, VM_CUSTOM, VM_TRUNCATABLE};
use crate::value::{AbstractInterface, ValueRef};
use std::sync::Arc;

/// Repository ids announced for a value of type `tc`: the type's own id,
/// followed by its base ids for as long as the chain stays truncatable.
pub(crate) fn truncatable_ids(tc: &TypeCode) -> Result<Vec<String>> {
    let mut ids = vec![tc.id()?.to_string()];
    let mut current = tc.origin()?;
    while let TypeCodeBody::Value(v) = current.body() {
        if v.modifier != VM_TRUNCATABLE {
            break;
        }
        let Some(base) = v.concrete_base.as_ref().map(TypeCode::origin).transpose()? else {
            break;
        };
        if base.kind() != TCKind::Value {
            break;
        }
        ids.push(base.id()?.to_string());
        current = base;
    }
    Ok(ids)
}

impl OutputStream {
    /// Start a value: close the open chunk, write the tag and the
    /// repository ids, and enter the value's nesting level.
    ///
    /// No ids writes no type information, one id a single id, several a
    /// truncatable id list. A value nested inside a chunked value is always
    /// chunked. Returns the position of the tag.
    pub fn begin_value(&mut self, repository_ids: &[&str], chunked: bool) -> Result<usize> {
        self.close_chunk();
        let chunked = chunked || self.chunking_active();
        let mut tag = MIN_VALUE_TAG;
        if chunked {
            tag |= VALUE_TAG_CHUNKED;
        }
        tag |= match repository_ids.len() {
            0 => 0,
            1 => VALUE_TAG_SINGLE_ID,
            _ => VALUE_TAG_ID_LIST,
        };

        self.in_header = true;
        let header = self.write_value_header(tag, repository_ids);
        self.in_header = false;
        let tag_pos = header?;

        self.chunking.push(chunked);
        Ok(tag_pos)
    }

    fn write_value_header(&mut self, tag: u32, repository_ids: &[&str]) -> Result<usize> {
        self.check(4, Alignment::Four)?;
        let tag_pos = self.position();
        self.write_ulong(tag)?;
        if repository_ids.len() > 1 {
            self.write_long(wire_len(repository_ids.len())? as i32)?;
        }
        for id in repository_ids {
            self.write_repository_id(id)?;
        }
        Ok(tag_pos)
    }

    /// Repository id string, or an indirection to its first occurrence in
    /// this message.
    fn write_repository_id(&mut self, id: &str) -> Result<()> {
        if let Some(&target) = self.repository_ids.get(id) {
            return self.write_indirection(target);
        }
        self.check(4, Alignment::Four)?;
        self.repository_ids.insert(id.to_string(), self.position());
        self.write_string(id)
    }

    /// End the innermost value: close its chunk and write its end tag.
    pub fn end_value(&mut self) -> Result<()> {
        let Some(chunked) = self.chunking.last().copied() else {
            return Err(CdrError::bad_param("end_value without begin_value"));
        };
        if chunked {
            self.close_chunk();
            let level = self.chunking.len() as i32;
            self.in_header = true;
            let written = self.write_long(-level);
            self.in_header = false;
            written?;
        }
        self.chunking.pop();
        Ok(())
    }

    /// Encode a value type instance, a null value, or an indirection to an
    /// instance already written in this message.
    pub fn write_value(&mut self, value: Option<&ValueRef>) -> Result<()> {
        let Some(value) = value else {
            return self.write_ulong(NULL_VALUE_TAG);
        };
        if let Some(target) = self.values.offset_of(value) {
            log::trace!("[OutputStream] value {:?} shared, indirecting", value);
            return self.write_indirection(target);
        }

        let tc = value.type_code().origin()?;
        let (ids, chunked) = match tc.body() {
            TypeCodeBody::Value(v) => {
                let ids = if v.modifier == VM_TRUNCATABLE {
                    truncatable_ids(&tc)?
                } else {
                    vec![v.id.clone()]
                };
                let chunked = v.modifier == VM_TRUNCATABLE
                    || (v.modifier == VM_CUSTOM && self.config.chunk_custom_values);
                (ids, chunked)
            }
            TypeCodeBody::ValueBox { id, .. } => (vec![id.clone()], false),
            _ => {
                return Err(CdrError::bad_param(format!(
                    "{} is not a value type",
                    tc.kind()
                )))
            }
        };

        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let tag_pos = self.begin_value(&id_refs, chunked)?;
        self.values.record(value, tag_pos);
        let writer = Arc::clone(&self.value_writer);
        writer.write_state(value, self)?;
        self.end_value()
    }

    /// Encode a value box instance (or null).
    pub fn write_value_box(&mut self, value: Option<&ValueRef>) -> Result<()> {
        if let Some(v) = value {
            let kind = v.type_code().origin()?.kind();
            if kind != TCKind::ValueBox {
                return Err(CdrError::bad_param(format!("{} is not a value box", kind)));
            }
        }
        self.write_value(value)
    }

    /// Abstract interface: `true` then an object reference, or `false` then
    /// a value.
    pub fn write_abstract_interface(&mut self, value: &AbstractInterface) -> Result<()> {
        match value {
            AbstractInterface::Object(ior) => {
                self.write_boolean(true)?;
                self.write_object(ior.as_ref())
            }
            AbstractInterface::Value(v) => {
                self.write_boolean(false)?;
                self.write_value(v.as_ref())
            }
        }
    }
}
