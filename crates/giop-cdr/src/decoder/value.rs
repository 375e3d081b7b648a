// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value type decoding: headers, chunks, truncation and sharing.

use super::InputStream;
use crate::align::Alignment;
use crate::config::{
    INDIRECTION_TAG, MAX_VALUE_TAG, MIN_VALUE_TAG, NULL_VALUE_TAG, VALUE_TAG_CHUNKED,
    VALUE_TAG_CODEBASE, VALUE_TAG_ID_LIST, VALUE_TAG_ID_MASK, VALUE_TAG_NO_TYPE_INFO,
    VALUE_TAG_SINGLE_ID,
};
use crate::error::{CdrError, Result};
use crate::indirection::indirection_target;
use crate::typecode::{TCKind, TypeCode};
use crate::value::{AbstractInterface, Value, ValueRef};
use std::sync::Arc;

impl InputStream<'_> {
    /// Decode a value type instance, a null value, or an indirection to an
    /// instance read earlier from this stream.
    ///
    /// The instance takes the most derived type this stream knows among
    /// the announced repository ids: registered types first, then
    /// `expected`. A chunked value of a type known only through one of its
    /// truncatable bases is truncated to that base.
    pub fn read_value(&mut self, expected: &TypeCode) -> Result<Option<ValueRef>> {
        self.check(Alignment::Four)?;
        let tag_pos = self.position();
        let tag = self.buf.read_u32()?;
        match tag {
            NULL_VALUE_TAG => Ok(None),
            INDIRECTION_TAG => {
                let field = self.buf.position();
                let offset = self.buf.read_u32()? as i32;
                let target = indirection_target(field, offset)
                    .ok_or_else(|| CdrError::malformed(field, "value indirection is not backward"))?;
                self.values.get(&target).cloned().map(Some).ok_or_else(|| {
                    CdrError::malformed(
                        field,
                        format!("value indirection to unknown offset {}", target),
                    )
                })
            }
            MIN_VALUE_TAG..=MAX_VALUE_TAG => {
                self.descend()?;
                let value = self.read_value_body(tag, tag_pos, expected);
                self.ascend();
                value.map(Some)
            }
            _ => Err(CdrError::malformed(
                tag_pos,
                format!("invalid value tag {:#010x}", tag),
            )),
        }
    }

    /// Decode a value box instance (or null).
    pub fn read_value_box(&mut self, expected: &TypeCode) -> Result<Option<ValueRef>> {
        let kind = expected.origin()?.kind();
        if kind != TCKind::ValueBox {
            return Err(CdrError::bad_param(format!("{} is not a value box", kind)));
        }
        self.read_value(expected)
    }

    /// Abstract interface: a boolean discriminator, then an object
    /// reference or a value of type `expected` (`ValueBase` when `None`).
    pub fn read_abstract_interface(
        &mut self,
        expected: Option<&TypeCode>,
    ) -> Result<AbstractInterface> {
        if self.read_boolean()? {
            return self.read_object().map(AbstractInterface::Object);
        }
        let value = match expected {
            Some(tc) => self.read_value(tc)?,
            None => self.read_value(&TypeCode::value_base())?,
        };
        Ok(AbstractInterface::Value(value))
    }

    fn read_value_body(
        &mut self,
        tag: u32,
        tag_pos: usize,
        expected: &TypeCode,
    ) -> Result<ValueRef> {
        let chunked = tag & VALUE_TAG_CHUNKED != 0;
        if self.in_chunked_value() && !chunked {
            return Err(CdrError::malformed(
                tag_pos,
                "unchunked value nested in a chunked value",
            ));
        }

        self.in_header = true;
        let ids = self.read_value_header(tag, tag_pos);
        self.in_header = false;
        let ids = ids?;

        let (tc, truncated) = self.resolve_value_type(&ids, expected, tag_pos)?;
        if truncated && !chunked {
            return Err(CdrError::malformed(
                tag_pos,
                format!("{} cannot be truncated: its state is not chunked", ids[0]),
            ));
        }
        if truncated {
            log::debug!(
                "[InputStream] truncating {} to {}",
                ids[0],
                tc.id().unwrap_or("?")
            );
        }

        // Registered before its state, so the state can refer back to it.
        let value = ValueRef::new(tc.clone(), Vec::new());
        self.values.insert(tag_pos, value.clone());

        self.chunked.push(chunked);
        self.chunk_end = None;
        let state = self.read_value_state(&tc, chunked);
        self.chunked.pop();
        self.chunk_end = None;
        value.set_state(state?);
        Ok(value)
    }

    fn read_value_state(&mut self, tc: &TypeCode, chunked: bool) -> Result<Vec<Value>> {
        let reader = Arc::clone(&self.value_reader);
        let state = reader.read_state(tc, self)?;
        if chunked {
            self.finish_chunked_value()?;
        }
        Ok(state)
    }

    /// Codebase URL if flagged, then the announced repository ids.
    fn read_value_header(&mut self, tag: u32, tag_pos: usize) -> Result<Vec<String>> {
        if tag & VALUE_TAG_CODEBASE != 0 {
            let codebase = self.read_repository_id()?;
            log::trace!("[InputStream] value codebase {}", codebase);
        }
        match tag & VALUE_TAG_ID_MASK {
            VALUE_TAG_NO_TYPE_INFO => Ok(Vec::new()),
            VALUE_TAG_SINGLE_ID => Ok(vec![self.read_repository_id()?]),
            VALUE_TAG_ID_LIST => {
                let at = self.position();
                let count = self.read_long()?;
                if count < 1 {
                    return Err(CdrError::malformed(
                        at,
                        format!("repository id list of length {}", count),
                    ));
                }
                (0..count).map(|_| self.read_repository_id()).collect()
            }
            _ => Err(CdrError::malformed(
                tag_pos,
                format!("invalid repository id bits in value tag {:#010x}", tag),
            )),
        }
    }

    /// Repository id string, or an indirection to one read earlier.
    fn read_repository_id(&mut self) -> Result<String> {
        self.check(Alignment::Four)?;
        let at = self.position();
        let len = self.buf.read_u32()?;
        if len == INDIRECTION_TAG {
            let field = self.buf.position();
            let offset = self.buf.read_u32()? as i32;
            let target = indirection_target(field, offset)
                .ok_or_else(|| CdrError::malformed(field, "repository id indirection is not backward"))?;
            return self.repository_ids.get(&target).cloned().ok_or_else(|| {
                CdrError::malformed(
                    field,
                    format!("repository id indirection to unknown offset {}", target),
                )
            });
        }
        self.buf.set_position(at)?;
        let id = self.read_string()?;
        self.repository_ids.insert(at, id.clone());
        Ok(id)
    }

    /// Pick the most derived known type among the announced ids.
    fn resolve_value_type(
        &self,
        ids: &[String],
        expected: &TypeCode,
        at: usize,
    ) -> Result<(TypeCode, bool)> {
        let expected = expected.origin()?;
        if ids.is_empty() {
            return Ok((expected, false));
        }
        let expected_id = expected.id().ok();
        for (i, id) in ids.iter().enumerate() {
            if let Some(tc) = self.registry.get(id) {
                return Ok((tc.clone(), i > 0));
            }
            if expected_id == Some(id.as_str()) {
                return Ok((expected.clone(), i > 0));
            }
        }
        Err(CdrError::malformed(at, format!("no type known for value {}", ids[0])))
    }

    /// Skip whatever state the reader left unread, then consume the end
    /// tag of the innermost value.
    ///
    /// Unread chunks and nested values belong to truncated state and are
    /// skipped. An end tag closing an enclosing value as well is left in
    /// place for it.
    fn finish_chunked_value(&mut self) -> Result<()> {
        let level = self.chunked.len() as i32;
        loop {
            if let Some(end) = self.chunk_end.take() {
                if self.buf.position() < end {
                    log::debug!(
                        "[InputStream] skipping {} unread state bytes",
                        end - self.buf.position()
                    );
                }
                self.buf.set_position(end)?;
            }
            self.in_header = true;
            let step = self.next_framing_tag();
            self.in_header = false;
            let (at, tag) = step?;

            if tag < 0 {
                let closed = -tag;
                if closed > level {
                    return Err(CdrError::malformed(
                        at,
                        format!("end tag {} inside value at level {}", tag, level),
                    ));
                }
                if closed < level {
                    // Merged end tag: the enclosing value consumes it.
                    log::debug!("[InputStream] end tag {} also closes level {}", tag, level);
                    self.buf.set_position(at)?;
                }
                return Ok(());
            }

            let tag = tag as u32;
            if (MIN_VALUE_TAG..=MAX_VALUE_TAG).contains(&tag) {
                self.skip_nested_value(tag, at)?;
            } else if tag == 0 {
                return Err(CdrError::malformed(at, "empty chunk in value state"));
            } else {
                self.chunk_end = Some(self.buf.position() + tag as usize);
            }
        }
    }

    fn next_framing_tag(&mut self) -> Result<(usize, i32)> {
        self.check(Alignment::Four)?;
        let at = self.buf.position();
        Ok((at, self.buf.read_u32()? as i32))
    }

    /// Skip a value nested in truncated state.
    fn skip_nested_value(&mut self, tag: u32, tag_pos: usize) -> Result<()> {
        if tag & VALUE_TAG_CHUNKED == 0 {
            return Err(CdrError::malformed(
                tag_pos,
                "unchunked value nested in a chunked value",
            ));
        }
        self.in_header = true;
        let header = self.read_value_header(tag, tag_pos);
        self.in_header = false;
        header?;
        self.descend()?;
        self.chunked.push(true);
        let skipped = self.finish_chunked_value();
        self.chunked.pop();
        self.ascend();
        skipped
    }
}
