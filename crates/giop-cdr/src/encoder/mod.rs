// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR encoder.
//!
//! [`OutputStream`] owns the output buffer and every piece of per-message
//! state: the alignment base, the value indirection tables, the chunking
//! stack and the optional deadline. All writes go through
//! [`OutputStream::check`], which in order:
//!
//! 1. polls the deadline when the write extends the buffer;
//! 2. consumes a pending GIOP 1.2 header-complete mark (8-byte alignment);
//! 3. opens a chunk when inside a chunked value and none is open;
//! 4. pads to the write's natural alignment.
//!
//! ```
//! use giop_cdr::OutputStream;
//!
//! let mut out = OutputStream::default();
//! out.write_octet(1).unwrap();
//! out.write_long(-2).unwrap();
//! assert_eq!(out.as_bytes(), &[1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFE]);
//! ```

mod any;
mod length;
mod remarshal;
mod typecode;
mod value;

pub use length::PendingLength;

use crate::align::Alignment;
use crate::buffer::{Endian, WriteBuffer};
use crate::codeset::CodeSet;
use crate::config::{CodecConfig, INDIRECTION_TAG};
use crate::deadline::Deadline;
use crate::decoder::InputStream;
use crate::error::{CdrError, Result};
use crate::fixed::Fixed;
use crate::indirection::{indirection_offset, IndirectionTable};
use crate::value::{Ior, ValueRef, LONG_DOUBLE_SIZE};
use crate::valuetype::{TypeCodeDriven, ValueWriter};
use crate::version::GiopVersion;
use std::collections::HashMap;
use std::sync::Arc;

/// Generate an aligned write for a fixed-width unsigned primitive.
macro_rules! write_aligned {
    ($name:ident, $type:ty, $align:ident, $raw:ident) => {
        pub fn $name(&mut self, value: $type) -> Result<()> {
            self.check(std::mem::size_of::<$type>(), Alignment::$align)?;
            self.buf.$raw(value);
            Ok(())
        }
    };
}

/// Generate a bulk array write: one alignment check, then raw elements.
macro_rules! write_array {
    ($name:ident, $type:ty, $align:ident, $raw:ident, $conv:expr) => {
        pub fn $name(&mut self, values: &[$type]) -> Result<()> {
            if values.is_empty() {
                return Ok(());
            }
            self.check(values.len() * std::mem::size_of::<$type>(), Alignment::$align)?;
            for v in values {
                self.buf.$raw(($conv)(*v));
            }
            Ok(())
        }
    };
}

/// Encoder for one outbound message.
///
/// Not shareable across threads while encoding: every operation takes
/// `&mut self`.
pub struct OutputStream {
    buf: WriteBuffer,
    config: CodecConfig,
    /// Alignment base: message start or innermost encapsulation start.
    base: usize,
    header_complete: bool,
    deadline: Option<Box<dyn Deadline>>,
    values: IndirectionTable<ValueRef>,
    repository_ids: HashMap<String, usize>,
    /// One entry per open value, innermost last: true when chunked.
    chunking: Vec<bool>,
    /// Position of the size slot of the open chunk.
    chunk_slot: Option<usize>,
    /// Writing a value header or end tag: never opens a chunk.
    in_header: bool,
    value_writer: Arc<dyn ValueWriter>,
}

impl OutputStream {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            buf: WriteBuffer::new(config.initial_capacity, config.endian),
            config,
            base: 0,
            header_complete: false,
            deadline: None,
            values: IndirectionTable::new(),
            repository_ids: HashMap::new(),
            chunking: Vec::new(),
            chunk_slot: None,
            in_header: false,
            value_writer: Arc::new(TypeCodeDriven),
        }
    }

    /// Big-endian stream for `version` with the default code sets.
    pub fn with_version(version: GiopVersion) -> Self {
        Self::new(CodecConfig::new(version))
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn version(&self) -> GiopVersion {
        self.config.version
    }

    pub fn endian(&self) -> Endian {
        self.buf.endian()
    }

    /// Absolute position of the cursor.
    pub fn position(&self) -> usize {
        self.buf.position()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_vec()
    }

    /// Decoder over the bytes written so far, with this stream's settings.
    pub fn input(&self) -> InputStream<'_> {
        InputStream::new(self.buf.as_slice(), self.config.clone())
    }

    /// Arm a deadline. It fires at most once.
    pub fn set_deadline(&mut self, deadline: impl Deadline + 'static) {
        self.deadline = Some(Box::new(deadline));
    }

    pub fn clear_deadline(&mut self) {
        self.deadline = None;
    }

    /// Replace the collaborator that writes value type state.
    pub fn set_value_writer(&mut self, writer: Arc<dyn ValueWriter>) {
        self.value_writer = writer;
    }

    /// A GIOP 1.2 message header was just written: the next write starts
    /// on an 8-byte boundary whatever its own alignment. No effect for
    /// earlier versions.
    pub fn mark_header_complete(&mut self) {
        if self.config.version.aligns_body() {
            self.header_complete = true;
        }
    }

    /// Prepare for a write of `n` bytes with alignment `align`.
    pub(crate) fn check(&mut self, n: usize, align: Alignment) -> Result<()> {
        if n > 0 && self.buf.extends(n) {
            self.poll_deadline()?;
        }
        if self.header_complete {
            self.header_complete = false;
            self.pad_to(Alignment::Eight);
        }
        if !self.in_header && self.chunk_slot.is_none() && self.chunking_active() {
            self.open_chunk();
        }
        self.pad_to(align);
        self.buf.ensure_available(n);
        Ok(())
    }

    fn poll_deadline(&mut self) -> Result<()> {
        if self.deadline.as_ref().is_some_and(|d| d.is_expired()) {
            self.deadline = None;
            log::warn!(
                "[OutputStream] deadline expired at offset {}",
                self.buf.position()
            );
            return Err(CdrError::Timeout);
        }
        Ok(())
    }

    fn pad_to(&mut self, align: Alignment) {
        let gap = align.gap(self.buf.position() - self.base);
        if gap > 0 {
            self.buf.pad(gap);
        }
    }

    pub(crate) fn chunking_active(&self) -> bool {
        self.chunking.last().copied().unwrap_or(false)
    }

    fn open_chunk(&mut self) {
        self.pad_to(Alignment::Four);
        self.chunk_slot = Some(self.buf.position());
        self.buf.pad(4);
    }

    /// Patch the size of the open chunk, if any.
    pub(crate) fn close_chunk(&mut self) {
        if let Some(slot) = self.chunk_slot.take() {
            let size = self.buf.position() - slot - 4;
            self.buf.patch_u32(slot, size as u32);
        }
    }

    // ===================================================================
    // Primitives
    // ===================================================================

    pub fn write_octet(&mut self, value: u8) -> Result<()> {
        self.check(1, Alignment::None)?;
        self.buf.write_u8(value);
        Ok(())
    }

    pub fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.write_octet(u8::from(value))
    }

    write_aligned!(write_ushort, u16, Two, write_u16);
    write_aligned!(write_ulong, u32, Four, write_u32);
    write_aligned!(write_ulonglong, u64, Eight, write_u64);

    pub fn write_short(&mut self, value: i16) -> Result<()> {
        self.write_ushort(value as u16)
    }

    pub fn write_long(&mut self, value: i32) -> Result<()> {
        self.write_ulong(value as u32)
    }

    pub fn write_longlong(&mut self, value: i64) -> Result<()> {
        self.write_ulonglong(value as u64)
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_ulong(value.to_bits())
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_ulonglong(value.to_bits())
    }

    /// `long double`: 16 raw octets, 8-aligned, copied as given.
    pub fn write_longdouble(&mut self, value: &[u8; LONG_DOUBLE_SIZE]) -> Result<()> {
        self.check(LONG_DOUBLE_SIZE, Alignment::Eight)?;
        self.buf.write_bytes(value);
        Ok(())
    }

    /// `enum` ordinal.
    pub fn write_enum(&mut self, ordinal: u32) -> Result<()> {
        self.write_ulong(ordinal)
    }

    /// Narrow character: exactly one octet after conversion.
    pub fn write_char(&mut self, c: char) -> Result<()> {
        let narrow = Arc::clone(&self.config.narrow);
        let c = narrow.convert(c);
        if narrow.count_bytes(c) != 1 {
            return Err(CdrError::UnsupportedEncoding {
                code: c as u32,
                codeset: narrow.name(),
            });
        }
        self.check(1, Alignment::None)?;
        let endian = self.buf.endian();
        narrow.write_char(c, endian, &mut self.buf)
    }

    /// Wide character.
    ///
    /// GIOP 1.2: an octet length, then the big-endian code unit(s).
    /// GIOP 1.0/1.1: one 2-byte unit, 2-aligned, in stream byte order.
    pub fn write_wchar(&mut self, c: char) -> Result<()> {
        let wide = Arc::clone(&self.config.wide);
        let c = wide.convert(c);
        let n = wide.count_bytes(c);
        if self.config.version.has_encapsulated_wstring() {
            self.check(1 + n, Alignment::None)?;
            self.buf.write_u8(n as u8);
            wide.write_char(c, Endian::Big, &mut self.buf)
        } else {
            single_wide_unit(wide.as_ref(), c)?;
            self.check(2, Alignment::Two)?;
            let endian = self.buf.endian();
            wide.write_char(c, endian, &mut self.buf)
        }
    }

    // ===================================================================
    // Arrays
    // ===================================================================

    pub fn write_octet_array(&mut self, values: &[u8]) -> Result<()> {
        self.check(values.len(), Alignment::None)?;
        self.buf.write_bytes(values);
        Ok(())
    }

    pub fn write_boolean_array(&mut self, values: &[bool]) -> Result<()> {
        self.check(values.len(), Alignment::None)?;
        for v in values {
            self.buf.write_u8(u8::from(*v));
        }
        Ok(())
    }

    write_array!(write_short_array, i16, Two, write_u16, |v: i16| v as u16);
    write_array!(write_ushort_array, u16, Two, write_u16, |v: u16| v);
    write_array!(write_long_array, i32, Four, write_u32, |v: i32| v as u32);
    write_array!(write_ulong_array, u32, Four, write_u32, |v: u32| v);
    write_array!(write_longlong_array, i64, Eight, write_u64, |v: i64| v as u64);
    write_array!(write_ulonglong_array, u64, Eight, write_u64, |v: u64| v);
    write_array!(write_float_array, f32, Four, write_u32, f32::to_bits);
    write_array!(write_double_array, f64, Eight, write_u64, f64::to_bits);

    pub fn write_char_array(&mut self, values: &[char]) -> Result<()> {
        for c in values {
            self.write_char(*c)?;
        }
        Ok(())
    }

    pub fn write_wchar_array(&mut self, values: &[char]) -> Result<()> {
        for c in values {
            self.write_wchar(*c)?;
        }
        Ok(())
    }

    // ===================================================================
    // Strings and sequences
    // ===================================================================

    /// Narrow string: ulong byte count including the NUL, converted bytes,
    /// NUL.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let narrow = Arc::clone(&self.config.narrow);
        let size: usize = if narrow.requires_writer() {
            s.chars().map(|c| narrow.count_bytes(narrow.convert(c))).sum()
        } else {
            s.chars().count()
        };
        self.write_ulong(wire_len(size + 1)?)?;
        self.check(size + 1, Alignment::None)?;
        let endian = self.buf.endian();
        for c in s.chars() {
            narrow.write_char(narrow.convert(c), endian, &mut self.buf)?;
        }
        self.buf.write_u8(0);
        Ok(())
    }

    /// Wide string.
    ///
    /// GIOP 1.2: ulong octet count, then NUL-free big-endian UTF-16.
    /// GIOP 1.0/1.1: ulong character count including a terminating NUL,
    /// each character written as a scalar `wchar`. Characters that need
    /// more than one 2-byte unit fail with
    /// [`CdrError::UnsupportedEncoding`] before anything is written.
    pub fn write_wstring(&mut self, s: &str) -> Result<()> {
        let wide = Arc::clone(&self.config.wide);
        if self.config.version.has_encapsulated_wstring() {
            let mut record = self.begin_length()?;
            for c in s.chars() {
                let c = wide.convert(c);
                record.check(wide.count_bytes(c), Alignment::None)?;
                wide.write_char(c, Endian::Big, &mut record.buf)?;
            }
            return Ok(());
        }

        let mut units = 0usize;
        for c in s.chars() {
            single_wide_unit(wide.as_ref(), wide.convert(c))?;
            units += 1;
        }
        self.write_ulong(wire_len(units + 1)?)?;
        for c in s.chars() {
            self.write_wchar(c)?;
        }
        self.write_ushort(0)
    }

    pub fn write_octet_sequence(&mut self, values: &[u8]) -> Result<()> {
        self.write_ulong(wire_len(values.len())?)?;
        self.write_octet_array(values)
    }

    /// `Principal`: an octet sequence.
    pub fn write_principal(&mut self, principal: &[u8]) -> Result<()> {
        self.write_octet_sequence(principal)
    }

    /// Fixed-point decimal at its own digit count.
    pub fn write_fixed(&mut self, value: &Fixed) -> Result<()> {
        let bytes = value.to_bcd(0);
        self.write_octet_array(&bytes)
    }

    /// Object reference as an IOR. `None` writes the nil reference (empty
    /// type id, no profiles).
    pub fn write_object(&mut self, ior: Option<&Ior>) -> Result<()> {
        let Some(ior) = ior else {
            self.write_string("")?;
            return self.write_ulong(0);
        };
        self.write_string(&ior.type_id)?;
        self.write_ulong(wire_len(ior.profiles.len())?)?;
        for profile in &ior.profiles {
            self.write_ulong(profile.tag)?;
            self.write_octet_sequence(&profile.data)?;
        }
        Ok(())
    }

    /// `-1` followed by the offset from the offset field back to `target`.
    pub(crate) fn write_indirection(&mut self, target: usize) -> Result<()> {
        self.write_ulong(INDIRECTION_TAG)?;
        self.check(4, Alignment::Four)?;
        let field = self.buf.position();
        self.buf.write_u32(indirection_offset(field, target) as u32);
        log::trace!(
            "[OutputStream] indirection at {} -> {}",
            field,
            target
        );
        Ok(())
    }
}

impl Default for OutputStream {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStream")
            .field("version", &self.config.version)
            .field("endian", &self.buf.endian())
            .field("position", &self.buf.position())
            .field("base", &self.base)
            .field("value_depth", &self.chunking.len())
            .finish()
    }
}

/// GIOP 1.0/1.1 wide characters occupy exactly one 2-byte unit.
fn single_wide_unit(wide: &dyn CodeSet, c: char) -> Result<()> {
    if wide.count_bytes(c) != 2 {
        return Err(CdrError::UnsupportedEncoding {
            code: c as u32,
            codeset: wide.name(),
        });
    }
    Ok(())
}

/// Length as a CDR ulong.
pub(crate) fn wire_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| CdrError::bad_param(format!("length {} exceeds ulong", len)))
}

#[cfg(test)]
mod tests;
