// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR decoder.
//!
//! [`InputStream`] borrows the message bytes and tracks the alignment base,
//! the byte order of the innermost encapsulation, the value indirection
//! tables and the chunk boundaries of the values being read. Every read
//! goes through [`InputStream::check`], which consumes a pending GIOP 1.2
//! header-complete mark, enters the next chunk when a chunked value's
//! state continues, and skips alignment padding.
//!
//! ```
//! use giop_cdr::OutputStream;
//!
//! let mut out = OutputStream::default();
//! out.write_string("hi").unwrap();
//! out.write_double(0.5).unwrap();
//!
//! let mut input = out.input();
//! assert_eq!(input.read_string().unwrap(), "hi");
//! assert_eq!(input.read_double().unwrap(), 0.5);
//! ```

mod any;
mod encapsulation;
mod typecode;
mod value;

pub use encapsulation::Encapsulation;

use crate::align::Alignment;
use crate::buffer::{Endian, ReadBuffer};
use crate::config::{CodecConfig, MAX_ELEMENT_COUNT, MAX_NESTING_DEPTH, MIN_VALUE_TAG};
use crate::error::{CdrError, Result};
use crate::fixed::Fixed;
use crate::typecode::TypeCode;
use crate::value::{Ior, TaggedProfile, ValueRef, LONG_DOUBLE_SIZE};
use crate::valuetype::{TypeCodeDriven, ValueReader};
use crate::version::GiopVersion;
use std::collections::HashMap;
use std::sync::Arc;

/// Generate an aligned read for a fixed-width unsigned primitive.
macro_rules! read_aligned {
    ($name:ident, $type:ty, $align:ident, $raw:ident) => {
        pub fn $name(&mut self) -> Result<$type> {
            self.check(Alignment::$align)?;
            self.buf.$raw()
        }
    };
}

/// Generate a bulk array read: one alignment check, then raw elements.
macro_rules! read_array {
    ($name:ident, $type:ty, $align:ident, $raw:ident, $conv:expr) => {
        pub fn $name(&mut self, count: usize) -> Result<Vec<$type>> {
            if count == 0 {
                return Ok(Vec::new());
            }
            self.check(Alignment::$align)?;
            self.ensure_remaining(count * std::mem::size_of::<$type>())?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(($conv)(self.buf.$raw()?));
            }
            Ok(values)
        }
    };
}

/// Decoder over one inbound message.
pub struct InputStream<'a> {
    buf: ReadBuffer<'a>,
    config: CodecConfig,
    /// Alignment base: message start or innermost encapsulation start.
    base: usize,
    header_complete: bool,
    /// Value instances by the position of their tag.
    values: HashMap<usize, ValueRef>,
    /// Repository ids (and codebase URLs) by the position of their string.
    repository_ids: HashMap<usize, String>,
    /// Value TypeCodes known by repository id, for truncation.
    registry: HashMap<String, TypeCode>,
    /// One entry per value being read, innermost last: true when chunked.
    chunked: Vec<bool>,
    /// End of the chunk currently being read.
    chunk_end: Option<usize>,
    /// Reading a value header or end tag: never enters a chunk.
    in_header: bool,
    /// Nesting of TypeCodes, typed values and value instances being read.
    depth: usize,
    /// Typed reads so far that consumed no input.
    empty_reads: usize,
    value_reader: Arc<dyn ValueReader>,
}

impl<'a> InputStream<'a> {
    pub fn new(data: &'a [u8], config: CodecConfig) -> Self {
        Self {
            buf: ReadBuffer::new(data, config.endian),
            config,
            base: 0,
            header_complete: false,
            values: HashMap::new(),
            repository_ids: HashMap::new(),
            registry: HashMap::new(),
            chunked: Vec::new(),
            chunk_end: None,
            in_header: false,
            depth: 0,
            empty_reads: 0,
            value_reader: Arc::new(TypeCodeDriven),
        }
    }

    /// Big-endian stream for `version` with the default code sets.
    pub fn with_version(data: &'a [u8], version: GiopVersion) -> Self {
        Self::new(data, CodecConfig::new(version))
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn version(&self) -> GiopVersion {
        self.config.version
    }

    /// Byte order currently in effect (that of the innermost encapsulation).
    pub fn endian(&self) -> Endian {
        self.buf.endian()
    }

    /// Switch the byte order of the outer stream, e.g. after reading the
    /// flags of a GIOP header.
    pub fn set_endian(&mut self, endian: Endian) {
        self.buf.set_endian(endian);
    }

    pub fn position(&self) -> usize {
        self.buf.position()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Replace the collaborator that reads value type state.
    pub fn set_value_reader(&mut self, reader: Arc<dyn ValueReader>) {
        self.value_reader = reader;
    }

    /// Make a value type known by its repository id, so that values
    /// announcing it (or announcing it as a truncatable base) decode to it.
    pub fn register_value_type(&mut self, type_code: TypeCode) -> Result<()> {
        let tc = type_code.origin()?;
        let id = tc.id()?.to_string();
        log::debug!("[InputStream] registered value type {}", id);
        self.registry.insert(id, tc);
        Ok(())
    }

    /// A GIOP 1.2 message header was just read: the next read starts on an
    /// 8-byte boundary. No effect for earlier versions.
    pub fn mark_header_complete(&mut self) {
        if self.config.version.aligns_body() {
            self.header_complete = true;
        }
    }

    /// True while reading the state of a chunked value.
    pub fn in_chunked_value(&self) -> bool {
        self.chunked.last().copied().unwrap_or(false)
    }

    /// Prepare for a read with alignment `align`.
    pub(crate) fn check(&mut self, align: Alignment) -> Result<()> {
        if self.header_complete {
            self.header_complete = false;
            self.skip_padding(Alignment::Eight)?;
        }
        if !self.in_header && self.in_chunked_value() {
            self.enter_chunk()?;
        }
        self.skip_padding(align)
    }

    fn skip_padding(&mut self, align: Alignment) -> Result<()> {
        let gap = align.gap(self.buf.position() - self.base);
        if gap > 0 {
            self.buf.skip(gap)?;
        }
        Ok(())
    }

    /// At a chunk boundary, consume the next chunk size if one follows.
    ///
    /// Anything else (a nested value tag, an indirection, an end tag) is
    /// left in place for the caller.
    fn enter_chunk(&mut self) -> Result<()> {
        if let Some(end) = self.chunk_end {
            if self.buf.position() < end {
                return Ok(());
            }
            self.chunk_end = None;
        }
        let resume = self.buf.position();
        let aligned = self.base + Alignment::Four.next_boundary(resume - self.base);
        if aligned + 4 > self.buf.len() {
            return Ok(());
        }
        self.buf.set_position(aligned)?;
        let size = self.buf.read_u32()?;
        if size > 0 && size < MIN_VALUE_TAG {
            self.chunk_end = Some(self.buf.position() + size as usize);
            log::trace!(
                "[InputStream] chunk of {} bytes at {}",
                size,
                self.buf.position()
            );
            Ok(())
        } else {
            self.buf.set_position(resume)
        }
    }

    fn ensure_remaining(&self, need: usize) -> Result<()> {
        if need > self.buf.remaining() {
            return Err(CdrError::OutOfBounds {
                offset: self.buf.position(),
                need,
                have: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Element count that cannot exceed the bytes left in the message.
    pub(crate) fn read_count(&mut self) -> Result<usize> {
        let at = self.position();
        let count = self.read_ulong()? as usize;
        if count > self.buf.remaining() {
            return Err(CdrError::malformed(
                at,
                format!(
                    "count {} exceeds the {} bytes left",
                    count,
                    self.buf.remaining()
                ),
            ));
        }
        Ok(count)
    }

    /// Enter one level of nesting. Fails once [`MAX_NESTING_DEPTH`] levels
    /// are open; every successful call is paired with [`Self::ascend`].
    pub(crate) fn descend(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CdrError::malformed(
                self.position(),
                format!("nesting deeper than {} levels", MAX_NESTING_DEPTH),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Reject array lengths beyond [`MAX_ELEMENT_COUNT`].
    pub(crate) fn check_element_count(&self, count: usize, at: usize) -> Result<()> {
        if count > MAX_ELEMENT_COUNT {
            return Err(CdrError::malformed(
                at,
                format!("{} elements exceed the maximum of {}", count, MAX_ELEMENT_COUNT),
            ));
        }
        Ok(())
    }

    /// Account for a typed read that started at `at`. Reads that consume
    /// nothing (`null`, empty structs, zero-length arrays) are limited to
    /// [`MAX_ELEMENT_COUNT`] per stream.
    pub(crate) fn note_typed_read(&mut self, at: usize) -> Result<()> {
        if self.buf.position() != at {
            return Ok(());
        }
        self.empty_reads += 1;
        if self.empty_reads > MAX_ELEMENT_COUNT {
            return Err(CdrError::malformed(
                at,
                format!(
                    "more than {} values without wire data",
                    MAX_ELEMENT_COUNT
                ),
            ));
        }
        Ok(())
    }

    /// `n` raw bytes at the cursor, no alignment.
    pub(crate) fn read_raw(&mut self, n: usize) -> Result<&'a [u8]> {
        self.check(Alignment::None)?;
        self.buf.read_bytes(n)
    }

    // ===================================================================
    // Primitives
    // ===================================================================

    pub fn read_octet(&mut self) -> Result<u8> {
        self.check(Alignment::None)?;
        self.buf.read_u8()
    }

    /// Boolean: exactly 0 or 1.
    pub fn read_boolean(&mut self) -> Result<bool> {
        let at = self.position();
        match self.read_octet()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CdrError::malformed(
                at,
                format!("invalid boolean octet {:#04x}", other),
            )),
        }
    }

    read_aligned!(read_ushort, u16, Two, read_u16);
    read_aligned!(read_ulong, u32, Four, read_u32);
    read_aligned!(read_ulonglong, u64, Eight, read_u64);

    pub fn read_short(&mut self) -> Result<i16> {
        self.read_ushort().map(|v| v as i16)
    }

    pub fn read_long(&mut self) -> Result<i32> {
        self.read_ulong().map(|v| v as i32)
    }

    pub fn read_longlong(&mut self) -> Result<i64> {
        self.read_ulonglong().map(|v| v as i64)
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.read_ulong().map(f32::from_bits)
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.read_ulonglong().map(f64::from_bits)
    }

    pub fn read_longdouble(&mut self) -> Result<[u8; LONG_DOUBLE_SIZE]> {
        self.check(Alignment::Eight)?;
        let mut out = [0u8; LONG_DOUBLE_SIZE];
        out.copy_from_slice(self.buf.read_bytes(LONG_DOUBLE_SIZE)?);
        Ok(out)
    }

    pub fn read_enum(&mut self) -> Result<u32> {
        self.read_ulong()
    }

    pub fn read_char(&mut self) -> Result<char> {
        self.check(Alignment::None)?;
        let narrow = Arc::clone(&self.config.narrow);
        let endian = self.buf.endian();
        narrow.read_char(&mut self.buf, endian)
    }

    /// Wide character, laid out as [`OutputStream::write_wchar`] writes it.
    ///
    /// [`OutputStream::write_wchar`]: crate::OutputStream::write_wchar
    pub fn read_wchar(&mut self) -> Result<char> {
        let wide = Arc::clone(&self.config.wide);
        if self.config.version.has_encapsulated_wstring() {
            let at = self.position();
            let len = usize::from(self.read_octet()?);
            let bytes = self.buf.read_bytes(len)?;
            let text = decode_wide(wide.as_ref(), bytes, at)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(CdrError::malformed(
                    at,
                    format!("wchar of {} octets is not one character", len),
                )),
            }
        } else {
            self.check(Alignment::Two)?;
            let endian = self.buf.endian();
            wide.read_char(&mut self.buf, endian)
        }
    }

    // ===================================================================
    // Arrays
    // ===================================================================

    pub fn read_octet_array(&mut self, count: usize) -> Result<Vec<u8>> {
        self.read_raw(count).map(<[u8]>::to_vec)
    }

    pub fn read_boolean_array(&mut self, count: usize) -> Result<Vec<bool>> {
        (0..count).map(|_| self.read_boolean()).collect()
    }

    read_array!(read_short_array, i16, Two, read_u16, |v: u16| v as i16);
    read_array!(read_ushort_array, u16, Two, read_u16, |v: u16| v);
    read_array!(read_long_array, i32, Four, read_u32, |v: u32| v as i32);
    read_array!(read_ulong_array, u32, Four, read_u32, |v: u32| v);
    read_array!(read_longlong_array, i64, Eight, read_u64, |v: u64| v as i64);
    read_array!(read_ulonglong_array, u64, Eight, read_u64, |v: u64| v);
    read_array!(read_float_array, f32, Four, read_u32, f32::from_bits);
    read_array!(read_double_array, f64, Eight, read_u64, f64::from_bits);

    pub fn read_char_array(&mut self, count: usize) -> Result<Vec<char>> {
        (0..count).map(|_| self.read_char()).collect()
    }

    pub fn read_wchar_array(&mut self, count: usize) -> Result<Vec<char>> {
        (0..count).map(|_| self.read_wchar()).collect()
    }

    // ===================================================================
    // Strings and sequences
    // ===================================================================

    /// Narrow string. A zero length is accepted as the empty string.
    pub fn read_string(&mut self) -> Result<String> {
        let at = self.position();
        let len = self.read_ulong()? as usize;
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_raw(len)?;
        let Some((&0, body)) = bytes.split_last() else {
            return Err(CdrError::malformed(at, "string is not NUL-terminated"));
        };
        let narrow = Arc::clone(&self.config.narrow);
        let endian = self.buf.endian();
        let mut src = ReadBuffer::new(body, endian);
        let mut s = String::with_capacity(body.len());
        while src.remaining() > 0 {
            s.push(narrow.read_char(&mut src, endian)?);
        }
        Ok(s)
    }

    /// Wide string, laid out as [`OutputStream::write_wstring`] writes it.
    ///
    /// [`OutputStream::write_wstring`]: crate::OutputStream::write_wstring
    pub fn read_wstring(&mut self) -> Result<String> {
        let wide = Arc::clone(&self.config.wide);
        let at = self.position();
        if self.config.version.has_encapsulated_wstring() {
            let len = self.read_ulong()? as usize;
            let bytes = self.read_raw(len)?;
            return decode_wide(wide.as_ref(), bytes, at);
        }

        let units = self.read_ulong()? as usize;
        if units == 0 {
            return Ok(String::new());
        }
        let mut s = String::new();
        let mut consumed = 0usize;
        while consumed < units - 1 {
            self.check(Alignment::Two)?;
            let start = self.buf.position();
            let endian = self.buf.endian();
            s.push(wide.read_char(&mut self.buf, endian)?);
            consumed += (self.buf.position() - start) / 2;
        }
        if consumed != units - 1 {
            return Err(CdrError::malformed(
                at,
                format!("wstring of {} units overran its length", units),
            ));
        }
        self.check(Alignment::Two)?;
        let terminator = self.buf.read_u16()?;
        if terminator != 0 {
            return Err(CdrError::malformed(at, "wstring is not NUL-terminated"));
        }
        Ok(s)
    }

    pub fn read_octet_sequence(&mut self) -> Result<Vec<u8>> {
        let len = self.read_count()?;
        self.read_octet_array(len)
    }

    pub fn read_principal(&mut self) -> Result<Vec<u8>> {
        self.read_octet_sequence()
    }

    /// Fixed-point decimal of `digits` digits at `scale`.
    pub fn read_fixed(&mut self, digits: u16, scale: i16) -> Result<Fixed> {
        let at = self.position();
        let scale = u16::try_from(scale)
            .map_err(|_| CdrError::malformed(at, format!("negative fixed scale {}", scale)))?;
        let bytes = self.read_raw(Fixed::wire_size(usize::from(digits)))?;
        Fixed::from_bcd(bytes, scale, at)
    }

    /// Object reference; the nil reference reads as `None`.
    pub fn read_object(&mut self) -> Result<Option<Ior>> {
        let type_id = self.read_string()?;
        let count = self.read_count()?;
        let mut profiles = Vec::with_capacity(count);
        for _ in 0..count {
            let tag = self.read_ulong()?;
            let data = self.read_octet_sequence()?;
            profiles.push(TaggedProfile { tag, data });
        }
        let ior = Ior::new(type_id, profiles);
        Ok((!ior.is_null()).then_some(ior))
    }
}

/// Decode GIOP 1.2 wide-character octets: big-endian unless a byte-order
/// mark says otherwise.
fn decode_wide(wide: &dyn crate::codeset::CodeSet, bytes: &[u8], at: usize) -> Result<String> {
    let (endian, body) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (Endian::Big, rest),
        [0xFF, 0xFE, rest @ ..] => (Endian::Little, rest),
        _ => (Endian::Big, bytes),
    };
    let mut src = ReadBuffer::new(body, endian);
    let mut s = String::with_capacity(body.len() / 2);
    while src.remaining() > 0 {
        let c = wide
            .read_char(&mut src, endian)
            .map_err(|e| match e {
                CdrError::OutOfBounds { .. } => {
                    CdrError::malformed(at, "truncated wide character")
                }
                other => other,
            })?;
        s.push(c);
    }
    Ok(s)
}

impl std::fmt::Debug for InputStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputStream")
            .field("version", &self.config.version)
            .field("endian", &self.buf.endian())
            .field("position", &self.buf.position())
            .field("base", &self.base)
            .field("value_depth", &self.chunked.len())
            .field("depth", &self.depth)
            .finish()
    }
}
