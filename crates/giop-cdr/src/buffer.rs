// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable write buffer and borrowed read buffer.
//!
//! Both carry a cursor and a byte order. Neither knows about alignment:
//! the streams compute padding and ask the buffer for raw bytes.

use crate::error::{CdrError, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Wire byte order of a stream or encapsulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    /// Encapsulation flag octet: 0 = big-endian, 1 = little-endian.
    pub const fn flag(self) -> u8 {
        match self {
            Endian::Big => 0,
            Endian::Little => 1,
        }
    }

    pub const fn from_flag(flag: u8) -> Self {
        if flag & 0x01 == 0 {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

/// Generate endian-aware write methods for a primitive width.
///
/// Each generated method grows the buffer when writing past the logical end,
/// stores the value at the cursor in the buffer's byte order and advances.
macro_rules! impl_write {
    ($name:ident, $type:ty, $size:expr, $be:path, $le:path) => {
        pub fn $name(&mut self, value: $type) {
            let endian = self.endian;
            let slot = self.slot($size);
            match endian {
                Endian::Big => $be(slot, value),
                Endian::Little => $le(slot, value),
            }
        }
    };
}

/// Generate endian-aware read methods for a primitive width.
macro_rules! impl_read {
    ($name:ident, $type:ty, $size:expr, $be:path, $le:path) => {
        pub fn $name(&mut self) -> Result<$type> {
            let endian = self.endian;
            let bytes = self.read_bytes($size)?;
            Ok(match endian {
                Endian::Big => $be(bytes),
                Endian::Little => $le(bytes),
            })
        }
    };
}

/// Owned, growable output buffer.
#[derive(Debug, Clone)]
pub struct WriteBuffer {
    data: Vec<u8>,
    pos: usize,
    endian: Endian,
}

impl WriteBuffer {
    pub fn new(capacity: usize, endian: Endian) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            pos: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor. Positions past the logical end are clamped to it.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Logical length (highest byte ever written).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Make room for `n` more bytes at the cursor.
    ///
    /// Returns `true` when the backing storage had to be reallocated; any
    /// slice previously borrowed from the buffer is invalid after that.
    pub fn ensure_available(&mut self, n: usize) -> bool {
        let needed = self.pos + n;
        if needed <= self.data.capacity() {
            return false;
        }
        let before = self.data.capacity();
        self.data.reserve(needed - self.data.len());
        log::trace!(
            "[WriteBuffer] grew from {} to {} bytes",
            before,
            self.data.capacity()
        );
        true
    }

    /// True when writing `n` bytes at the cursor extends the logical length.
    pub fn extends(&self, n: usize) -> bool {
        self.pos + n > self.data.len()
    }

    fn slot(&mut self, n: usize) -> &mut [u8] {
        let end = self.pos + n;
        if end > self.data.len() {
            self.ensure_available(n);
            self.data.resize(end, 0);
        }
        let start = self.pos;
        self.pos = end;
        &mut self.data[start..end]
    }

    /// Write `n` zero bytes (alignment padding, reserved slots).
    pub fn pad(&mut self, n: usize) {
        self.slot(n).fill(0);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.slot(1)[0] = value;
    }

    impl_write!(write_u16, u16, 2, BigEndian::write_u16, LittleEndian::write_u16);
    impl_write!(write_u32, u32, 4, BigEndian::write_u32, LittleEndian::write_u32);
    impl_write!(write_u64, u64, 8, BigEndian::write_u64, LittleEndian::write_u64);

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.slot(bytes.len()).copy_from_slice(bytes);
    }

    /// Overwrite a previously reserved 4-byte slot without moving the cursor.
    pub fn patch_u32(&mut self, at: usize, value: u32) {
        let slot = &mut self.data[at..at + 4];
        match self.endian {
            Endian::Big => BigEndian::write_u32(slot, value),
            Endian::Little => LittleEndian::write_u32(slot, value),
        }
    }

    /// Drop everything at and after `pos` (used to retract an empty slot).
    pub fn truncate(&mut self, pos: usize) {
        self.data.truncate(pos);
        self.pos = self.pos.min(pos);
    }

    /// Read view over the committed bytes, starting at offset 0.
    pub fn reader(&self) -> ReadBuffer<'_> {
        ReadBuffer::new(&self.data, self.endian)
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BUFFER_CAPACITY, Endian::Big)
    }
}

/// Borrowed input buffer with a bounds-checked cursor.
#[derive(Debug, Clone)]
pub struct ReadBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ReadBuffer<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Switch byte order (entering or leaving an encapsulation).
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(CdrError::OutOfBounds {
                offset: pos,
                need: 0,
                have: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(CdrError::OutOfBounds {
                offset: self.pos,
                need: len,
                have: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    impl_read!(read_u16, u16, 2, BigEndian::read_u16, LittleEndian::read_u16);
    impl_read!(read_u32, u32, 4, BigEndian::read_u32, LittleEndian::read_u32);
    impl_read!(read_u64, u64, 8, BigEndian::read_u64, LittleEndian::read_u64);

    /// Bytes at `[from, to)` regardless of the cursor.
    pub fn slice(&self, from: usize, to: usize) -> Result<&'a [u8]> {
        if from > to || to > self.data.len() {
            return Err(CdrError::OutOfBounds {
                offset: from,
                need: to.saturating_sub(from),
                have: self.data.len().saturating_sub(from),
            });
        }
        Ok(&self.data[from..to])
    }
}
