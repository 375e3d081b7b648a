// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encapsulated regions on input.

use super::InputStream;
use crate::buffer::Endian;
use crate::error::{CdrError, Result};
use std::ops::{Deref, DerefMut};

/// An open encapsulation: the body is read through the guard in the byte
/// order announced by its flag. On drop the cursor moves to the end of the
/// encapsulation and the enclosing byte order and alignment base return.
pub struct Encapsulation<'s, 'a> {
    input: &'s mut InputStream<'a>,
    end: usize,
    saved_base: usize,
    saved_endian: Endian,
}

impl<'a> InputStream<'a> {
    /// Enter an encapsulation: ulong length, then the byte-order flag.
    pub fn open_encapsulation(&mut self) -> Result<Encapsulation<'_, 'a>> {
        let at = self.position();
        let len = self.read_ulong()? as usize;
        if len == 0 {
            return Err(CdrError::malformed(at, "empty encapsulation"));
        }
        if len > self.buf.remaining() {
            return Err(CdrError::OutOfBounds {
                offset: self.buf.position(),
                need: len,
                have: self.buf.remaining(),
            });
        }
        let start = self.buf.position();
        let flag = self.buf.read_u8()?;
        let saved_base = self.base;
        let saved_endian = self.buf.endian();
        self.base = start;
        self.buf.set_endian(Endian::from_flag(flag));
        Ok(Encapsulation {
            input: self,
            end: start + len,
            saved_base,
            saved_endian,
        })
    }

    /// Body of an encapsulation as raw bytes, flag included.
    pub fn read_encapsulation_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_count()?;
        self.buf.read_bytes(len)
    }
}

impl Encapsulation<'_, '_> {
    /// Close the encapsulation, failing if its body was read past the
    /// declared length.
    pub fn finish(self) -> Result<()> {
        let pos = self.input.position();
        if pos > self.end {
            return Err(CdrError::malformed(
                self.end,
                format!("encapsulated body overran its length by {} bytes", pos - self.end),
            ));
        }
        Ok(())
    }
}

impl<'a> Deref for Encapsulation<'_, 'a> {
    type Target = InputStream<'a>;

    fn deref(&self) -> &InputStream<'a> {
        self.input
    }
}

impl<'a> DerefMut for Encapsulation<'_, 'a> {
    fn deref_mut(&mut self) -> &mut InputStream<'a> {
        self.input
    }
}

impl Drop for Encapsulation<'_, '_> {
    fn drop(&mut self) {
        let end = self.end.min(self.input.buf.len());
        if self.input.buf.position() < end {
            log::trace!(
                "[InputStream] skipping {} trailing encapsulation bytes",
                end - self.input.buf.position()
            );
        }
        // `end` was bounds-checked on entry.
        let _ = self.input.buf.set_position(end);
        self.input.base = self.saved_base;
        self.input.buf.set_endian(self.saved_endian);
    }
}
