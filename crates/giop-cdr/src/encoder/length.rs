// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Back-patched length prefixes.

use super::OutputStream;
use crate::align::Alignment;
use crate::error::Result;
use std::ops::{Deref, DerefMut};

/// A reserved ulong length slot, patched with the body length on drop.
///
/// Dereferences to the stream, so the body is written through the guard.
/// Patching happens on every exit path, errors included. An encapsulation
/// guard also restores the enclosing alignment base.
///
/// ```
/// use giop_cdr::OutputStream;
///
/// let mut out = OutputStream::default();
/// {
///     let mut enc = out.begin_encapsulation().unwrap();
///     enc.write_long(7).unwrap();
/// }
/// // length 8 = flag + 3 padding + long
/// assert_eq!(out.as_bytes(), &[0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 7]);
/// ```
pub struct PendingLength<'a> {
    out: &'a mut OutputStream,
    slot: usize,
    saved_base: Option<usize>,
}

impl OutputStream {
    /// Open an encapsulation: length slot, then the byte-order flag. The
    /// body aligns relative to the flag octet.
    pub fn begin_encapsulation(&mut self) -> Result<PendingLength<'_>> {
        let slot = self.reserve_length()?;
        let saved = self.base;
        self.base = self.buf.position();
        let mut guard = PendingLength {
            out: self,
            slot,
            saved_base: Some(saved),
        };
        let flag = guard.buf.endian().flag();
        guard.write_octet(flag)?;
        Ok(guard)
    }

    /// Open a plain length-prefixed region (no flag, same alignment base).
    pub(crate) fn begin_length(&mut self) -> Result<PendingLength<'_>> {
        let slot = self.reserve_length()?;
        Ok(PendingLength {
            out: self,
            slot,
            saved_base: None,
        })
    }

    fn reserve_length(&mut self) -> Result<usize> {
        self.check(4, Alignment::Four)?;
        let slot = self.buf.position();
        self.buf.pad(4);
        Ok(slot)
    }
}

impl PendingLength<'_> {
    /// Bytes written after the length slot so far.
    pub fn body_len(&self) -> usize {
        self.out.buf.position() - self.slot - 4
    }
}

impl Deref for PendingLength<'_> {
    type Target = OutputStream;

    fn deref(&self) -> &OutputStream {
        self.out
    }
}

impl DerefMut for PendingLength<'_> {
    fn deref_mut(&mut self) -> &mut OutputStream {
        self.out
    }
}

impl Drop for PendingLength<'_> {
    fn drop(&mut self) {
        let len = self.body_len();
        self.out.buf.patch_u32(self.slot, len as u32);
        if let Some(base) = self.saved_base {
            self.out.base = base;
        }
    }
}
