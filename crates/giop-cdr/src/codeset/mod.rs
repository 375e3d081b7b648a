// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Code-set converters for `char`/`string` and `wchar`/`wstring`.
//!
//! The codec never chooses a code set: the caller picks one narrow and one
//! wide converter (usually from code-set negotiation) and hands them to the
//! stream through [`CodecConfig`](crate::config::CodecConfig). The codec only
//! asks each converter how wide a character is and lets it emit or parse the
//! octets.

mod builtin;

pub use builtin::{Latin1, Utf16, Utf8};

use crate::buffer::{Endian, ReadBuffer, WriteBuffer};
use crate::config::{CODESET_ISO_8859_1, CODESET_UTF_16, CODESET_UTF_8};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Character conversion between host `char`s and wire octets.
pub trait CodeSet: fmt::Debug + Send + Sync {
    /// Human-readable name used in error messages.
    fn name(&self) -> &'static str;

    /// OSF code-set registry id.
    fn id(&self) -> u32;

    /// True when a character may need more than one fixed-size unit, so the
    /// stream has to ask [`CodeSet::count_bytes`] before writing lengths.
    fn requires_writer(&self) -> bool;

    /// True when wire octets differ from the host representation. Bulk copy
    /// of `char`/`wchar` arrays is only legal when this is false.
    fn requires_conversion(&self) -> bool;

    /// Map a host character before encoding.
    fn convert(&self, c: char) -> char {
        c
    }

    /// Number of wire octets for `c`.
    fn count_bytes(&self, c: char) -> usize;

    /// Append the wire octets for `c`. Multi-octet units use `endian`.
    fn write_char(&self, c: char, endian: Endian, out: &mut WriteBuffer) -> Result<()>;

    /// Parse one character starting at the cursor.
    fn read_char(&self, src: &mut ReadBuffer<'_>, endian: Endian) -> Result<char>;
}

/// Shared converter handle.
pub type CodeSetRef = Arc<dyn CodeSet>;

/// Converter for a registry id, if the codec ships one.
pub fn for_id(id: u32) -> Option<CodeSetRef> {
    match id {
        CODESET_ISO_8859_1 => Some(Arc::new(Latin1)),
        CODESET_UTF_8 => Some(Arc::new(Utf8)),
        CODESET_UTF_16 => Some(Arc::new(Utf16)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_id_resolves_builtins() {
        assert_eq!(for_id(CODESET_ISO_8859_1).map(|c| c.name()), Some("ISO-8859-1"));
        assert_eq!(for_id(CODESET_UTF_8).map(|c| c.name()), Some("UTF-8"));
        assert_eq!(for_id(CODESET_UTF_16).map(|c| c.name()), Some("UTF-16"));
        assert!(for_id(0xDEAD).is_none());
    }
}
