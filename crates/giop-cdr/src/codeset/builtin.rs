// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in converters: ISO-8859-1, UTF-8 and UTF-16.

use super::CodeSet;
use crate::buffer::{Endian, ReadBuffer, WriteBuffer};
use crate::config::{CODESET_ISO_8859_1, CODESET_UTF_16, CODESET_UTF_8};
use crate::error::{CdrError, Result};

fn unsupported(c: char, codeset: &'static str) -> CdrError {
    CdrError::UnsupportedEncoding {
        code: c as u32,
        codeset,
    }
}

/// ISO-8859-1: one octet per character, no conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl CodeSet for Latin1 {
    fn name(&self) -> &'static str {
        "ISO-8859-1"
    }

    fn id(&self) -> u32 {
        CODESET_ISO_8859_1
    }

    fn requires_writer(&self) -> bool {
        false
    }

    fn requires_conversion(&self) -> bool {
        false
    }

    fn count_bytes(&self, _c: char) -> usize {
        1
    }

    fn write_char(&self, c: char, _endian: Endian, out: &mut WriteBuffer) -> Result<()> {
        let code = c as u32;
        if code > 0xFF {
            return Err(unsupported(c, self.name()));
        }
        out.write_u8(code as u8);
        Ok(())
    }

    fn read_char(&self, src: &mut ReadBuffer<'_>, _endian: Endian) -> Result<char> {
        Ok(char::from(src.read_u8()?))
    }
}

/// UTF-8: one to four octets per character.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl CodeSet for Utf8 {
    fn name(&self) -> &'static str {
        "UTF-8"
    }

    fn id(&self) -> u32 {
        CODESET_UTF_8
    }

    fn requires_writer(&self) -> bool {
        true
    }

    fn requires_conversion(&self) -> bool {
        true
    }

    fn count_bytes(&self, c: char) -> usize {
        c.len_utf8()
    }

    fn write_char(&self, c: char, _endian: Endian, out: &mut WriteBuffer) -> Result<()> {
        let mut scratch = [0u8; 4];
        out.write_bytes(c.encode_utf8(&mut scratch).as_bytes());
        Ok(())
    }

    fn read_char(&self, src: &mut ReadBuffer<'_>, _endian: Endian) -> Result<char> {
        let start = src.position();
        let lead = src.read_u8()?;
        let width = match lead {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(CdrError::malformed(start, "invalid UTF-8 lead byte")),
        };
        let bytes = src.slice(start, start + width)?;
        src.skip(width - 1)?;
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| CdrError::malformed(start, "invalid UTF-8 sequence"))
    }
}

/// UTF-16: one or two 16-bit code units per character.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16;

impl CodeSet for Utf16 {
    fn name(&self) -> &'static str {
        "UTF-16"
    }

    fn id(&self) -> u32 {
        CODESET_UTF_16
    }

    fn requires_writer(&self) -> bool {
        true
    }

    fn requires_conversion(&self) -> bool {
        true
    }

    fn count_bytes(&self, c: char) -> usize {
        c.len_utf16() * 2
    }

    fn write_char(&self, c: char, endian: Endian, out: &mut WriteBuffer) -> Result<()> {
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units).iter() {
            let bytes = match endian {
                Endian::Big => unit.to_be_bytes(),
                Endian::Little => unit.to_le_bytes(),
            };
            out.write_bytes(&bytes);
        }
        Ok(())
    }

    fn read_char(&self, src: &mut ReadBuffer<'_>, endian: Endian) -> Result<char> {
        let start = src.position();
        let read_unit = |src: &mut ReadBuffer<'_>| -> Result<u16> {
            let b = src.read_bytes(2)?;
            Ok(match endian {
                Endian::Big => u16::from_be_bytes([b[0], b[1]]),
                Endian::Little => u16::from_le_bytes([b[0], b[1]]),
            })
        };
        let first = read_unit(src)?;
        let mut units = vec![first];
        if (0xD800..0xDC00).contains(&first) {
            units.push(read_unit(src)?);
        }
        char::decode_utf16(units)
            .next()
            .and_then(|r| r.ok())
            .ok_or_else(|| CdrError::malformed(start, "unpaired UTF-16 surrogate"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(cs: &dyn CodeSet, c: char, endian: Endian) -> Vec<u8> {
        let mut out = WriteBuffer::new(4, endian);
        cs.write_char(c, endian, &mut out).expect("write_char");
        out.into_vec()
    }

    #[test]
    fn test_latin1_rejects_wide_chars() {
        assert_eq!(encode(&Latin1, 'e', Endian::Big), vec![b'e']);
        assert_eq!(encode(&Latin1, '\u{e9}', Endian::Big), vec![0xE9]);
        let mut out = WriteBuffer::default();
        let err = Latin1
            .write_char('\u{20AC}', Endian::Big, &mut out)
            .unwrap_err();
        assert!(matches!(err, CdrError::UnsupportedEncoding { code: 0x20AC, .. }));
    }

    #[test]
    fn test_utf8_roundtrip_multibyte() {
        for c in ['a', '\u{e9}', '\u{20AC}', '\u{1F600}'] {
            let bytes = encode(&Utf8, c, Endian::Big);
            assert_eq!(bytes.len(), Utf8.count_bytes(c));
            let mut src = ReadBuffer::new(&bytes, Endian::Big);
            assert_eq!(Utf8.read_char(&mut src, Endian::Big).expect("read"), c);
            assert_eq!(src.remaining(), 0);
        }
    }

    #[test]
    fn test_utf16_units_follow_endian() {
        assert_eq!(encode(&Utf16, 'A', Endian::Big), vec![0x00, 0x41]);
        assert_eq!(encode(&Utf16, 'A', Endian::Little), vec![0x41, 0x00]);
        let bytes = encode(&Utf16, '\u{1F600}', Endian::Big);
        assert_eq!(bytes, vec![0xD8, 0x3D, 0xDE, 0x00]);
        let mut src = ReadBuffer::new(&bytes, Endian::Big);
        assert_eq!(
            Utf16.read_char(&mut src, Endian::Big).expect("read"),
            '\u{1F600}'
        );
    }

    #[test]
    fn test_utf16_unpaired_surrogate_is_malformed() {
        let bytes = [0xDC, 0x00];
        let mut src = ReadBuffer::new(&bytes, Endian::Big);
        assert!(matches!(
            Utf16.read_char(&mut src, Endian::Big),
            Err(CdrError::Malformed { .. })
        ));
    }
}
