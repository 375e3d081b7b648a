// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration: protocol constants and per-stream settings.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire constants from the CORBA CDR rules (value
//!   tags, indirection markers, code-set registry ids).
//! - **Level 2 (Per stream)**: [`CodecConfig`], fixed when a stream is built
//!   and never changed mid-message.
//!
//! # Example
//!
//! ```
//! use giop_cdr::config::CodecConfig;
//! use giop_cdr::{Endian, GiopVersion, OutputStream};
//!
//! let config = CodecConfig::builder()
//!     .version(GiopVersion::V1_2)
//!     .endian(Endian::Little)
//!     .build();
//! let mut out = OutputStream::new(config);
//! out.write_long(42).unwrap();
//! ```

use crate::buffer::Endian;
use crate::codeset::{CodeSetRef, Latin1, Utf16};
use crate::version::GiopVersion;
use std::fmt;
use std::sync::Arc;

// =======================================================================
// Indirection and value tags (CORBA 3.x Sec.9.3.4)
// =======================================================================

/// Kind tag / value tag announcing an indirection (`-1` as a signed long).
pub const INDIRECTION_TAG: u32 = 0xFFFF_FFFF;

/// Null value reference.
pub const NULL_VALUE_TAG: u32 = 0;

/// Lowest value tag; tags in `[MIN_VALUE_TAG, MAX_VALUE_TAG]` start a value.
pub const MIN_VALUE_TAG: u32 = 0x7FFF_FF00;

/// Highest value tag.
pub const MAX_VALUE_TAG: u32 = 0x7FFF_FFFF;

/// Value tag bit: a codebase URL follows the tag.
pub const VALUE_TAG_CODEBASE: u32 = 0x0000_0001;

/// Value tag bits 1-2: no repository id.
pub const VALUE_TAG_NO_TYPE_INFO: u32 = 0x0000_0000;

/// Value tag bits 1-2: one repository id.
pub const VALUE_TAG_SINGLE_ID: u32 = 0x0000_0002;

/// Value tag bits 1-2: a list of repository ids (truncatable chain).
pub const VALUE_TAG_ID_LIST: u32 = 0x0000_0006;

/// Mask selecting the repository-id bits of a value tag.
pub const VALUE_TAG_ID_MASK: u32 = 0x0000_0006;

/// Value tag bit: the state is chunked.
pub const VALUE_TAG_CHUNKED: u32 = 0x0000_0008;

/// Repository id of the abstract base of all value types.
pub const VALUE_BASE_ID: &str = "IDL:omg.org/CORBA/ValueBase:1.0";

// =======================================================================
// Code-set registry ids (OSF Character and Code Set Registry)
// =======================================================================

/// ISO 8859-1 (Latin-1).
pub const CODESET_ISO_8859_1: u32 = 0x0001_0001;

/// UTF-16 (ISO 10646 UCS-2 with surrogates).
pub const CODESET_UTF_16: u32 = 0x0001_0109;

/// UTF-8.
pub const CODESET_UTF_8: u32 = 0x0501_0001;

// =======================================================================
// Buffers
// =======================================================================

/// Initial output buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

// =======================================================================
// Decoding limits
// =======================================================================

/// Deepest nesting of TypeCodes, typed values and value instances that a
/// stream decodes or re-marshals. Deeper input fails as malformed instead
/// of exhausting the call stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Largest array or sequence a stream accepts, and the total number of
/// zero-size elements (`null`, `void`) it will decode per message.
pub const MAX_ELEMENT_COUNT: usize = 1_000_000;

/// Per-stream codec settings.
#[derive(Clone)]
pub struct CodecConfig {
    /// Protocol generation; selects wide-character layout and header rules.
    pub version: GiopVersion,
    /// Byte order of the outer stream.
    pub endian: Endian,
    /// Converter for `char` and `string`.
    pub narrow: CodeSetRef,
    /// Converter for `wchar` and `wstring`.
    pub wide: CodeSetRef,
    /// Initial output buffer capacity.
    pub initial_capacity: usize,
    /// Chunk the state of custom (`VM_CUSTOM`) values.
    pub chunk_custom_values: bool,
}

impl CodecConfig {
    pub fn new(version: GiopVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            version: GiopVersion::V1_2,
            endian: Endian::Big,
            narrow: Arc::new(Latin1),
            wide: Arc::new(Utf16),
            initial_capacity: DEFAULT_BUFFER_CAPACITY,
            chunk_custom_values: true,
        }
    }
}

impl fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecConfig")
            .field("version", &self.version)
            .field("endian", &self.endian)
            .field("narrow", &self.narrow.name())
            .field("wide", &self.wide.name())
            .field("initial_capacity", &self.initial_capacity)
            .field("chunk_custom_values", &self.chunk_custom_values)
            .finish()
    }
}

/// Fluent builder for [`CodecConfig`].
#[derive(Debug, Default)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    pub fn version(mut self, version: GiopVersion) -> Self {
        self.config.version = version;
        self
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.config.endian = endian;
        self
    }

    pub fn narrow_codeset(mut self, codeset: CodeSetRef) -> Self {
        self.config.narrow = codeset;
        self
    }

    pub fn wide_codeset(mut self, codeset: CodeSetRef) -> Self {
        self.config.wide = codeset;
        self
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    pub fn chunk_custom_values(mut self, chunk: bool) -> Self {
        self.config.chunk_custom_values = chunk;
        self
    }

    pub fn build(self) -> CodecConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeset::Utf8;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.version, GiopVersion::V1_2);
        assert_eq!(config.endian, Endian::Big);
        assert_eq!(config.narrow.id(), CODESET_ISO_8859_1);
        assert_eq!(config.wide.id(), CODESET_UTF_16);
    }

    #[test]
    fn test_builder_overrides() {
        let config = CodecConfig::builder()
            .version(GiopVersion::V1_0)
            .endian(Endian::Little)
            .narrow_codeset(Arc::new(Utf8))
            .initial_capacity(16)
            .chunk_custom_values(false)
            .build();
        assert_eq!(config.version, GiopVersion::V1_0);
        assert_eq!(config.endian, Endian::Little);
        assert_eq!(config.narrow.id(), CODESET_UTF_8);
        assert_eq!(config.initial_capacity, 16);
        assert!(!config.chunk_custom_values);
    }

    #[test]
    fn test_value_tag_ranges() {
        assert!(MIN_VALUE_TAG | VALUE_TAG_CHUNKED | VALUE_TAG_ID_LIST <= MAX_VALUE_TAG);
        assert_eq!(VALUE_TAG_ID_LIST & VALUE_TAG_ID_MASK, VALUE_TAG_ID_LIST);
        assert_eq!(INDIRECTION_TAG as i32, -1);
    }
}
