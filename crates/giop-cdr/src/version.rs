// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GIOP protocol generations.

use std::fmt;

/// GIOP version a stream is encoded for.
///
/// Versions differ in the layout of `wchar`/`wstring` and in the 8-byte
/// alignment of message bodies after a 1.2 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GiopVersion {
    V1_0,
    V1_1,
    /// 1.2 and every later minor version.
    V1_2,
}

impl GiopVersion {
    pub const fn from_parts(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (1, 0) => Some(GiopVersion::V1_0),
            (1, 1) => Some(GiopVersion::V1_1),
            (1, m) if m >= 2 => Some(GiopVersion::V1_2),
            _ => None,
        }
    }

    pub const fn minor(self) -> u8 {
        match self {
            GiopVersion::V1_0 => 0,
            GiopVersion::V1_1 => 1,
            GiopVersion::V1_2 => 2,
        }
    }

    /// Wide strings are length-prefixed octet sequences without a terminator.
    pub const fn has_encapsulated_wstring(self) -> bool {
        matches!(self, GiopVersion::V1_2)
    }

    /// Message bodies start on an 8-byte boundary after the header.
    pub const fn aligns_body(self) -> bool {
        matches!(self, GiopVersion::V1_2)
    }
}

impl fmt::Display for GiopVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1.{}", self.minor())
    }
}
