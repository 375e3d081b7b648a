// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the encoder, the decoder and the TypeCode model.

use thiserror::Error;

/// CDR marshalling error.
///
/// None of these are retried inside the codec: a stream that returned an
/// error is left in an unspecified state and must be discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CdrError {
    /// Decoded bytes are inconsistent with the declared type.
    #[error("malformed data at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// A read ran past the logical end of the buffer.
    #[error("read past end of buffer at offset {offset}: need {need} bytes, have {have}")]
    OutOfBounds {
        offset: usize,
        need: usize,
        have: usize,
    },

    /// A character cannot be represented in the active code set.
    #[error("character U+{code:04X} is not representable in {codeset}")]
    UnsupportedEncoding { code: u32, codeset: &'static str },

    /// The marshalling deadline expired.
    #[error("deadline expired while marshalling")]
    Timeout,

    /// Internal TypeCode invariant violation.
    #[error("invalid typecode: {0}")]
    InvalidTypeCode(String),

    /// A host value does not match its TypeCode or violates a bound.
    #[error("bad parameter: {0}")]
    BadParam(String),
}

impl CdrError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        CdrError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_param(reason: impl Into<String>) -> Self {
        CdrError::BadParam(reason.into())
    }

    pub(crate) fn invalid_tc(reason: impl Into<String>) -> Self {
        CdrError::InvalidTypeCode(reason.into())
    }

    /// True for [`CdrError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, CdrError::Timeout)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CdrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = CdrError::OutOfBounds {
            offset: 12,
            need: 4,
            have: 1,
        };
        assert_eq!(
            err.to_string(),
            "read past end of buffer at offset 12: need 4 bytes, have 1"
        );

        let err = CdrError::malformed(4, "indirection at top level");
        assert_eq!(
            err.to_string(),
            "malformed data at offset 4: indirection at top level"
        );

        let err = CdrError::UnsupportedEncoding {
            code: 0x20AC,
            codeset: "ISO-8859-1",
        };
        assert_eq!(
            err.to_string(),
            "character U+20AC is not representable in ISO-8859-1"
        );

        assert!(CdrError::Timeout.is_timeout());
        assert!(!CdrError::bad_param("x").is_timeout());
    }
}
