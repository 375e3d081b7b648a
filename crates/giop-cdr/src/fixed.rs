// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-point decimals and their packed BCD wire form.
//!
//! Wire layout: the unscaled magnitude as packed BCD, two digits per octet,
//! most significant first, with a leading zero nibble when the digit count
//! is odd, followed by one sign octet (`0x0C` positive, `0x0D` negative).
//!
//! ```
//! use giop_cdr::Fixed;
//!
//! let value: Fixed = "-12.5".parse().unwrap();
//! assert_eq!(value.to_bcd(0), vec![0x01, 0x25, 0x0D]);
//! ```

use crate::error::{CdrError, Result};
use std::fmt;
use std::str::FromStr;

const SIGN_POSITIVE: u8 = 0x0C;
const SIGN_NEGATIVE: u8 = 0x0D;
/// Alternate positive sign nibble accepted on input.
const SIGN_UNSIGNED: u8 = 0x0F;

/// Largest digit count of an IDL fixed type.
pub const MAX_FIXED_DIGITS: usize = 31;

/// Decimal with up to 31 significant digits.
///
/// Stored normalized: no leading zero digits, zero is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fixed {
    digits: Vec<u8>,
    scale: u16,
    negative: bool,
}

impl Fixed {
    /// Build from decimal digits (most significant first) and a scale
    /// (number of fractional digits).
    pub fn new(digits: Vec<u8>, scale: u16, negative: bool) -> Result<Self> {
        if let Some(d) = digits.iter().find(|d| **d > 9) {
            return Err(CdrError::bad_param(format!("{} is not a decimal digit", d)));
        }
        let mut fixed = Self {
            digits,
            scale,
            negative,
        };
        fixed.normalize();
        if fixed.digits.len() > MAX_FIXED_DIGITS {
            return Err(CdrError::bad_param(format!(
                "fixed value has {} digits, limit is {}",
                fixed.digits.len(),
                MAX_FIXED_DIGITS
            )));
        }
        Ok(fixed)
    }

    fn normalize(&mut self) {
        let leading = self.digits.iter().take_while(|d| **d == 0).count();
        self.digits.drain(..leading);
        if self.digits.is_empty() {
            self.negative = false;
        }
    }

    /// Significant digits, most significant first (empty for zero).
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn scale(&self) -> u16 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Same value at a larger scale (appends fractional zeros).
    pub fn rescale(&self, scale: u16) -> Result<Fixed> {
        if scale < self.scale {
            return Err(CdrError::bad_param(format!(
                "cannot narrow fixed scale from {} to {}",
                self.scale, scale
            )));
        }
        let mut digits = self.digits.clone();
        if !digits.is_empty() {
            digits.resize(digits.len() + usize::from(scale - self.scale), 0);
        }
        Fixed::new(digits, scale, self.negative)
    }

    /// Packed BCD, zero-extended on the left to at least `width` digits.
    pub fn to_bcd(&self, width: usize) -> Vec<u8> {
        let count = self.digits.len().max(width);
        let padded = count + count % 2;
        let mut nibbles = vec![0u8; padded - self.digits.len()];
        nibbles.extend_from_slice(&self.digits);

        let mut out: Vec<u8> = nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect();
        out.push(if self.negative {
            SIGN_NEGATIVE
        } else {
            SIGN_POSITIVE
        });
        out
    }

    /// Octets occupied on the wire by a value of `digits` digits.
    pub const fn wire_size(digits: usize) -> usize {
        (digits + 1) / 2 + 1
    }

    /// Parse packed BCD produced by [`Fixed::to_bcd`]. `offset` is only used
    /// in error reports.
    pub fn from_bcd(bytes: &[u8], scale: u16, offset: usize) -> Result<Fixed> {
        let Some((sign, body)) = bytes.split_last() else {
            return Err(CdrError::malformed(offset, "empty fixed value"));
        };
        let negative = match sign & 0x0F {
            SIGN_POSITIVE | SIGN_UNSIGNED => false,
            SIGN_NEGATIVE => true,
            other => {
                return Err(CdrError::malformed(
                    offset + body.len(),
                    format!("invalid fixed sign nibble {:#x}", other),
                ))
            }
        };
        let mut digits = Vec::with_capacity(body.len() * 2);
        for (i, octet) in body.iter().enumerate() {
            for nibble in [octet >> 4, octet & 0x0F] {
                if nibble > 9 {
                    return Err(CdrError::malformed(offset + i, "invalid BCD digit"));
                }
                digits.push(nibble);
            }
        }
        Fixed::new(digits, scale, negative)
    }
}

impl FromStr for Fixed {
    type Err = CdrError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_end_matches(['d', 'D']);
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(CdrError::bad_param(format!("'{}' is not a fixed literal", s)));
        }
        let mut digits = Vec::with_capacity(int_part.len() + frac_part.len());
        for c in int_part.chars().chain(frac_part.chars()) {
            let d = c
                .to_digit(10)
                .ok_or_else(|| CdrError::bad_param(format!("'{}' is not a fixed literal", s)))?;
            digits.push(d as u8);
        }
        let scale = u16::try_from(frac_part.len())
            .map_err(|_| CdrError::bad_param("fixed scale out of range"))?;
        Fixed::new(digits, scale, negative)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = usize::from(self.scale);
        let mut text: String = self.digits.iter().map(|d| char::from(b'0' + d)).collect();
        if text.len() <= scale {
            text = format!("{}{}", "0".repeat(scale + 1 - text.len()), text);
        }
        if self.negative {
            f.write_str("-")?;
        }
        let (int_part, frac_part) = text.split_at(text.len() - scale);
        f.write_str(int_part)?;
        if !frac_part.is_empty() {
            write!(f, ".{}", frac_part)?;
        }
        Ok(())
    }
}
