// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR alignment boundaries.
//!
//! Alignment is always computed relative to an alignment base: the start of
//! the message, or the start of the innermost encapsulation.

/// Natural alignment of a CDR primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Alignment {
    /// Octets, booleans, chars: never padded.
    None,
    Two,
    Four,
    Eight,
}

impl Alignment {
    /// Boundary in bytes (1 for [`Alignment::None`]).
    pub const fn boundary(self) -> usize {
        match self {
            Alignment::None => 1,
            Alignment::Two => 2,
            Alignment::Four => 4,
            Alignment::Eight => 8,
        }
    }

    /// Alignment of a primitive of `size` bytes.
    pub const fn for_size(size: usize) -> Self {
        match size {
            0 | 1 => Alignment::None,
            2 | 3 => Alignment::Two,
            4..=7 => Alignment::Four,
            _ => Alignment::Eight,
        }
    }

    /// Padding bytes needed to bring `position` to this boundary.
    pub const fn gap(self, position: usize) -> usize {
        let boundary = self.boundary();
        (boundary - position % boundary) % boundary
    }

    /// First boundary at or after `position`.
    pub const fn next_boundary(self, position: usize) -> usize {
        position + self.gap(position)
    }

    pub const fn is_aligned(self, position: usize) -> bool {
        self.gap(position) == 0
    }
}
