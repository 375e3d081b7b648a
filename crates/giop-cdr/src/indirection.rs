// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identity-keyed indirection tables.
//!
//! The encoder maps an instance (by address) to the absolute offset of its
//! first full encoding; the decoder maps offsets back to decoded instances.
//! Entries keep their handle alive so an address cannot be reused by a
//! different instance while the table exists.

use crate::typecode::TypeCode;
use crate::value::ValueRef;
use std::collections::HashMap;

/// Handles with a stable identity.
pub trait Identity: Clone {
    fn identity(&self) -> usize;
}

impl Identity for TypeCode {
    fn identity(&self) -> usize {
        TypeCode::identity(self)
    }
}

impl Identity for ValueRef {
    fn identity(&self) -> usize {
        ValueRef::identity(self)
    }
}

/// Encoder side: identity -> offset of the first encoding.
#[derive(Debug)]
pub struct IndirectionTable<T> {
    entries: HashMap<usize, (usize, T)>,
}

impl<T: Identity> IndirectionTable<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn offset_of(&self, handle: &T) -> Option<usize> {
        self.entries.get(&handle.identity()).map(|(offset, _)| *offset)
    }

    /// Record the first encoding of `handle`. An existing entry is kept.
    pub fn record(&mut self, handle: &T, offset: usize) {
        self.entries
            .entry(handle.identity())
            .or_insert_with(|| (offset, handle.clone()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Identity> Default for IndirectionTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Target of an indirection whose offset field sits at `field`.
///
/// Returns `None` when the offset points before the start of the buffer.
pub fn indirection_target(field: usize, offset: i32) -> Option<usize> {
    let target = field as i64 + i64::from(offset);
    usize::try_from(target).ok()
}

/// Offset to write at `field` so that it points back to `target`.
pub fn indirection_offset(field: usize, target: usize) -> i32 {
    (target as i64 - field as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_keys_on_identity() {
        let a = TypeCode::struct_tc("IDL:A:1.0", "A", Vec::new());
        let b = TypeCode::struct_tc("IDL:A:1.0", "A", Vec::new());
        let mut table = IndirectionTable::new();
        table.record(&a, 8);
        assert_eq!(table.offset_of(&a.clone()), Some(8));
        assert_eq!(table.offset_of(&b), None);

        table.record(&a, 40);
        assert_eq!(table.offset_of(&a), Some(8));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_offsets_point_backward() {
        assert_eq!(indirection_offset(20, 8), -12);
        assert_eq!(indirection_target(20, -12), Some(8));
        assert_eq!(indirection_target(4, -12), None);
    }
}
