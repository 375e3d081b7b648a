// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors (TypeCodes).
//!
//! A [`TypeCode`] is a cheap, clonable handle. Cloning shares the same
//! instance, and instance identity is what the encoder's indirection table
//! keys on: the same handle written twice in one call is encoded once.
//!
//! Recursive types use an explicit [`TypeCodeBody::Recursive`] placeholder
//! naming the repository id of the enclosing type. The placeholder is bound
//! to its target when the enclosing struct, union, exception or value
//! TypeCode is constructed.
//!
//! ```
//! use giop_cdr::{TCKind, TypeCode};
//!
//! // struct Node { long value; sequence<Node> children; };
//! let node = TypeCode::struct_tc(
//!     "IDL:Node:1.0",
//!     "Node",
//!     vec![
//!         ("value", TypeCode::long()).into(),
//!         ("children", TypeCode::sequence(TypeCode::recursive("IDL:Node:1.0"), 0)).into(),
//!     ],
//! );
//! let children = node.member_type(1).unwrap();
//! let element = children.content_type().unwrap().resolve().unwrap();
//! assert_eq!(element.kind(), TCKind::Struct);
//! assert!(element.ptr_eq(&node));
//! ```

mod builder;
mod kind;

pub use builder::StructBuilder;
pub use kind::TCKind;

use crate::error::{CdrError, Result};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Value type modifier: plain value.
pub const VM_NONE: i16 = 0;
/// Value type modifier: custom marshalling.
pub const VM_CUSTOM: i16 = 1;
/// Value type modifier: abstract value.
pub const VM_ABSTRACT: i16 = 2;
/// Value type modifier: state may be truncated to the concrete base.
pub const VM_TRUNCATABLE: i16 = 3;

/// Value member visibility.
pub const PRIVATE_MEMBER: i16 = 0;
pub const PUBLIC_MEMBER: i16 = 1;

/// Shared handle to a TypeCode.
#[derive(Clone)]
pub struct TypeCode(Arc<TypeCodeBody>);

/// Kind-specific parameters of a TypeCode.
#[derive(Debug)]
pub enum TypeCodeBody {
    /// Kinds without parameters (`tk_long`, `tk_any`, ...).
    Basic(TCKind),
    /// `tk_string`; bound 0 = unbounded.
    String { bound: u32 },
    /// `tk_wstring`; bound 0 = unbounded.
    WString { bound: u32 },
    Fixed { digits: u16, scale: i16 },
    /// `tk_objref`, `tk_abstract_interface`, `tk_native`, `tk_local_interface`.
    Interface {
        kind: TCKind,
        id: String,
        name: String,
    },
    Struct(StructType),
    Except(StructType),
    Union(UnionType),
    Enum {
        id: String,
        name: String,
        members: Vec<String>,
    },
    /// bound 0 = unbounded.
    Sequence { element: TypeCode, bound: u32 },
    Array { element: TypeCode, length: u32 },
    Alias {
        id: String,
        name: String,
        original: TypeCode,
    },
    ValueBox {
        id: String,
        name: String,
        boxed: TypeCode,
    },
    Value(ValueType),
    /// Reference to an enclosing TypeCode still under construction.
    Recursive(RecursiveRef),
}

/// Struct and exception parameters.
#[derive(Debug)]
pub struct StructType {
    pub id: String,
    pub name: String,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone)]
pub struct StructMember {
    pub name: String,
    pub member_type: TypeCode,
}

impl StructMember {
    pub fn new(name: impl Into<String>, member_type: TypeCode) -> Self {
        Self {
            name: name.into(),
            member_type,
        }
    }
}

impl<S: Into<String>> From<(S, TypeCode)> for StructMember {
    fn from((name, member_type): (S, TypeCode)) -> Self {
        Self::new(name, member_type)
    }
}

/// Union parameters.
#[derive(Debug)]
pub struct UnionType {
    pub id: String,
    pub name: String,
    pub discriminator: TypeCode,
    pub members: Vec<UnionMember>,
}

impl UnionType {
    /// Index of the `default:` member, or -1.
    pub fn default_index(&self) -> i32 {
        self.members
            .iter()
            .position(|m| m.label == UnionLabel::Default)
            .map_or(-1, |i| i as i32)
    }

    /// Member selected by a discriminator value: an explicit label match,
    /// else the default member. `None` is the implicit empty default.
    pub fn member_for(&self, discriminator: i64) -> Option<(usize, &UnionMember)> {
        self.members
            .iter()
            .enumerate()
            .find(|(_, m)| m.label == UnionLabel::Value(discriminator))
            .or_else(|| {
                self.members
                    .iter()
                    .enumerate()
                    .find(|(_, m)| m.label == UnionLabel::Default)
            })
    }
}

/// Case label of a union member.
///
/// Discriminator values of every legal kind are carried as `i64`: booleans
/// as 0/1, characters as their code point, enums as their ordinal, unsigned
/// 64-bit values by bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionLabel {
    Value(i64),
    Default,
}

#[derive(Debug, Clone)]
pub struct UnionMember {
    pub label: UnionLabel,
    pub name: String,
    pub member_type: TypeCode,
}

impl UnionMember {
    pub fn new(label: i64, name: impl Into<String>, member_type: TypeCode) -> Self {
        Self {
            label: UnionLabel::Value(label),
            name: name.into(),
            member_type,
        }
    }

    pub fn default_case(name: impl Into<String>, member_type: TypeCode) -> Self {
        Self {
            label: UnionLabel::Default,
            name: name.into(),
            member_type,
        }
    }
}

/// Value type parameters.
#[derive(Debug)]
pub struct ValueType {
    pub id: String,
    pub name: String,
    pub modifier: i16,
    pub concrete_base: Option<TypeCode>,
    pub members: Vec<ValueMember>,
}

#[derive(Debug, Clone)]
pub struct ValueMember {
    pub name: String,
    pub member_type: TypeCode,
    pub access: i16,
}

impl ValueMember {
    pub fn public(name: impl Into<String>, member_type: TypeCode) -> Self {
        Self {
            name: name.into(),
            member_type,
            access: PUBLIC_MEMBER,
        }
    }

    pub fn private(name: impl Into<String>, member_type: TypeCode) -> Self {
        Self {
            name: name.into(),
            member_type,
            access: PRIVATE_MEMBER,
        }
    }
}

/// Placeholder for a recursive reference.
pub struct RecursiveRef {
    id: String,
    target: OnceLock<Weak<TypeCodeBody>>,
}

impl RecursiveRef {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_bound(&self) -> bool {
        self.target.get().is_some()
    }

    fn bind(&self, target: &Weak<TypeCodeBody>) {
        let _ = self.target.set(target.clone());
    }
}

impl fmt::Debug for RecursiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveRef")
            .field("id", &self.id)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl TypeCode {
    fn from_body(body: TypeCodeBody) -> Self {
        TypeCode(Arc::new(body))
    }

    pub fn body(&self) -> &TypeCodeBody {
        &self.0
    }

    /// Identity key for indirection tables.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Same instance (not merely equal).
    pub fn ptr_eq(&self, other: &TypeCode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_recursive(&self) -> bool {
        matches!(*self.0, TypeCodeBody::Recursive(_))
    }

    /// Follow a recursive placeholder to its completed target.
    pub fn resolve(&self) -> Result<TypeCode> {
        match &*self.0 {
            TypeCodeBody::Recursive(r) => r
                .target
                .get()
                .and_then(Weak::upgrade)
                .map(TypeCode)
                .ok_or_else(|| {
                    CdrError::invalid_tc(format!("unresolved recursive reference to {}", r.id))
                }),
            _ => Ok(self.clone()),
        }
    }

    /// Resolve placeholders and strip aliases.
    pub fn origin(&self) -> Result<TypeCode> {
        let mut tc = self.resolve()?;
        while let TypeCodeBody::Alias { original, .. } = tc.body() {
            tc = original.resolve()?;
        }
        Ok(tc)
    }

    /// Kind of this TypeCode. A bound placeholder reports its target's kind,
    /// an unbound one `tk_null`.
    pub fn kind(&self) -> TCKind {
        match &*self.0 {
            TypeCodeBody::Basic(k) => *k,
            TypeCodeBody::String { .. } => TCKind::String,
            TypeCodeBody::WString { .. } => TCKind::WString,
            TypeCodeBody::Fixed { .. } => TCKind::Fixed,
            TypeCodeBody::Interface { kind, .. } => *kind,
            TypeCodeBody::Struct(_) => TCKind::Struct,
            TypeCodeBody::Except(_) => TCKind::Except,
            TypeCodeBody::Union(_) => TCKind::Union,
            TypeCodeBody::Enum { .. } => TCKind::Enum,
            TypeCodeBody::Sequence { .. } => TCKind::Sequence,
            TypeCodeBody::Array { .. } => TCKind::Array,
            TypeCodeBody::Alias { .. } => TCKind::Alias,
            TypeCodeBody::ValueBox { .. } => TCKind::ValueBox,
            TypeCodeBody::Value(_) => TCKind::Value,
            TypeCodeBody::Recursive(_) => self.resolve().map_or(TCKind::Null, |t| t.kind()),
        }
    }

    fn bad_kind(&self, op: &str) -> CdrError {
        CdrError::bad_param(format!("{} is not valid for {}", op, self.kind()))
    }

    /// Repository id of a named kind.
    pub fn id(&self) -> Result<&str> {
        match &*self.0 {
            TypeCodeBody::Interface { id, .. }
            | TypeCodeBody::Enum { id, .. }
            | TypeCodeBody::Alias { id, .. }
            | TypeCodeBody::ValueBox { id, .. } => Ok(id),
            TypeCodeBody::Struct(s) | TypeCodeBody::Except(s) => Ok(&s.id),
            TypeCodeBody::Union(u) => Ok(&u.id),
            TypeCodeBody::Value(v) => Ok(&v.id),
            TypeCodeBody::Recursive(r) => Ok(&r.id),
            _ => Err(self.bad_kind("id()")),
        }
    }

    pub fn name(&self) -> Result<&str> {
        match &*self.0 {
            TypeCodeBody::Interface { name, .. }
            | TypeCodeBody::Enum { name, .. }
            | TypeCodeBody::Alias { name, .. }
            | TypeCodeBody::ValueBox { name, .. } => Ok(name),
            TypeCodeBody::Struct(s) | TypeCodeBody::Except(s) => Ok(&s.name),
            TypeCodeBody::Union(u) => Ok(&u.name),
            TypeCodeBody::Value(v) => Ok(&v.name),
            _ => Err(self.bad_kind("name()")),
        }
    }

    pub fn member_count(&self) -> Result<usize> {
        match &*self.0 {
            TypeCodeBody::Struct(s) | TypeCodeBody::Except(s) => Ok(s.members.len()),
            TypeCodeBody::Union(u) => Ok(u.members.len()),
            TypeCodeBody::Enum { members, .. } => Ok(members.len()),
            TypeCodeBody::Value(v) => Ok(v.members.len()),
            _ => Err(self.bad_kind("member_count()")),
        }
    }

    pub fn member_name(&self, index: usize) -> Result<&str> {
        let name = match &*self.0 {
            TypeCodeBody::Struct(s) | TypeCodeBody::Except(s) => {
                s.members.get(index).map(|m| m.name.as_str())
            }
            TypeCodeBody::Union(u) => u.members.get(index).map(|m| m.name.as_str()),
            TypeCodeBody::Enum { members, .. } => members.get(index).map(String::as_str),
            TypeCodeBody::Value(v) => v.members.get(index).map(|m| m.name.as_str()),
            _ => return Err(self.bad_kind("member_name()")),
        };
        name.ok_or_else(|| CdrError::bad_param(format!("member index {} out of range", index)))
    }

    pub fn member_type(&self, index: usize) -> Result<TypeCode> {
        let tc = match &*self.0 {
            TypeCodeBody::Struct(s) | TypeCodeBody::Except(s) => {
                s.members.get(index).map(|m| m.member_type.clone())
            }
            TypeCodeBody::Union(u) => u.members.get(index).map(|m| m.member_type.clone()),
            TypeCodeBody::Value(v) => v.members.get(index).map(|m| m.member_type.clone()),
            _ => return Err(self.bad_kind("member_type()")),
        };
        tc.ok_or_else(|| CdrError::bad_param(format!("member index {} out of range", index)))
    }

    pub fn member_label(&self, index: usize) -> Result<UnionLabel> {
        match &*self.0 {
            TypeCodeBody::Union(u) => u
                .members
                .get(index)
                .map(|m| m.label)
                .ok_or_else(|| CdrError::bad_param(format!("member index {} out of range", index))),
            _ => Err(self.bad_kind("member_label()")),
        }
    }

    pub fn member_visibility(&self, index: usize) -> Result<i16> {
        match &*self.0 {
            TypeCodeBody::Value(v) => v
                .members
                .get(index)
                .map(|m| m.access)
                .ok_or_else(|| CdrError::bad_param(format!("member index {} out of range", index))),
            _ => Err(self.bad_kind("member_visibility()")),
        }
    }

    pub fn discriminator_type(&self) -> Result<TypeCode> {
        match &*self.0 {
            TypeCodeBody::Union(u) => Ok(u.discriminator.clone()),
            _ => Err(self.bad_kind("discriminator_type()")),
        }
    }

    pub fn default_index(&self) -> Result<i32> {
        match &*self.0 {
            TypeCodeBody::Union(u) => Ok(u.default_index()),
            _ => Err(self.bad_kind("default_index()")),
        }
    }

    /// Element type of sequences and arrays, aliased type of aliases, boxed
    /// type of value boxes.
    pub fn content_type(&self) -> Result<TypeCode> {
        match &*self.0 {
            TypeCodeBody::Sequence { element, .. } | TypeCodeBody::Array { element, .. } => {
                Ok(element.clone())
            }
            TypeCodeBody::Alias { original, .. } => Ok(original.clone()),
            TypeCodeBody::ValueBox { boxed, .. } => Ok(boxed.clone()),
            _ => Err(self.bad_kind("content_type()")),
        }
    }

    /// Bound of strings and sequences, length of arrays.
    pub fn length(&self) -> Result<u32> {
        match &*self.0 {
            TypeCodeBody::String { bound }
            | TypeCodeBody::WString { bound }
            | TypeCodeBody::Sequence { bound, .. } => Ok(*bound),
            TypeCodeBody::Array { length, .. } => Ok(*length),
            _ => Err(self.bad_kind("length()")),
        }
    }

    pub fn fixed_digits(&self) -> Result<u16> {
        match &*self.0 {
            TypeCodeBody::Fixed { digits, .. } => Ok(*digits),
            _ => Err(self.bad_kind("fixed_digits()")),
        }
    }

    pub fn fixed_scale(&self) -> Result<i16> {
        match &*self.0 {
            TypeCodeBody::Fixed { scale, .. } => Ok(*scale),
            _ => Err(self.bad_kind("fixed_scale()")),
        }
    }

    pub fn type_modifier(&self) -> Result<i16> {
        match &*self.0 {
            TypeCodeBody::Value(v) => Ok(v.modifier),
            _ => Err(self.bad_kind("type_modifier()")),
        }
    }

    pub fn concrete_base_type(&self) -> Result<Option<TypeCode>> {
        match &*self.0 {
            TypeCodeBody::Value(v) => Ok(v.concrete_base.clone()),
            _ => Err(self.bad_kind("concrete_base_type()")),
        }
    }

    /// Structural equality (CORBA `TypeCode::equal`).
    pub fn equal(&self, other: &TypeCode) -> bool {
        self == other
    }
}

impl PartialEq for TypeCode {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.body(), other.body()) {
            (TypeCodeBody::Basic(a), TypeCodeBody::Basic(b)) => a == b,
            (TypeCodeBody::String { bound: a }, TypeCodeBody::String { bound: b })
            | (TypeCodeBody::WString { bound: a }, TypeCodeBody::WString { bound: b }) => a == b,
            (
                TypeCodeBody::Fixed { digits: d1, scale: s1 },
                TypeCodeBody::Fixed { digits: d2, scale: s2 },
            ) => d1 == d2 && s1 == s2,
            (
                TypeCodeBody::Interface { kind: k1, id: i1, name: n1 },
                TypeCodeBody::Interface { kind: k2, id: i2, name: n2 },
            ) => k1 == k2 && i1 == i2 && n1 == n2,
            (TypeCodeBody::Struct(a), TypeCodeBody::Struct(b))
            | (TypeCodeBody::Except(a), TypeCodeBody::Except(b)) => {
                a.id == b.id
                    && a.name == b.name
                    && a.members.len() == b.members.len()
                    && a.members
                        .iter()
                        .zip(&b.members)
                        .all(|(x, y)| x.name == y.name && x.member_type == y.member_type)
            }
            (TypeCodeBody::Union(a), TypeCodeBody::Union(b)) => {
                a.id == b.id
                    && a.name == b.name
                    && a.discriminator == b.discriminator
                    && a.members.len() == b.members.len()
                    && a.members.iter().zip(&b.members).all(|(x, y)| {
                        x.label == y.label && x.name == y.name && x.member_type == y.member_type
                    })
            }
            (
                TypeCodeBody::Enum { id: i1, name: n1, members: m1 },
                TypeCodeBody::Enum { id: i2, name: n2, members: m2 },
            ) => i1 == i2 && n1 == n2 && m1 == m2,
            (
                TypeCodeBody::Sequence { element: e1, bound: b1 },
                TypeCodeBody::Sequence { element: e2, bound: b2 },
            ) => b1 == b2 && e1 == e2,
            (
                TypeCodeBody::Array { element: e1, length: l1 },
                TypeCodeBody::Array { element: e2, length: l2 },
            ) => l1 == l2 && e1 == e2,
            (
                TypeCodeBody::Alias { id: i1, name: n1, original: o1 },
                TypeCodeBody::Alias { id: i2, name: n2, original: o2 },
            )
            | (
                TypeCodeBody::ValueBox { id: i1, name: n1, boxed: o1 },
                TypeCodeBody::ValueBox { id: i2, name: n2, boxed: o2 },
            ) => i1 == i2 && n1 == n2 && o1 == o2,
            (TypeCodeBody::Value(a), TypeCodeBody::Value(b)) => {
                a.id == b.id
                    && a.name == b.name
                    && a.modifier == b.modifier
                    && a.concrete_base == b.concrete_base
                    && a.members.len() == b.members.len()
                    && a.members.iter().zip(&b.members).all(|(x, y)| {
                        x.name == y.name && x.access == y.access && x.member_type == y.member_type
                    })
            }
            // Placeholders compare by the id they point at; following them
            // would not terminate.
            (TypeCodeBody::Recursive(a), TypeCodeBody::Recursive(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl fmt::Debug for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Ok(id) if !id.is_empty() => write!(f, "{}({})", self.kind(), id),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

#[cfg(test)]
mod tests;
