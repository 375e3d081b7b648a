// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode constructors and fluent builders.
//!
//! Constructors of types that may be the target of a recursive reference
//! (struct, exception, union, value) bind every matching, still unbound
//! [`TypeCode::recursive`] placeholder found among their members.

use super::{
    RecursiveRef, StructMember, StructType, TCKind, TypeCode, TypeCodeBody, UnionLabel,
    UnionMember, UnionType, ValueMember, ValueType, VM_ABSTRACT,
};
use crate::config::VALUE_BASE_ID;
use crate::error::{CdrError, Result};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock, Weak};

/// Generate constructors for parameterless kinds.
macro_rules! basic_ctor {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $name() -> TypeCode {
                TypeCode::from_body(TypeCodeBody::Basic(TCKind::$kind))
            }
        )*
    };
}

impl TypeCode {
    basic_ctor! {
        null => Null,
        void => Void,
        short => Short,
        long => Long,
        ushort => UShort,
        ulong => ULong,
        float => Float,
        double => Double,
        boolean => Boolean,
        char => Char,
        octet => Octet,
        any => Any,
        type_code => TypeCode,
        principal => Principal,
        longlong => LongLong,
        ulonglong => ULongLong,
        longdouble => LongDouble,
        wchar => WChar,
    }

    /// Parameterless TypeCode for `kind`.
    pub fn basic(kind: TCKind) -> Result<TypeCode> {
        if !kind.is_basic() {
            return Err(CdrError::bad_param(format!("{} takes parameters", kind)));
        }
        Ok(TypeCode::from_body(TypeCodeBody::Basic(kind)))
    }

    /// Bounded string; 0 = unbounded.
    pub fn string(bound: u32) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::String { bound })
    }

    pub fn wstring(bound: u32) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::WString { bound })
    }

    pub fn fixed(digits: u16, scale: i16) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::Fixed { digits, scale })
    }

    pub fn objref(id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        Self::interface(TCKind::Objref, id, name)
    }

    pub fn abstract_interface(id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        Self::interface(TCKind::AbstractInterface, id, name)
    }

    pub fn native(id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        Self::interface(TCKind::Native, id, name)
    }

    pub fn local_interface(id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        Self::interface(TCKind::LocalInterface, id, name)
    }

    fn interface(kind: TCKind, id: impl Into<String>, name: impl Into<String>) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::Interface {
            kind,
            id: id.into(),
            name: name.into(),
        })
    }

    pub fn struct_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        members: Vec<StructMember>,
    ) -> TypeCode {
        let id = id.into();
        let name = name.into();
        Self::cyclic(|weak| {
            for m in &members {
                bind_recursive(&m.member_type, &id, weak);
            }
            TypeCodeBody::Struct(StructType { id, name, members })
        })
    }

    pub fn exception_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        members: Vec<StructMember>,
    ) -> TypeCode {
        let id = id.into();
        let name = name.into();
        Self::cyclic(|weak| {
            for m in &members {
                bind_recursive(&m.member_type, &id, weak);
            }
            TypeCodeBody::Except(StructType { id, name, members })
        })
    }

    /// Union TypeCode. The discriminator must resolve to an integer,
    /// boolean, character or enum kind; at most one member may be the
    /// default case.
    pub fn union_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        discriminator: TypeCode,
        members: Vec<UnionMember>,
    ) -> Result<TypeCode> {
        let disc_kind = discriminator.origin()?.kind();
        if !disc_kind.is_discriminator() {
            return Err(CdrError::bad_param(format!(
                "{} is not a legal union discriminator",
                disc_kind
            )));
        }
        let defaults = members
            .iter()
            .filter(|m| m.label == UnionLabel::Default)
            .count();
        if defaults > 1 {
            return Err(CdrError::bad_param("union has more than one default member"));
        }
        let id = id.into();
        let name = name.into();
        Ok(Self::cyclic(|weak| {
            for m in &members {
                bind_recursive(&m.member_type, &id, weak);
            }
            TypeCodeBody::Union(UnionType {
                id,
                name,
                discriminator,
                members,
            })
        }))
    }

    pub fn enum_tc<I, S>(id: impl Into<String>, name: impl Into<String>, members: I) -> TypeCode
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeCode::from_body(TypeCodeBody::Enum {
            id: id.into(),
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        })
    }

    /// Sequence; bound 0 = unbounded.
    pub fn sequence(element: TypeCode, bound: u32) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::Sequence { element, bound })
    }

    pub fn array(element: TypeCode, length: u32) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::Array { element, length })
    }

    pub fn alias(id: impl Into<String>, name: impl Into<String>, original: TypeCode) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::Alias {
            id: id.into(),
            name: name.into(),
            original,
        })
    }

    pub fn value_box(id: impl Into<String>, name: impl Into<String>, boxed: TypeCode) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::ValueBox {
            id: id.into(),
            name: name.into(),
            boxed,
        })
    }

    pub fn value_tc(
        id: impl Into<String>,
        name: impl Into<String>,
        modifier: i16,
        concrete_base: Option<TypeCode>,
        members: Vec<ValueMember>,
    ) -> TypeCode {
        let id = id.into();
        let name = name.into();
        Self::cyclic(|weak| {
            for m in &members {
                bind_recursive(&m.member_type, &id, weak);
            }
            TypeCodeBody::Value(ValueType {
                id,
                name,
                modifier,
                concrete_base,
                members,
            })
        })
    }

    /// `CORBA::ValueBase`: abstract, no state.
    pub fn value_base() -> TypeCode {
        Self::value_tc(VALUE_BASE_ID, "ValueBase", VM_ABSTRACT, None, Vec::new())
    }

    /// Placeholder for the enclosing type with repository id `id`.
    ///
    /// Bound when that type is constructed; resolving it before then fails.
    pub fn recursive(id: impl Into<String>) -> TypeCode {
        TypeCode::from_body(TypeCodeBody::Recursive(RecursiveRef {
            id: id.into(),
            target: OnceLock::new(),
        }))
    }

    /// Fluent builder for a struct TypeCode.
    pub fn build_struct(id: impl Into<String>, name: impl Into<String>) -> StructBuilder {
        StructBuilder {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    fn cyclic(build: impl FnOnce(&Weak<TypeCodeBody>) -> TypeCodeBody) -> TypeCode {
        TypeCode(Arc::new_cyclic(build))
    }
}

/// Bind unbound placeholders for `id` reachable from `tc` without crossing
/// another placeholder. Shared sub-TypeCodes are visited once.
fn bind_recursive(tc: &TypeCode, id: &str, target: &Weak<TypeCodeBody>) {
    bind_recursive_in(tc, id, target, &mut HashSet::new());
}

fn bind_recursive_in(
    tc: &TypeCode,
    id: &str,
    target: &Weak<TypeCodeBody>,
    seen: &mut HashSet<usize>,
) {
    if !seen.insert(tc.identity()) {
        return;
    }
    match tc.body() {
        TypeCodeBody::Recursive(r) => {
            if r.id == id && !r.is_bound() {
                r.bind(target);
            }
        }
        TypeCodeBody::Sequence { element, .. } | TypeCodeBody::Array { element, .. } => {
            bind_recursive_in(element, id, target, seen);
        }
        TypeCodeBody::Alias { original, .. } => bind_recursive_in(original, id, target, seen),
        TypeCodeBody::ValueBox { boxed, .. } => bind_recursive_in(boxed, id, target, seen),
        TypeCodeBody::Struct(s) | TypeCodeBody::Except(s) => {
            for m in &s.members {
                bind_recursive_in(&m.member_type, id, target, seen);
            }
        }
        TypeCodeBody::Union(u) => {
            for m in &u.members {
                bind_recursive_in(&m.member_type, id, target, seen);
            }
        }
        TypeCodeBody::Value(v) => {
            for m in &v.members {
                bind_recursive_in(&m.member_type, id, target, seen);
            }
        }
        _ => {}
    }
}

/// Builder for struct TypeCodes.
#[derive(Debug)]
pub struct StructBuilder {
    id: String,
    name: String,
    members: Vec<StructMember>,
}

impl StructBuilder {
    /// Add a member.
    pub fn member(mut self, name: impl Into<String>, member_type: TypeCode) -> Self {
        self.members.push(StructMember::new(name, member_type));
        self
    }

    /// Add an unbounded `sequence<T>` member.
    pub fn sequence_member(self, name: impl Into<String>, element: TypeCode) -> Self {
        self.member(name, TypeCode::sequence(element, 0))
    }

    /// Add a `sequence<Self>` member referring back to the struct being built.
    pub fn recursive_sequence_member(self, name: impl Into<String>) -> Self {
        let placeholder = TypeCode::recursive(self.id.clone());
        self.sequence_member(name, placeholder)
    }

    /// Build the TypeCode.
    pub fn build(self) -> TypeCode {
        TypeCode::struct_tc(self.id, self.name, self.members)
    }
}
