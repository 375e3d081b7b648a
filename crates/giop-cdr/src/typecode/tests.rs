// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode model tests.

use super::*;

fn point() -> TypeCode {
    TypeCode::build_struct("IDL:Point:1.0", "Point")
        .member("x", TypeCode::long())
        .member("y", TypeCode::long())
        .build()
}

#[test]
fn test_struct_accessors() {
    let tc = point();
    assert_eq!(tc.kind(), TCKind::Struct);
    assert_eq!(tc.id().unwrap(), "IDL:Point:1.0");
    assert_eq!(tc.name().unwrap(), "Point");
    assert_eq!(tc.member_count().unwrap(), 2);
    assert_eq!(tc.member_name(1).unwrap(), "y");
    assert_eq!(tc.member_type(0).unwrap().kind(), TCKind::Long);
    assert!(matches!(tc.member_name(2), Err(CdrError::BadParam(_))));
    assert!(matches!(tc.length(), Err(CdrError::BadParam(_))));
}

#[test]
fn test_basic_kinds_have_no_id() {
    let tc = TypeCode::long();
    assert!(tc.id().is_err());
    assert_eq!(tc.to_string(), "tk_long");
    assert!(TypeCode::basic(TCKind::Struct).is_err());
    assert_eq!(TypeCode::basic(TCKind::WChar).unwrap().kind(), TCKind::WChar);
}

#[test]
fn test_recursive_struct_binds_placeholder() {
    let node = TypeCode::build_struct("IDL:Node:1.0", "Node")
        .member("value", TypeCode::long())
        .recursive_sequence_member("children")
        .build();

    let seq = node.member_type(1).unwrap();
    let placeholder = seq.content_type().unwrap();
    assert!(placeholder.is_recursive());
    assert_eq!(placeholder.kind(), TCKind::Struct);
    assert!(placeholder.resolve().unwrap().ptr_eq(&node));
}

#[test]
fn test_unbound_placeholder_fails_to_resolve() {
    let dangling = TypeCode::recursive("IDL:Missing:1.0");
    assert_eq!(dangling.kind(), TCKind::Null);
    assert!(matches!(
        dangling.resolve(),
        Err(CdrError::InvalidTypeCode(_))
    ));
}

#[test]
fn test_placeholder_binds_through_nested_struct() {
    // struct Outer { struct Inner { sequence<Outer> back; } inner; };
    let inner = TypeCode::struct_tc(
        "IDL:Inner:1.0",
        "Inner",
        vec![(
            "back",
            TypeCode::sequence(TypeCode::recursive("IDL:Outer:1.0"), 0),
        )
            .into()],
    );
    let placeholder = inner.member_type(0).unwrap().content_type().unwrap();
    assert!(placeholder.resolve().is_err());

    let outer = TypeCode::struct_tc("IDL:Outer:1.0", "Outer", vec![("inner", inner).into()]);
    assert!(placeholder.resolve().unwrap().ptr_eq(&outer));
}

#[test]
fn test_origin_strips_aliases() {
    let inner = TypeCode::alias("IDL:Meters:1.0", "Meters", TypeCode::double());
    let outer = TypeCode::alias("IDL:Distance:1.0", "Distance", inner);
    assert_eq!(outer.kind(), TCKind::Alias);
    assert_eq!(outer.origin().unwrap().kind(), TCKind::Double);
}

#[test]
fn test_structural_equality() {
    assert_eq!(point(), point());
    assert!(!point().ptr_eq(&point()));
    assert!(point().equal(&point()));

    let other = TypeCode::build_struct("IDL:Point:1.0", "Point")
        .member("x", TypeCode::long())
        .member("y", TypeCode::short())
        .build();
    assert_ne!(point(), other);
    assert_ne!(TypeCode::string(0), TypeCode::string(8));
    assert_eq!(TypeCode::sequence(TypeCode::octet(), 4), TypeCode::sequence(TypeCode::octet(), 4));
}

#[test]
fn test_union_default_index_and_member_lookup() {
    let tc = TypeCode::union_tc(
        "IDL:U:1.0",
        "U",
        TypeCode::short(),
        vec![
            UnionMember::new(1, "a", TypeCode::long()),
            UnionMember::default_case("d", TypeCode::string(0)),
            UnionMember::new(2, "b", TypeCode::double()),
        ],
    )
    .unwrap();
    assert_eq!(tc.default_index().unwrap(), 1);
    assert_eq!(tc.member_label(2).unwrap(), UnionLabel::Value(2));

    let TypeCodeBody::Union(u) = tc.body() else {
        panic!("not a union");
    };
    assert_eq!(u.member_for(2).map(|(i, _)| i), Some(2));
    assert_eq!(u.member_for(7).map(|(i, _)| i), Some(1));
}

#[test]
fn test_union_rejects_bad_discriminator() {
    let err = TypeCode::union_tc("IDL:U:1.0", "U", TypeCode::double(), Vec::new()).unwrap_err();
    assert!(matches!(err, CdrError::BadParam(_)));

    let err = TypeCode::union_tc(
        "IDL:U:1.0",
        "U",
        TypeCode::long(),
        vec![
            UnionMember::default_case("a", TypeCode::long()),
            UnionMember::default_case("b", TypeCode::long()),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, CdrError::BadParam(_)));
}

#[test]
fn test_value_type_accessors() {
    let base = TypeCode::value_tc(
        "IDL:Base:1.0",
        "Base",
        VM_NONE,
        None,
        vec![ValueMember::public("id", TypeCode::long())],
    );
    let derived = TypeCode::value_tc(
        "IDL:Derived:1.0",
        "Derived",
        VM_TRUNCATABLE,
        Some(base.clone()),
        vec![ValueMember::private("extra", TypeCode::string(0))],
    );
    assert_eq!(derived.type_modifier().unwrap(), VM_TRUNCATABLE);
    assert!(derived.concrete_base_type().unwrap().unwrap().ptr_eq(&base));
    assert_eq!(derived.member_visibility(0).unwrap(), PRIVATE_MEMBER);
    assert_eq!(TypeCode::value_base().type_modifier().unwrap(), VM_ABSTRACT);
}
