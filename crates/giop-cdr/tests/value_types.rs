// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Value type integration: sharing, custom marshalling, truncation and
// remarshalling through whole messages.

use giop_cdr::config::CodecConfig;
use giop_cdr::typecode::{VM_CUSTOM, VM_NONE, VM_TRUNCATABLE};
use giop_cdr::{
    AbstractInterface, CdrError, InputStream, OutputStream, Result, StructMember, TypeCode, Value,
    ValueMember, ValueReader, ValueRef, ValueWriter,
};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn point_type() -> TypeCode {
    TypeCode::value_tc(
        "IDL:Point:1.0",
        "Point",
        VM_CUSTOM,
        None,
        vec![
            ValueMember::private("x", TypeCode::short()),
            ValueMember::private("y", TypeCode::short()),
        ],
    )
}

/// Packs both coordinates of a point into one long.
struct PackedPoint;

impl ValueWriter for PackedPoint {
    fn write_state(&self, value: &ValueRef, out: &mut OutputStream) -> Result<()> {
        let state = value.state();
        match state.as_slice() {
            [Value::Short(x), Value::Short(y)] => {
                out.write_long((i32::from(*x) << 16) | i32::from(*y as u16))
            }
            _ => Err(CdrError::BadParam("point needs two shorts".into())),
        }
    }
}

impl ValueReader for PackedPoint {
    fn read_state(&self, _: &TypeCode, input: &mut InputStream<'_>) -> Result<Vec<Value>> {
        let packed = input.read_long()?;
        Ok(vec![
            Value::Short((packed >> 16) as i16),
            Value::Short(packed as i16),
        ])
    }
}

#[test]
fn test_custom_value_uses_installed_marshaller() {
    init_logging();
    let point = ValueRef::new(point_type(), vec![Value::Short(-3), Value::Short(4)]);

    let mut out = OutputStream::default();
    out.set_value_writer(Arc::new(PackedPoint));
    out.write_value(Some(&point)).unwrap();
    // chunked by default: tag, id, chunk length, packed state, end tag
    assert_eq!(&out.as_bytes()[0..4], &[0x7F, 0xFF, 0xFF, 0x0A]);
    assert_eq!(out.len(), 36);

    let mut input = out.input();
    input.set_value_reader(Arc::new(PackedPoint));
    let decoded = input.read_value(&point_type()).unwrap().unwrap();
    assert_eq!(*decoded.state(), vec![Value::Short(-3), Value::Short(4)]);
    assert_eq!(input.remaining(), 0);
}

#[test]
fn test_custom_value_chunking_can_be_disabled() {
    let point = ValueRef::new(point_type(), vec![Value::Short(1), Value::Short(2)]);
    let config = CodecConfig::builder().chunk_custom_values(false).build();
    let mut out = OutputStream::new(config);
    out.write_value(Some(&point)).unwrap();
    assert_eq!(&out.as_bytes()[0..4], &[0x7F, 0xFF, 0xFF, 0x02]);
    assert_eq!(out.len(), 26);

    let decoded = out.input().read_value(&point_type()).unwrap().unwrap();
    assert_eq!(*decoded.state(), vec![Value::Short(1), Value::Short(2)]);
}

#[test]
fn test_shared_boxes_survive_remarshal() {
    init_logging();
    let name = TypeCode::value_box("IDL:Name:1.0", "Name", TypeCode::string(0));
    let roster = TypeCode::struct_tc(
        "IDL:Roster:1.0",
        "Roster",
        vec![
            StructMember::new("first", name.clone()),
            StructMember::new("second", name.clone()),
            StructMember::new("third", name.clone()),
        ],
    );
    let shared = ValueRef::boxed(name.clone(), Value::from("ada"));
    let value = Value::Struct(vec![
        Value::Value(Some(shared.clone())),
        Value::Value(None),
        Value::Value(Some(shared)),
    ]);

    let mut src = OutputStream::default();
    src.write_typed(&roster, &value).unwrap();
    let mut dst = OutputStream::default();
    dst.remarshal(&roster, &mut src.input()).unwrap();
    assert_eq!(dst.as_bytes(), src.as_bytes());

    let decoded = dst.input().read_typed(&roster).unwrap();
    let members = decoded.as_slice().unwrap();
    let first = members[0].as_value_ref().unwrap();
    let third = members[2].as_value_ref().unwrap();
    assert!(first.ptr_eq(third));
    assert_eq!(members[1], Value::Value(None));
    assert_eq!(*first.state(), vec![Value::from("ada")]);
}

#[test]
fn test_truncated_value_inside_struct_keeps_stream_in_sync() {
    init_logging();
    let base = TypeCode::value_tc(
        "IDL:Shape:1.0",
        "Shape",
        VM_NONE,
        None,
        vec![ValueMember::public("sides", TypeCode::ushort())],
    );
    let derived = TypeCode::value_tc(
        "IDL:Polygon:1.0",
        "Polygon",
        VM_TRUNCATABLE,
        Some(base.clone()),
        vec![ValueMember::public(
            "points",
            TypeCode::sequence(TypeCode::double(), 0),
        )],
    );
    let polygon = ValueRef::new(
        derived,
        vec![
            Value::UShort(3),
            Value::Sequence(vec![Value::Double(0.0), Value::Double(1.0)]),
        ],
    );
    let sender = TypeCode::struct_tc(
        "IDL:Msg:1.0",
        "Msg",
        vec![
            StructMember::new("shape", base.clone()),
            StructMember::new("trailer", TypeCode::string(0)),
        ],
    );
    let mut out = OutputStream::default();
    out.write_typed(
        &sender,
        &Value::Struct(vec![Value::Value(Some(polygon)), Value::from("end")]),
    )
    .unwrap();

    let decoded = out.input().read_typed(&sender).unwrap();
    let members = decoded.as_slice().unwrap();
    let shape = members[0].as_value_ref().unwrap();
    assert_eq!(shape.type_code().id().unwrap(), "IDL:Shape:1.0");
    assert_eq!(*shape.state(), vec![Value::UShort(3)]);
    assert_eq!(members[1], Value::from("end"));
}

#[test]
fn test_abstract_interface_value_needs_registered_type() {
    let point = ValueRef::new(point_type(), vec![Value::Short(5), Value::Short(6)]);
    let mut out = OutputStream::default();
    out.write_abstract_interface(&AbstractInterface::Value(Some(point)))
        .unwrap();

    assert!(matches!(
        out.input().read_abstract_interface(None),
        Err(CdrError::Malformed { .. })
    ));

    let mut input = out.input();
    input.register_value_type(point_type()).unwrap();
    match input.read_abstract_interface(None).unwrap() {
        AbstractInterface::Value(Some(v)) => {
            assert_eq!(v.type_code().id().unwrap(), "IDL:Point:1.0");
            assert_eq!(*v.state(), vec![Value::Short(5), Value::Short(6)]);
        }
        other => panic!("expected a value, got {:?}", other),
    }
}
