// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::codeset::Utf8;
use crate::indirection;
use crate::typecode::{StructMember, TypeCode, UnionMember, VM_NONE};
use std::time::Instant;

fn stream(version: GiopVersion) -> OutputStream {
    OutputStream::with_version(version)
}

fn read_i32_be(bytes: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[test]
fn test_string_layout() {
    let mut out = stream(GiopVersion::V1_0);
    out.write_string("hi").unwrap();
    assert_eq!(out.as_bytes(), &[0x00, 0x00, 0x00, 0x03, 0x68, 0x69, 0x00]);
}

#[test]
fn test_string_through_utf8_code_set() {
    let config = CodecConfig::builder().narrow_codeset(Arc::new(Utf8)).build();
    let mut out = OutputStream::new(config);
    out.write_string("é").unwrap();
    assert_eq!(out.as_bytes(), &[0, 0, 0, 3, 0xC3, 0xA9, 0]);
}

#[test]
fn test_char_outside_latin1_rejected() {
    let mut out = OutputStream::default();
    assert!(matches!(
        out.write_char('€'),
        Err(CdrError::UnsupportedEncoding { .. })
    ));
}

#[test]
fn test_mixed_primitives_align_from_base() {
    let mut out = OutputStream::default();
    out.write_octet(1).unwrap();
    out.write_short(-1).unwrap();
    out.write_double(1.0).unwrap();
    assert_eq!(
        out.as_bytes(),
        &[1, 0, 0xFF, 0xFF, 0, 0, 0, 0, 0x3F, 0xF0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_little_endian_stream() {
    let config = CodecConfig::builder().endian(Endian::Little).build();
    let mut out = OutputStream::new(config);
    out.write_ulong(0x0102_0304).unwrap();
    assert_eq!(out.as_bytes(), &[4, 3, 2, 1]);
}

#[test]
fn test_basic_typecode_is_bare_kind() {
    let mut out = OutputStream::default();
    out.write_typecode(&TypeCode::long()).unwrap();
    assert_eq!(out.as_bytes(), &[0x00, 0x00, 0x00, 0x03]);
}

#[test]
fn test_union_typecode_default_label_placeholder() {
    let tc = TypeCode::union_tc(
        "IDL:U:1.0",
        "U",
        TypeCode::short(),
        vec![
            UnionMember::new(1, "a", TypeCode::long()),
            UnionMember::default_case("d", TypeCode::octet()),
        ],
    )
    .unwrap();
    let mut out = OutputStream::default();
    out.write_typecode(&tc).unwrap();
    let bytes = out.as_bytes();

    assert_eq!(bytes.len(), 80);
    assert_eq!(&bytes[0..4], &[0, 0, 0, 16]);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 72]);
    // discriminator tk_short, default index 1, two members
    assert_eq!(&bytes[36..48], &[0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2]);
    assert_eq!(&bytes[48..50], &[0, 1]);
    // the default member's label is a zero short
    assert_eq!(&bytes[64..66], &[0, 0]);
}

#[test]
fn test_repeated_typecode_is_indirected() {
    let e = TypeCode::enum_tc("IDL:E:1.0", "E", ["A"]);
    let tc = TypeCode::struct_tc(
        "IDL:P:1.0",
        "P",
        vec![
            StructMember::new("a", e.clone()),
            StructMember::new("b", e.clone()),
        ],
    );
    let mut out = OutputStream::default();
    out.write_typecode(&tc).unwrap();
    let bytes = out.as_bytes();
    let len = bytes.len();

    assert_eq!(&bytes[len - 8..len - 4], &[0xFF, 0xFF, 0xFF, 0xFF]);
    let field = len - 4;
    let offset = read_i32_be(bytes, field);
    assert!(offset < 0);
    let target = indirection::indirection_target(field, offset).unwrap();
    assert_eq!(&bytes[target..target + 4], &[0, 0, 0, 17]);

    // A second top-level call starts a fresh table.
    let before = out.len();
    out.write_typecode(&e).unwrap();
    assert_eq!(&out.as_bytes()[before..before + 4], &[0, 0, 0, 17]);
}

#[test]
fn test_recursive_typecode_ends_in_indirection_to_itself() {
    let node = TypeCode::build_struct("IDL:Node:1.0", "Node")
        .recursive_sequence_member("children")
        .build();
    let mut out = OutputStream::default();
    out.write_typecode(&node).unwrap();
    let bytes = out.as_bytes();
    let len = bytes.len();

    // ... element indirection, then the sequence bound
    assert_eq!(&bytes[len - 12..len - 8], &[0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(&bytes[len - 4..], &[0, 0, 0, 0]);
    let field = len - 8;
    let target = indirection::indirection_target(field, read_i32_be(bytes, field)).unwrap();
    assert_eq!(target, 0);
}

#[test]
fn test_deadline_fires_once() {
    let mut out = OutputStream::default();
    out.set_deadline(Instant::now());
    assert_eq!(out.write_long(1), Err(CdrError::Timeout));
    out.write_long(2).unwrap();
    assert_eq!(out.as_bytes(), &[0, 0, 0, 2]);
}

#[test]
fn test_deadline_not_polled_without_growth() {
    let mut out = OutputStream::default();
    out.set_deadline(crate::deadline::Timeout::after(std::time::Duration::from_secs(3600)));
    out.write_long(1).unwrap();
    out.clear_deadline();
    out.write_long(2).unwrap();
    assert_eq!(out.len(), 8);
}

#[test]
fn test_header_complete_aligns_next_write() {
    let mut out = stream(GiopVersion::V1_2);
    out.write_octet_array(&[0u8; 12]).unwrap();
    out.mark_header_complete();
    out.write_octet(7).unwrap();
    assert_eq!(out.len(), 17);
    assert_eq!(out.as_bytes()[16], 7);

    let mut out = stream(GiopVersion::V1_0);
    out.write_octet_array(&[0u8; 12]).unwrap();
    out.mark_header_complete();
    out.write_octet(7).unwrap();
    assert_eq!(out.len(), 13);
}

#[test]
fn test_chunked_value_layout() {
    let mut out = OutputStream::default();
    let tag_pos = out.begin_value(&["IDL:V:1.0"], true).unwrap();
    out.write_long(5).unwrap();
    out.end_value().unwrap();

    assert_eq!(tag_pos, 0);
    let mut expected = vec![0x7F, 0xFF, 0xFF, 0x0A, 0, 0, 0, 10];
    expected.extend_from_slice(b"IDL:V:1.0\0");
    expected.extend_from_slice(&[0, 0]);
    expected.extend_from_slice(&[0, 0, 0, 4]);
    expected.extend_from_slice(&[0, 0, 0, 5]);
    expected.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(out.as_bytes(), expected.as_slice());
}

#[test]
fn test_nested_value_closes_chunk_and_uses_deeper_end_tag() {
    let mut out = OutputStream::default();
    out.begin_value(&["IDL:Outer:1.0"], true).unwrap();
    out.write_long(1).unwrap();
    out.begin_value(&[], false).unwrap();
    out.write_long(2).unwrap();
    out.end_value().unwrap();
    out.end_value().unwrap();

    let bytes = out.as_bytes();
    let len = bytes.len();
    // inner end tag -2, then outer end tag -1
    assert_eq!(read_i32_be(bytes, len - 8), -2);
    assert_eq!(read_i32_be(bytes, len - 4), -1);
}

#[test]
fn test_end_value_without_begin_is_bad_param() {
    let mut out = OutputStream::default();
    assert!(matches!(out.end_value(), Err(CdrError::BadParam(_))));
}

#[test]
fn test_shared_values_and_repository_ids_are_indirected() {
    let tc = TypeCode::value_tc("IDL:V:1.0", "V", VM_NONE, None, Vec::new());
    let first = ValueRef::new(tc.clone(), Vec::new());
    let second = ValueRef::new(tc, Vec::new());

    let mut out = OutputStream::default();
    out.write_value(Some(&first)).unwrap();
    out.write_value(Some(&second)).unwrap();
    out.write_value(Some(&first)).unwrap();
    out.write_value(None).unwrap();
    let bytes = out.as_bytes();

    assert_eq!(&bytes[0..4], &[0x7F, 0xFF, 0xFF, 0x02]);
    assert_eq!(&bytes[20..24], &[0x7F, 0xFF, 0xFF, 0x02]);
    // repository id of the second value points at the first one's
    assert_eq!(&bytes[24..28], &[0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(read_i32_be(bytes, 28), -24);
    // the first value again
    assert_eq!(&bytes[32..36], &[0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(read_i32_be(bytes, 36), -36);
    assert_eq!(&bytes[40..44], &[0, 0, 0, 0]);
    assert_eq!(bytes.len(), 44);
}

#[test]
fn test_wchar_layout_per_version() {
    let mut out = stream(GiopVersion::V1_2);
    out.write_wchar('A').unwrap();
    assert_eq!(out.as_bytes(), &[2, 0x00, 0x41]);

    let mut out = stream(GiopVersion::V1_0);
    out.write_octet(9).unwrap();
    out.write_wchar('A').unwrap();
    assert_eq!(out.as_bytes(), &[9, 0, 0x00, 0x41]);

    let mut out = stream(GiopVersion::V1_1);
    assert!(matches!(
        out.write_wchar('\u{1F600}'),
        Err(CdrError::UnsupportedEncoding { .. })
    ));
}

#[test]
fn test_wstring_1_1_follows_the_wchar_rule() {
    let mut out = stream(GiopVersion::V1_1);
    out.write_wstring("\u{E9}").unwrap();
    assert_eq!(out.as_bytes(), &[0, 0, 0, 2, 0, 0xE9, 0, 0]);

    let mut out = stream(GiopVersion::V1_1);
    assert!(matches!(
        out.write_wstring("a\u{1F600}"),
        Err(CdrError::UnsupportedEncoding { code: 0x1F600, .. })
    ));
    assert!(out.as_bytes().is_empty());

    let mut out = stream(GiopVersion::V1_2);
    out.write_wstring("\u{1F600}").unwrap();
    assert_eq!(out.as_bytes(), &[0, 0, 0, 4, 0xD8, 0x3D, 0xDE, 0x00]);
}

#[test]
fn test_wstring_layout_per_version() {
    let mut out = stream(GiopVersion::V1_2);
    out.write_wstring("Hi").unwrap();
    assert_eq!(out.as_bytes(), &[0, 0, 0, 4, 0, 0x48, 0, 0x69]);

    let mut out = stream(GiopVersion::V1_1);
    out.write_wstring("Hi").unwrap();
    assert_eq!(out.as_bytes(), &[0, 0, 0, 3, 0, 0x48, 0, 0x69, 0, 0]);

    let config = CodecConfig::builder()
        .version(GiopVersion::V1_1)
        .endian(Endian::Little)
        .build();
    let mut out = OutputStream::new(config);
    out.write_wstring("Hi").unwrap();
    assert_eq!(out.as_bytes(), &[3, 0, 0, 0, 0x48, 0, 0x69, 0, 0, 0]);
}

#[test]
fn test_wstring_1_2_is_big_endian_in_little_endian_stream() {
    let config = CodecConfig::builder().endian(Endian::Little).build();
    let mut out = OutputStream::new(config);
    out.write_wstring("A").unwrap();
    assert_eq!(out.as_bytes(), &[2, 0, 0, 0, 0x00, 0x41]);
}

#[test]
fn test_nil_object_reference() {
    let mut out = OutputStream::default();
    out.write_object(None).unwrap();
    assert_eq!(out.as_bytes(), &[0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_object_reference_profiles() {
    let ior = Ior::new(
        "IDL:X:1.0",
        vec![crate::value::TaggedProfile {
            tag: 0,
            data: vec![1, 2],
        }],
    );
    let mut out = OutputStream::default();
    out.write_object(Some(&ior)).unwrap();
    let bytes = out.as_bytes();
    // "IDL:X:1.0" is 10 bytes with its NUL: profile count lands at 16
    assert_eq!(&bytes[16..20], &[0, 0, 0, 1]);
    assert_eq!(&bytes[20..24], &[0, 0, 0, 0]);
    assert_eq!(&bytes[24..30], &[0, 0, 0, 2, 1, 2]);
}

#[test]
fn test_fixed_at_own_digit_count() {
    let mut out = OutputStream::default();
    out.write_fixed(&"-12.5".parse().unwrap()).unwrap();
    assert_eq!(out.as_bytes(), &[0x01, 0x25, 0x0D]);
}

#[test]
fn test_bulk_arrays() {
    let mut out = OutputStream::default();
    out.write_octet(0).unwrap();
    out.write_ushort_array(&[1, 2]).unwrap();
    out.write_long_array(&[-1]).unwrap();
    out.write_boolean_array(&[true, false]).unwrap();
    assert_eq!(
        out.as_bytes(),
        &[0, 0, 0, 1, 0, 2, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 1, 0]
    );
}

#[test]
fn test_encapsulation_aligns_from_flag() {
    let mut out = OutputStream::default();
    out.write_octet(1).unwrap();
    {
        let mut enc = out.begin_encapsulation().unwrap();
        enc.write_short(2).unwrap();
        assert_eq!(enc.body_len(), 4);
    }
    // octet, 3 pad, length 4, flag, 1 pad, short
    assert_eq!(out.as_bytes(), &[1, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 2]);
    // base restored: the next long aligns from the message start
    out.write_long(3).unwrap();
    assert_eq!(&out.as_bytes()[12..16], &[0, 0, 0, 3]);
}

#[test]
fn test_remarshal_self_containing_struct_is_malformed() {
    let tc = TypeCode::build_struct("IDL:Loop:1.0", "Loop")
        .member("next", TypeCode::recursive("IDL:Loop:1.0"))
        .build();
    let mut input = InputStream::with_version(&[], GiopVersion::V1_2);
    let mut out = stream(GiopVersion::V1_2);
    assert!(matches!(
        out.remarshal(&tc, &mut input),
        Err(CdrError::Malformed { .. })
    ));
}

#[test]
fn test_remarshal_oversized_null_array_is_malformed() {
    let mut src = stream(GiopVersion::V1_2);
    src.write_typecode(&TypeCode::array(TypeCode::null(), 10_000_000))
        .unwrap();
    let mut out = stream(GiopVersion::V1_2);
    assert!(matches!(
        out.remarshal_any(&mut src.input()),
        Err(CdrError::Malformed { .. })
    ));
}
