// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use giop_cdr::typecode::{VM_NONE, VM_TRUNCATABLE};
use giop_cdr::{InputStream, TypeCode, ValueMember};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
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
        vec![
            ValueMember::public("name", TypeCode::string(0)),
            ValueMember::public("next", TypeCode::recursive("IDL:Derived:1.0")),
        ],
    );

    let mut input = InputStream::with_version(data, giop_cdr::GiopVersion::V1_2);
    let _ = input.register_value_type(derived);
    while input.remaining() > 0 {
        if input.read_value(&base).is_err() {
            break;
        }
    }
});
