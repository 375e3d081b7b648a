// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use giop_cdr::config::CodecConfig;
use giop_cdr::{Endian, GiopVersion, InputStream, OutputStream};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let version = match selector & 0x03 {
        0 => GiopVersion::V1_0,
        1 => GiopVersion::V1_1,
        _ => GiopVersion::V1_2,
    };
    let endian = if selector & 0x04 == 0 {
        Endian::Big
    } else {
        Endian::Little
    };
    let config = CodecConfig::builder().version(version).endian(endian).build();

    let mut input = InputStream::new(body, config.clone());
    if let Ok(any) = input.read_any() {
        let mut out = OutputStream::new(config);
        if out.write_any(&any).is_ok() {
            let _ = out.input().read_any();
        }
    }

    let mut input = InputStream::new(body, CodecConfig::default());
    let mut out = OutputStream::default();
    let _ = out.remarshal_any(&mut input);
});
