// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # giop-cdr - CORBA CDR encoding for GIOP 1.0 to 1.2
//!
//! Marshals IDL data into Common Data Representation octet streams and back:
//! primitives with natural alignment, strings through negotiated code sets,
//! TypeCodes with recursion and indirection, `any`, fixed-point decimals,
//! object references, and value types with chunking, truncation and sharing.
//!
//! ## Quick Start
//!
//! ```rust
//! use giop_cdr::config::CodecConfig;
//! use giop_cdr::{GiopVersion, InputStream, OutputStream};
//!
//! let config = CodecConfig::builder().version(GiopVersion::V1_2).build();
//! let mut out = OutputStream::new(config.clone());
//! out.write_string("hello").unwrap();
//! out.write_double(2.5).unwrap();
//!
//! let mut input = InputStream::new(out.as_bytes(), config);
//! assert_eq!(input.read_string().unwrap(), "hello");
//! assert_eq!(input.read_double().unwrap(), 2.5);
//! ```
//!
//! ## Layers
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  marshal     CdrEncode / CdrDecode for host types                   |
//! +---------------------------------------------------------------------+
//! |  any         TypeCode-directed values, remarshal between streams    |
//! |  valuetype   value state through ValueWriter / ValueReader          |
//! +---------------------------------------------------------------------+
//! |  encoder     OutputStream: alignment, chunks, encapsulations        |
//! |  decoder     InputStream: bounds, indirection tables, truncation    |
//! +---------------------------------------------------------------------+
//! |  buffer      growable / borrowed octet buffers, byte order          |
//! |  codeset     narrow and wide character conversion                   |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OutputStream`] | Growable CDR encoder |
//! | [`InputStream`] | Bounds-checked CDR decoder over borrowed bytes |
//! | [`TypeCode`] | Runtime description of an IDL type |
//! | [`Any`] | A TypeCode paired with a [`Value`] |
//! | [`CodecConfig`] | GIOP version, byte order and code sets of a stream |

pub mod align;
pub mod buffer;
pub mod codeset;
pub mod config;
pub mod deadline;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fixed;
pub mod indirection;
pub mod marshal;
pub mod typecode;
pub mod value;
pub mod valuetype;
pub mod version;

pub use buffer::Endian;
pub use config::CodecConfig;
pub use deadline::{Deadline, Timeout};
pub use decoder::{Encapsulation, InputStream};
pub use encoder::{OutputStream, PendingLength};
pub use error::{CdrError, Result};
pub use fixed::Fixed;
pub use marshal::{CdrDecode, CdrEncode};
pub use typecode::{
    StructMember, TCKind, TypeCode, UnionLabel, UnionMember, ValueMember,
};
pub use value::{AbstractInterface, Any, Ior, TaggedProfile, Value, ValueRef};
pub use valuetype::{TypeCodeDriven, ValueReader, ValueWriter};
pub use version::GiopVersion;
