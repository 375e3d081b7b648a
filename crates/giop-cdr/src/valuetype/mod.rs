// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value type state collaborators.
//!
//! The streams own the value framing (tags, repository ids, chunks, end
//! tags, indirections). What goes between the header and the end tag is
//! delegated to a [`ValueWriter`] on output and a [`ValueReader`] on input.
//! [`TypeCodeDriven`] marshals the state member by member from the value's
//! TypeCode and is installed by default.

use crate::decoder::InputStream;
use crate::encoder::OutputStream;
use crate::error::{CdrError, Result};
use crate::typecode::{TCKind, TypeCode, TypeCodeBody};
use crate::value::{Value, ValueRef};

/// Writes the state of a value instance.
pub trait ValueWriter: Send + Sync {
    fn write_state(&self, value: &ValueRef, out: &mut OutputStream) -> Result<()>;
}

/// Reads the state of a value instance of type `type_code`.
pub trait ValueReader: Send + Sync {
    fn read_state(&self, type_code: &TypeCode, input: &mut InputStream<'_>) -> Result<Vec<Value>>;
}

/// State marshalled from the TypeCode: base members first, then the type's
/// own members; a value box marshals its single boxed value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCodeDriven;

/// Member types making up the state of a value or value box TypeCode.
pub fn state_types(type_code: &TypeCode) -> Result<Vec<TypeCode>> {
    let tc = type_code.origin()?;
    match tc.body() {
        TypeCodeBody::ValueBox { boxed, .. } => Ok(vec![boxed.clone()]),
        TypeCodeBody::Value(v) => {
            let mut types = match &v.concrete_base {
                Some(base) if base.origin()?.kind() == TCKind::Value => state_types(base)?,
                _ => Vec::new(),
            };
            types.extend(v.members.iter().map(|m| m.member_type.clone()));
            Ok(types)
        }
        _ => Err(CdrError::bad_param(format!(
            "{} is not a value type",
            tc.kind()
        ))),
    }
}

impl ValueWriter for TypeCodeDriven {
    fn write_state(&self, value: &ValueRef, out: &mut OutputStream) -> Result<()> {
        let types = state_types(value.type_code())?;
        // Snapshot: the state may refer back to this instance.
        let state = value.state().clone();
        if state.len() != types.len() {
            return Err(CdrError::bad_param(format!(
                "{} expects {} state members, instance has {}",
                value.type_code(),
                types.len(),
                state.len()
            )));
        }
        for (tc, member) in types.iter().zip(&state) {
            out.write_typed(tc, member)?;
        }
        Ok(())
    }
}

impl ValueReader for TypeCodeDriven {
    fn read_state(&self, type_code: &TypeCode, input: &mut InputStream<'_>) -> Result<Vec<Value>> {
        state_types(type_code)?
            .iter()
            .map(|tc| input.read_typed(tc))
            .collect()
    }
}
