//! Shared reply decoding.
//!
//! Each operation owns its decoder (see the `commands` modules); the helpers
//! here cover the reply shapes several operations have in common. Every
//! helper turns an error reply, top-level or nested, into
//! [`Error::Server`] carrying the engine's message unmodified.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::types::Value;

pub(crate) fn unexpected(expected: &'static str, actual: &Value) -> Error {
    Error::UnexpectedResponse {
        expected,
        actual: actual.kind().to_string(),
    }
}

/// `+OK` → `()`. Any other status string is a protocol error.
pub(crate) fn ok(reply: Value) -> Result<()> {
    match reply.into_result()? {
        Value::Status(s) if s == "OK" => Ok(()),
        Value::Status(s) => Err(Error::Protocol(format!("unexpected status: {}", s))),
        other => Err(unexpected("status OK", &other)),
    }
}

/// A `0`/`1` integer reply. What `true` means is up to the operation.
pub(crate) fn zero_or_one(reply: Value) -> Result<bool> {
    match reply.into_result()? {
        Value::Integer(1) => Ok(true),
        Value::Integer(0) => Ok(false),
        Value::Integer(n) => Err(Error::Protocol(format!("expected 0 or 1, got {}", n))),
        other => Err(unexpected("integer", &other)),
    }
}

/// Array of integers, one per input item, in input order.
pub(crate) fn integers(reply: Value) -> Result<Vec<i64>> {
    reply
        .into_array()?
        .into_iter()
        .map(Value::into_integer)
        .collect()
}

/// Array of optional strings: nil entries become `None`.
pub(crate) fn optional_strings(reply: Value) -> Result<Vec<Option<String>>> {
    reply
        .into_array()?
        .into_iter()
        .map(|v| match v {
            Value::Nil => Ok(None),
            other => other.into_string().map(Some),
        })
        .collect()
}

/// Flat `name, value, name, value, ...` array.
pub(crate) fn field_pairs(reply: Value) -> Result<Vec<(String, Value)>> {
    let items = reply.into_array()?;
    if items.len() % 2 != 0 {
        return Err(Error::Protocol(format!(
            "info reply has an odd number of elements: {}",
            items.len()
        )));
    }
    let mut pairs = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((name.into_string()?, value.into_result()?));
    }
    Ok(pairs)
}

/// Info reply whose values are all integers, keyed by the engine's field
/// names exactly as sent.
pub(crate) fn integer_fields(reply: Value) -> Result<HashMap<String, i64>> {
    field_pairs(reply)?
        .into_iter()
        .map(|(name, value)| Ok((name, field_integer(value)?)))
        .collect()
}

/// An integer field that may also arrive as a decimal bulk string.
pub(crate) fn field_integer(value: Value) -> Result<i64> {
    match value {
        Value::Integer(n) => Ok(n),
        Value::String(ref b) => std::str::from_utf8(b)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| Error::Protocol(format!("invalid integer field: {}", value))),
        other => Err(unexpected("integer", &other)),
    }
}

/// `[cursor, payload]` reply of a scan-dump. The payload is empty (or nil)
/// when the cursor is `0`.
pub(crate) fn scan_dump(reply: Value) -> Result<(i64, Bytes)> {
    let items = reply.into_array()?;
    if items.len() != 2 {
        return Err(Error::Protocol(format!(
            "scan dump reply must have 2 elements, got {}",
            items.len()
        )));
    }
    let mut iter = items.into_iter();
    let (Some(cursor), Some(payload)) = (iter.next(), iter.next()) else {
        return Err(Error::Protocol("scan dump reply truncated".into()));
    };
    let cursor = cursor.into_integer()?;
    let data = match payload.into_result()? {
        Value::Nil => Bytes::new(),
        other => other.into_bytes()?,
    };
    Ok((cursor, data))
}

/// A floating point result that must be a real number. `nan` means the engine
/// had nothing to compute from.
pub(crate) fn defined_f64(reply: Value, what: &'static str) -> Result<f64> {
    let value = reply.into_f64()?;
    if value.is_nan() {
        return Err(Error::UndefinedResult(what));
    }
    Ok(value)
}
