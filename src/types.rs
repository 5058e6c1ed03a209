//! Value types for engine replies and command arguments.

use bytes::Bytes;
use std::fmt;

use crate::error::{Error, Result, ValueKind};
use crate::reply::unexpected;

/// A reply read from the engine.
///
/// This is the closed set of RESP2 reply shapes. Every operation decodes its
/// reply by matching on these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A status reply (RESP Simple String, e.g. `+OK`).
    Status(String),

    /// An integer reply (RESP Integer).
    Integer(i64),

    /// A bulk string reply. May carry arbitrary binary data.
    String(Bytes),

    /// An array reply, possibly nested (RESP Array).
    Array(Vec<Value>),

    /// A null reply (RESP Null Bulk String or Null Array).
    Nil,

    /// An error reply (RESP Error), carrying the engine's message verbatim.
    Error(String),
}

impl Value {
    /// Returns the value as a string, if it is one.
    ///
    /// # Examples
    /// ```
    /// # use redisbloom::types::Value;
    /// let val = Value::String(bytes::Bytes::from("hello"));
    /// assert_eq!(val.as_str(), Some("hello"));
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(b) => std::str::from_utf8(b).ok(),
            Value::Status(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the value as bytes, if it is a bulk string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns `true` if the value is nil/null.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns `true` if the value is an error reply.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Returns the shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Status(_) => ValueKind::Status,
            Value::Integer(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Nil => ValueKind::Null,
            Value::Error(_) => ValueKind::Error,
        }
    }

    /// Turns an error reply into [`Error::Server`], passing every other value
    /// through untouched.
    pub fn into_result(self) -> Result<Value> {
        match self {
            Value::Error(msg) => Err(Error::Server(msg)),
            other => Ok(other),
        }
    }

    /// Converts the value into a `String`.
    ///
    /// Returns an error if the value is not a string type.
    pub fn into_string(self) -> Result<String> {
        match self.into_result()? {
            Value::String(b) => String::from_utf8(b.to_vec())
                .map_err(|e| Error::Protocol(format!("invalid UTF-8 in string value: {}", e))),
            Value::Status(s) => Ok(s),
            other => Err(unexpected("string", &other)),
        }
    }

    /// Converts the value into raw bytes.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self.into_result()? {
            Value::String(b) => Ok(b),
            Value::Status(s) => Ok(Bytes::from(s)),
            other => Err(unexpected("bulk string", &other)),
        }
    }

    /// Converts the value into an `i64`.
    ///
    /// Returns an error if the value is not an integer.
    pub fn into_integer(self) -> Result<i64> {
        match self.into_result()? {
            Value::Integer(n) => Ok(n),
            other => Err(unexpected("integer", &other)),
        }
    }

    /// Converts the value into an `f64`.
    ///
    /// The engine sends floating point results as bulk strings (`"3"`,
    /// `"0.66666666666666663"`, `"inf"`). Integers are accepted as well.
    pub fn into_f64(self) -> Result<f64> {
        match self.into_result()? {
            Value::Integer(n) => Ok(n as f64),
            Value::String(b) => parse_f64(&b),
            Value::Status(s) => parse_f64(s.as_bytes()),
            other => Err(unexpected("float", &other)),
        }
    }

    /// Converts the value into a `Vec<Value>`.
    ///
    /// Returns an error if the value is not an array. A nil reply is an empty
    /// array.
    pub fn into_array(self) -> Result<Vec<Value>> {
        match self.into_result()? {
            Value::Array(arr) => Ok(arr),
            Value::Nil => Ok(vec![]),
            other => Err(unexpected("array", &other)),
        }
    }
}

fn parse_f64(raw: &[u8]) -> Result<f64> {
    let s = std::str::from_utf8(raw)
        .map_err(|_| Error::Protocol("invalid UTF-8 in float value".into()))?;
    match s.trim().to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
        "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
        "nan" | "-nan" => Ok(f64::NAN),
        other => other
            .parse::<f64>()
            .map_err(|_| Error::Protocol(format!("invalid float: {}", s))),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "<binary {} bytes>", b.len()),
            },
            Value::Integer(n) => write!(f, "(integer) {}", n),
            Value::Array(arr) => {
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {}", i + 1, val)?;
                }
                Ok(())
            }
            Value::Nil => write!(f, "(nil)"),
            Value::Status(s) => write!(f, "{}", s),
            Value::Error(s) => write!(f, "(error) {}", s),
        }
    }
}

/// One unit of an exported structure: the cursor returned by a scan-dump call
/// together with the payload bytes it produced.
///
/// Chunks must be replayed through load-chunk in the order they were dumped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Cursor returned alongside `data`. Never `0` for a chunk that carries data.
    pub iterator: i64,
    /// Opaque serialized structure state.
    pub data: Bytes,
}

impl Chunk {
    /// Create a chunk from a scan-dump reply.
    pub fn new(iterator: i64, data: impl Into<Bytes>) -> Self {
        Self {
            iterator,
            data: data.into(),
        }
    }
}

impl From<(i64, Bytes)> for Chunk {
    fn from((iterator, data): (i64, Bytes)) -> Self {
        Self { iterator, data }
    }
}

/// Summary of a T-Digest as reported by `TDIGEST.INFO`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TDigestInfo {
    pub(crate) compression: i64,
    pub(crate) capacity: i64,
    pub(crate) merged_nodes: i64,
    pub(crate) unmerged_nodes: i64,
    pub(crate) merged_weight: f64,
    pub(crate) unmerged_weight: f64,
    pub(crate) total_compressions: i64,
}

impl TDigestInfo {
    /// Configured compression factor.
    pub fn compression(&self) -> i64 {
        self.compression
    }

    /// Number of centroids the digest can hold.
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Number of merged centroids.
    pub fn merged_nodes(&self) -> i64 {
        self.merged_nodes
    }

    /// Number of buffered, not yet merged, observations.
    pub fn unmerged_nodes(&self) -> i64 {
        self.unmerged_nodes
    }

    /// Total weight of merged centroids.
    pub fn merged_weight(&self) -> f64 {
        self.merged_weight
    }

    /// Total weight of unmerged observations.
    pub fn unmerged_weight(&self) -> f64 {
        self.unmerged_weight
    }

    /// Number of compressions performed so far.
    pub fn total_compressions(&self) -> i64 {
        self.total_compressions
    }
}

/// Trait for types that can be converted into command arguments.
pub trait ToArg {
    /// Encode this value as a RESP bulk string argument.
    fn to_arg(&self) -> Bytes;
}

impl ToArg for &str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for &String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl ToArg for &[u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for i64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for u64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for i32 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for u32 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for usize {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for f64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result_maps_error_reply() {
        let err = Value::Error("WRONGTYPE Operation against a key holding the wrong kind of value".into())
            .into_result()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "WRONGTYPE Operation against a key holding the wrong kind of value"
        );
    }

    #[test]
    fn test_into_integer_rejects_other_shapes() {
        let err = Value::Status("OK".into()).into_integer().unwrap_err();
        match err {
            Error::UnexpectedResponse { expected, actual } => {
                assert_eq!(expected, "integer");
                assert_eq!(actual, "status");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_f64_parses_engine_formats() {
        assert_eq!(Value::String(Bytes::from("3")).into_f64().unwrap(), 3.0);
        assert_eq!(
            Value::String(Bytes::from("0.66666666666666663")).into_f64().unwrap(),
            2.0 / 3.0
        );
        assert_eq!(Value::Integer(2).into_f64().unwrap(), 2.0);
        assert!(Value::String(Bytes::from("inf")).into_f64().unwrap().is_infinite());
        assert!(Value::String(Bytes::from("nan")).into_f64().unwrap().is_nan());
        assert!(Value::String(Bytes::from("abc")).into_f64().is_err());
    }

    #[test]
    fn test_nil_is_empty_array() {
        assert!(Value::Nil.into_array().unwrap().is_empty());
    }

    #[test]
    fn test_float_args_use_shortest_form() {
        assert_eq!(0.01_f64.to_arg(), Bytes::from("0.01"));
        assert_eq!(0.925_f64.to_arg(), Bytes::from("0.925"));
        assert_eq!(1000.0_f64.to_arg(), Bytes::from("1000"));
    }
}
