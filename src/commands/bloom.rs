//! Bloom filter commands (`BF.*`).
//!
//! # Example
//!
//! ```ignore
//! let client = AsyncClient::connect("127.0.0.1", 6379).await?;
//! client.bf_reserve("visitors", 0.01, 1000).await?;
//! assert!(client.bf_add("visitors", "alice").await?);
//! assert!(client.bf_exists("visitors", "alice").await?);
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::{arg, command, exec, items_command, push_flag, push_items, push_opt};
use crate::connection::Connection;
use crate::error::Result;
use crate::reply;
use crate::types::{ToArg, Value};

/// Optional `BF.RESERVE` parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReserveOptions {
    /// Growth factor of each new sub-filter (`EXPANSION`).
    pub expansion: Option<u64>,
    /// Never add sub-filters once capacity is reached (`NONSCALING`).
    pub non_scaling: bool,
}

impl ReserveOptions {
    /// Set the expansion factor.
    pub fn expansion(mut self, expansion: u64) -> Self {
        self.expansion = Some(expansion);
        self
    }

    /// Disable scaling.
    pub fn non_scaling(mut self) -> Self {
        self.non_scaling = true;
        self
    }
}

/// `BF.INSERT` parameters. Unset numbers are left to the engine's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InsertOptions {
    /// Capacity used if the filter is created by this call (`CAPACITY`).
    pub capacity: Option<u64>,
    /// Error rate used if the filter is created by this call (`ERROR`).
    pub error_rate: Option<f64>,
    /// Growth factor of each new sub-filter (`EXPANSION`).
    pub expansion: Option<u64>,
    /// Fail instead of creating a missing filter (`NOCREATE`).
    pub no_create: bool,
    /// Never add sub-filters once capacity is reached (`NONSCALING`).
    pub non_scaling: bool,
}

impl InsertOptions {
    /// Options with a capacity and error rate, the usual starting point.
    pub fn new(capacity: u64, error_rate: f64) -> Self {
        Self {
            capacity: Some(capacity),
            error_rate: Some(error_rate),
            ..Default::default()
        }
    }

    /// Set the expansion factor.
    pub fn expansion(mut self, expansion: u64) -> Self {
        self.expansion = Some(expansion);
        self
    }

    /// Do not create the filter if it does not exist.
    pub fn no_create(mut self) -> Self {
        self.no_create = true;
        self
    }

    /// Disable scaling.
    pub fn non_scaling(mut self) -> Self {
        self.non_scaling = true;
        self
    }
}

// ── Encoders ────────────────────────────────────────────────────────────────

pub(crate) fn encode_reserve(
    key: impl ToArg,
    error_rate: f64,
    capacity: u64,
    options: &ReserveOptions,
) -> Vec<Bytes> {
    let mut args = command("BF.RESERVE", key);
    args.push(arg(error_rate));
    args.push(arg(capacity));
    push_opt(&mut args, "EXPANSION", options.expansion);
    push_flag(&mut args, "NONSCALING", options.non_scaling);
    args
}

pub(crate) fn encode_insert(
    key: impl ToArg,
    options: &InsertOptions,
    items: &[impl ToArg],
) -> Result<Vec<Bytes>> {
    let mut args = command("BF.INSERT", key);
    push_opt(&mut args, "CAPACITY", options.capacity);
    push_opt(&mut args, "ERROR", options.error_rate);
    push_opt(&mut args, "EXPANSION", options.expansion);
    push_flag(&mut args, "NOCREATE", options.no_create);
    push_flag(&mut args, "NONSCALING", options.non_scaling);
    args.push(Bytes::from_static(b"ITEMS"));
    push_items(&mut args, "BF.INSERT", items)?;
    Ok(args)
}

pub(crate) fn encode_madd(key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Bytes>> {
    items_command("BF.MADD", key, items)
}

pub(crate) fn encode_mexists(key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Bytes>> {
    items_command("BF.MEXISTS", key, items)
}

// ── Decoders ────────────────────────────────────────────────────────────────

/// `BF.ADD`: 1 when the item was not in the filter before this call.
fn decode_added(reply: Value) -> Result<bool> {
    reply::zero_or_one(reply)
}

/// `BF.EXISTS`: 1 when the item may be in the filter.
fn decode_present(reply: Value) -> Result<bool> {
    reply::zero_or_one(reply)
}

/// `BF.MADD`: one added flag per item, in item order.
pub(crate) fn decode_added_each(reply: Value) -> Result<Vec<bool>> {
    reply.into_array()?.into_iter().map(decode_added).collect()
}

/// `BF.MEXISTS`: one presence flag per item, in item order.
pub(crate) fn decode_present_each(reply: Value) -> Result<Vec<bool>> {
    reply.into_array()?.into_iter().map(decode_present).collect()
}

// ── Executors ───────────────────────────────────────────────────────────────

/// BF.RESERVE key error_rate capacity [EXPANSION x] [NONSCALING].
pub async fn reserve(
    conn: &mut Connection,
    key: impl ToArg,
    error_rate: f64,
    capacity: u64,
    options: &ReserveOptions,
) -> Result<()> {
    reply::ok(exec(conn, encode_reserve(key, error_rate, capacity, options)).await?)
}

/// BF.ADD key item: `true` if the item was newly added.
pub async fn add(conn: &mut Connection, key: impl ToArg, item: impl ToArg) -> Result<bool> {
    let args = vec![Bytes::from("BF.ADD"), arg(key), arg(item)];
    decode_added(exec(conn, args).await?)
}

/// BF.EXISTS key item: `true` if the item may be present.
pub async fn exists(conn: &mut Connection, key: impl ToArg, item: impl ToArg) -> Result<bool> {
    let args = vec![Bytes::from("BF.EXISTS"), arg(key), arg(item)];
    decode_present(exec(conn, args).await?)
}

/// BF.MADD key item [item ...]: for each item, `true` if it was newly added.
pub async fn madd(conn: &mut Connection, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<bool>> {
    let args = encode_madd(key, items)?;
    decode_added_each(exec(conn, args).await?)
}

/// BF.MEXISTS key item [item ...]: for each item, `true` if it may be present.
pub async fn mexists(
    conn: &mut Connection,
    key: impl ToArg,
    items: &[impl ToArg],
) -> Result<Vec<bool>> {
    let args = encode_mexists(key, items)?;
    decode_present_each(exec(conn, args).await?)
}

/// BF.INSERT key [CAPACITY n] [ERROR e] [EXPANSION x] [NOCREATE] [NONSCALING] ITEMS item [item ...].
pub async fn insert(
    conn: &mut Connection,
    key: impl ToArg,
    options: &InsertOptions,
    items: &[impl ToArg],
) -> Result<Vec<i64>> {
    let args = encode_insert(key, options, items)?;
    reply::integers(exec(conn, args).await?)
}

/// BF.INFO key.
pub async fn info(conn: &mut Connection, key: impl ToArg) -> Result<HashMap<String, i64>> {
    reply::integer_fields(exec(conn, command("BF.INFO", key)).await?)
}

/// BF.SCANDUMP key iterator: next `(iterator, chunk)`; iterator `0` ends the dump.
pub async fn scandump(conn: &mut Connection, key: impl ToArg, iterator: i64) -> Result<(i64, Bytes)> {
    let mut args = command("BF.SCANDUMP", key);
    args.push(arg(iterator));
    reply::scan_dump(exec(conn, args).await?)
}

/// BF.LOADCHUNK key iterator data.
pub async fn loadchunk(
    conn: &mut Connection,
    key: impl ToArg,
    iterator: i64,
    data: impl ToArg,
) -> Result<()> {
    let mut args = command("BF.LOADCHUNK", key);
    args.push(arg(iterator));
    args.push(arg(data));
    reply::ok(exec(conn, args).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::args_as_strings;
    use crate::error::Error;

    #[test]
    fn test_encode_reserve() {
        let args = encode_reserve("test_RESERVE", 0.1, 1000, &ReserveOptions::default());
        assert_eq!(args_as_strings(&args), ["BF.RESERVE", "test_RESERVE", "0.1", "1000"]);

        let options = ReserveOptions::default().expansion(4).non_scaling();
        let args = encode_reserve("k", 0.01, 500, &options);
        assert_eq!(
            args_as_strings(&args),
            ["BF.RESERVE", "k", "0.01", "500", "EXPANSION", "4", "NONSCALING"]
        );
    }

    #[test]
    fn test_encode_insert_omits_unset_expansion() {
        let args = encode_insert("k", &InsertOptions::new(1000, 0.1), &["a", "b"]).unwrap();
        assert_eq!(
            args_as_strings(&args),
            ["BF.INSERT", "k", "CAPACITY", "1000", "ERROR", "0.1", "ITEMS", "a", "b"]
        );
    }

    #[test]
    fn test_encode_insert_all_options() {
        let options = InsertOptions::new(2, 0.1).expansion(4).no_create().non_scaling();
        let args = encode_insert("k", &options, &["c"]).unwrap();
        assert_eq!(
            args_as_strings(&args),
            [
                "BF.INSERT", "k", "CAPACITY", "2", "ERROR", "0.1", "EXPANSION", "4", "NOCREATE",
                "NONSCALING", "ITEMS", "c"
            ]
        );
    }

    #[test]
    fn test_encode_insert_without_creation_params() {
        let args = encode_insert("k", &InsertOptions::default(), &["x"]).unwrap();
        assert_eq!(args_as_strings(&args), ["BF.INSERT", "k", "ITEMS", "x"]);
    }

    #[test]
    fn test_encode_insert_requires_items() {
        let items: [&str; 0] = [];
        assert!(matches!(
            encode_insert("k", &InsertOptions::default(), &items),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_add_and_exists_polarity() {
        assert!(decode_added(Value::Integer(1)).unwrap());
        assert!(!decode_added(Value::Integer(0)).unwrap());
        assert!(decode_present(Value::Integer(1)).unwrap());
        assert!(!decode_present(Value::Integer(0)).unwrap());
        let err = decode_present(Value::Error(
            "WRONGTYPE Operation against a key holding the wrong kind of value".into(),
        ))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "WRONGTYPE Operation against a key holding the wrong kind of value"
        );
    }
}
