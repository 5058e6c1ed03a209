//! Cuckoo filter commands (`CF.*`).

use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::{arg, command, exec, push_flag, push_items, push_opt};
use crate::connection::Connection;
use crate::error::Result;
use crate::reply;
use crate::types::{ToArg, Value};

/// Optional `CF.RESERVE` parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReserveOptions {
    /// Items per bucket (`BUCKETSIZE`).
    pub bucket_size: Option<u64>,
    /// Swap attempts before declaring the filter full (`MAXITERATIONS`).
    pub max_iterations: Option<u64>,
    /// Growth factor of each new sub-filter (`EXPANSION`).
    pub expansion: Option<u64>,
}

impl ReserveOptions {
    /// Set the bucket size.
    pub fn bucket_size(mut self, bucket_size: u64) -> Self {
        self.bucket_size = Some(bucket_size);
        self
    }

    /// Set the maximum number of swap attempts.
    pub fn max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set the expansion factor.
    pub fn expansion(mut self, expansion: u64) -> Self {
        self.expansion = Some(expansion);
        self
    }
}

/// `CF.INSERT` / `CF.INSERTNX` parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Capacity used if the filter is created by this call (`CAPACITY`).
    pub capacity: Option<u64>,
    /// Fail instead of creating a missing filter (`NOCREATE`).
    pub no_create: bool,
}

impl InsertOptions {
    /// Options with a capacity for auto-creation.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            capacity: Some(capacity),
            no_create: false,
        }
    }

    /// Do not create the filter if it does not exist.
    pub fn no_create(mut self) -> Self {
        self.no_create = true;
        self
    }
}

pub(crate) fn encode_reserve(key: impl ToArg, capacity: u64, options: &ReserveOptions) -> Vec<Bytes> {
    let mut args = command("CF.RESERVE", key);
    args.push(arg(capacity));
    push_opt(&mut args, "BUCKETSIZE", options.bucket_size);
    push_opt(&mut args, "MAXITERATIONS", options.max_iterations);
    push_opt(&mut args, "EXPANSION", options.expansion);
    args
}

pub(crate) fn encode_insert(
    keyword: &'static str,
    key: impl ToArg,
    options: &InsertOptions,
    items: &[impl ToArg],
) -> Result<Vec<Bytes>> {
    let mut args = command(keyword, key);
    push_opt(&mut args, "CAPACITY", options.capacity);
    push_flag(&mut args, "NOCREATE", options.no_create);
    args.push(Bytes::from_static(b"ITEMS"));
    push_items(&mut args, keyword, items)?;
    Ok(args)
}

/// `CF.ADD` / `CF.ADDNX`: 1 when this call stored the item.
fn decode_added(reply: Value) -> Result<bool> {
    reply::zero_or_one(reply)
}

/// `CF.EXISTS`: 1 when the item may be in the filter.
fn decode_present(reply: Value) -> Result<bool> {
    reply::zero_or_one(reply)
}

/// `CF.DEL`: 1 when one copy of the item was removed, 0 when none was found.
fn decode_deleted(reply: Value) -> Result<bool> {
    reply::zero_or_one(reply)
}

/// CF.RESERVE key capacity [BUCKETSIZE n] [MAXITERATIONS n] [EXPANSION n].
pub async fn reserve(
    conn: &mut Connection,
    key: impl ToArg,
    capacity: u64,
    options: &ReserveOptions,
) -> Result<()> {
    reply::ok(exec(conn, encode_reserve(key, capacity, options)).await?)
}

/// CF.ADD key item: always stores the item, even if already present.
pub async fn add(conn: &mut Connection, key: impl ToArg, item: impl ToArg) -> Result<bool> {
    let args = vec![Bytes::from("CF.ADD"), arg(key), arg(item)];
    decode_added(exec(conn, args).await?)
}

/// CF.ADDNX key item: stores the item only if it is not already present.
pub async fn addnx(conn: &mut Connection, key: impl ToArg, item: impl ToArg) -> Result<bool> {
    let args = vec![Bytes::from("CF.ADDNX"), arg(key), arg(item)];
    decode_added(exec(conn, args).await?)
}

/// CF.INSERT key [CAPACITY n] [NOCREATE] ITEMS item [item ...].
pub async fn insert(
    conn: &mut Connection,
    key: impl ToArg,
    options: &InsertOptions,
    items: &[impl ToArg],
) -> Result<Vec<i64>> {
    let args = encode_insert("CF.INSERT", key, options, items)?;
    reply::integers(exec(conn, args).await?)
}

/// CF.INSERTNX key [CAPACITY n] [NOCREATE] ITEMS item [item ...].
pub async fn insertnx(
    conn: &mut Connection,
    key: impl ToArg,
    options: &InsertOptions,
    items: &[impl ToArg],
) -> Result<Vec<i64>> {
    let args = encode_insert("CF.INSERTNX", key, options, items)?;
    reply::integers(exec(conn, args).await?)
}

/// CF.EXISTS key item.
pub async fn exists(conn: &mut Connection, key: impl ToArg, item: impl ToArg) -> Result<bool> {
    let args = vec![Bytes::from("CF.EXISTS"), arg(key), arg(item)];
    decode_present(exec(conn, args).await?)
}

/// CF.DEL key item.
pub async fn del(conn: &mut Connection, key: impl ToArg, item: impl ToArg) -> Result<bool> {
    let args = vec![Bytes::from("CF.DEL"), arg(key), arg(item)];
    decode_deleted(exec(conn, args).await?)
}

/// CF.COUNT key item: how many times the item may have been added.
pub async fn count(conn: &mut Connection, key: impl ToArg, item: impl ToArg) -> Result<i64> {
    let args = vec![Bytes::from("CF.COUNT"), arg(key), arg(item)];
    exec(conn, args).await?.into_integer()
}

/// CF.INFO key.
pub async fn info(conn: &mut Connection, key: impl ToArg) -> Result<HashMap<String, i64>> {
    reply::integer_fields(exec(conn, command("CF.INFO", key)).await?)
}

/// CF.SCANDUMP key iterator.
pub async fn scandump(conn: &mut Connection, key: impl ToArg, iterator: i64) -> Result<(i64, Bytes)> {
    let mut args = command("CF.SCANDUMP", key);
    args.push(arg(iterator));
    reply::scan_dump(exec(conn, args).await?)
}

/// CF.LOADCHUNK key iterator data.
pub async fn loadchunk(
    conn: &mut Connection,
    key: impl ToArg,
    iterator: i64,
    data: impl ToArg,
) -> Result<()> {
    let mut args = command("CF.LOADCHUNK", key);
    args.push(arg(iterator));
    args.push(arg(data));
    reply::ok(exec(conn, args).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{args_as_strings, unset_if_negative};

    #[test]
    fn test_encode_reserve_defaults() {
        let args = encode_reserve("test_cf_reserve", 1000, &ReserveOptions::default());
        assert_eq!(args_as_strings(&args), ["CF.RESERVE", "test_cf_reserve", "1000"]);
    }

    #[test]
    fn test_encode_reserve_from_sentinels() {
        let options = ReserveOptions {
            bucket_size: unset_if_negative(50),
            max_iterations: unset_if_negative(-1),
            expansion: unset_if_negative(2),
        };
        let args = encode_reserve("k", 100, &options);
        assert_eq!(
            args_as_strings(&args),
            ["CF.RESERVE", "k", "100", "BUCKETSIZE", "50", "EXPANSION", "2"]
        );
    }

    #[test]
    fn test_encode_reserve_max_iterations() {
        let args = encode_reserve("k", 1000, &ReserveOptions::default().max_iterations(20));
        assert_eq!(
            args_as_strings(&args),
            ["CF.RESERVE", "k", "1000", "MAXITERATIONS", "20"]
        );
    }

    #[test]
    fn test_encode_insertnx() {
        let options = InsertOptions::with_capacity(1000).no_create();
        let args = encode_insert("CF.INSERTNX", "k", &options, &["b"]).unwrap();
        assert_eq!(
            args_as_strings(&args),
            ["CF.INSERTNX", "k", "CAPACITY", "1000", "NOCREATE", "ITEMS", "b"]
        );
    }

    #[test]
    fn test_decode_deleted() {
        assert!(decode_deleted(Value::Integer(1)).unwrap());
        assert!(!decode_deleted(Value::Integer(0)).unwrap());
        assert!(decode_deleted(Value::Error("ERR not found".into())).is_err());
    }
}
