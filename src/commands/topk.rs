//! Top-K commands (`TOPK.*`).

use std::collections::HashMap;

use bytes::Bytes;
use indexmap::IndexMap;

use crate::commands::{arg, command, exec, items_command, pairs_command};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::reply;
use crate::types::{ToArg, Value};

pub(crate) fn encode_reserve(key: impl ToArg, k: u64, width: u64, depth: u64, decay: f64) -> Vec<Bytes> {
    let mut args = command("TOPK.RESERVE", key);
    args.push(arg(k));
    args.push(arg(width));
    args.push(arg(depth));
    args.push(arg(decay));
    args
}

pub(crate) fn encode_add(key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Bytes>> {
    items_command("TOPK.ADD", key, items)
}

pub(crate) fn encode_incrby(key: impl ToArg, increments: &[(impl ToArg, i64)]) -> Result<Vec<Bytes>> {
    pairs_command("TOPK.INCRBY", key, increments)
}

pub(crate) fn encode_query(key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Bytes>> {
    items_command("TOPK.QUERY", key, items)
}

pub(crate) fn encode_count(key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Bytes>> {
    items_command("TOPK.COUNT", key, items)
}

/// `TOPK.LIST`: items in rank order; nil slots are skipped.
fn decode_list(reply: Value) -> Result<Vec<String>> {
    Ok(reply::optional_strings(reply)?.into_iter().flatten().collect())
}

/// `TOPK.LIST ... WITHCOUNT`: `item, count` pairs in rank order.
fn decode_list_with_count(reply: Value) -> Result<IndexMap<String, i64>> {
    let items = reply.into_array()?;
    if items.len() % 2 != 0 {
        return Err(Error::Protocol(format!(
            "TOPK.LIST WITHCOUNT reply has an odd number of elements: {}",
            items.len()
        )));
    }
    let mut ranked = IndexMap::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(item), Some(count)) = (iter.next(), iter.next()) {
        if item.is_nil() {
            continue;
        }
        ranked.insert(item.into_string()?, count.into_integer()?);
    }
    Ok(ranked)
}

/// `TOPK.INFO`: values as text, since `decay` is fractional.
fn decode_info(reply: Value) -> Result<HashMap<String, String>> {
    reply::field_pairs(reply)?
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::Integer(n) => n.to_string(),
                other => other.into_string()?,
            };
            Ok((name, text))
        })
        .collect()
}

/// TOPK.RESERVE key topk width depth decay.
pub async fn reserve(
    conn: &mut Connection,
    key: impl ToArg,
    k: u64,
    width: u64,
    depth: u64,
    decay: f64,
) -> Result<()> {
    reply::ok(exec(conn, encode_reserve(key, k, width, depth, decay)).await?)
}

/// TOPK.ADD key item [item ...]: for each item, the item it expelled from
/// the top-k list, if any.
pub async fn add(
    conn: &mut Connection,
    key: impl ToArg,
    items: &[impl ToArg],
) -> Result<Vec<Option<String>>> {
    let args = encode_add(key, items)?;
    reply::optional_strings(exec(conn, args).await?)
}

/// TOPK.INCRBY key item increment [item increment ...]: for each pair, the
/// item it expelled from the top-k list, if any.
pub async fn incrby(
    conn: &mut Connection,
    key: impl ToArg,
    increments: &[(impl ToArg, i64)],
) -> Result<Vec<Option<String>>> {
    let args = encode_incrby(key, increments)?;
    reply::optional_strings(exec(conn, args).await?)
}

/// TOPK.QUERY key item [item ...]: `1` for items currently in the top-k.
pub async fn query(conn: &mut Connection, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
    let args = encode_query(key, items)?;
    reply::integers(exec(conn, args).await?)
}

/// TOPK.COUNT key item [item ...]: estimated counts, in item order.
pub async fn count(conn: &mut Connection, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
    let args = encode_count(key, items)?;
    reply::integers(exec(conn, args).await?)
}

/// TOPK.LIST key.
pub async fn list(conn: &mut Connection, key: impl ToArg) -> Result<Vec<String>> {
    decode_list(exec(conn, command("TOPK.LIST", key)).await?)
}

/// TOPK.LIST key WITHCOUNT.
pub async fn list_with_count(conn: &mut Connection, key: impl ToArg) -> Result<IndexMap<String, i64>> {
    let mut args = command("TOPK.LIST", key);
    args.push(Bytes::from_static(b"WITHCOUNT"));
    decode_list_with_count(exec(conn, args).await?)
}

/// TOPK.INFO key: `k`, `width`, `depth` and `decay`.
pub async fn info(conn: &mut Connection, key: impl ToArg) -> Result<HashMap<String, String>> {
    decode_info(exec(conn, command("TOPK.INFO", key)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::args_as_strings;

    fn bulk(s: &str) -> Value {
        Value::String(Bytes::copy_from_slice(s.as_bytes()))
    }

    #[test]
    fn test_encode_reserve() {
        let args = encode_reserve("test_topk_reserve", 10, 2000, 7, 0.925);
        assert_eq!(
            args_as_strings(&args),
            ["TOPK.RESERVE", "test_topk_reserve", "10", "2000", "7", "0.925"]
        );
    }

    #[test]
    fn test_decode_list_keeps_rank_order() {
        let reply = Value::Array(vec![bulk("A"), bulk("B"), Value::Nil, bulk("E")]);
        assert_eq!(decode_list(reply).unwrap(), ["A", "B", "E"]);
    }

    #[test]
    fn test_decode_list_with_count_insertion_order_is_rank() {
        let reply = Value::Array(vec![
            bulk("A"),
            Value::Integer(4),
            bulk("B"),
            Value::Integer(3),
            bulk("E"),
            Value::Integer(3),
        ]);
        let ranked = decode_list_with_count(reply).unwrap();
        let order: Vec<_> = ranked.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(order, [("A", 4), ("B", 3), ("E", 3)]);
    }

    #[test]
    fn test_decode_info_as_text() {
        let reply = Value::Array(vec![
            bulk("k"),
            Value::Integer(10),
            bulk("width"),
            Value::Integer(2000),
            bulk("depth"),
            Value::Integer(7),
            bulk("decay"),
            bulk("0.92500000000000004"),
        ]);
        let info = decode_info(reply).unwrap();
        assert_eq!(info["k"], "10");
        assert_eq!(info["width"], "2000");
        assert_eq!(info["depth"], "7");
        assert_eq!(info["decay"], "0.92500000000000004");
    }

    #[test]
    fn test_dropped_items() {
        let reply = Value::Array(vec![Value::Nil, Value::Nil, bulk("42")]);
        assert_eq!(
            reply::optional_strings(reply).unwrap(),
            [None, None, Some("42".to_string())]
        );
    }
}
