//! T-Digest commands (`TDIGEST.*`).

use bytes::Bytes;

use crate::commands::{arg, command, exec, pairs_command};
use crate::connection::Connection;
use crate::error::Result;
use crate::reply;
use crate::types::{TDigestInfo, ToArg, Value};

pub(crate) fn encode_add(key: impl ToArg, samples: &[(f64, f64)]) -> Result<Vec<Bytes>> {
    pairs_command("TDIGEST.ADD", key, samples)
}

/// `TDIGEST.INFO`: fields the digest summary does not model are ignored.
fn decode_info(reply: Value) -> Result<TDigestInfo> {
    let mut info = TDigestInfo::default();
    for (name, value) in reply::field_pairs(reply)? {
        match name.as_str() {
            "Compression" => info.compression = reply::field_integer(value)?,
            "Capacity" => info.capacity = reply::field_integer(value)?,
            "Merged nodes" => info.merged_nodes = reply::field_integer(value)?,
            "Unmerged nodes" => info.unmerged_nodes = reply::field_integer(value)?,
            "Merged weight" => info.merged_weight = value.into_f64()?,
            "Unmerged weight" => info.unmerged_weight = value.into_f64()?,
            "Total compressions" => info.total_compressions = reply::field_integer(value)?,
            _ => {}
        }
    }
    Ok(info)
}

/// TDIGEST.CREATE key compression.
pub async fn create(conn: &mut Connection, key: impl ToArg, compression: u64) -> Result<()> {
    let mut args = command("TDIGEST.CREATE", key);
    args.push(arg(compression));
    reply::ok(exec(conn, args).await?)
}

/// TDIGEST.RESET key: empty the digest, keeping its compression.
pub async fn reset(conn: &mut Connection, key: impl ToArg) -> Result<()> {
    reply::ok(exec(conn, command("TDIGEST.RESET", key)).await?)
}

/// TDIGEST.ADD key value weight [value weight ...].
pub async fn add(conn: &mut Connection, key: impl ToArg, samples: &[(f64, f64)]) -> Result<()> {
    let args = encode_add(key, samples)?;
    reply::ok(exec(conn, args).await?)
}

/// TDIGEST.MERGE to-key from-key: fold `from` into `to`.
pub async fn merge(conn: &mut Connection, to_key: impl ToArg, from_key: impl ToArg) -> Result<()> {
    let mut args = command("TDIGEST.MERGE", to_key);
    args.push(arg(from_key));
    reply::ok(exec(conn, args).await?)
}

/// TDIGEST.MIN key.
pub async fn min(conn: &mut Connection, key: impl ToArg) -> Result<f64> {
    exec(conn, command("TDIGEST.MIN", key)).await?.into_f64()
}

/// TDIGEST.MAX key.
pub async fn max(conn: &mut Connection, key: impl ToArg) -> Result<f64> {
    exec(conn, command("TDIGEST.MAX", key)).await?.into_f64()
}

/// TDIGEST.QUANTILE key quantile: fails with
/// [`Error::UndefinedResult`](crate::Error::UndefinedResult) on an empty digest.
pub async fn quantile(conn: &mut Connection, key: impl ToArg, quantile: f64) -> Result<f64> {
    let mut args = command("TDIGEST.QUANTILE", key);
    args.push(arg(quantile));
    reply::defined_f64(exec(conn, args).await?, "TDIGEST.QUANTILE")
}

/// TDIGEST.CDF key value: fails with
/// [`Error::UndefinedResult`](crate::Error::UndefinedResult) on an empty digest.
pub async fn cdf(conn: &mut Connection, key: impl ToArg, value: f64) -> Result<f64> {
    let mut args = command("TDIGEST.CDF", key);
    args.push(arg(value));
    reply::defined_f64(exec(conn, args).await?, "TDIGEST.CDF")
}

/// TDIGEST.INFO key.
pub async fn info(conn: &mut Connection, key: impl ToArg) -> Result<TDigestInfo> {
    decode_info(exec(conn, command("TDIGEST.INFO", key)).await?)
}
