//! Count-Min Sketch commands (`CMS.*`).

use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::{arg, command, exec, items_command, pairs_command};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::reply;
use crate::types::ToArg;

pub(crate) fn encode_merge(
    dest: impl ToArg,
    sources: &[impl ToArg],
    weights: Option<&[i64]>,
) -> Result<Vec<Bytes>> {
    if sources.is_empty() {
        return Err(Error::InvalidArgument(
            "CMS.MERGE requires at least one source".into(),
        ));
    }
    let mut args = command("CMS.MERGE", dest);
    args.push(arg(sources.len()));
    args.extend(sources.iter().map(ToArg::to_arg));
    if let Some(weights) = weights {
        if weights.len() != sources.len() {
            return Err(Error::InvalidArgument(format!(
                "CMS.MERGE got {} weights for {} sources",
                weights.len(),
                sources.len()
            )));
        }
        args.push(Bytes::from_static(b"WEIGHTS"));
        args.extend(weights.iter().map(ToArg::to_arg));
    }
    Ok(args)
}

pub(crate) fn encode_incrby(key: impl ToArg, increments: &[(impl ToArg, i64)]) -> Result<Vec<Bytes>> {
    pairs_command("CMS.INCRBY", key, increments)
}

pub(crate) fn encode_query(key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Bytes>> {
    items_command("CMS.QUERY", key, items)
}

/// CMS.INITBYDIM key width depth.
pub async fn init_by_dim(conn: &mut Connection, key: impl ToArg, width: u64, depth: u64) -> Result<()> {
    let mut args = command("CMS.INITBYDIM", key);
    args.push(arg(width));
    args.push(arg(depth));
    reply::ok(exec(conn, args).await?)
}

/// CMS.INITBYPROB key error probability.
pub async fn init_by_prob(
    conn: &mut Connection,
    key: impl ToArg,
    error: f64,
    probability: f64,
) -> Result<()> {
    let mut args = command("CMS.INITBYPROB", key);
    args.push(arg(error));
    args.push(arg(probability));
    reply::ok(exec(conn, args).await?)
}

/// CMS.INCRBY key item increment [item increment ...]: the updated count of
/// each pair, in pair order.
pub async fn incrby(
    conn: &mut Connection,
    key: impl ToArg,
    increments: &[(impl ToArg, i64)],
) -> Result<Vec<i64>> {
    let args = encode_incrby(key, increments)?;
    reply::integers(exec(conn, args).await?)
}

/// CMS.QUERY key item [item ...]: estimated counts, in item order.
pub async fn query(conn: &mut Connection, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
    let args = encode_query(key, items)?;
    reply::integers(exec(conn, args).await?)
}

/// CMS.MERGE dest numKeys src [src ...] [WEIGHTS weight [weight ...]].
///
/// `weights`, when given, must hold exactly one weight per source; the engine
/// uses 1 for every source otherwise.
pub async fn merge(
    conn: &mut Connection,
    dest: impl ToArg,
    sources: &[impl ToArg],
    weights: Option<&[i64]>,
) -> Result<()> {
    let args = encode_merge(dest, sources, weights)?;
    reply::ok(exec(conn, args).await?)
}

/// CMS.INFO key: `width`, `depth` and `count`.
pub async fn info(conn: &mut Connection, key: impl ToArg) -> Result<HashMap<String, i64>> {
    reply::integer_fields(exec(conn, command("CMS.INFO", key)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::args_as_strings;

    #[test]
    fn test_encode_merge_without_weights() {
        let args = encode_merge("C", &["A", "B"], None).unwrap();
        assert_eq!(args_as_strings(&args), ["CMS.MERGE", "C", "2", "A", "B"]);
    }

    #[test]
    fn test_encode_merge_with_weights() {
        let args = encode_merge("E", &["A", "B"], Some(&[1, 5][..])).unwrap();
        assert_eq!(
            args_as_strings(&args),
            ["CMS.MERGE", "E", "2", "A", "B", "WEIGHTS", "1", "5"]
        );
    }

    #[test]
    fn test_encode_merge_rejects_partial_weights() {
        let err = encode_merge("D", &["A", "B"], Some(&[1, 1, 1][..])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = encode_merge("D", &["A", "B"], Some(&[3][..])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_encode_merge_rejects_no_sources() {
        let sources: [&str; 0] = [];
        assert!(encode_merge("D", &sources, None).is_err());
    }

    #[test]
    fn test_encode_incrby_pair_order() {
        let args = encode_incrby("k", &[("foo", 5), ("bar", 3), ("baz", 9)]).unwrap();
        assert_eq!(
            args_as_strings(&args),
            ["CMS.INCRBY", "k", "foo", "5", "bar", "3", "baz", "9"]
        );
    }
}
