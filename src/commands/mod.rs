//! Command encoders, decoders and executors, one module per structure kind.
//!
//! Every operation is split in three: an encoder that builds the exact
//! argument list (and rejects bad input before any I/O), an executor that
//! sends it over a borrowed [`Connection`], and a decoder for the reply.
//! Encoders that can fail are reachable from the client façade, which runs
//! them before checking a connection out of the pool.
//!
//! Encoding rules shared by all modules:
//!
//! - optional parameters are `Option`s and are omitted when `None`, letting
//!   the engine apply its default;
//! - flags are emitted as a bare keyword only when `true`;
//! - item lists and `(item, value)` pairs are emitted in caller order, which
//!   is the order replies are decoded in.

pub mod bloom;
pub mod cms;
pub mod cuckoo;
pub mod tdigest;
pub mod topk;

use bytes::Bytes;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::types::{ToArg, Value};

/// Send a built command and return the raw reply.
pub(crate) async fn exec(conn: &mut Connection, args: Vec<Bytes>) -> Result<Value> {
    conn.execute(&args).await
}

/// Helper to create a Bytes arg from anything that implements ToArg.
#[inline]
pub(crate) fn arg<T: ToArg>(val: T) -> Bytes {
    val.to_arg()
}

/// Start a command with its keyword and key.
pub(crate) fn command(keyword: &'static str, key: impl ToArg) -> Vec<Bytes> {
    vec![Bytes::from_static(keyword.as_bytes()), arg(key)]
}

/// Append `keyword value` when the value is set.
pub(crate) fn push_opt<T: ToArg>(args: &mut Vec<Bytes>, keyword: &'static str, value: Option<T>) {
    if let Some(value) = value {
        args.push(Bytes::from_static(keyword.as_bytes()));
        args.push(arg(value));
    }
}

/// Append a bare flag keyword when enabled.
pub(crate) fn push_flag(args: &mut Vec<Bytes>, keyword: &'static str, enabled: bool) {
    if enabled {
        args.push(Bytes::from_static(keyword.as_bytes()));
    }
}

/// Append every item in order. Fails on an empty list, which the engine
/// would reject with an arity error.
pub(crate) fn push_items<T: ToArg>(
    args: &mut Vec<Bytes>,
    command: &'static str,
    items: &[T],
) -> Result<()> {
    if items.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "{command} requires at least one item"
        )));
    }
    args.extend(items.iter().map(ToArg::to_arg));
    Ok(())
}

/// Append `item value` pairs in order. Fails on an empty list.
pub(crate) fn push_pairs<K: ToArg, V: ToArg>(
    args: &mut Vec<Bytes>,
    command: &'static str,
    pairs: &[(K, V)],
) -> Result<()> {
    if pairs.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "{command} requires at least one pair"
        )));
    }
    for (item, value) in pairs {
        args.push(item.to_arg());
        args.push(value.to_arg());
    }
    Ok(())
}

/// `keyword key item [item ...]`. Fails on an empty list.
pub(crate) fn items_command<T: ToArg>(
    keyword: &'static str,
    key: impl ToArg,
    items: &[T],
) -> Result<Vec<Bytes>> {
    let mut args = command(keyword, key);
    push_items(&mut args, keyword, items)?;
    Ok(args)
}

/// `keyword key item value [item value ...]`. Fails on an empty list.
pub(crate) fn pairs_command<K: ToArg, V: ToArg>(
    keyword: &'static str,
    key: impl ToArg,
    pairs: &[(K, V)],
) -> Result<Vec<Bytes>> {
    let mut args = command(keyword, key);
    push_pairs(&mut args, keyword, pairs)?;
    Ok(args)
}

/// Maps the negative "unset" sentinel used by sentinel-style APIs to `None`.
///
/// ```
/// # use redisbloom::commands::unset_if_negative;
/// assert_eq!(unset_if_negative(-1), None);
/// assert_eq!(unset_if_negative(0), Some(0));
/// assert_eq!(unset_if_negative(4), Some(4));
/// ```
pub fn unset_if_negative(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

#[cfg(test)]
pub(crate) fn args_as_strings(args: &[Bytes]) -> Vec<String> {
    args.iter()
        .map(|a| String::from_utf8_lossy(a).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_opt_omits_unset() {
        let mut args = command("CF.RESERVE", "k");
        push_opt(&mut args, "BUCKETSIZE", None::<u64>);
        push_opt(&mut args, "EXPANSION", Some(2u64));
        assert_eq!(args_as_strings(&args), ["CF.RESERVE", "k", "EXPANSION", "2"]);
    }

    #[test]
    fn test_push_flag() {
        let mut args = command("BF.INSERT", "k");
        push_flag(&mut args, "NOCREATE", false);
        push_flag(&mut args, "NONSCALING", true);
        assert_eq!(args_as_strings(&args), ["BF.INSERT", "k", "NONSCALING"]);
    }

    #[test]
    fn test_push_items_rejects_empty() {
        let mut args = command("BF.MADD", "k");
        let items: [&str; 0] = [];
        assert!(matches!(
            push_items(&mut args, "BF.MADD", &items),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_push_pairs_keeps_order() {
        let mut args = command("CMS.INCRBY", "k");
        push_pairs(&mut args, "CMS.INCRBY", &[("foo", 5i64), ("bar", 3), ("baz", 9)]).unwrap();
        assert_eq!(
            args_as_strings(&args),
            ["CMS.INCRBY", "k", "foo", "5", "bar", "3", "baz", "9"]
        );
    }
}
