#![allow(clippy::unwrap_used)]
//! Property-based tests for the RESP codec.

use bytes::{Bytes, BytesMut};
use proptest::prelude::*;

use redisbloom::resp::{decode_value, encode_command};
use redisbloom::Value;

proptest! {
    /// Arguments arrive in the order they were encoded, byte for byte.
    #[test]
    fn prop_command_arguments_keep_order(args in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 1..16)) {
        let args: Vec<Bytes> = args.into_iter().map(Bytes::from).collect();
        let mut buf = BytesMut::new();
        encode_command(&args, &mut buf);

        let decoded = decode_value(&mut buf).unwrap().unwrap();
        let items = decoded.into_array().unwrap();
        prop_assert_eq!(items.len(), args.len());
        for (item, arg) in items.iter().zip(&args) {
            prop_assert_eq!(item.as_bytes().unwrap(), &arg[..]);
        }
        prop_assert!(buf.is_empty());
    }

    /// A frame split at any byte decodes only once it is complete.
    #[test]
    fn prop_split_frames_wait_for_more_data(split in 0usize..40) {
        let frame: &[u8] = b"*3\r\n:1\r\n$5\r\nhello\r\n-ERR not found\r\n";
        let split = split.min(frame.len() - 1);

        let mut buf = BytesMut::from(&frame[..split]);
        prop_assert!(decode_value(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&frame[split..]);

        let value = decode_value(&mut buf).unwrap().unwrap();
        prop_assert_eq!(
            value,
            Value::Array(vec![
                Value::Integer(1),
                Value::String(Bytes::from_static(b"hello")),
                Value::Error("ERR not found".into()),
            ])
        );
        prop_assert!(buf.is_empty());
    }

    /// Nested arrays decode up to 64 levels and are rejected beyond that.
    #[test]
    fn prop_nesting_depth_is_bounded(depth in 0usize..512) {
        let frame = format!("{}:1\r\n", "*1\r\n".repeat(depth));
        let mut buf = BytesMut::from(frame.as_str());
        let result = decode_value(&mut buf);
        if depth <= 64 {
            prop_assert!(result.unwrap().is_some());
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Arbitrary input never panics the decoder.
    #[test]
    fn prop_decoder_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut buf = BytesMut::from(&data[..]);
        let _ = decode_value(&mut buf);
    }
}
