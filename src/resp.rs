//! RESP2 protocol encoder and decoder.
//!
//! Commands go out as arrays of bulk strings. Replies are decoded into
//! [`Value`], with error replies kept as [`Value::Error`] so that an error
//! nested inside an array still consumes exactly one frame from the buffer.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;

use crate::error::{Error, Result};
use crate::types::Value;

/// Encode a command as a RESP2 array of bulk strings.
///
/// # Example wire format
/// ```text
/// *3\r\n$6\r\nBF.ADD\r\n$3\r\nkey\r\n$4\r\nitem\r\n
/// ```
pub fn encode_command(args: &[Bytes], buf: &mut BytesMut) {
    buf.put_u8(b'*');
    buf.put_slice(args.len().to_string().as_bytes());
    buf.put_slice(b"\r\n");

    for arg in args {
        buf.put_u8(b'$');
        buf.put_slice(arg.len().to_string().as_bytes());
        buf.put_slice(b"\r\n");
        buf.put_slice(arg);
        buf.put_slice(b"\r\n");
    }
}

/// Attempt to decode one RESP2 value from the buffer.
///
/// Returns `Ok(Some(value))` and advances the buffer past the frame if a
/// complete frame was available, `Ok(None)` if more data is needed, or `Err`
/// if the data is malformed.
pub fn decode_value(buf: &mut BytesMut) -> Result<Option<Value>> {
    if buf.is_empty() {
        return Ok(None);
    }

    let mut cursor = Cursor::new(&buf[..]);
    match parse_value(&mut cursor, 0) {
        Ok(value) => {
            let len = cursor.position() as usize;
            buf.advance(len);
            Ok(Some(value))
        }
        Err(Frame::Incomplete) => Ok(None),
        Err(Frame::Invalid(msg)) => Err(Error::Protocol(msg)),
    }
}

/// Why a frame could not be parsed.
enum Frame {
    Incomplete,
    Invalid(String),
}

type FrameResult<T> = std::result::Result<T, Frame>;

/// Deepest array nesting accepted in a reply. No engine reply comes close.
const MAX_DEPTH: usize = 64;

fn parse_value(cursor: &mut Cursor<&[u8]>, depth: usize) -> FrameResult<Value> {
    match get_byte(cursor)? {
        b'+' => Ok(Value::Status(read_utf8_line(cursor)?)),
        b'-' => Ok(Value::Error(read_utf8_line(cursor)?)),
        b':' => Ok(Value::Integer(read_decimal(cursor)?)),
        b'$' => {
            let len = read_decimal(cursor)?;
            match len {
                -1 => Ok(Value::Nil),
                n if n < -1 => Err(Frame::Invalid("negative bulk string length".into())),
                n => {
                    let data = read_bytes(cursor, n as usize)?;
                    let val = Bytes::copy_from_slice(data);
                    skip_crlf(cursor)?;
                    Ok(Value::String(val))
                }
            }
        }
        b'*' => {
            let count = read_decimal(cursor)?;
            match count {
                -1 => Ok(Value::Nil),
                n if n < -1 => Err(Frame::Invalid("negative array length".into())),
                _ if depth >= MAX_DEPTH => Err(Frame::Invalid("nesting too deep".into())),
                n => {
                    let mut values = Vec::with_capacity((n as usize).min(1024));
                    for _ in 0..n {
                        values.push(parse_value(cursor, depth + 1)?);
                    }
                    Ok(Value::Array(values))
                }
            }
        }
        byte => Err(Frame::Invalid(format!("unexpected byte: 0x{:02x}", byte))),
    }
}

// ── Low-level cursor helpers ────────────────────────────────────────────────

fn get_byte(cursor: &mut Cursor<&[u8]>) -> FrameResult<u8> {
    if !cursor.has_remaining() {
        return Err(Frame::Incomplete);
    }
    Ok(cursor.get_u8())
}

fn read_line<'a>(cursor: &mut Cursor<&'a [u8]>) -> FrameResult<&'a [u8]> {
    let start = cursor.position() as usize;
    let buf: &'a [u8] = *cursor.get_ref();
    for i in start..buf.len().saturating_sub(1) {
        if buf[i] == b'\r' && buf[i + 1] == b'\n' {
            cursor.set_position((i + 2) as u64);
            return Ok(&buf[start..i]);
        }
    }
    Err(Frame::Incomplete)
}

fn read_utf8_line(cursor: &mut Cursor<&[u8]>) -> FrameResult<String> {
    let line = read_line(cursor)?;
    String::from_utf8(line.to_vec()).map_err(|e| Frame::Invalid(format!("invalid UTF-8: {}", e)))
}

fn read_decimal(cursor: &mut Cursor<&[u8]>) -> FrameResult<i64> {
    let line = read_line(cursor)?;
    let s = std::str::from_utf8(line)
        .map_err(|_| Frame::Invalid("invalid UTF-8 in integer".into()))?;
    s.parse::<i64>()
        .map_err(|_| Frame::Invalid(format!("invalid integer: {}", s)))
}

fn read_bytes<'a>(cursor: &mut Cursor<&'a [u8]>, n: usize) -> FrameResult<&'a [u8]> {
    let start = cursor.position() as usize;
    let buf: &'a [u8] = *cursor.get_ref();
    if start + n > buf.len() {
        return Err(Frame::Incomplete);
    }
    cursor.set_position((start + n) as u64);
    Ok(&buf[start..start + n])
}

fn skip_crlf(cursor: &mut Cursor<&[u8]>) -> FrameResult<()> {
    let pos = cursor.position() as usize;
    let buf = cursor.get_ref();
    if pos + 2 > buf.len() {
        return Err(Frame::Incomplete);
    }
    if buf[pos] != b'\r' || buf[pos + 1] != b'\n' {
        return Err(Frame::Invalid("expected CRLF".into()));
    }
    cursor.advance(2);
    Ok(())
}
