//! RESP2 codec
//!
//! Parsing is incremental: an incomplete frame yields `Ok(None)` and leaves
//! the buffer untouched so the caller can read more bytes and retry.

use bytes::{Buf, BytesMut};

/// Largest accepted bulk string (512 MiB)
const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest accepted array (1 Mi elements)
const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Deepest accepted array nesting; commands are flat arrays
const MAX_DEPTH: usize = 32;

/// RESP frame
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// `+OK\r\n`
    SimpleString(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:42\r\n`
    Integer(i64),
    /// `$3\r\nfoo\r\n`, or `$-1\r\n` for null
    BulkString(Option<Vec<u8>>),
    /// `*2\r\n...`, or `*-1\r\n` for null
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    /// Shorthand for a bulk string reply
    pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    /// Shorthand for an error reply
    pub fn error(msg: impl Into<String>) -> Self {
        RespValue::Error(msg.into())
    }

    /// Encode this frame
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(s) => write_line(out, b'+', s.as_bytes()),
            RespValue::Error(e) => write_line(out, b'-', e.as_bytes()),
            RespValue::Integer(i) => write_line(out, b':', i.to_string().as_bytes()),
            RespValue::BulkString(None) => out.extend_from_slice(b"$-1\r\n"),
            RespValue::BulkString(Some(data)) => {
                write_line(out, b'$', data.len().to_string().as_bytes());
                out.extend_from_slice(data);
                out.extend_from_slice(b"\r\n");
            }
            RespValue::Array(None) => out.extend_from_slice(b"*-1\r\n"),
            RespValue::Array(Some(items)) => {
                write_line(out, b'*', items.len().to_string().as_bytes());
                for item in items {
                    item.write_to(out);
                }
            }
        }
    }

    /// Decode one frame from the front of `buf`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - A frame was decoded and its bytes consumed
    /// * `Ok(None)` - More bytes are needed
    /// * `Err(msg)` - The input is malformed
    pub fn parse(buf: &mut BytesMut) -> Result<Option<RespValue>, String> {
        let mut pos = 0;
        match parse_value(&buf[..], &mut pos, 0)? {
            Some(value) => {
                buf.advance(pos);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

fn write_line(out: &mut Vec<u8>, prefix: u8, body: &[u8]) {
    out.push(prefix);
    out.extend_from_slice(body);
    out.extend_from_slice(b"\r\n");
}

fn parse_value(
    input: &[u8],
    pos: &mut usize,
    depth: usize,
) -> Result<Option<RespValue>, String> {
    let Some(&tag) = input.get(*pos) else {
        return Ok(None);
    };
    *pos += 1;

    match tag {
        b'+' => Ok(read_text(input, pos)?.map(RespValue::SimpleString)),
        b'-' => Ok(read_text(input, pos)?.map(RespValue::Error)),
        b':' => Ok(read_int(input, pos)?.map(RespValue::Integer)),
        b'$' => parse_bulk(input, pos),
        b'*' => parse_array(input, pos, depth),
        other => Err(format!("unknown RESP type byte '{}'", other as char)),
    }
}

fn parse_bulk(input: &[u8], pos: &mut usize) -> Result<Option<RespValue>, String> {
    let Some(len) = read_len(input, pos, MAX_BULK_LEN, "bulk string")? else {
        return Ok(None);
    };
    let Some(len) = len else {
        return Ok(Some(RespValue::BulkString(None)));
    };

    let end = *pos + len;
    if input.len() < end + 2 {
        return Ok(None);
    }
    if &input[end..end + 2] != b"\r\n" {
        return Err("bulk string not terminated by CRLF".to_string());
    }

    let data = input[*pos..end].to_vec();
    *pos = end + 2;
    Ok(Some(RespValue::BulkString(Some(data))))
}

fn parse_array(
    input: &[u8],
    pos: &mut usize,
    depth: usize,
) -> Result<Option<RespValue>, String> {
    if depth >= MAX_DEPTH {
        return Err(format!("nesting too deep (max {})", MAX_DEPTH));
    }
    let Some(len) = read_len(input, pos, MAX_ARRAY_LEN, "array")? else {
        return Ok(None);
    };
    let Some(len) = len else {
        return Ok(Some(RespValue::Array(None)));
    };

    let mut items = Vec::with_capacity(len.min(64));
    for _ in 0..len {
        match parse_value(input, pos, depth + 1)? {
            Some(item) => items.push(item),
            None => return Ok(None),
        }
    }
    Ok(Some(RespValue::Array(Some(items))))
}

/// Reads a length header. The inner `None` is the RESP null (`-1`).
fn read_len(
    input: &[u8],
    pos: &mut usize,
    max: usize,
    what: &str,
) -> Result<Option<Option<usize>>, String> {
    let Some(len) = read_int(input, pos)? else {
        return Ok(None);
    };

    match len {
        -1 => Ok(Some(None)),
        n if n < 0 => Err(format!("invalid {} length {}", what, n)),
        n => {
            let n = n as usize;
            if n > max {
                return Err(format!("{} too large: {} (max {})", what, n, max));
            }
            Ok(Some(Some(n)))
        }
    }
}

fn read_int(input: &[u8], pos: &mut usize) -> Result<Option<i64>, String> {
    match read_text(input, pos)? {
        Some(text) => text
            .parse::<i64>()
            .map(Some)
            .map_err(|e| format!("invalid integer '{}': {}", text, e)),
        None => Ok(None),
    }
}

fn read_text(input: &[u8], pos: &mut usize) -> Result<Option<String>, String> {
    match read_line(input, pos) {
        Some(line) => String::from_utf8(line.to_vec())
            .map(Some)
            .map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

fn read_line<'a>(input: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let rest = &input[*pos..];
    let offset = rest.windows(2).position(|w| w == b"\r\n")?;
    *pos += offset + 2;
    Some(&rest[..offset])
}
