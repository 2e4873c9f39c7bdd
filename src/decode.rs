//! Streaming token parsers for the RESP2 framing layer.
//!
//! Each parser either consumes one complete framing token, fails with
//! `Err::Failure` on malformed input, or signals `Err::Incomplete` when the
//! token is not fully buffered yet. Nothing is consumed on an incomplete
//! token, so the reader can retry after more bytes arrive.

use crate::{
  error::ReaderParseError,
  types::{ReplyKind, CRLF},
};
use bytes::Bytes;
use core::str;
use nom::{
  bytes::streaming::{take as nom_take, take_until as nom_take_until},
  number::streaming::be_u8,
  sequence::terminated as nom_terminated,
};

pub(crate) type DResult<'a, T> = Result<(&'a [u8], T), nom::Err<ReaderParseError<&'a [u8]>>>;

/// Lengths parsed from a `$` or `*` prefix line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PrefixLen {
  /// The RESP `-1` sentinel denoting a nil value.
  Nil,
  Len(usize),
}

fn to_isize(s: &[u8]) -> Result<isize, ReaderParseError<&[u8]>> {
  str::from_utf8(s)?
    .parse::<isize>()
    .map_err(|_| ReaderParseError::new_custom("to_isize", "Failed to parse as integer."))
}

fn to_i64(s: &[u8]) -> Result<i64, ReaderParseError<&[u8]>> {
  str::from_utf8(s)?
    .parse::<i64>()
    .map_err(|_| ReaderParseError::new_custom("to_i64", "Failed to parse as integer."))
}

/// Read the type prefix byte for the next frame.
pub(crate) fn read_kind(input: &[u8]) -> DResult<ReplyKind> {
  let (input, byte) = be_u8(input)?;
  decode_log!(input, "Reading frame kind. Kind byte: {:?}, remaining: {:?}", byte, input);

  match ReplyKind::from_byte(byte) {
    Some(kind) => Ok((input, kind)),
    None => e!(ReaderParseError::new_custom("read_kind", "Invalid frame kind byte.")),
  }
}

/// Read one line, up to but not including the trailing CRLF.
pub(crate) fn read_line(input: &[u8]) -> DResult<&[u8]> {
  decode_log!(input, "Parsing to CRLF. Remaining: {:?}", input);
  nom_terminated(nom_take_until(CRLF.as_bytes()), nom_take(2_usize))(input)
}

/// Read a `$` or `*` length prefix line.
pub(crate) fn read_prefix_len(input: &[u8]) -> DResult<PrefixLen> {
  let (input, data) = read_line(input)?;
  decode_log!("Reading prefix len. Data: {:?}", str::from_utf8(data));

  match etry!(to_isize(data)) {
    -1 => Ok((input, PrefixLen::Nil)),
    len if len < -1 => e!(ReaderParseError::new_custom("read_prefix_len", "Length out of range.")),
    len => Ok((input, PrefixLen::Len(len as usize))),
  }
}

/// Read an integer frame body as a signed 64 bit decimal line.
pub(crate) fn read_i64(input: &[u8]) -> DResult<i64> {
  let (input, data) = read_line(input)?;
  Ok((input, etry!(to_i64(data))))
}

/// Read a complete bulk string frame body, including the length prefix.
///
/// The length line and payload are parsed as one unit so that a partially
/// buffered payload consumes nothing and the parse can resume from the `$`
/// prefix once more bytes arrive.
pub(crate) fn read_bulk(input: &[u8]) -> DResult<Option<&[u8]>> {
  let (input, len) = read_prefix_len(input)?;
  decode_log!(input, "Parsing bulk string. Length: {:?}, remaining: {:?}", len, input);

  match len {
    PrefixLen::Nil => Ok((input, None)),
    PrefixLen::Len(len) => {
      let (input, data) = nom_terminated(nom_take(len), nom_take(2_usize))(input)?;
      Ok((input, Some(data)))
    },
  }
}

/// [read_line], copying the line into an owned buffer.
pub(crate) fn read_line_bytes(input: &[u8]) -> DResult<Bytes> {
  let (input, data) = read_line(input)?;
  Ok((input, Bytes::copy_from_slice(data)))
}

/// [read_bulk], copying the payload into an owned buffer.
pub(crate) fn read_bulk_bytes(input: &[u8]) -> DResult<Option<Bytes>> {
  let (input, data) = read_bulk(input)?;
  Ok((input, data.map(Bytes::copy_from_slice)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use nom::Err as NomErr;

  fn expect_incomplete<T: core::fmt::Debug>(result: DResult<T>) {
    match result {
      Err(NomErr::Incomplete(_)) => {},
      other => panic!("Expected incomplete, got {:?}", other),
    }
  }

  fn expect_failure<T: core::fmt::Debug>(result: DResult<T>) {
    match result {
      Err(NomErr::Failure(_)) => {},
      other => panic!("Expected failure, got {:?}", other),
    }
  }

  #[test]
  fn should_read_kind_bytes() {
    let (remaining, kind) = read_kind(b"+OK\r\n").unwrap();
    assert_eq!(kind, ReplyKind::SimpleString);
    assert_eq!(remaining, b"OK\r\n");

    expect_incomplete(read_kind(b""));
    expect_failure(read_kind(b"x"));
  }

  #[test]
  #[cfg(feature = "decode-logs")]
  fn should_trace_token_parsers() {
    let _ = pretty_env_logger::try_init();

    let (_, kind) = read_kind(b"+OK\r\n").unwrap();
    assert_eq!(kind, ReplyKind::SimpleString);
    assert_eq!(read_line(b"OK\r\n").unwrap().1, b"OK");
    assert_eq!(read_prefix_len(b"3\r\n").unwrap().1, PrefixLen::Len(3));
    assert_eq!(read_bulk(b"3\r\nfoo\r\n").unwrap().1, Some(&b"foo"[..]));
  }

  #[test]
  fn should_read_lines_to_crlf() {
    let (remaining, line) = read_line(b"OK\r\n+next\r\n").unwrap();
    assert_eq!(line, b"OK");
    assert_eq!(remaining, b"+next\r\n");

    expect_incomplete(read_line(b"OK"));
    expect_incomplete(read_line(b"OK\r"));
  }

  #[test]
  fn should_read_prefix_lens() {
    assert_eq!(read_prefix_len(b"5\r\n").unwrap().1, PrefixLen::Len(5));
    assert_eq!(read_prefix_len(b"0\r\n").unwrap().1, PrefixLen::Len(0));
    assert_eq!(read_prefix_len(b"-1\r\n").unwrap().1, PrefixLen::Nil);

    expect_failure(read_prefix_len(b"-5\r\n"));
    expect_failure(read_prefix_len(b"abc\r\n"));
    expect_incomplete(read_prefix_len(b"12"));
  }

  #[test]
  fn should_read_i64_lines() {
    assert_eq!(read_i64(b"48293\r\n").unwrap().1, 48293);
    assert_eq!(read_i64(b"-329\r\n").unwrap().1, -329);
    assert_eq!(read_i64(b"+42\r\n").unwrap().1, 42);
    assert_eq!(read_i64(format!("{}\r\n", i64::MAX).as_bytes()).unwrap().1, i64::MAX);

    expect_failure(read_i64(b"3.14\r\n"));
    expect_failure(read_i64(b"\r\n"));
  }

  #[test]
  fn should_read_bulk_bodies() {
    let (remaining, body) = read_bulk(b"3\r\nfoo\r\ntrailing").unwrap();
    assert_eq!(body, Some(&b"foo"[..]));
    assert_eq!(remaining, b"trailing");

    assert_eq!(read_bulk(b"0\r\n\r\n").unwrap().1, Some(&b""[..]));
    assert_eq!(read_bulk(b"-1\r\n").unwrap().1, None);

    expect_incomplete(read_bulk(b"3\r\nfo"));
    expect_incomplete(read_bulk(b"3\r\nfoo"));
    expect_failure(read_bulk(b"-5\r\n"));
  }
}
