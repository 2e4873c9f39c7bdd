use crate::error::RespError;
use bytes::Bytes;
use bytes_utils::Str;
use core::{fmt, mem, str};

/// Byte prefix before a simple string type.
pub const SIMPLESTRING_BYTE: u8 = b'+';
/// Byte prefix before an error type.
pub const ERROR_BYTE: u8 = b'-';
/// Byte prefix before an integer type.
pub const INTEGER_BYTE: u8 = b':';
/// Byte prefix before a bulk string type.
pub const BULKSTRING_BYTE: u8 = b'$';
/// Byte prefix before an array type.
pub const ARRAY_BYTE: u8 = b'*';

/// Terminating bytes between frames.
pub const CRLF: &str = "\r\n";

/// An enum representing the kind of a reply without references to any inner data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplyKind {
  SimpleString,
  Error,
  Integer,
  BulkString,
  Array,
  Null,
}

impl ReplyKind {
  pub fn from_byte(d: u8) -> Option<ReplyKind> {
    use self::ReplyKind::*;

    match d {
      SIMPLESTRING_BYTE => Some(SimpleString),
      ERROR_BYTE => Some(Error),
      INTEGER_BYTE => Some(Integer),
      BULKSTRING_BYTE => Some(BulkString),
      ARRAY_BYTE => Some(Array),
      _ => None,
    }
  }

  pub fn to_byte(&self) -> u8 {
    use self::ReplyKind::*;

    match *self {
      SimpleString => SIMPLESTRING_BYTE,
      Error => ERROR_BYTE,
      Integer => INTEGER_BYTE,
      BulkString | Null => BULKSTRING_BYTE,
      Array => ARRAY_BYTE,
    }
  }
}

/// A well-formed RESP error reply (`-` prefix).
///
/// This is valid protocol content, not a parser failure. It moves through the
/// success path of [get_reply](crate::reader::Reader::get_reply) and the
/// caller decides whether to treat it as an error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplyError {
  payload: Bytes,
}

impl ReplyError {
  pub fn new(payload: Bytes) -> Self {
    ReplyError { payload }
  }

  /// The raw error payload, without the `-` prefix or trailing CRLF.
  pub fn payload(&self) -> &Bytes {
    &self.payload
  }

  /// Read the payload as a string slice, if it contains valid UTF-8.
  pub fn details(&self) -> Option<&str> {
    str::from_utf8(&self.payload).ok()
  }

  /// The leading word of the payload (`ERR`, `WRONGTYPE`, `MOVED`, ...), if any.
  pub fn code(&self) -> Option<&str> {
    self.details().and_then(|s| s.split(' ').next()).filter(|s| !s.is_empty())
  }
}

impl fmt::Display for ReplyError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", String::from_utf8_lossy(&self.payload))
  }
}

impl std::error::Error for ReplyError {}

impl From<&'static str> for ReplyError {
  fn from(s: &'static str) -> Self {
    ReplyError::new(Bytes::from_static(s.as_bytes()))
  }
}

/// A text encoding applied to simple string and bulk string payloads.
///
/// Decoding failures are deferred and surfaced by the next call to
/// [get_reply](crate::reader::Reader::get_reply), they never poison the reader.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextEncoding {
  Utf8,
  Ascii,
}

impl TextEncoding {
  pub fn decode(&self, data: Bytes) -> Result<Str, RespError> {
    match *self {
      TextEncoding::Utf8 => Str::from_inner(data).map_err(|e| RespError::new_decode(format!("{}", e.utf8_error()))),
      TextEncoding::Ascii => {
        if data.is_ascii() {
          Str::from_inner(data).map_err(|e| RespError::new_decode(format!("{}", e.utf8_error())))
        } else {
          Err(RespError::new_decode("Invalid ASCII payload."))
        }
      },
    }
  }
}

/// A decoded RESP2 reply.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
  /// A short string.
  SimpleString(Bytes),
  /// A short string representing an error reply.
  Error(ReplyError),
  /// A signed 64 bit integer.
  Integer(i64),
  /// A RESP2 bulk string.
  BulkString(Bytes),
  /// A simple string or bulk string decoded with the configured text encoding.
  String(Str),
  /// An array of replies.
  Array(Vec<Reply>),
  /// A null value.
  Null,
}

impl Reply {
  /// Replace `self` with Null, returning the original value.
  pub fn take(&mut self) -> Reply {
    mem::replace(self, Reply::Null)
  }

  /// Read the `ReplyKind` value for this reply.
  pub fn kind(&self) -> ReplyKind {
    match *self {
      Reply::SimpleString(_) | Reply::String(_) => ReplyKind::SimpleString,
      Reply::Error(_) => ReplyKind::Error,
      Reply::Integer(_) => ReplyKind::Integer,
      Reply::BulkString(_) => ReplyKind::BulkString,
      Reply::Array(_) => ReplyKind::Array,
      Reply::Null => ReplyKind::Null,
    }
  }

  /// Whether or not the reply is an error reply.
  pub fn is_error(&self) -> bool {
    matches!(*self, Reply::Error(_))
  }

  /// Whether or not the reply is a simple string, bulk string, or decoded string.
  pub fn is_string(&self) -> bool {
    matches!(*self, Reply::SimpleString(_) | Reply::BulkString(_) | Reply::String(_))
  }

  /// Whether or not the reply is Null.
  pub fn is_null(&self) -> bool {
    matches!(*self, Reply::Null)
  }

  /// Whether or not the reply is an array of replies.
  pub fn is_array(&self) -> bool {
    matches!(*self, Reply::Array(_))
  }

  /// Whether or not the reply is an integer.
  pub fn is_integer(&self) -> bool {
    matches!(*self, Reply::Integer(_))
  }

  /// Attempt to read the reply value as a string slice without allocating.
  pub fn as_str(&self) -> Option<&str> {
    match *self {
      Reply::BulkString(ref b) | Reply::SimpleString(ref b) => str::from_utf8(b).ok(),
      Reply::String(ref s) => Some(s),
      Reply::Error(ref e) => e.details(),
      _ => None,
    }
  }

  /// Attempt to read the raw bytes backing a string or error reply.
  pub fn as_bytes(&self) -> Option<&[u8]> {
    match *self {
      Reply::BulkString(ref b) | Reply::SimpleString(ref b) => Some(b),
      Reply::String(ref s) => Some(s.as_bytes()),
      Reply::Error(ref e) => Some(e.payload()),
      _ => None,
    }
  }

  /// Attempt to move out the inner array of replies.
  pub fn into_array(self) -> Result<Vec<Reply>, Reply> {
    match self {
      Reply::Array(values) => Ok(values),
      other => Err(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn should_decode_reply_kind_byte() {
    assert_eq!(ReplyKind::from_byte(SIMPLESTRING_BYTE), Some(ReplyKind::SimpleString));
    assert_eq!(ReplyKind::from_byte(ERROR_BYTE), Some(ReplyKind::Error));
    assert_eq!(ReplyKind::from_byte(INTEGER_BYTE), Some(ReplyKind::Integer));
    assert_eq!(ReplyKind::from_byte(BULKSTRING_BYTE), Some(ReplyKind::BulkString));
    assert_eq!(ReplyKind::from_byte(ARRAY_BYTE), Some(ReplyKind::Array));
    assert_eq!(ReplyKind::from_byte(b'x'), None);
  }

  #[test]
  fn should_encode_reply_kind_byte() {
    assert_eq!(ReplyKind::SimpleString.to_byte(), SIMPLESTRING_BYTE);
    assert_eq!(ReplyKind::Error.to_byte(), ERROR_BYTE);
    assert_eq!(ReplyKind::Integer.to_byte(), INTEGER_BYTE);
    assert_eq!(ReplyKind::BulkString.to_byte(), BULKSTRING_BYTE);
    assert_eq!(ReplyKind::Null.to_byte(), BULKSTRING_BYTE);
    assert_eq!(ReplyKind::Array.to_byte(), ARRAY_BYTE);
  }

  #[test]
  fn should_check_reply_types() {
    let r = Reply::Null;
    assert!(r.is_null());
    assert!(!r.is_string());
    assert!(!r.is_error());
    assert!(!r.is_array());
    assert!(!r.is_integer());

    let r = Reply::BulkString("foo".into());
    assert!(!r.is_null());
    assert!(r.is_string());
    assert!(!r.is_error());
    assert!(!r.is_array());
    assert!(!r.is_integer());

    let r = Reply::SimpleString("foo".into());
    assert!(!r.is_null());
    assert!(r.is_string());
    assert!(!r.is_error());
    assert!(!r.is_array());
    assert!(!r.is_integer());

    let r = Reply::Error("foo".into());
    assert!(!r.is_null());
    assert!(!r.is_string());
    assert!(r.is_error());
    assert!(!r.is_array());
    assert!(!r.is_integer());

    let r = Reply::Array(vec![Reply::SimpleString("foo".into())]);
    assert!(!r.is_null());
    assert!(!r.is_string());
    assert!(!r.is_error());
    assert!(r.is_array());
    assert!(!r.is_integer());

    let r = Reply::Integer(10);
    assert!(!r.is_null());
    assert!(!r.is_string());
    assert!(!r.is_error());
    assert!(!r.is_array());
    assert!(r.is_integer());
  }

  #[test]
  fn should_read_reply_error_code() {
    let error = ReplyError::from("WRONGTYPE Operation against a key holding the wrong kind of value");
    assert_eq!(error.code(), Some("WRONGTYPE"));
    assert_eq!(
      error.details(),
      Some("WRONGTYPE Operation against a key holding the wrong kind of value")
    );

    let error = ReplyError::new(Bytes::new());
    assert_eq!(error.code(), None);
  }

  #[test]
  fn should_decode_utf8_payloads() {
    let snowman: Bytes = Bytes::from_static("\u{2603}".as_bytes());
    let decoded = TextEncoding::Utf8.decode(snowman).unwrap();
    assert_eq!(&*decoded, "\u{2603}");

    let invalid = Bytes::from_static(&[0xFF, 0xFE, 0xFD]);
    assert!(TextEncoding::Utf8.decode(invalid).is_err());
  }

  #[test]
  fn should_decode_ascii_payloads() {
    let ok = Bytes::from_static(b"hello");
    assert_eq!(&*TextEncoding::Ascii.decode(ok).unwrap(), "hello");

    let snowman: Bytes = Bytes::from_static("\u{2603}".as_bytes());
    assert!(TextEncoding::Ascii.decode(snowman).is_err());
  }
}
