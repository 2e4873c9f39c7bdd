use core::{borrow::Borrow, fmt, fmt::Debug, str::Utf8Error};
use nom::{
  error::{ErrorKind, FromExternalError, ParseError},
  Err as NomError,
  Needed,
};
use std::{borrow::Cow, io::Error as IoError};

/// The kind of error without any associated data.
#[derive(Debug)]
pub enum RespErrorKind {
  /// The byte stream violated the RESP framing rules. The reader that
  /// produced this error is poisoned and must be replaced.
  Protocol,
  /// An error raised while constructing a reply value, such as a text
  /// decoding failure. Does not poison the reader.
  Decode,
  /// An invalid argument to a public function, such as an out of range
  /// offset or length.
  InvalidInput,
  /// An IO error.
  IO(IoError),
  /// An unknown error.
  Unknown,
}

impl PartialEq for RespErrorKind {
  fn eq(&self, other: &Self) -> bool {
    use self::RespErrorKind::*;

    match *self {
      Protocol => matches!(other, Protocol),
      Decode => matches!(other, Decode),
      InvalidInput => matches!(other, InvalidInput),
      IO(_) => matches!(other, IO(_)),
      Unknown => matches!(other, Unknown),
    }
  }
}

impl Eq for RespErrorKind {}

impl RespErrorKind {
  pub fn to_str(&self) -> &'static str {
    use self::RespErrorKind::*;

    match *self {
      Protocol => "Protocol Error",
      Decode => "Decode Error",
      InvalidInput => "Invalid Input",
      IO(_) => "IO Error",
      Unknown => "Unknown Error",
    }
  }
}

/// The default error type used with all external functions in this library.
#[derive(Debug, Eq, PartialEq)]
pub struct RespError {
  details: Cow<'static, str>,
  kind:    RespErrorKind,
}

impl RespError {
  pub fn new<S: Into<Cow<'static, str>>>(kind: RespErrorKind, desc: S) -> Self {
    RespError {
      kind,
      details: desc.into(),
    }
  }

  pub fn new_protocol<S: Into<Cow<'static, str>>>(desc: S) -> Self {
    RespError::new(RespErrorKind::Protocol, desc)
  }

  pub fn new_decode<S: Into<Cow<'static, str>>>(desc: S) -> Self {
    RespError::new(RespErrorKind::Decode, desc)
  }

  pub fn details(&self) -> &str {
    self.details.borrow()
  }

  pub fn kind(&self) -> &RespErrorKind {
    &self.kind
  }
}

impl fmt::Display for RespError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}: {}", self.kind.to_str(), self.details)
  }
}

impl std::error::Error for RespError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self.kind {
      RespErrorKind::IO(ref e) => Some(e),
      _ => None,
    }
  }
}

impl From<IoError> for RespError {
  fn from(e: IoError) -> Self {
    RespError::new(RespErrorKind::IO(e), "IO Error")
  }
}

impl<I> From<ReaderParseError<I>> for RespError
where
  I: Debug,
{
  fn from(e: ReaderParseError<I>) -> Self {
    RespError::new_protocol(format!("{:?}", e))
  }
}

impl From<Utf8Error> for RespError {
  fn from(e: Utf8Error) -> Self {
    RespError::new_decode(format!("{}", e))
  }
}

/// A struct defining parse errors when decoding frames.
pub enum ReaderParseError<I> {
  Custom {
    context: &'static str,
    message: Cow<'static, str>,
  },
  Incomplete(Needed),
  Nom(I, ErrorKind),
}

impl<I> fmt::Debug for ReaderParseError<I>
where
  I: Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      ReaderParseError::Custom { context, message } => write!(f, "{}: {}", context, message),
      ReaderParseError::Nom(input, kind) => write!(f, "{:?} at {:?}", kind, input),
      ReaderParseError::Incomplete(needed) => write!(f, "Incomplete({:?})", needed),
    }
  }
}

impl<I> ReaderParseError<I> {
  pub fn new_custom<S: Into<Cow<'static, str>>>(ctx: &'static str, message: S) -> Self {
    ReaderParseError::Custom {
      context: ctx,
      message: message.into(),
    }
  }

  pub fn into_nom_error(self) -> nom::Err<ReaderParseError<I>> {
    match self {
      ReaderParseError::Incomplete(n) => nom::Err::Incomplete(n),
      _ => nom::Err::Failure(self),
    }
  }
}

impl<I> ParseError<I> for ReaderParseError<I> {
  fn from_error_kind(input: I, kind: ErrorKind) -> Self {
    ReaderParseError::Nom(input, kind)
  }

  fn append(_: I, _: ErrorKind, other: Self) -> Self {
    other
  }
}

impl<I, E> FromExternalError<I, E> for ReaderParseError<I> {
  fn from_external_error(input: I, kind: ErrorKind, _e: E) -> Self {
    ReaderParseError::Nom(input, kind)
  }
}

impl<I> From<nom::Err<ReaderParseError<I>>> for ReaderParseError<I> {
  fn from(e: NomError<ReaderParseError<I>>) -> Self {
    match e {
      NomError::Incomplete(n) => ReaderParseError::Incomplete(n),
      NomError::Failure(e) | NomError::Error(e) => e,
    }
  }
}

impl<I> From<Utf8Error> for ReaderParseError<I> {
  fn from(e: Utf8Error) -> Self {
    ReaderParseError::new_custom("parse_utf8", format!("{}", e))
  }
}
