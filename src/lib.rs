//! # RESP Reader
//!
//! An incremental reader for [RESP2](https://redis.io/topics/protocol) reply frames.
//!
//! Raw bytes from a connection are appended with [feed](reader::Reader::feed)
//! in whatever fragments the transport produces, and completed replies are
//! drained with [get_reply](reader::Reader::get_reply). Partial input never
//! blocks and never forces a re-parse from scratch; the reader resumes from
//! its task stack once more bytes arrive.
//!
//! ## Examples
//!
//! ```rust
//! use resp_reader::{reader::Reader, types::Reply};
//!
//! let mut reader = Reader::new();
//!
//! // fragments may split frames anywhere, even mid-token
//! reader.feed(b"*2\r\n$3\r\nfo");
//! assert_eq!(reader.get_reply().unwrap(), None);
//!
//! reader.feed(b"o\r\n*1\r\n:7\r\n");
//! let reply = reader.get_reply().unwrap().unwrap();
//! assert_eq!(
//!   reply,
//!   Reply::Array(vec![
//!     Reply::BulkString("foo".into()),
//!     Reply::Array(vec![Reply::Integer(7)]),
//!   ])
//! );
//! ```
//!
//! Error replies (`-` prefix) are valid protocol content and move through the
//! success path as [Reply::Error](types::Reply::Error). Framing violations
//! poison the reader: the instance must be discarded and replaced.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

/// Error types for the reader.
pub mod error;
/// Reply types and framing constants.
pub mod types;
/// The incremental reader and its configuration.
pub mod reader;

pub(crate) mod decode;
pub(crate) mod task;

/// A framed codec interface for [tokio](https://tokio.rs) users.
#[cfg(feature = "codec")]
#[cfg_attr(docsrs, doc(cfg(feature = "codec")))]
pub mod codec;

pub use error::{RespError, RespErrorKind};
pub use reader::{Reader, ReaderConfig};
pub use types::{Reply, ReplyError, ReplyKind, TextEncoding};
