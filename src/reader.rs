//! An incremental reader for RESP2 reply frames.
//!
//! The [Reader] owns an append-only input buffer and an explicit stack of
//! in-progress parse tasks. Bytes go in through [feed](Reader::feed) in
//! arbitrarily sized fragments and completed top-level replies come out of
//! [get_reply](Reader::get_reply), one per call. Nesting is tracked on the
//! task stack rather than the call stack, so adversarial nesting depth is
//! bounded only by memory.

use crate::{
  decode::{self, DResult, PrefixLen},
  error::{RespError, RespErrorKind},
  task::ReadTask,
  types::{Reply, ReplyError, ReplyKind, TextEncoding},
};
use bytes::{Bytes, BytesMut};
use core::{fmt, mem};
use nom::Err as NomErr;
use std::borrow::Cow;

/// A factory mapping a framing-violation message to the error returned by
/// [get_reply](Reader::get_reply).
pub type ProtocolErrorFn = Box<dyn Fn(Cow<'static, str>) -> RespError + Send + Sync>;
/// A factory wrapping the payload of a `-` error reply.
pub type ReplyErrorFn = Box<dyn Fn(Bytes) -> ReplyError + Send + Sync>;

/// The default allocation size an idle reader may keep around between replies.
pub const DEFAULT_MAX_IDLE_BUFFER: usize = 16 * 1024;

/// Configuration options for a [Reader].
pub struct ReaderConfig {
  /// Factory for protocol-level framing errors.
  pub protocol_error:  Option<ProtocolErrorFn>,
  /// Factory for application-level `-` error replies.
  pub reply_error:     Option<ReplyErrorFn>,
  /// When set, simple string and bulk string payloads are decoded to text
  /// instead of returned as raw bytes.
  pub text_encoding:   Option<TextEncoding>,
  /// Once the buffer is fully drained, allocations larger than this are
  /// released rather than reused.
  pub max_idle_buffer: usize,
}

impl Default for ReaderConfig {
  fn default() -> Self {
    ReaderConfig {
      protocol_error:  None,
      reply_error:     None,
      text_encoding:   None,
      max_idle_buffer: DEFAULT_MAX_IDLE_BUFFER,
    }
  }
}

impl fmt::Debug for ReaderConfig {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("ReaderConfig")
      .field("protocol_error", &self.protocol_error.is_some())
      .field("reply_error", &self.reply_error.is_some())
      .field("text_encoding", &self.text_encoding)
      .field("max_idle_buffer", &self.max_idle_buffer)
      .finish()
  }
}

/// A push-based, incremental decoder for RESP2 reply frames.
///
/// ```rust
/// use resp_reader::{reader::Reader, types::Reply};
///
/// let mut reader = Reader::new();
/// reader.feed(b"*2\r\n$3\r\nfoo\r\n");
/// // the array is still partial
/// assert_eq!(reader.get_reply().unwrap(), None);
///
/// reader.feed(b":42\r\n");
/// let expected = Reply::Array(vec![Reply::BulkString("foo".into()), Reply::Integer(42)]);
/// assert_eq!(reader.get_reply().unwrap(), Some(expected));
/// ```
///
/// The reader is a single mutable state machine with no internal locking.
/// Run one instance per connection or byte stream.
pub struct Reader {
  buf:     BytesMut,
  pos:     usize,
  stack:   Vec<ReadTask>,
  error:   Option<Cow<'static, str>>,
  pending: Option<RespError>,
  config:  ReaderConfig,
}

impl Default for Reader {
  fn default() -> Self {
    Reader::new()
  }
}

impl fmt::Debug for Reader {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Reader")
      .field("buffer_len", &self.buffer_len())
      .field("depth", &self.stack.len())
      .field("error", &self.error)
      .field("config", &self.config)
      .finish()
  }
}

impl Reader {
  /// Create a new reader with default options.
  pub fn new() -> Self {
    Reader::with_config(ReaderConfig::default())
  }

  /// Create a new reader with the provided options.
  pub fn with_config(config: ReaderConfig) -> Self {
    Reader {
      buf: BytesMut::new(),
      pos: 0,
      stack: Vec::new(),
      error: None,
      pending: None,
      config,
    }
  }

  /// Append `data` to the internal buffer.
  ///
  /// Fragments may be arbitrarily small, down to one byte, and zero-length
  /// input is a no-op.
  pub fn feed(&mut self, data: &[u8]) {
    // release an oversized allocation once the previous replies drained
    if self.buf.is_empty() && self.buf.capacity() > self.config.max_idle_buffer {
      self.buf = BytesMut::new();
      self.pos = 0;
    }
    if !data.is_empty() {
      self.buf.extend_from_slice(data);
    }
  }

  /// Append `data[offset .. offset + length]` to the internal buffer.
  ///
  /// Returns an input-range error if the slice falls outside `data`, leaving
  /// the reader untouched.
  pub fn feed_range(&mut self, data: &[u8], offset: usize, length: usize) -> Result<(), RespError> {
    let end = offset
      .checked_add(length)
      .filter(|end| *end <= data.len())
      .ok_or_else(|| RespError::new(RespErrorKind::InvalidInput, "Input range is larger than the buffer."))?;

    self.feed(&data[offset .. end]);
    Ok(())
  }

  /// Attempt to extract the next completed top-level reply.
  ///
  /// Returns `Ok(None)` when more data is needed, distinct from a decoded
  /// [Reply::Null]. Returns a protocol error if the byte stream violates the
  /// RESP framing rules, after which the reader is poisoned and every
  /// subsequent call fails the same way. A deferred construction error (such
  /// as a text decoding failure) is surfaced on the call where the affected
  /// top-level reply settles, without poisoning the reader.
  pub fn get_reply(&mut self) -> Result<Option<Reply>, RespError> {
    if let Some(ref message) = self.error {
      let message = message.clone();
      return Err(self.make_protocol_error(message));
    }

    loop {
      if self.stack.is_empty() {
        if self.pos >= self.buf.len() {
          self.compact();
          return Ok(None);
        }
        let kind = match self.parse_kind()? {
          Some(kind) => kind,
          None => return Ok(None),
        };
        self.stack.push(ReadTask::new(kind, 0, None));
      }

      let top = self.stack.len() - 1;
      match self.stack[top].kind {
        ReplyKind::SimpleString | ReplyKind::Error => {
          let data = match self.parse_line()? {
            Some(data) => data,
            None => return Ok(None),
          };
          let kind = self.stack[top].kind;
          let value = self.build_string(kind, data);
          if let Some(reply) = self.parentize(value) {
            return self.finish(reply);
          }
        },
        ReplyKind::Integer => {
          let value = match self.parse_i64()? {
            Some(i) => Reply::Integer(i),
            None => return Ok(None),
          };
          if let Some(reply) = self.parentize(value) {
            return self.finish(reply);
          }
        },
        ReplyKind::BulkString => {
          let value = match self.parse_bulk()? {
            Some(Some(data)) => self.build_string(ReplyKind::BulkString, data),
            Some(None) => Reply::Null,
            None => return Ok(None),
          };
          if let Some(reply) = self.parentize(value) {
            return self.finish(reply);
          }
        },
        ReplyKind::Array => {
          if self.stack[top].elements.is_none() {
            match self.parse_prefix_len()? {
              Some(PrefixLen::Nil) => {
                if let Some(reply) = self.parentize(Reply::Null) {
                  return self.finish(reply);
                }
                continue;
              },
              Some(PrefixLen::Len(count)) => {
                let task = &mut self.stack[top];
                task.elements = Some(count);
                task.slots = Vec::with_capacity(count);
              },
              None => return Ok(None),
            }
          }

          if self.stack[top].is_filled() {
            let slots = mem::take(&mut self.stack[top].slots);
            if let Some(reply) = self.parentize(Reply::Array(slots)) {
              return self.finish(reply);
            }
          } else {
            let kind = match self.parse_kind()? {
              Some(kind) => kind,
              None => return Ok(None),
            };
            let index = self.stack[top].slots.len();
            self.stack.push(ReadTask::new(kind, index, Some(top)));
          }
        },
        // nulls are derived from `$-1` or `*-1` length prefixes and never
        // appear as a task kind
        ReplyKind::Null => {
          if let Some(reply) = self.parentize(Reply::Null) {
            return self.finish(reply);
          }
        },
      }
    }
  }

  /// The number of unconsumed buffered bytes.
  pub fn buffer_len(&self) -> usize {
    self.buf.len() - self.pos
  }

  /// Whether a parse is mid-flight or unconsumed bytes remain.
  pub fn has_pending(&self) -> bool {
    !self.stack.is_empty() || self.pos < self.buf.len()
  }

  /// Whether the reader has encountered a protocol error and must be replaced.
  pub fn is_poisoned(&self) -> bool {
    self.error.is_some()
  }

  // --- parsing plumbing ---

  fn parse_kind(&mut self) -> Result<Option<ReplyKind>, RespError> {
    self.parse_token(decode::read_kind)
  }

  fn parse_line(&mut self) -> Result<Option<Bytes>, RespError> {
    self.parse_token(decode::read_line_bytes)
  }

  fn parse_i64(&mut self) -> Result<Option<i64>, RespError> {
    self.parse_token(decode::read_i64)
  }

  fn parse_prefix_len(&mut self) -> Result<Option<PrefixLen>, RespError> {
    self.parse_token(decode::read_prefix_len)
  }

  fn parse_bulk(&mut self) -> Result<Option<Option<Bytes>>, RespError> {
    self.parse_token(decode::read_bulk_bytes)
  }

  /// Run one token parser at the cursor, advancing it over a complete token,
  /// leaving it in place on incomplete input, and poisoning the reader on
  /// malformed input.
  fn parse_token<T>(&mut self, parser: fn(&[u8]) -> DResult<'_, T>) -> Result<Option<T>, RespError> {
    let step = match parser(&self.buf[self.pos ..]) {
      Ok((remaining, value)) => Ok((remaining.len(), value)),
      Err(NomErr::Incomplete(_)) => return Ok(None),
      Err(NomErr::Error(e)) | Err(NomErr::Failure(e)) => Err(format!("{:?}", e)),
    };

    match step {
      Ok((remaining, value)) => {
        self.pos = self.buf.len() - remaining;
        Ok(Some(value))
      },
      Err(message) => Err(self.poison(message)),
    }
  }

  // --- value construction ---

  /// Materialize a string-backed value for the current task kind.
  ///
  /// Error replies wrap the payload through the configured reply-error
  /// factory. Other strings are decoded when a text encoding is configured;
  /// a decoding failure is captured for the next settled reply and a
  /// placeholder fills the slot, since raising here would leave the task
  /// stack inconsistent.
  fn build_string(&mut self, kind: ReplyKind, data: Bytes) -> Reply {
    if kind == ReplyKind::Error {
      let error = match self.config.reply_error {
        Some(ref factory) => factory(data),
        None => ReplyError::new(data),
      };
      return Reply::Error(error);
    }

    match self.config.text_encoding {
      Some(encoding) => match encoding.decode(data) {
        Ok(decoded) => Reply::String(decoded),
        Err(error) => {
          if self.pending.is_none() {
            self.pending = Some(error);
          }
          Reply::Null
        },
      },
      None => match kind {
        ReplyKind::SimpleString => Reply::SimpleString(data),
        _ => Reply::BulkString(data),
      },
    }
  }

  /// Pop the innermost task and link its value into the parent's child slot,
  /// returning the value when the root task completed instead.
  fn parentize(&mut self, value: Reply) -> Option<Reply> {
    let task = self.stack.pop()?;
    match task.parent {
      Some(parent) => {
        debug_assert_eq!(task.index, self.stack[parent].slots.len());
        self.stack[parent].slots.push(value);
        None
      },
      None => Some(value),
    }
  }

  /// Hand a settled top-level reply to the caller, or surface a deferred
  /// construction error captured while it was being built.
  fn finish(&mut self, reply: Reply) -> Result<Option<Reply>, RespError> {
    self.compact();

    if let Some(error) = self.pending.take() {
      // the reply contains a placeholder where construction failed, so it is
      // discarded rather than delivered
      decode_log!("Discarding settled reply for deferred error: {:?}", &error);
      drop(reply);
      Err(error)
    } else {
      Ok(Some(reply))
    }
  }

  /// Discard the consumed prefix of the buffer.
  fn compact(&mut self) {
    if self.pos > 0 {
      let _ = self.buf.split_to(self.pos);
      self.pos = 0;
    }
  }

  fn make_protocol_error(&self, message: Cow<'static, str>) -> RespError {
    match self.config.protocol_error {
      Some(ref factory) => factory(message),
      None => RespError::new_protocol(message),
    }
  }

  /// Enter the unrecoverable protocol-error state, releasing any in-progress
  /// task tree.
  fn poison(&mut self, message: String) -> RespError {
    decode_log!("Protocol error: {}", &message);
    self.stack.clear();
    self.error = Some(Cow::Owned(message.clone()));
    self.make_protocol_error(Cow::Owned(message))
  }
}
