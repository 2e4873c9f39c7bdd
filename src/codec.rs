use crate::{
  error::{RespError, RespErrorKind},
  reader::Reader,
  types::Reply,
};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A framed decoder for RESP2 reply frames.
///
/// ```rust
/// use futures::StreamExt;
/// use resp_reader::{codec::Resp2, types::Reply};
/// use tokio::net::TcpStream;
/// use tokio_util::codec::FramedRead;
///
/// async fn example() {
///   let socket = TcpStream::connect("127.0.0.1:6379").await.unwrap();
///   let mut framed = FramedRead::new(socket, Resp2::default());
///
///   while let Some(reply) = framed.next().await {
///     println!("Reply: {:?}", reply.unwrap());
///   }
/// }
/// ```
///
/// Only the decode half is implemented. Serializing outgoing commands is left
/// to the caller.
#[derive(Debug, Default)]
pub struct Resp2 {
  reader: Reader,
}

impl Resp2 {
  /// Create a codec driving the provided reader, keeping its configuration.
  pub fn new(reader: Reader) -> Self {
    Resp2 { reader }
  }
}

impl Decoder for Resp2 {
  type Error = RespError;
  type Item = Reply;

  fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
    if !src.is_empty() {
      let data = src.split_to(src.len());
      self.reader.feed(&data);
    }

    self.reader.get_reply()
  }

  fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
    match self.decode(src)? {
      Some(reply) => Ok(Some(reply)),
      None => {
        // the input buffer is drained into the reader, so a frame truncated
        // by EOF is only visible through the reader's parse state
        if self.reader.has_pending() {
          Err(RespError::new(
            RespErrorKind::Protocol,
            "Stream ended in the middle of a frame.",
          ))
        } else {
          Ok(None)
        }
      },
    }
  }
}
