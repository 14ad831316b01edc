//! Byte sources for response bodies.
//!
//! Transport clients deliver bodies in different shapes. This module adapts
//! them all to [`AsyncRead`], which is what the envelope stores:
//!
//! - [`StreamReader`]: a stream of `Bytes` chunks
//! - [`http_body_reader`]: an [`http_body::Body`] (data frames only)

use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use http_body_util::BodyExt;
use tokio::io::AsyncRead;

pub use tokio_util::io::StreamReader;

/// A boxed single-pass byte source.
pub type BoxAsyncRead = Pin<Box<dyn AsyncRead + Send + 'static>>;

/// Adapt an HTTP body into a single-pass byte source.
///
/// Trailer frames are skipped; body errors surface as `io::Error` from the
/// read that encounters them.
pub fn http_body_reader<B>(
    body: B,
) -> StreamReader<impl Stream<Item = io::Result<Bytes>>, Bytes>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    StreamReader::new(body.into_data_stream().map_err(io::Error::other))
}
