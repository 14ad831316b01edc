//! Response payload: an embedded blob or an open stream.
//!
//! The embedded blob lives in the wire message ([`InvokeResponse::data`]);
//! the stream lives beside it in a [`ReplayableBody`]. When both are
//! present the embedded blob wins, so a streamed body can be overridden by
//! a materialized one after the fact.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use invoke_messaging_core::{InvokeResponse, PROTOBUF_CONTENT_TYPE};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::body::BoxAsyncRead;
use crate::replay::{ReplayReader, ReplayableBody};

/// A single-pass reader over a response body.
///
/// Obtained from [`InvokeMethodResponse::raw_data`](crate::InvokeMethodResponse::raw_data).
#[derive(Debug)]
pub struct BodyReader {
    inner: ReaderInner,
}

#[derive(Debug)]
enum ReaderInner {
    Embedded(Bytes),
    Stream(ReplayReader),
}

impl BodyReader {
    fn embedded(data: Bytes) -> Self {
        Self {
            inner: ReaderInner::Embedded(data),
        }
    }

    fn stream(reader: ReplayReader) -> Self {
        Self {
            inner: ReaderInner::Stream(reader),
        }
    }

    /// Read everything that is left.
    pub async fn read_full(self) -> io::Result<Bytes> {
        match self.inner {
            ReaderInner::Embedded(data) => Ok(data),
            ReaderInner::Stream(mut reader) => {
                let mut out = Vec::new();
                reader.read_to_end(&mut out).await?;
                Ok(Bytes::from(out))
            }
        }
    }
}

impl AsyncRead for BodyReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().inner {
            ReaderInner::Embedded(data) => {
                let n = data.remaining().min(buf.remaining());
                buf.put_slice(&data[..n]);
                data.advance(n);
                Poll::Ready(Ok(()))
            }
            ReaderInner::Stream(reader) => Pin::new(reader).poll_read(cx, buf),
        }
    }
}

/// Stream side of the payload plus the replay flag.
#[derive(Debug, Default)]
pub(crate) struct Payload {
    body: Option<ReplayableBody>,
    replay: bool,
}

impl Payload {
    /// Store an open stream. Any previous stream and its recording are dropped.
    pub(crate) fn set_stream(&mut self, source: BoxAsyncRead) {
        if let Some(previous) = self.body.take() {
            previous.close();
        }
        self.body = Some(ReplayableBody::new(source, self.replay));
    }

    pub(crate) fn set_replay(&mut self, enabled: bool) {
        self.replay = enabled;
        if let Some(body) = &self.body {
            body.set_replay(enabled);
        }
    }

    pub(crate) fn replay_enabled(&self) -> bool {
        self.replay
    }

    #[cfg(test)]
    pub(crate) fn body(&self) -> Option<&ReplayableBody> {
        self.body.as_ref()
    }

    /// Resolve the reader for the current payload, embedded blob first.
    pub(crate) fn reader(&self, message: &InvokeResponse) -> Option<BodyReader> {
        if let Some(data) = message.data.as_ref().filter(|d| !d.value.is_empty()) {
            return Some(BodyReader::embedded(Bytes::copy_from_slice(&data.value)));
        }
        self.body.as_ref().map(|b| BodyReader::stream(b.reader()))
    }

    /// Read the whole payload into memory. Empty when there is none.
    pub(crate) async fn read_full(&self, message: &InvokeResponse) -> io::Result<Bytes> {
        match self.reader(message) {
            Some(reader) => reader.read_full().await,
            None => Ok(Bytes::new()),
        }
    }

    /// Release the stream and the recording. Returns whether a stream was
    /// still open and how many bytes had been recorded.
    pub(crate) fn close(&mut self) -> (bool, usize) {
        self.body.take().map_or((false, 0), |b| b.close())
    }
}

/// Content type of a payload: the explicit value if set, the protobuf
/// content type for a typed embedded blob, otherwise empty.
pub(crate) fn content_type(message: &InvokeResponse) -> &str {
    if !message.content_type.is_empty() {
        &message.content_type
    } else if message.is_structured() {
        PROTOBUF_CONTENT_TYPE
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::Any;
    use std::io::Cursor;

    fn blob(value: &str) -> InvokeResponse {
        InvokeResponse {
            data: Some(Any {
                type_url: String::new(),
                value: value.as_bytes().to_vec(),
            }),
            content_type: String::new(),
        }
    }

    fn stream(data: &'static str) -> BoxAsyncRead {
        Box::pin(Cursor::new(data.as_bytes()))
    }

    #[tokio::test]
    async fn test_no_payload() {
        let payload = Payload::default();
        let message = InvokeResponse::default();

        assert!(payload.reader(&message).is_none());
        assert!(payload.read_full(&message).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedded_blob_wins_over_stream() {
        let mut payload = Payload::default();
        payload.set_stream(stream("from the stream"));

        let message = blob("from the blob");
        let data = payload.read_full(&message).await.unwrap();
        assert_eq!(data, "from the blob");

        // The stream was never touched.
        assert!(payload.body().unwrap().has_source());
    }

    #[tokio::test]
    async fn test_empty_blob_falls_back_to_stream() {
        let mut payload = Payload::default();
        payload.set_stream(stream("from the stream"));

        let data = payload.read_full(&blob("")).await.unwrap();
        assert_eq!(data, "from the stream");
    }

    #[tokio::test]
    async fn test_embedded_reader_is_fresh_each_time() {
        let payload = Payload::default();
        let message = blob("again");

        for _ in 0..2 {
            let mut out = Vec::new();
            payload.reader(&message).unwrap().read_to_end(&mut out).await.unwrap();
            assert_eq!(out, b"again");
        }
    }

    #[tokio::test]
    async fn test_set_stream_replaces_previous() {
        let mut payload = Payload::default();
        payload.set_replay(true);
        payload.set_stream(stream("first"));
        let message = InvokeResponse::default();
        assert_eq!(payload.read_full(&message).await.unwrap(), "first");

        payload.set_stream(stream("second"));
        assert_eq!(payload.body().unwrap().recorded_len(), Some(0));
        assert_eq!(payload.read_full(&message).await.unwrap(), "second");
        assert_eq!(payload.read_full(&message).await.unwrap(), "second");
    }

    #[test]
    fn test_content_type() {
        let mut message = blob("test");
        assert_eq!(content_type(&message), "");

        message.data.as_mut().unwrap().type_url = "type.googleapis.com/example.v1.Item".into();
        assert_eq!(content_type(&message), PROTOBUF_CONTENT_TYPE);

        message.content_type = "application/json".into();
        assert_eq!(content_type(&message), "application/json");
    }
}
