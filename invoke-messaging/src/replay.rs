//! Replayable body streams.
//!
//! A transport stream can be consumed only once, but middleware may need to
//! read a body several times. [`ReplayableBody`] owns the single-pass source
//! and, when replay is enabled, an append-only recording of every byte
//! pulled from it. Each [`ReplayReader`] tracks its own position:
//!
//! ```text
//! recorded: [=========== pulled so far ===========]
//! reader:    ^ position
//!            served from the recording until caught up,
//!            then pulled from the source and appended
//! ```
//!
//! The source is therefore read at most once, and a reader created at any
//! time observes the complete body from the first byte.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, ReadBuf};

use crate::body::BoxAsyncRead;

struct BodyState {
    /// Dropped once it reports end-of-data, or on close.
    source: Option<BoxAsyncRead>,
    /// Present only while replay is enabled.
    recorded: Option<BytesMut>,
}

/// A single-pass byte source that can optionally be read more than once.
///
/// Cloning shares the same source and recording.
#[derive(Clone)]
pub struct ReplayableBody {
    state: Arc<Mutex<BodyState>>,
}

impl ReplayableBody {
    /// Wrap a source. Nothing is read until a reader polls it.
    pub fn new(source: BoxAsyncRead, replay: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(BodyState {
                source: Some(source),
                recorded: replay.then(BytesMut::new),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BodyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enable or disable recording.
    ///
    /// Disabling discards anything recorded so far. Changing this after a
    /// read has started means the recording will not cover the whole body.
    pub fn set_replay(&self, enabled: bool) {
        let mut state = self.lock();
        if !enabled {
            state.recorded = None;
        } else if state.recorded.is_none() {
            state.recorded = Some(BytesMut::new());
        }
    }

    /// Returns true if pulled bytes are being recorded.
    pub fn is_replay_enabled(&self) -> bool {
        self.lock().recorded.is_some()
    }

    /// Returns true until the source has reported end-of-data or the body
    /// has been closed.
    pub fn has_source(&self) -> bool {
        self.lock().source.is_some()
    }

    /// Number of bytes recorded so far, if replay is enabled.
    pub fn recorded_len(&self) -> Option<usize> {
        self.lock().recorded.as_ref().map(|r| r.len())
    }

    /// A copy of the bytes recorded so far, if replay is enabled.
    pub fn recorded(&self) -> Option<Bytes> {
        self.lock()
            .recorded
            .as_ref()
            .map(|r| Bytes::copy_from_slice(r))
    }

    /// Get a reader positioned at the start of the body.
    pub fn reader(&self) -> ReplayReader {
        ReplayReader {
            state: Arc::clone(&self.state),
            position: 0,
        }
    }

    /// Release the source and the recording.
    ///
    /// Outstanding readers observe end-of-data afterwards. Returns whether a
    /// source was still open and how many bytes had been recorded.
    pub fn close(&self) -> (bool, usize) {
        let mut state = self.lock();
        let had_source = state.source.take().is_some();
        let recorded = state.recorded.take().map_or(0, |r| r.len());
        (had_source, recorded)
    }
}

impl std::fmt::Debug for ReplayableBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ReplayableBody")
            .field("has_source", &state.source.is_some())
            .field("recorded_len", &state.recorded.as_ref().map(|r| r.len()))
            .finish()
    }
}

/// A reader over a [`ReplayableBody`].
///
/// With replay enabled, every reader sees the complete body regardless of
/// what other readers consumed before it. Without replay, all readers share
/// the one source and a second read after exhaustion yields end-of-data.
pub struct ReplayReader {
    state: Arc<Mutex<BodyState>>,
    position: usize,
}

impl AsyncRead for ReplayReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        let mut guard = this.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;

        if let Some(recorded) = &state.recorded {
            if this.position < recorded.len() {
                let end = recorded.len().min(this.position + buf.remaining());
                buf.put_slice(&recorded[this.position..end]);
                this.position = end;
                return Poll::Ready(Ok(()));
            }
        }

        let Some(source) = state.source.as_mut() else {
            return Poll::Ready(Ok(()));
        };

        let before = buf.filled().len();
        ready!(source.as_mut().poll_read(cx, buf))?;
        let pulled = &buf.filled()[before..];

        if pulled.is_empty() {
            state.source = None;
            tracing::trace!(
                recorded = state.recorded.as_ref().map(|r| r.len()),
                "body stream exhausted"
            );
        } else if let Some(recorded) = state.recorded.as_mut() {
            recorded.extend_from_slice(pulled);
            this.position = recorded.len();
        }

        Poll::Ready(Ok(()))
    }
}

impl std::fmt::Debug for ReplayReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayReader")
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::StreamReader;
    use std::io::Cursor;
    use tokio::io::AsyncReadExt;

    const MESSAGE: &str = "Nel mezzo del cammin di nostra vita mi ritrovai per una selva oscura, che' la diritta via era smarrita.";

    fn source(data: &'static str) -> BoxAsyncRead {
        Box::pin(Cursor::new(data.as_bytes()))
    }

    fn chunked(chunks: &[&'static str]) -> BoxAsyncRead {
        let items: Vec<io::Result<Bytes>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        Box::pin(StreamReader::new(futures::stream::iter(items)))
    }

    async fn read_all(reader: &mut ReplayReader) -> String {
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_without_replay_second_read_is_empty() {
        let body = ReplayableBody::new(source(MESSAGE), false);

        assert_eq!(read_all(&mut body.reader()).await, MESSAGE);
        assert_eq!(read_all(&mut body.reader()).await, "");
        assert!(!body.has_source());
        assert_eq!(body.recorded_len(), None);
    }

    #[tokio::test]
    async fn test_replay_full_reads_repeat() {
        let body = ReplayableBody::new(source(MESSAGE), true);

        for _ in 0..3 {
            assert_eq!(read_all(&mut body.reader()).await, MESSAGE);
        }
        assert!(!body.has_source());
        assert_eq!(body.recorded_len(), Some(MESSAGE.len()));
        assert_eq!(body.recorded().unwrap(), MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_replay_partial_then_rest_then_full() {
        let body = ReplayableBody::new(source(MESSAGE), true);

        let mut first = body.reader();
        let mut buf = [0u8; 9];
        first.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, &MESSAGE.as_bytes()[..9]);
        assert_eq!(body.recorded_len(), Some(9));

        assert_eq!(read_all(&mut first).await, &MESSAGE[9..]);
        assert_eq!(read_all(&mut body.reader()).await, MESSAGE);
    }

    #[tokio::test]
    async fn test_replay_reader_started_mid_stream_sees_whole_body() {
        let body = ReplayableBody::new(chunked(&["Nel mezzo ", "del cammin ", "di nostra vita"]), true);

        let mut early = body.reader();
        let mut buf = [0u8; 4];
        early.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"Nel ");

        let mut late = body.reader();
        assert_eq!(read_all(&mut late).await, "Nel mezzo del cammin di nostra vita");
        assert_eq!(read_all(&mut early).await, "mezzo del cammin di nostra vita");
    }

    #[tokio::test]
    async fn test_replay_after_full_read_then_partial() {
        let body = ReplayableBody::new(source(MESSAGE), true);
        assert_eq!(read_all(&mut body.reader()).await, MESSAGE);

        let mut reader = body.reader();
        let mut buf = [0u8; 9];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, &MESSAGE.as_bytes()[..9]);
        assert_eq!(read_all(&mut reader).await, &MESSAGE[9..]);

        assert_eq!(read_all(&mut body.reader()).await, MESSAGE);
    }

    #[tokio::test]
    async fn test_concurrent_readers_after_exhaustion() {
        let body = ReplayableBody::new(chunked(&["a", "bc", "def"]), true);
        assert_eq!(read_all(&mut body.reader()).await, "abcdef");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut reader = body.reader();
                tokio::spawn(async move { read_all(&mut reader).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "abcdef");
        }
    }

    #[tokio::test]
    async fn test_enable_replay_after_creation() {
        let body = ReplayableBody::new(source("late switch"), false);
        assert!(!body.is_replay_enabled());

        body.set_replay(true);
        assert!(body.is_replay_enabled());
        assert_eq!(read_all(&mut body.reader()).await, "late switch");
        assert_eq!(read_all(&mut body.reader()).await, "late switch");

        body.set_replay(false);
        assert_eq!(body.recorded_len(), None);
        assert_eq!(read_all(&mut body.reader()).await, "");
    }

    #[tokio::test]
    async fn test_close_releases_everything() {
        let body = ReplayableBody::new(source(MESSAGE), true);
        let mut reader = body.reader();
        let mut buf = [0u8; 3];
        reader.read_exact(&mut buf).await.unwrap();

        assert_eq!(body.close(), (true, 3));
        assert!(!body.has_source());
        assert_eq!(body.recorded(), None);
        assert_eq!(read_all(&mut reader).await, "");

        assert_eq!(body.close(), (false, 0));
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let items: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionAborted, "aborted")),
        ];
        let body = ReplayableBody::new(Box::pin(StreamReader::new(futures::stream::iter(items))), true);

        let mut out = Vec::new();
        let err = body.reader().read_to_end(&mut out).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionAborted);
        assert_eq!(body.recorded().unwrap(), b"partial".as_slice());
    }
}
