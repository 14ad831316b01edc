//! The invocation response envelope.
//!
//! This module provides [`InvokeMethodResponse`], which carries the result of
//! invoking a remote method regardless of whether it was reached over a
//! binary RPC transport or over HTTP.

use std::collections::HashMap;

use bytes::Bytes;
use futures::Stream;
use http::HeaderMap;
use invoke_messaging_core::{InternalInvokeResponse, InvokeResponse, MetadataMap, Status};
use prost_types::Any;
use tokio::io::AsyncRead;

use crate::ResponseError;
use crate::body::{StreamReader, http_body_reader};
use crate::metadata::{metadata_from_header_map, metadata_from_map};
use crate::payload::{self, BodyReader, Payload};

/// Response envelope for an invoked method.
///
/// The body is either an embedded blob inside the wire message or an open
/// single-pass stream. With replay enabled the stream may be read any number
/// of times.
///
/// Configure the envelope with the chainable `with_*` methods before the
/// first body read.
///
/// # Example
///
/// ```
/// use invoke_messaging::InvokeMethodResponse;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), invoke_messaging::ResponseError> {
/// let resp = InvokeMethodResponse::new(0, "OK")
///     .with_raw_data_string("nel blu dipinto di blu")
///     .with_replay(true);
///
/// let first = resp.raw_data_full().await?;
/// let second = resp.raw_data_full().await?;
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InvokeMethodResponse {
    /// Wire representation. `message` is always `Some`.
    pub(crate) r: InternalInvokeResponse,
    pub(crate) payload: Payload,
}

impl InvokeMethodResponse {
    /// Create a response with a status code and message, no headers and no
    /// payload.
    ///
    /// Codes `>= 100` are HTTP status codes; smaller codes are RPC codes.
    pub fn new<S: Into<String>>(code: i32, message: S) -> Self {
        Self::from_normalized(InternalInvokeResponse {
            status: Some(Status::new(code, message)),
            headers: HashMap::new(),
            trailers: HashMap::new(),
            message: Some(InvokeResponse::default()),
        })
    }

    /// Wrap a wire message whose sections are already present.
    pub(crate) fn from_normalized(r: InternalInvokeResponse) -> Self {
        Self {
            r,
            payload: Payload::default(),
        }
    }

    /// Attach structured details to the status.
    pub fn with_status_details(mut self, details: Vec<Any>) -> Self {
        self.status_mut().details = details;
        self
    }

    /// Replace the message section (embedded blob and content type).
    pub fn with_message(mut self, message: InvokeResponse) -> Self {
        self.r.message = Some(message);
        self
    }

    /// Set the body from an open byte source. The source is not read until
    /// the body is.
    ///
    /// Any embedded blob is cleared so the new stream is what readers see.
    /// A blob assigned afterwards still takes priority.
    pub fn with_raw_data<R>(mut self, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        self.reset_message_data();
        self.payload.set_stream(Box::pin(reader));
        self
    }

    /// Set the body from bytes that are fully known up front.
    ///
    /// The bytes are read like a stream; the embedded blob is left unset.
    pub fn with_raw_bytes<B: Into<Bytes>>(self, data: B) -> Self {
        self.with_raw_data(std::io::Cursor::new(data.into()))
    }

    /// Set the body from a string.
    pub fn with_raw_data_string<S: Into<String>>(self, data: S) -> Self {
        self.with_raw_bytes(data.into())
    }

    /// Set the body from a stream of byte chunks.
    pub fn with_body_stream<S>(self, stream: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        self.with_raw_data(StreamReader::new(stream))
    }

    /// Set the body from an HTTP response body. Trailer frames are ignored;
    /// use [`with_http_trailers`](Self::with_http_trailers) for those.
    pub fn with_http_body<B>(self, body: B) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.with_raw_data(http_body_reader(body))
    }

    /// Set an explicit content type.
    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.message_mut().content_type = content_type.into();
        self
    }

    /// Set headers from RPC-style metadata.
    pub fn with_headers<I, K, V>(mut self, md: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        self.r.headers = metadata_from_map(md);
        self
    }

    /// Set headers from HTTP headers.
    pub fn with_http_headers(mut self, headers: &HeaderMap) -> Self {
        self.r.headers = metadata_from_header_map(headers);
        self
    }

    /// Set trailers from RPC-style metadata.
    pub fn with_trailers<I, K, V>(mut self, md: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        self.r.trailers = metadata_from_map(md);
        self
    }

    /// Set trailers from HTTP trailers.
    pub fn with_http_trailers(mut self, trailers: &HeaderMap) -> Self {
        self.r.trailers = metadata_from_header_map(trailers);
        self
    }

    /// Enable or disable replay of a streamed body.
    ///
    /// Must be set before the first read.
    pub fn with_replay(mut self, enabled: bool) -> Self {
        self.payload.set_replay(enabled);
        self
    }

    /// Get the status.
    pub fn status(&self) -> &Status {
        // Always populated by the constructors.
        self.r.status.as_ref().unwrap_or(&DEFAULT_STATUS)
    }

    fn status_mut(&mut self) -> &mut Status {
        self.r.status.get_or_insert_with(Status::default)
    }

    /// Get the message section.
    pub fn message(&self) -> &InvokeResponse {
        self.r.message.as_ref().unwrap_or(&DEFAULT_MESSAGE)
    }

    /// Get a mutable reference to the message section.
    ///
    /// Setting `data` here overrides any configured stream.
    pub fn message_mut(&mut self) -> &mut InvokeResponse {
        self.r.message.get_or_insert_with(InvokeResponse::default)
    }

    /// Get the headers.
    pub fn headers(&self) -> &MetadataMap {
        &self.r.headers
    }

    /// Get the trailers.
    pub fn trailers(&self) -> &MetadataMap {
        &self.r.trailers
    }

    /// Returns true if the status code is an HTTP status code.
    pub fn is_http_response(&self) -> bool {
        self.status().is_http()
    }

    /// Returns true if replay is enabled.
    pub fn replay_enabled(&self) -> bool {
        self.payload.replay_enabled()
    }

    /// Returns true if the message section carries a non-empty embedded blob.
    pub fn has_message_data(&self) -> bool {
        self.message().has_data()
    }

    /// Remove the embedded blob. A configured stream becomes visible again.
    pub fn reset_message_data(&mut self) {
        self.message_mut().data = None;
    }

    /// Get the content type of the payload.
    ///
    /// Returns the explicit content type if set, the protobuf content type if
    /// the embedded blob is a typed message, and an empty string otherwise.
    pub fn content_type(&self) -> &str {
        payload::content_type(self.message())
    }

    /// Get a reader over the body.
    ///
    /// A non-empty embedded blob takes priority over a configured stream.
    /// Returns `None` when there is no payload or after [`close`](Self::close).
    pub fn raw_data(&self) -> Option<BodyReader> {
        self.payload.reader(self.message())
    }

    /// Read the whole body into memory.
    ///
    /// Returns empty bytes when there is no payload.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Read`] if the underlying stream fails. Status
    /// and metadata remain readable.
    pub async fn raw_data_full(&self) -> Result<Bytes, ResponseError> {
        Ok(self.payload.read_full(self.message()).await?)
    }

    /// Release the stream and the replay buffer.
    ///
    /// Afterwards body accessors return empty results. Calling this more
    /// than once is fine.
    pub fn close(&mut self) {
        let (had_stream, recorded) = self.payload.close();
        if had_stream || recorded > 0 {
            tracing::debug!(had_stream, recorded, "closed invoke response body");
        }
    }
}

static DEFAULT_STATUS: Status = Status {
    code: 0,
    message: String::new(),
    details: Vec::new(),
};

static DEFAULT_MESSAGE: InvokeResponse = InvokeResponse {
    data: None,
    content_type: String::new(),
};
