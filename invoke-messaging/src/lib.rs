//! Response envelope for service invocation.
//!
//! This crate provides [`InvokeMethodResponse`], the carrier for the result
//! of invoking a remote method through a sidecar, designed to work the same
//! way whether the method was reached over a binary RPC transport or over
//! HTTP.
//!
//! ## Features
//!
//! - One representation for RPC and HTTP statuses, headers and trailers
//! - Bodies as embedded blobs or lazily read single-pass streams
//! - Replay: read a streamed body any number of times
//! - Conversion to and from the protobuf wire message
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use http_body_util::Full;
//! use invoke_messaging::InvokeMethodResponse;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), invoke_messaging::ResponseError> {
//! let mut headers = http::HeaderMap::new();
//! headers.insert("content-type", "text/plain".parse().unwrap());
//!
//! let mut resp = InvokeMethodResponse::new(503, "Service Unavailable")
//!     .with_http_headers(&headers)
//!     .with_http_body(Full::new(Bytes::from("try again later")))
//!     .with_replay(true);
//!
//! // A retry policy can inspect the body...
//! let body = resp.raw_data_full().await?;
//!
//! // ...and the full body is still there for forwarding.
//! let wire = resp.to_wire_message_with_data().await?;
//! assert_eq!(wire.message.unwrap().data.unwrap().value, body);
//! resp.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`metadata`]: Header and trailer conversion
//! - [`replay`]: Replayable single-pass bodies
//! - [`body`]: Adapters from chunk streams and HTTP bodies

pub mod body;
mod error;
pub mod metadata;
mod payload;
pub mod replay;
mod response;
mod wire;

pub use error::ResponseError;
pub use payload::BodyReader;
pub use response::InvokeMethodResponse;

pub use invoke_messaging_core::{
    Code, HTTP_STATUS_THRESHOLD, InternalInvokeResponse, InvokeResponse, ListStringValue,
    MetadataMap, PROTOBUF_CONTENT_TYPE, Status, WireError,
};
