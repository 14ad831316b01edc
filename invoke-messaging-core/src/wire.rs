//! Protobuf wire messages for service invocation responses.
//!
//! ```text
//! InternalInvokeResponse
//! ├── status:   Status { code, message, details }
//! ├── headers:  map<string, ListStringValue>
//! ├── trailers: map<string, ListStringValue>
//! └── message:  InvokeResponse { data: Any, content_type }
//! ```

use std::collections::HashMap;

use bytes::{Buf, Bytes};
use prost::Message;
use prost_types::Any;

use crate::error::WireError;
use crate::status::Status;

/// Content type reported for embedded payloads that carry a type URL.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Canonical metadata representation: header name to ordered values.
pub type MetadataMap = HashMap<String, ListStringValue>;

/// Ordered list of values for a single header or trailer key.
#[derive(Clone, PartialEq, Message)]
pub struct ListStringValue {
    #[prost(string, repeated, tag = "1")]
    pub values: Vec<String>,
}

impl ListStringValue {
    /// Create a value list, keeping the given order.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the values.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// The response message section: an optional embedded blob and its content type.
#[derive(Clone, PartialEq, Message)]
pub struct InvokeResponse {
    #[prost(message, optional, tag = "1")]
    pub data: Option<Any>,
    #[prost(string, tag = "2")]
    pub content_type: String,
}

impl InvokeResponse {
    /// Returns true if an embedded blob with at least one byte is present.
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.value.is_empty())
    }

    /// Returns true if the embedded blob is a typed, serialized message
    /// rather than an opaque byte string.
    pub fn is_structured(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.type_url.is_empty())
    }
}

/// A response as exchanged between sidecars.
#[derive(Clone, PartialEq, Message)]
pub struct InternalInvokeResponse {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(map = "string, message", tag = "2")]
    pub headers: HashMap<String, ListStringValue>,
    #[prost(map = "string, message", tag = "3")]
    pub trailers: HashMap<String, ListStringValue>,
    #[prost(message, optional, tag = "4")]
    pub message: Option<InvokeResponse>,
}

impl InternalInvokeResponse {
    /// Decode a protobuf-encoded response.
    pub fn decode_from<B: Buf>(buf: B) -> Result<Self, WireError> {
        Ok(Self::decode(buf)?)
    }

    /// Encode this response to protobuf bytes.
    pub fn encode_to_bytes(&self) -> Bytes {
        Bytes::from(self.encode_to_vec())
    }
}
