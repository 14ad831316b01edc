//! Conversion between the envelope and its wire message.
//!
//! Inbound messages are normalized so every envelope has a status and a
//! message section. Outbound messages come in two flavors: as-is, where an
//! unread stream leaves `data` empty, and materialized, where the full body
//! is embedded.

use bytes::{Buf, Bytes};
use invoke_messaging_core::{InternalInvokeResponse, Status, WireError};
use prost_types::Any;

use crate::{InvokeMethodResponse, ResponseError};

impl InvokeMethodResponse {
    /// Adapt an inbound wire message.
    ///
    /// A missing message section is replaced by an empty one and a missing
    /// status by `code = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Wire`] if the status code is negative.
    pub fn from_wire_message(mut msg: InternalInvokeResponse) -> Result<Self, ResponseError> {
        let status = msg.status.get_or_insert_with(Status::default);
        if status.code < 0 {
            return Err(WireError::NegativeStatusCode(status.code).into());
        }

        if msg.message.is_none() {
            tracing::debug!(
                code = status.code,
                "wire message has no message section, using an empty one"
            );
            msg.message = Some(Default::default());
        }

        Ok(Self::from_normalized(msg))
    }

    /// Decode and adapt a protobuf-encoded wire message.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Wire`] if decoding or adaptation fails.
    pub fn from_wire_bytes<B: Buf>(buf: B) -> Result<Self, ResponseError> {
        Self::from_wire_message(InternalInvokeResponse::decode_from(buf)?)
    }

    /// Get the wire message as it currently stands.
    ///
    /// An unread stream is not drained: `data` stays empty. Use
    /// [`to_wire_message_with_data`](Self::to_wire_message_with_data) when
    /// the body must be inlined.
    pub fn to_wire_message(&self) -> InternalInvokeResponse {
        self.r.clone()
    }

    /// Get the wire message with the full body embedded.
    ///
    /// A streamed body is drained through the replay-aware reader and stored
    /// as the embedded blob, so later reads are served from memory.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Read`] if the stream fails. The envelope keeps
    /// its status and metadata.
    pub async fn to_wire_message_with_data(&mut self) -> Result<InternalInvokeResponse, ResponseError> {
        if !self.has_message_data() {
            let data = self.raw_data_full().await?;
            tracing::trace!(len = data.len(), "materialized body for wire message");

            let message = self.message_mut();
            let type_url = message.data.take().map(|d| d.type_url).unwrap_or_default();
            message.data = Some(Any {
                type_url,
                value: data.to_vec(),
            });
        }
        Ok(self.to_wire_message())
    }

    /// Encode the wire message, with the full body embedded, for transmission.
    pub async fn encode_wire_message_with_data(&mut self) -> Result<Bytes, ResponseError> {
        Ok(self.to_wire_message_with_data().await?.encode_to_bytes())
    }
}
