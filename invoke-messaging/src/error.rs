//! Envelope error types.
//!
//! This module provides [`ResponseError`], the error type for envelope
//! adaptation, body materialization and header re-emission.

use invoke_messaging_core::{Code, WireError};

/// Errors surfaced by [`InvokeMethodResponse`](crate::InvokeMethodResponse).
///
/// A missing payload is never an error; it is represented by empty results.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The inbound wire message could not be adapted. No envelope was built.
    #[error("invalid wire message: {0}")]
    Wire(#[from] WireError),

    /// Reading the underlying stream failed while materializing the body.
    /// The envelope remains usable for status and metadata access.
    #[error("failed to read response body: {0}")]
    Read(#[from] std::io::Error),

    /// A metadata entry cannot be expressed as an HTTP header.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl ResponseError {
    /// Get the RPC code that best describes this error.
    ///
    /// - Wire: `InvalidArgument`
    /// - Read: `DataLoss`
    /// - InvalidHeader: `Internal`
    pub fn code(&self) -> Code {
        match self {
            ResponseError::Wire(_) => Code::InvalidArgument,
            ResponseError::Read(_) => Code::DataLoss,
            ResponseError::InvalidHeader(_) => Code::Internal,
        }
    }

    /// Returns true if this error was raised by the underlying stream.
    pub fn is_read(&self) -> bool {
        matches!(self, ResponseError::Read(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let wire = ResponseError::from(WireError::NegativeStatusCode(-1));
        assert_eq!(wire.code(), Code::InvalidArgument);
        assert!(!wire.is_read());

        let read = ResponseError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        ));
        assert_eq!(read.code(), Code::DataLoss);
        assert!(read.is_read());

        let header = ResponseError::InvalidHeader("bad name".into());
        assert_eq!(header.code(), Code::Internal);
    }

    #[test]
    fn test_error_display() {
        let err = ResponseError::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stream ended early",
        ));
        assert_eq!(
            err.to_string(),
            "failed to read response body: stream ended early"
        );
    }
}
