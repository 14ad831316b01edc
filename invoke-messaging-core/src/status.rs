//! Response status and its transport classification.
//!
//! A single integer code space carries both kinds of status:
//!
//! ```text
//! 0 ..= 99    RPC-style status (0..=16 in use, see Code)
//! 100 ..      HTTP status code
//! ```

use prost::Message;
use prost_types::Any;

use crate::error::Code;

/// Codes at or above this value are HTTP status codes; codes below it are
/// RPC status codes.
pub const HTTP_STATUS_THRESHOLD: i32 = 100;

/// Status of an invoked method: a numeric code, a message and optional
/// structured details.
#[derive(Clone, PartialEq, Message)]
pub struct Status {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, repeated, tag = "3")]
    pub details: Vec<Any>,
}

impl Status {
    /// Create a new status with a code and message.
    ///
    /// No validation is performed; callers supply protocol-appropriate codes.
    pub fn new<S: Into<String>>(code: i32, message: S) -> Self {
        Self {
            code,
            message: message.into(),
            details: vec![],
        }
    }

    /// Returns true if the code is an HTTP status code.
    pub fn is_http(&self) -> bool {
        self.code >= HTTP_STATUS_THRESHOLD
    }

    /// Interpret the code as an RPC status code.
    ///
    /// Returns `None` for HTTP-style codes and for codes outside the known
    /// RPC code space.
    pub fn rpc_code(&self) -> Option<Code> {
        if self.is_http() {
            return None;
        }
        Code::try_from(self.code).ok()
    }

    /// Interpret the code as an HTTP status code.
    ///
    /// Returns `None` for RPC-style codes and for values that are not valid
    /// HTTP status codes.
    pub fn http_status(&self) -> Option<http::StatusCode> {
        if !self.is_http() {
            return None;
        }
        u16::try_from(self.code)
            .ok()
            .and_then(|c| http::StatusCode::from_u16(c).ok())
    }
}

impl From<Code> for Status {
    fn from(code: Code) -> Self {
        Self::new(code.into(), code.as_str())
    }
}

impl From<http::StatusCode> for Status {
    fn from(status: http::StatusCode) -> Self {
        Self::new(
            i32::from(status.as_u16()),
            status.canonical_reason().unwrap_or_default(),
        )
    }
}
