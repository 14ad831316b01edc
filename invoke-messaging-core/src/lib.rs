//! Core wire types for service invocation responses.
//!
//! This crate provides the protocol types shared by the envelope crate
//! (`invoke-messaging`) and by the transports that produce or consume it.
//!
//! ## Modules
//!
//! - [`error`]: RPC status codes and wire errors
//! - [`status`]: Status classification (HTTP-style vs RPC-style)
//! - [`wire`]: Protobuf wire messages

mod error;
mod status;
mod wire;

pub use error::*;
pub use status::*;
pub use wire::*;
