//! Base types and error handling.
//!
//! Provides foundational types shared by every layer of the gateway:
//! - [`GatewayError`](gatewayerror::GatewayError): the request, dispatch and load error taxonomy
//! - [`context`]: extension traits that attach context to foreign errors

pub mod context;
pub mod gatewayerror;

pub use gatewayerror::{GatewayError, Layer};
