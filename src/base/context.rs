//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting backing-store and hex errors into context-rich
//! `GatewayError` variants.

use crate::base::gatewayerror::GatewayError;
use std::fmt::Display;

/// Extension trait for adding upstream context to foreign Results.
pub trait UpstreamResultExt<T> {
    /// Attribute a failure to the backing fetch of `node`.
    ///
    /// # Example
    /// ```ignore
    /// use ccip_gateway::base::context::UpstreamResultExt;
    ///
    /// let body = client.request(req).await.upstream_context(&node)?;
    /// // Error: "Upstream fetch failed for 0x.. : connection refused"
    /// ```
    fn upstream_context(self, node: impl Display) -> Result<T, GatewayError>;
}

impl<T, E: Display> UpstreamResultExt<T> for Result<T, E> {
    fn upstream_context(self, node: impl Display) -> Result<T, GatewayError> {
        self.map_err(|e| GatewayError::upstream(node, e))
    }
}

/// Extension trait for request-level decoding failures.
pub trait RequestResultExt<T> {
    /// Map any failure to `MalformedRequest` with a short description.
    fn request_context(self, what: &str) -> Result<T, GatewayError>;
}

impl<T, E: Display> RequestResultExt<T> for Result<T, E> {
    fn request_context(self, what: &str) -> Result<T, GatewayError> {
        self.map_err(|e| GatewayError::MalformedRequest(format!("{}: {}", what, e)))
    }
}
