use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Protocol layer a selector was dispatched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// CCIP envelope layer: `resolve(bytes,bytes)` and `multicall(bytes[])`.
    Ccip,
    /// ENSIP-10 resolver layer: `addr`, `text`, `contenthash`, `multicall`.
    Resolver,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Ccip => f.write_str("ccip"),
            Layer::Resolver => f.write_str("resolve()"),
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum GatewayError {
    // Request errors
    #[error("Malformed name: {0}")]
    MalformedName(&'static str),
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    #[error("Unsupported {layer} method: 0x{}", hex::encode(.selector))]
    UnsupportedMethod { layer: Layer, selector: [u8; 4] },
    #[error("Invalid calldata for {method}: {reason}")]
    InvalidCallData { method: &'static str, reason: String },
    #[error("Multicall too deep (depth {depth})")]
    TooDeep { depth: usize },
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedHttpMethod(String),

    // Backing store errors
    #[error("Upstream fetch failed for {node}: {reason}")]
    UpstreamFailure { node: String, reason: String },

    // Load-time errors
    #[error("Duplicate label {label:?} under {parent:?}")]
    DuplicateLabel { parent: String, label: String },
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Invalid address for coin {coin_type}: {reason}")]
    InvalidAddress { coin_type: u64, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl GatewayError {
    /// HTTP status used when this error reaches the outermost boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedRequest(_) | GatewayError::UnsupportedHttpMethod(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to echo to a client. Internal details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::MalformedRequest(reason) => format!("malformed request: {}", reason),
            GatewayError::UnknownEndpoint(_) => "resolver not found".to_string(),
            GatewayError::UnsupportedHttpMethod(_) => "unsupported http method".to_string(),
            _ => "internal error".to_string(),
        }
    }

    /// Whether a multicall batch may absorb this error into an empty slot.
    ///
    /// Every dispatch failure is slot-local; load and config failures never
    /// occur during dispatch.
    pub fn is_dispatch_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::MalformedName(_)
                | GatewayError::UnsupportedMethod { .. }
                | GatewayError::InvalidCallData { .. }
                | GatewayError::TooDeep { .. }
                | GatewayError::UpstreamFailure { .. }
        )
    }

    pub fn upstream(node: impl fmt::Display, reason: impl fmt::Display) -> Self {
        GatewayError::UpstreamFailure { node: node.to_string(), reason: reason.to_string() }
    }

    pub fn call_data(method: &'static str, reason: impl fmt::Display) -> Self {
        GatewayError::InvalidCallData { method, reason: reason.to_string() }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::InvalidSnapshot(e.to_string())
    }
}
