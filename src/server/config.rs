//! Gateway configuration.
//!
//! Loaded from a JSON file; every field has a default.
//!
//! ```json
//! {
//!   "http_port": 8014,
//!   "private_key": "0x...",
//!   "endpoints": { "/ccip": "0x..." },
//!   "storage": { "kind": "json", "path": "records.json", "reload_interval_ms": 1000 }
//! }
//! ```

use crate::base::GatewayError;
use alloy_primitives::Address;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding `private_key`.
pub const PRIVATE_KEY_ENV: &str = "CCIP_GATEWAY_PRIVATE_KEY";

/// Where records come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// A local snapshot file, reloaded when it changes.
    Json {
        path: PathBuf,
        #[serde(default = "default_reload_interval_ms")]
        reload_interval_ms: u64,
    },
    /// A remote `getBatchData` contract reached over JSON-RPC.
    Rpc {
        url: String,
        contract: String,
        #[serde(default = "default_cache_ttl_ms")]
        cache_ttl_ms: u64,
    },
}

fn default_reload_interval_ms() -> u64 {
    1000
}

fn default_cache_ttl_ms() -> u64 {
    5000
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Json {
            path: PathBuf::from("records.json"),
            reload_interval_ms: default_reload_interval_ms(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listening port.
    pub http_port: u16,

    /// Hex secp256k1 signing key.
    pub private_key: Option<String>,

    /// POST path to the resolver contract address signed into responses.
    pub endpoints: BTreeMap<String, String>,

    /// Validity window of signed responses.
    pub signature_ttl_secs: u64,

    /// Body of `GET` responses.
    pub greeting: String,

    pub storage: StorageConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert("/ccip".to_string(), Address::ZERO.to_string());
        Self {
            http_port: 8014,
            private_key: None,
            endpoints,
            signature_ttl_secs: 60,
            greeting: "CCIP Gateway".to_string(),
            storage: StorageConfig::default(),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("http_port", &self.http_port)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("endpoints", &self.endpoints)
            .field("signature_ttl_secs", &self.signature_ttl_secs)
            .field("greeting", &self.greeting)
            .field("storage", &self.storage)
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, GatewayError> {
        serde_json::from_slice(bytes).map_err(|e| GatewayError::InvalidConfig(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_slice(&bytes)
    }

    /// The signing key, the environment taking precedence over the file.
    pub fn private_key(&self) -> Result<String, GatewayError> {
        std::env::var(PRIVATE_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.private_key.clone())
            .ok_or_else(|| {
                GatewayError::InvalidConfig(format!(
                    "no private key: set \"private_key\" or {}",
                    PRIVATE_KEY_ENV
                ))
            })
    }

    /// Parsed endpoint table. Paths must start with `/`.
    pub fn endpoints(&self) -> Result<BTreeMap<String, Address>, GatewayError> {
        if self.endpoints.is_empty() {
            return Err(GatewayError::InvalidConfig("no endpoints configured".to_string()));
        }
        self.endpoints
            .iter()
            .map(|(path, resolver)| {
                if !path.starts_with('/') {
                    return Err(GatewayError::InvalidConfig(format!(
                        "endpoint path {:?} must start with '/'",
                        path
                    )));
                }
                let address = Address::from_str(resolver.trim()).map_err(|e| {
                    GatewayError::InvalidConfig(format!("endpoint {} resolver {:?}: {}", path, resolver, e))
                })?;
                Ok((path.clone(), address))
            })
            .collect()
    }

    pub fn signature_ttl(&self) -> Duration {
        Duration::from_secs(self.signature_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.http_port, 8014);
        assert_eq!(config.signature_ttl(), Duration::from_secs(60));
        assert!(config.endpoints().unwrap().contains_key("/ccip"));
    }

    #[test]
    fn test_parse_rpc_storage() {
        let config = GatewayConfig::from_slice(
            br#"{
                "http_port": 9000,
                "endpoints": {"/a": "0x0000000000000000000000000000000000000001"},
                "storage": {"kind": "rpc", "url": "http://127.0.0.1:8545", "contract": "0x0000000000000000000000000000000000000002"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.signature_ttl_secs, 60);
        assert_eq!(
            config.storage,
            StorageConfig::Rpc {
                url: "http://127.0.0.1:8545".to_string(),
                contract: "0x0000000000000000000000000000000000000002".to_string(),
                cache_ttl_ms: 5000,
            }
        );
        assert_eq!(config.endpoints().unwrap()["/a"], Address::with_last_byte(1));
    }

    #[test]
    fn test_bad_endpoint() {
        let config = GatewayConfig::from_slice(br#"{"endpoints": {"ccip": "0x00"}}"#).unwrap();
        assert!(matches!(config.endpoints(), Err(GatewayError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GatewayConfig { private_key: Some("0xsecret".to_string()), ..Default::default() };
        let out = format!("{:?}", config);
        assert!(out.contains("<redacted>"));
        assert!(!out.contains("0xsecret"));
    }
}
