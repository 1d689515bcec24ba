//! Upstream record fetching.
//!
//! A remote store keeps records in an on-chain contract exposing
//! `getBatchData(string node, string[] keys)`. [`RpcFetch`] calls it over
//! JSON-RPC `eth_call`; a zero nonce means the node has no record.

use crate::base::context::UpstreamResultExt;
use crate::base::GatewayError;
use crate::record::{CoinTable, RawValue, Record, CONTENT_HASH_KEY};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use bytes::Bytes as BodyBytes;
use http::{header, Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use url::Url;

mod abi {
    alloy_sol_types::sol! {
        function getBatchData(string node, string[] keys) external view returns (uint256 nonce, bytes[] vs);
    }
}

/// Text keys fetched for every record, before the coin address keys.
pub const TEXT_KEYS: &[&str] = &[
    "name",
    "description",
    "avatar",
    "url",
    "notice",
    "decimals",
    "twitter",
    "github",
    CONTENT_HASH_KEY,
    "version",
    "alias",
];

/// Every storage key a remote record is fetched with.
pub fn record_keys(coins: &CoinTable) -> Vec<String> {
    let mut keys: Vec<String> = TEXT_KEYS.iter().map(|k| k.to_string()).collect();
    for key in coins.storage_keys() {
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Raw answer of one `getBatchData` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchData {
    pub nonce: U256,
    pub values: Vec<Bytes>,
}

impl BatchData {
    /// Pair the values with the keys they were fetched for.
    ///
    /// Returns `None` for a zero nonce. Empty values are dropped.
    pub fn into_record(self, keys: &[String], coins: &CoinTable) -> Option<Record> {
        if self.nonce.is_zero() {
            return None;
        }
        let fields: HashMap<String, RawValue> = keys
            .iter()
            .zip(self.values)
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), RawValue::Bytes(v.0)))
            .collect();
        Some(Record::new(fields, coins))
    }
}

/// Alias for the future returned by a record fetcher.
pub type Fetching = Pin<Box<dyn Future<Output = Result<BatchData, GatewayError>> + Send>>;

/// Source of raw batch data, keyed by namehash.
pub trait RecordFetch: Send + Sync {
    fn fetch(&self, node: B256, keys: Arc<Vec<String>>) -> Fetching;
}

impl<F: RecordFetch + ?Sized> RecordFetch for Arc<F> {
    fn fetch(&self, node: B256, keys: Arc<Vec<String>>) -> Fetching {
        (**self).fetch(node, keys)
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Fetches batch data with `eth_call` against a JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcFetch {
    client: Client<HttpConnector, Full<BodyBytes>>,
    url: Uri,
    contract: Address,
}

impl RpcFetch {
    pub fn new(url: &str, contract: Address) -> Result<Self, GatewayError> {
        let parsed = Url::parse(url)
            .map_err(|e| GatewayError::InvalidConfig(format!("rpc url {:?}: {}", url, e)))?;
        if parsed.scheme() != "http" || parsed.host_str().is_none() {
            return Err(GatewayError::InvalidConfig(format!(
                "rpc url {} must be http with a host",
                parsed
            )));
        }
        let url: Uri = parsed
            .as_str()
            .parse()
            .map_err(|e| GatewayError::InvalidConfig(format!("rpc url {}: {}", parsed, e)))?;
        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { client, url, contract })
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    async fn call(&self, node: B256, keys: Arc<Vec<String>>) -> Result<BatchData, GatewayError> {
        let call = abi::getBatchDataCall { node: node.to_string(), keys: keys.to_vec() };
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": self.contract.to_string(), "data": format!("0x{}", hex::encode(call.abi_encode())) },
                "latest"
            ]
        });

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(BodyBytes::from(payload.to_string())))
            .upstream_context(node)?;

        let resp = self.client.request(req).await.upstream_context(node)?;
        let status = resp.status();
        let body = resp.into_body().collect().await.upstream_context(node)?.to_bytes();
        if !status.is_success() {
            return Err(GatewayError::upstream(node, format!("rpc status {}", status)));
        }

        let rpc: RpcResponse = serde_json::from_slice(&body).upstream_context(node)?;
        if let Some(err) = rpc.error {
            return Err(GatewayError::upstream(node, format!("rpc error {}: {}", err.code, err.message)));
        }
        let result = rpc
            .result
            .ok_or_else(|| GatewayError::upstream(node, "rpc response without result"))?;
        let raw = hex::decode(result.trim_start_matches("0x")).upstream_context(node)?;
        let ret = abi::getBatchDataCall::abi_decode_returns(&raw, false).upstream_context(node)?;
        tracing::debug!(node = %node, nonce = %ret.nonce, values = ret.vs.len(), "batch fetched");
        Ok(BatchData { nonce: ret.nonce, values: ret.vs })
    }
}

impl RecordFetch for RpcFetch {
    fn fetch(&self, node: B256, keys: Arc<Vec<String>>) -> Fetching {
        let this = self.clone();
        Box::pin(async move { this.call(node, keys).await })
    }
}

impl std::fmt::Debug for RpcFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcFetch")
            .field("url", &self.url)
            .field("contract", &self.contract)
            .finish()
    }
}
