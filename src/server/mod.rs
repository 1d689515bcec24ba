//! Gateway server.
//!
//! - [`config`]: the JSON configuration file
//! - [`http`]: routing, JSON framing and the accept loop

pub mod config;
pub mod http;

pub use config::{GatewayConfig, StorageConfig};
pub use http::{serve, Gateway};

use crate::base::GatewayError;
use crate::ccip::CcipSigner;
use crate::dispatch::Dispatcher;
use crate::record::CoinTable;
use crate::store::{spawn_watcher, RecordSource, RemoteSource, RpcFetch, SnapshotSource};
use alloy_primitives::Address;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A gateway assembled from configuration, plus its background tasks.
pub struct Assembled {
    pub gateway: Arc<Gateway>,
    pub tasks: Vec<JoinHandle<()>>,
}

/// Open the configured record source and build the gateway.
pub async fn assemble(config: &GatewayConfig) -> Result<Assembled, GatewayError> {
    let coins = Arc::new(CoinTable::default());
    let signer = CcipSigner::from_hex(&config.private_key()?)?;
    let endpoints = config.endpoints()?;
    let mut tasks = Vec::new();

    let source: Arc<dyn RecordSource> = match &config.storage {
        StorageConfig::Json { path, reload_interval_ms } => {
            let source = Arc::new(SnapshotSource::open(path, Arc::clone(&coins)).await?);
            if *reload_interval_ms > 0 {
                tasks.push(spawn_watcher(Arc::clone(&source), Duration::from_millis(*reload_interval_ms)));
            }
            source
        }
        StorageConfig::Rpc { url, contract, cache_ttl_ms } => {
            let contract = Address::from_str(contract.trim())
                .map_err(|e| GatewayError::InvalidConfig(format!("storage contract: {}", e)))?;
            let fetch = Arc::new(RpcFetch::new(url, contract)?);
            tracing::info!(url = %url, contract = %fetch.contract(), "using remote storage");
            Arc::new(RemoteSource::new(fetch, Arc::clone(&coins), Duration::from_millis(*cache_ttl_ms)))
        }
    };

    for (path, resolver) in &endpoints {
        tracing::info!(path = %path, resolver = %resolver, "endpoint");
    }
    tracing::info!(signer = %signer.address(), "signer ready");

    let gateway = Gateway::new(Dispatcher::new(source, coins), signer, endpoints)
        .with_signature_ttl(config.signature_ttl())
        .with_greeting(config.greeting.clone());
    Ok(Assembled { gateway: Arc::new(gateway), tasks })
}
