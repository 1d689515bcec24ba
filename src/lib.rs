//! # ccip-gateway
//!
//! An offchain resolution gateway for ENS names: EIP-3668 (CCIP-Read) with
//! ENSIP-10 wildcard resolution.
//!
//! A resolver contract reverts with `OffchainLookup`; the client POSTs the
//! calldata here. The gateway decodes `resolve(name, data)`, finds the
//! record for `name`, answers the inner `addr`/`text`/`contenthash` call and
//! returns the result signed for the contract's callback to verify.
//!
//! ## Features
//!
//! - **Two-layer dispatch**: `resolve` and `multicall` at the gateway layer,
//!   `addr`, `addr(coinType)`, `text`, `contenthash` and `multicall` at the
//!   resolver layer, with per-slot failure isolation
//! - **Record tree**: basename suffixes, alias redirection, reverse address
//!   lookup and atomic reload of a JSON snapshot
//! - **Remote records**: `getBatchData` over JSON-RPC behind a TTL cache
//!   that deduplicates concurrent fetches
//! - **Address codecs**: EVM, base58check and bech32 segwit (ENSIP-9)
//! - **Signed envelopes**: secp256k1 signatures with an expiry window
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ccip_gateway::server::{assemble, serve, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::from_file("gateway.json")?;
//!     let assembled = assemble(&config).await?;
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
//!     serve(assembled.gateway, listener, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and context helpers
//! - [`name`] - DNS wire names and namehash
//! - [`record`] - Records, coin types and address codecs
//! - [`store`] - Record tree, snapshot loading, remote fetch and caching
//! - [`dispatch`] - Selector registries, dispatch engine and request history
//! - [`ccip`] - Response signing
//! - [`server`] - Configuration and the HTTP surface

pub mod base;
pub mod ccip;
pub mod dispatch;
pub mod name;
pub mod record;
pub mod server;
pub mod store;
