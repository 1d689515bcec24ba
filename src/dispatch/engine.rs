//! Two-layer call dispatch.
//!
//! The CCIP layer answers `resolve(name, data)` and `multicall(calls)`.
//! `resolve` decodes the DNS-encoded name, looks up its record and hands
//! `data` to the resolver layer, which answers `addr`, `text`,
//! `contenthash` and its own `multicall` from that record.
//!
//! A multicall runs its slots concurrently and answers in call order. A
//! failing slot answers empty bytes; it never fails the batch.

use super::history::History;
use super::registry::{Answer, CcipCall, ResolverCall, CCIP_METHODS, RESOLVER_METHODS};
use crate::base::GatewayError;
use crate::name::{decode_labels, safe_str};
use crate::record::{CoinTable, Record, COIN_TYPE_ETH};
use crate::store::RecordSource;
use alloy_primitives::{Address, Bytes};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;

/// Outcome of one batch slot.
enum SlotOutcome {
    Answered(Vec<u8>),
    Failed,
}

impl SlotOutcome {
    fn into_bytes(self) -> Bytes {
        match self {
            SlotOutcome::Answered(data) => Bytes::from(data),
            SlotOutcome::Failed => Bytes::new(),
        }
    }
}

impl From<Result<Vec<u8>, GatewayError>> for SlotOutcome {
    fn from(result: Result<Vec<u8>, GatewayError>) -> Self {
        match result {
            Ok(data) => SlotOutcome::Answered(data),
            Err(e) if e.is_dispatch_failure() => {
                tracing::debug!(error = %e, "multicall slot failed");
                SlotOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(error = %e, "multicall slot failed outside dispatch");
                SlotOutcome::Failed
            }
        }
    }
}

pub struct Dispatcher {
    source: Arc<dyn RecordSource>,
    coins: Arc<CoinTable>,
}

impl Dispatcher {
    pub fn new(source: Arc<dyn RecordSource>, coins: Arc<CoinTable>) -> Self {
        Self { source, coins }
    }

    /// Dispatch top-level calldata with a fresh History.
    pub async fn handle(&self, data: &[u8]) -> (Result<Vec<u8>, GatewayError>, History) {
        let mut history = History::new();
        let result = self.dispatch_ccip(data, &mut history).await;
        (result, history)
    }

    /// Dispatch CCIP-layer calldata. Failures are recorded on `history`.
    pub fn dispatch_ccip<'a>(
        &'a self,
        data: &'a [u8],
        history: &'a mut History,
    ) -> BoxFuture<'a, Result<Vec<u8>, GatewayError>> {
        async move {
            let result = self.ccip_call(data, history).await;
            if let Err(e) = &result {
                history.fail(e);
            }
            result
        }
        .boxed()
    }

    /// Dispatch resolver-layer calldata against `record`.
    pub fn dispatch_resolver<'a>(
        &'a self,
        record: Option<&'a Record>,
        data: &'a [u8],
        history: &'a mut History,
    ) -> BoxFuture<'a, Result<Vec<u8>, GatewayError>> {
        async move {
            let result = self.resolver_call(record, data, history).await;
            if let Err(e) = &result {
                history.fail(e);
            }
            result
        }
        .boxed()
    }

    async fn ccip_call(&self, data: &[u8], history: &mut History) -> Result<Vec<u8>, GatewayError> {
        let (_, call) = CCIP_METHODS.decode(data)?;
        match call {
            CcipCall::Resolve { name, data } => {
                let labels = decode_labels(&name)?;
                history.add(format!("resolve({})", safe_str(&labels.join("."))));
                let record = self.source.lookup(labels).await?;
                self.dispatch_resolver(record.as_deref(), &data, history.enter()).await
            }
            CcipCall::Multicall { calls } => {
                history.add("multicall");
                let slots = history.descend(calls.len())?;
                let outcomes = join_all(calls.iter().zip(slots.iter_mut()).map(|(call, slot)| async move {
                    SlotOutcome::from(self.dispatch_ccip(call, slot).await)
                }))
                .await;
                Ok(Answer::Batch(outcomes.into_iter().map(SlotOutcome::into_bytes).collect()).encode())
            }
        }
    }

    async fn resolver_call(
        &self,
        record: Option<&Record>,
        data: &[u8],
        history: &mut History,
    ) -> Result<Vec<u8>, GatewayError> {
        let (_, call) = RESOLVER_METHODS.decode(data)?;
        let answer = match call {
            ResolverCall::Addr => {
                history.add("addr()");
                let address = record
                    .and_then(|r| r.address(COIN_TYPE_ETH))
                    .filter(|a| a.len() == 20)
                    .map(|a| Address::from_slice(a))
                    .unwrap_or(Address::ZERO);
                Answer::Address(address)
            }
            ResolverCall::AddrCoin { coin_type } => {
                let coin_type = u64::try_from(coin_type).ok();
                match coin_type.and_then(|t| self.coins.get(t)) {
                    Some(coin) => history.add(format!("addr({})", coin.key)),
                    None => history.add(format!("addr(0x{})", coin_type.map_or("?".to_string(), |t| format!("{:x}", t)))),
                }
                let value = match (record, coin_type) {
                    (Some(r), Some(t)) => r.address(t).cloned(),
                    _ => None,
                };
                Answer::Bytes(value.map(Bytes::from).unwrap_or_default())
            }
            ResolverCall::Text { key } => {
                history.add(format!("text({})", safe_str(&key)));
                Answer::Text(record.and_then(|r| r.text(&key)).unwrap_or_default())
            }
            ResolverCall::ContentHash => {
                history.add("contenthash()");
                Answer::Bytes(record.and_then(Record::content_hash).map(Bytes::from).unwrap_or_default())
            }
            ResolverCall::Multicall { calls } => {
                history.add("multicall");
                let slots = history.descend(calls.len())?;
                let outcomes = join_all(calls.iter().zip(slots.iter_mut()).map(|(call, slot)| async move {
                    SlotOutcome::from(self.dispatch_resolver(record, call, slot).await)
                }))
                .await;
                Answer::Batch(outcomes.into_iter().map(SlotOutcome::into_bytes).collect())
            }
        };
        Ok(answer.encode())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("coins", &self.coins.entries().len()).finish()
    }
}
