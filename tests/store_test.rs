//! Store Module Tests
//!
//! Covers:
//! - Snapshot loading into a `Tree`: basenames, aliases, reverse index
//! - `SnapshotSource` atomic reload
//! - `RemoteSource` over a mock `RecordFetch` with TTL caching

use ccip_gateway::base::GatewayError;
use ccip_gateway::record::{coin_type_from_chain, CoinTable};
use ccip_gateway::store::fetch::Fetching;
use ccip_gateway::store::{BatchData, RecordFetch, RecordSource, RemoteSource, Snapshot, SnapshotSource, Tree};

use alloy_primitives::{Bytes, B256, U256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SNAPSHOT: &str = r#"{
    "basenames": ["tkn.eth", "tokens.eth"],
    "root": {
        ".": {"name": "Token Registry"},
        "usdc": {
            "name": "USDC",
            "decimals": 6,
            "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            "op_address": "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85",
            "btc_address": "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            "dweb": "0xe301017012201687de19f1516b9e560ab8655faa678e3a023ebff43494ac06a36581aafc957e"
        },
        "usdc-mirror": {
            "name": "Mirror",
            "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
        },
        "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48": {"alias": "usdc.tkn.eth"},
        "chains": {
            ".": null,
            "base op": {"name": "L2"}
        }
    }
}"#;

fn labels(name: &str) -> Vec<String> {
    name.split('.').map(str::to_string).collect()
}

fn tree() -> Tree {
    Snapshot::from_slice(SNAPSHOT.as_bytes())
        .unwrap()
        .into_tree(CoinTable::standard())
        .unwrap()
}

#[test]
fn test_record_queries() {
    let tree = tree();
    let usdc = tree.lookup(&labels("usdc.tkn.eth")).unwrap();
    assert_eq!(usdc.text("decimals").as_deref(), Some("6"));
    assert_eq!(usdc.address(60).unwrap().len(), 20);
    assert_eq!(usdc.address(coin_type_from_chain(10)).unwrap().len(), 20);
    assert_eq!(hex::encode(usdc.address(0).unwrap()), "0014751e76e8199196d454941c45d1b3a323f1433bd6");
    assert_eq!(usdc.content_hash().unwrap().len(), 38);
}

#[test]
fn test_every_basename_serves_the_tree() {
    let tree = tree();
    assert!(tree.lookup(&labels("usdc.tokens.eth")).is_some());
    assert!(tree.lookup(&labels("usdc.other.eth")).is_none());
}

#[test]
fn test_shared_subtree() {
    let tree = tree();
    let base = tree.lookup(&labels("base.chains.tkn.eth")).unwrap();
    let op = tree.lookup(&labels("op.chains.tkn.eth")).unwrap();
    assert_eq!(base, op);
    assert!(tree.lookup(&labels("chains.tkn.eth")).is_none());
}

#[test]
fn test_alias_redirects_once() {
    let tree = tree();
    let rec = tree
        .lookup(&labels("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48.tkn.eth"))
        .unwrap();
    assert_eq!(rec.text("name").as_deref(), Some("USDC"));
}

#[test]
fn test_reverse_index_first_claim_wins() {
    let tree = tree();
    let rec = tree
        .lookup(&labels("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.1.addr.tkn.eth"))
        .unwrap();
    assert_eq!(rec.text("name").as_deref(), Some("USDC"));
    assert!(tree
        .lookup(&labels("0b2c639c533813f4aa9d7837caf62653d097ff85.10.addr.tkn.eth"))
        .is_some());
}

#[test]
fn test_directory_summary() {
    let tree = tree();
    let dir = tree.directory(&labels("chains.tkn.eth")).unwrap();
    assert_eq!(dir.text("count").as_deref(), Some("2"));
    assert_eq!(dir.text("children").as_deref(), Some("base,op"));
    assert!(tree.directory(&labels("usdc.tkn.eth")).is_none());
}

#[tokio::test]
async fn test_snapshot_source_reload_is_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    std::fs::write(&path, SNAPSHOT).unwrap();

    let source = SnapshotSource::open(&path, Arc::new(CoinTable::default())).await.unwrap();
    let before = source.current();

    std::fs::write(&path, r#"{"basenames": ["tkn.eth"], "root": {".": null, "dai": {"name": "DAI"}}}"#).unwrap();
    source.reload().await.unwrap();

    // a reader holding the old tree keeps a consistent view
    assert!(before.lookup(&labels("usdc.tkn.eth")).is_some());
    assert!(source.lookup(labels("usdc.tkn.eth")).await.unwrap().is_none());
    assert!(source.lookup(labels("dai.tkn.eth")).await.unwrap().is_some());
}

#[tokio::test]
async fn test_duplicate_labels_fail_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    std::fs::write(&path, r#"{"basenames": ["tkn.eth"], "root": {".": null, "a b": {}, "b": {}}}"#).unwrap();
    let err = SnapshotSource::open(&path, Arc::new(CoinTable::default())).await.unwrap_err();
    assert!(matches!(err, GatewayError::DuplicateLabel { .. }));
}

struct FlakyFetch {
    calls: AtomicUsize,
}

impl RecordFetch for FlakyFetch {
    fn fetch(&self, node: B256, keys: Arc<Vec<String>>) -> Fetching {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if call == 0 {
                return Err(GatewayError::upstream(node, "connection refused"));
            }
            let mut values = vec![Bytes::new(); keys.len()];
            values[0] = Bytes::from_static(b"USDC");
            Ok(BatchData { nonce: U256::from(1), values })
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_remote_failure_is_retried_after_ttl() {
    let fetch = Arc::new(FlakyFetch { calls: AtomicUsize::new(0) });
    let source = RemoteSource::new(fetch.clone(), Arc::new(CoinTable::default()), Duration::from_secs(5));

    // both callers share the failing fetch
    let (a, b) = tokio::join!(source.lookup(labels("usdc.tkn.eth")), source.lookup(labels("usdc.tkn.eth")));
    assert!(matches!(a, Err(GatewayError::UpstreamFailure { .. })));
    assert!(matches!(b, Err(GatewayError::UpstreamFailure { .. })));
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);

    // cached as absent within the window
    assert!(source.lookup(labels("usdc.tkn.eth")).await.unwrap().is_none());
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(6)).await;
    let rec = source.lookup(labels("usdc.tkn.eth")).await.unwrap().unwrap();
    assert_eq!(rec.text("name").as_deref(), Some("USDC"));
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
}
