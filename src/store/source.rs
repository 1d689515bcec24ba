//! Record sources.
//!
//! The dispatch engine asks a [`RecordSource`] for the record of a name and
//! never sees which backend answered: a local snapshot tree, or a remote
//! contract fronted by a TTL cache.

use super::cache::TtlCache;
use super::fetch::{record_keys, RecordFetch};
use super::snapshot;
use super::tree::Tree;
use crate::base::GatewayError;
use crate::name::{is_address_like, namehash_labels, normalize_label, split_name};
use crate::record::{CoinTable, Record};
use alloy_primitives::B256;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Alias for the future returned by a record source.
pub type Looking = Pin<Box<dyn Future<Output = Result<Option<Arc<Record>>, GatewayError>> + Send>>;

/// Resolves a name, given as labels most specific first, to its record.
///
/// A missing record is `Ok(None)`, not an error.
pub trait RecordSource: Send + Sync {
    fn lookup(&self, labels: Vec<String>) -> Looking;
}

impl<S: RecordSource + ?Sized> RecordSource for Arc<S> {
    fn lookup(&self, labels: Vec<String>) -> Looking {
        (**self).lookup(labels)
    }
}

/// A snapshot file loaded into a [`Tree`], swapped whole on reload.
#[derive(Debug)]
pub struct SnapshotSource {
    path: PathBuf,
    coins: Arc<CoinTable>,
    tree: watch::Sender<Arc<Tree>>,
}

impl SnapshotSource {
    /// Load the initial tree. Failure here is fatal.
    pub async fn open(path: impl AsRef<Path>, coins: Arc<CoinTable>) -> Result<Self, GatewayError> {
        let path = path.as_ref().to_path_buf();
        let tree = snapshot::load_file(&path, &coins).await?;
        tracing::info!(path = %path.display(), nodes = tree.len(), "snapshot opened");
        let (tx, _) = watch::channel(Arc::new(tree));
        Ok(Self { path, coins, tree: tx })
    }

    /// Serve a tree that is never reloaded.
    pub fn from_tree(tree: Tree, coins: Arc<CoinTable>) -> Self {
        let (tx, _) = watch::channel(Arc::new(tree));
        Self { path: PathBuf::new(), coins, tree: tx }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current tree. Holders keep reading it across reloads.
    pub fn current(&self) -> Arc<Tree> {
        Arc::clone(&self.tree.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Tree>> {
        self.tree.subscribe()
    }

    /// Rebuild the tree from disk and publish it.
    ///
    /// On failure the previous tree keeps serving.
    pub async fn reload(&self) -> Result<(), GatewayError> {
        let tree = match snapshot::load_file(&self.path, &self.coins).await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "snapshot reload failed");
                return Err(e);
            }
        };
        tracing::info!(path = %self.path.display(), nodes = tree.len(), "snapshot reloaded");
        tracing::debug!("\n{}", tree);
        self.tree.send_replace(Arc::new(tree));
        Ok(())
    }
}

impl RecordSource for SnapshotSource {
    fn lookup(&self, labels: Vec<String>) -> Looking {
        let record = self.current().lookup(&labels);
        Box::pin(async move { Ok(record) })
    }
}

/// Records fetched from a remote contract, cached by namehash.
pub struct RemoteSource {
    inner: Arc<RemoteInner>,
}

struct RemoteInner {
    fetch: Arc<dyn RecordFetch>,
    cache: TtlCache<B256, Option<Arc<Record>>>,
    keys: Arc<Vec<String>>,
    coins: Arc<CoinTable>,
}

impl RemoteSource {
    pub fn new(fetch: Arc<dyn RecordFetch>, coins: Arc<CoinTable>, ttl: Duration) -> Self {
        let keys = Arc::new(record_keys(&coins));
        Self { inner: Arc::new(RemoteInner { fetch, cache: TtlCache::new(ttl), keys, coins }) }
    }

    pub fn cached(&self) -> usize {
        self.inner.cache.len()
    }
}

impl RemoteInner {
    async fn record(&self, labels: &[String]) -> Result<Option<Arc<Record>>, GatewayError> {
        let node = namehash_labels(labels);
        let fetch = Arc::clone(&self.fetch);
        let keys = Arc::clone(&self.keys);
        let coins = Arc::clone(&self.coins);
        self.cache
            .get_or_fetch(node, move |node| async move {
                let data = fetch.fetch(node, Arc::clone(&keys)).await?;
                Ok::<_, GatewayError>(data.into_record(&keys, &coins).map(Arc::new))
            })
            .await
    }

    async fn lookup(&self, labels: Vec<String>) -> Result<Option<Arc<Record>>, GatewayError> {
        let labels: Vec<String> = labels.iter().map(|l| normalize_label(l)).collect();
        if let Some(first) = labels.first().filter(|l| is_address_like(l)) {
            let mut stripped = labels.clone();
            stripped[0] = first.trim_start_matches("0x").to_string();
            let record = self.record(&stripped).await?;
            if let Some(alias) = record.as_ref().and_then(|r| r.alias()) {
                return self.record(&split_name(&alias)).await;
            }
            if record.is_some() || stripped == labels {
                return Ok(record);
            }
        }
        self.record(&labels).await
    }
}

impl RecordSource for RemoteSource {
    fn lookup(&self, labels: Vec<String>) -> Looking {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.lookup(labels).await })
    }
}

impl std::fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSource")
            .field("keys", &self.inner.keys.len())
            .field("cache", &self.inner.cache)
            .finish()
    }
}
