//! Snapshot file watching.
//!
//! Polls the snapshot's modification time and reloads the tree when it
//! changes. A reload that fails to parse leaves the previous tree serving.

use super::source::SnapshotSource;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;

async fn modified(source: &SnapshotSource) -> Option<SystemTime> {
    tokio::fs::metadata(source.path()).await.ok()?.modified().ok()
}

/// Spawn a task reloading `source` whenever its file changes.
pub fn spawn_watcher(source: Arc<SnapshotSource>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = modified(&source).await;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let current = modified(&source).await;
            if current.is_none() || current == last {
                continue;
            }
            last = current;
            tracing::debug!(path = %source.path().display(), "snapshot changed");
            // reload logs its own failure
            let _ = source.reload().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CoinTable;
    use std::io::Write;

    fn labels(name: &str) -> Vec<String> {
        name.split('.').map(str::to_string).collect()
    }

    #[tokio::test]
    async fn test_reload_on_change() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"basenames": ["tkn.eth"], "root": {{".": null, "usdc": {{"name": "USDC"}}}}}}"#).unwrap();
        file.flush().unwrap();

        let source = Arc::new(
            SnapshotSource::open(file.path(), Arc::new(CoinTable::default())).await.unwrap(),
        );
        let mut updates = source.subscribe();
        let watcher = spawn_watcher(Arc::clone(&source), Duration::from_millis(20));

        // mtime granularity can be coarse
        tokio::time::sleep(Duration::from_millis(1100)).await;
        std::fs::write(
            file.path(),
            r#"{"basenames": ["tkn.eth"], "root": {".": null, "usdt": {"name": "USDT"}}}"#,
        )
        .unwrap();

        tokio::time::timeout(Duration::from_secs(5), updates.changed()).await.unwrap().unwrap();
        let tree = source.current();
        assert!(tree.lookup(&labels("usdt.tkn.eth")).is_some());
        assert!(tree.lookup(&labels("usdc.tkn.eth")).is_none());
        watcher.abort();
    }

    #[tokio::test]
    async fn test_bad_reload_keeps_tree() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"basenames": ["tkn.eth"], "root": {"name": "TKN"}}"#).unwrap();

        let source = SnapshotSource::open(file.path(), Arc::new(CoinTable::default())).await.unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        assert!(source.reload().await.is_err());
        assert!(source.current().lookup(&labels("tkn.eth")).is_some());
    }
}
