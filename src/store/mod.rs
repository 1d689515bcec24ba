//! Record storage.
//!
//! - [`tree`]: the arena record tree with basename, alias and reverse lookup
//! - [`snapshot`]: the JSON document a tree is loaded from
//! - [`source`]: the [`RecordSource`] trait and its snapshot and remote backends
//! - [`cache`]: TTL cache with in-flight deduplication for remote records
//! - [`fetch`]: JSON-RPC `getBatchData` fetching
//! - [`watch`]: snapshot file change polling

pub mod basenames;
pub mod cache;
pub mod fetch;
pub mod snapshot;
pub mod source;
pub mod tree;
pub mod watch;

pub use basenames::Basenames;
pub use cache::TtlCache;
pub use fetch::{BatchData, RecordFetch, RpcFetch};
pub use snapshot::Snapshot;
pub use source::{RecordSource, RemoteSource, SnapshotSource};
pub use tree::{Tree, TreeBuilder};
pub use watch::spawn_watcher;
