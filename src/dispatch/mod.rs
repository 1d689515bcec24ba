//! Selector-based call dispatch.
//!
//! - [`registry`]: per-layer selector tables and ABI definitions
//! - [`engine`]: the [`Dispatcher`] walking CCIP and resolver calls
//! - [`history`]: the per-request trace tree

pub mod engine;
pub mod history;
pub mod registry;

pub use engine::Dispatcher;
pub use history::{History, MULTICALL_MAX_DEPTH};
pub use registry::{Answer, CcipCall, MethodDescriptor, Registry, ResolverCall, CCIP_METHODS, RESOLVER_METHODS};
