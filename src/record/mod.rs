//! Records and coin types.
//!
//! - [`record`]: the per-name field map with address, text and content hash queries
//! - [`coins`]: the numeric coin type table (SLIP-44 and EVM chain derived)
//! - [`codec`]: textual address to binary address conversion

pub mod codec;
pub mod coins;
#[allow(clippy::module_inception)]
pub mod record;

pub use coins::{coin_type_from_chain, CoinEntry, CoinTable, COIN_TYPE_ETH};
pub use record::{RawValue, Record, ALIAS_KEY, CONTENT_HASH_KEY};
