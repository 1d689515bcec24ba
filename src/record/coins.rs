//! Coin type table.
//!
//! Maps SLIP-44 / ENSIP-11 numeric coin types to the storage key holding the
//! address in a record, and to the codec used to decode it.

use super::codec::{AddressCodec, BTC, DOGE, LTC};
use std::collections::HashMap;
use std::sync::LazyLock;

/// ENSIP-11: coin type of an EVM chain.
pub const fn coin_type_from_chain(chain: u64) -> u64 {
    0x8000_0000 | chain
}

/// The coin type of Ethereum mainnet, used by the legacy `addr(bytes32)`.
pub const COIN_TYPE_ETH: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinEntry {
    pub coin_type: u64,
    /// EVM chain id, for chain-bearing coins.
    pub chain: Option<u64>,
    pub key: String,
    pub codec: AddressCodec,
    /// An alternate numeric type sharing another entry's storage key.
    pub legacy: bool,
}

impl CoinEntry {
    pub fn native(coin_type: u64, key: &str, codec: AddressCodec) -> Self {
        Self { coin_type, chain: None, key: key.to_string(), codec, legacy: false }
    }

    /// An EVM chain whose coin type is derived from its chain id.
    pub fn evm(chain: u64, key: &str) -> Self {
        Self {
            coin_type: coin_type_from_chain(chain),
            chain: Some(chain),
            key: key.to_string(),
            codec: AddressCodec::Evm,
            legacy: false,
        }
    }

    pub fn legacy(coin_type: u64, key: &str, codec: AddressCodec) -> Self {
        Self { legacy: true, ..Self::native(coin_type, key, codec) }
    }
}

/// Coin entries indexed by numeric type.
#[derive(Debug, Clone)]
pub struct CoinTable {
    entries: Vec<CoinEntry>,
    by_type: HashMap<u64, usize>,
}

impl CoinTable {
    pub fn new(entries: Vec<CoinEntry>) -> Self {
        let mut by_type = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_type.entry(entry.coin_type).or_insert(i);
        }
        Self { entries, by_type }
    }

    /// The shared default table.
    pub fn standard() -> &'static CoinTable {
        static STANDARD: LazyLock<CoinTable> = LazyLock::new(|| {
            CoinTable::new(vec![
                CoinEntry { chain: Some(1), ..CoinEntry::native(COIN_TYPE_ETH, "address", AddressCodec::Evm) },
                CoinEntry::native(0, "btc_address", AddressCodec::Bitcoin(BTC)),
                CoinEntry::native(2, "ltc_address", AddressCodec::Bitcoin(LTC)),
                CoinEntry::native(3, "doge_address", AddressCodec::Bitcoin(DOGE)),
                CoinEntry::evm(10, "op_address"),
                CoinEntry::evm(56, "bnb_address"),
                CoinEntry::evm(139, "poly_address"),
                CoinEntry::evm(501, "solana_address"),
                CoinEntry::evm(42161, "arb1_address"),
                CoinEntry::evm(100, "gnosis_address"),
                CoinEntry::legacy(700, "gnosis_address", AddressCodec::Evm),
            ])
        });
        &STANDARD
    }

    pub fn get(&self, coin_type: u64) -> Option<&CoinEntry> {
        self.by_type.get(&coin_type).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CoinEntry] {
        &self.entries
    }

    /// Chain-bearing entries, excluding legacy aliases.
    pub fn chains(&self) -> impl Iterator<Item = &CoinEntry> {
        self.entries.iter().filter(|e| e.chain.is_some() && !e.legacy)
    }

    /// Distinct storage keys in table order.
    pub fn storage_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !keys.contains(&entry.key.as_str()) {
                keys.push(&entry.key);
            }
        }
        keys
    }
}

impl Default for CoinTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_conversion() {
        assert_eq!(coin_type_from_chain(10), 2147483658);
        assert_eq!(coin_type_from_chain(42161), 0x8000_a4b1);
    }

    #[test]
    fn test_standard_lookup() {
        let table = CoinTable::standard();
        assert_eq!(table.get(60).unwrap().key, "address");
        assert_eq!(table.get(coin_type_from_chain(10)).unwrap().key, "op_address");
        assert!(table.get(999_999).is_none());
    }

    #[test]
    fn test_legacy_shares_key() {
        let table = CoinTable::standard();
        let legacy = table.get(700).unwrap();
        let modern = table.get(coin_type_from_chain(100)).unwrap();
        assert!(legacy.legacy);
        assert_eq!(legacy.key, modern.key);
    }

    #[test]
    fn test_storage_keys_deduplicated() {
        let keys = CoinTable::standard().storage_keys();
        assert_eq!(keys.iter().filter(|k| **k == "gnosis_address").count(), 1);
        assert_eq!(keys[0], "address");
    }

    #[test]
    fn test_chains_skip_native_coins() {
        let chains: Vec<u64> = CoinTable::standard().chains().filter_map(|e| e.chain).collect();
        assert!(chains.contains(&1));
        assert!(chains.contains(&42161));
        assert_eq!(chains.len(), 7);
    }
}
