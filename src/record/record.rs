use super::coins::CoinTable;
use bytes::Bytes;
use std::collections::HashMap;

/// Storage key of the content hash field.
pub const CONTENT_HASH_KEY: &str = "dweb";
/// Storage key of the alias text used to redirect address-like names.
pub const ALIAS_KEY: &str = "alias";

/// A stored field value, decoded lazily on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Bytes(Bytes),
}

impl RawValue {
    fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Bytes(b) => std::str::from_utf8(b).ok().map(str::to_owned),
        }
    }

    fn as_bytes(&self) -> Option<Bytes> {
        match self {
            RawValue::Bytes(b) => Some(b.clone()),
            RawValue::Text(s) => {
                let s = s.trim();
                let hex = s.strip_prefix("0x").unwrap_or(s);
                hex::decode(hex).ok().map(Bytes::from)
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            RawValue::Text(s) => s.is_empty(),
            RawValue::Bytes(b) => b.is_empty(),
        }
    }
}

/// The fields stored for one name.
///
/// Addresses are decoded once at construction, keyed by numeric coin type;
/// a legacy coin type gets its own entry for the shared storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, RawValue>,
    addresses: HashMap<u64, Bytes>,
}

impl Record {
    pub fn new(fields: HashMap<String, RawValue>, coins: &CoinTable) -> Self {
        let mut addresses = HashMap::new();
        for coin in coins.entries() {
            let Some(value) = fields.get(&coin.key) else { continue };
            if value.is_empty() {
                continue;
            }
            let Some(text) = value.as_text() else {
                tracing::warn!(key = %coin.key, "address field is not text");
                continue;
            };
            match coin.codec.decode(&text) {
                Ok(bytes) => {
                    addresses.insert(coin.coin_type, Bytes::from(bytes));
                }
                Err(e) => {
                    tracing::warn!(key = %coin.key, coin_type = coin.coin_type, error = %e, "ignoring undecodable address");
                }
            }
        }
        Self { fields, addresses }
    }

    /// Build a record from `(key, value)` text pairs.
    pub fn from_texts<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>, coins: &CoinTable) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), RawValue::Text(v.to_string())))
            .collect();
        Self::new(fields, coins)
    }

    /// Binary address for a coin type, if set and decodable.
    pub fn address(&self, coin_type: u64) -> Option<&Bytes> {
        self.addresses.get(&coin_type)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(RawValue::as_text)
    }

    pub fn content_hash(&self) -> Option<Bytes> {
        self.fields.get(CONTENT_HASH_KEY).and_then(RawValue::as_bytes)
    }

    /// Non-empty alias target, if any.
    pub fn alias(&self) -> Option<String> {
        self.text(ALIAS_KEY).filter(|s| !s.trim().is_empty())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
