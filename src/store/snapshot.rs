//! JSON snapshot loading.
//!
//! A snapshot document looks like:
//!
//! ```json
//! {
//!   "basenames": ["tkn.eth"],
//!   "root": {
//!     ".": { "name": "TKN" },
//!     "usdc": { "name": "USDC", "address": "0x..." },
//!     "base op": { ".": null, "wallet": { "address": "0x..." } }
//!   }
//! }
//! ```
//!
//! An object holding a `"."` key is a node: `"."` is its record (or `null`)
//! and every other key names children. A key may list several
//! whitespace-separated labels sharing one subtree. An object without `"."`
//! is a leaf record.

use super::basenames::Basenames;
use super::tree::{NodeId, Tree, TreeBuilder, ROOT};
use crate::base::GatewayError;
use crate::name::normalize_label;
use crate::record::{CoinTable, RawValue, Record};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const RECORD_KEY: &str = ".";

#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub basenames: Vec<String>,
    pub root: Value,
}

impl Snapshot {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, GatewayError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build the tree described by this snapshot.
    pub fn into_tree(self, coins: &CoinTable) -> Result<Tree, GatewayError> {
        let mut builder = TreeBuilder::new(Basenames::new(&self.basenames));
        parse_node(&mut builder, ROOT, "[root]", &self.root, coins)?;
        Ok(builder.build(coins))
    }
}

/// Read and parse a snapshot file.
pub async fn load_file(path: impl AsRef<Path>, coins: &CoinTable) -> Result<Tree, GatewayError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let tree = Snapshot::from_slice(&bytes)?.into_tree(coins)?;
    tracing::debug!(path = %path.display(), nodes = tree.len(), "snapshot loaded");
    Ok(tree)
}

fn parse_node(
    builder: &mut TreeBuilder,
    id: NodeId,
    path: &str,
    value: &Value,
    coins: &CoinTable,
) -> Result<(), GatewayError> {
    let Value::Object(map) = value else {
        return Err(GatewayError::InvalidSnapshot(format!("{} is not an object", path)));
    };

    let Some(payload) = map.get(RECORD_KEY) else {
        builder.set_record(id, Arc::new(parse_record(map, coins)));
        return Ok(());
    };
    match payload {
        Value::Object(fields) => builder.set_record(id, Arc::new(parse_record(fields, coins))),
        Value::Null => {}
        _ => {
            return Err(GatewayError::InvalidSnapshot(format!(
                "record of {} is not an object",
                path
            )))
        }
    }

    for (key, child) in map {
        if key == RECORD_KEY {
            continue;
        }
        for label in key.split_whitespace().map(normalize_label) {
            let child_id = builder.add_child(id, &label)?;
            let child_path = format!("{}.{}", label, path);
            parse_node(builder, child_id, &child_path, child, coins)?;
        }
    }
    Ok(())
}

fn parse_record(fields: &Map<String, Value>, coins: &CoinTable) -> Record {
    let mut out = HashMap::with_capacity(fields.len());
    for (key, value) in fields {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            _ => {
                tracing::warn!(key = %key, "ignoring non-scalar record field");
                continue;
            }
        };
        out.insert(key.clone(), RawValue::Text(text));
    }
    Record::new(out, coins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(name: &str) -> Vec<String> {
        name.split('.').map(str::to_string).collect()
    }

    fn tree(json: &str) -> Result<Tree, GatewayError> {
        Snapshot::from_slice(json.as_bytes())?.into_tree(CoinTable::standard())
    }

    #[test]
    fn test_parse_nested() {
        let tree = tree(
            r#"{
                "basenames": ["tkn.eth"],
                "root": {
                    ".": {"name": "TKN"},
                    "usdc": {"name": "USDC", "decimals": 6},
                    "base": {".": null, "wallet": {"address": "0x51050ec063d393217B436747617aD1C2285Aeeee"}}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(tree.lookup(&labels("usdc.tkn.eth")).unwrap().text("decimals").as_deref(), Some("6"));
        assert!(tree.lookup(&labels("base.tkn.eth")).is_none());
        assert!(tree.lookup(&labels("wallet.base.tkn.eth")).unwrap().address(60).is_some());
    }

    #[test]
    fn test_shared_subtree_keys() {
        let tree = tree(
            r#"{"basenames": ["tkn.eth"], "root": {".": null, "op  Base": {"name": "L2"}}}"#,
        )
        .unwrap();
        assert!(tree.lookup(&labels("op.tkn.eth")).is_some());
        assert!(tree.lookup(&labels("base.tkn.eth")).is_some());
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let err = tree(r#"{"basenames": ["tkn.eth"], "root": {".": null, "usdc": {}, "USDC": {}}}"#)
            .unwrap_err();
        assert!(matches!(err, GatewayError::DuplicateLabel { .. }));
    }

    #[test]
    fn test_non_object_node_rejected() {
        let err = tree(r#"{"basenames": [], "root": {".": null, "usdc": 5}}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(tree("{"), Err(GatewayError::InvalidSnapshot(_))));
    }
}
