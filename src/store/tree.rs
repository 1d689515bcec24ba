//! Hierarchical record tree.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]; the
//! tree is immutable once built and is swapped whole on reload.
//!
//! Lookup walks a name from its most significant label down:
//! 1. strip the longest basename suffix (names outside every basename miss)
//! 2. if the leading label is address-like, look it up without its `0x`;
//!    a record there with an alias restarts from step 1 with the alias
//!    target, any other record is the answer
//! 3. descend one child per remaining label

use super::basenames::Basenames;
use crate::base::GatewayError;
use crate::name::{is_address_like, normalize_label, split_name};
use crate::record::{CoinTable, RawValue, Record};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// The root node id.
pub const ROOT: NodeId = 0;

/// Label of the reverse-lookup subtree (`<hex>.<chain>.addr.<basename>`).
pub const REVERSE_LABEL: &str = "addr";

/// Label of the hidden per-node summary child. Never a valid DNS label.
pub const SUMMARY_LABEL: &str = ".";

#[derive(Debug)]
struct Node {
    label: String,
    parent: Option<NodeId>,
    children: HashMap<String, NodeId>,
    record: Option<Arc<Record>>,
    hidden: bool,
}

impl Node {
    fn new(label: String, parent: Option<NodeId>, hidden: bool) -> Self {
        Self { label, parent, children: HashMap::new(), record: None, hidden }
    }
}

/// Mutable arena used while loading a snapshot.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    basenames: Basenames,
}

impl TreeBuilder {
    pub fn new(basenames: Basenames) -> Self {
        Self { nodes: vec![Node::new(String::new(), None, false)], basenames }
    }

    /// Add a new child. A label may appear once per parent.
    pub fn add_child(&mut self, parent: NodeId, label: &str) -> Result<NodeId, GatewayError> {
        if label.is_empty() || label.contains('.') {
            return Err(GatewayError::InvalidSnapshot(format!(
                "invalid label {:?} under {:?}",
                label,
                self.path(parent)
            )));
        }
        if self.nodes[parent].children.contains_key(label) {
            return Err(GatewayError::DuplicateLabel {
                parent: self.path(parent),
                label: label.to_string(),
            });
        }
        Ok(self.push(parent, label, false))
    }

    pub fn set_record(&mut self, node: NodeId, record: Arc<Record>) {
        self.nodes[node].record = Some(record);
    }

    fn push(&mut self, parent: NodeId, label: &str, hidden: bool) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(label.to_string(), Some(parent), hidden));
        self.nodes[parent].children.insert(label.to_string(), id);
        id
    }

    fn child_or_insert(&mut self, parent: NodeId, label: &str) -> NodeId {
        match self.nodes[parent].children.get(label) {
            Some(&id) => id,
            None => self.push(parent, label, false),
        }
    }

    fn path(&self, id: NodeId) -> String {
        path_of(&self.nodes, id)
    }

    /// Index every chain address under `addr.<chain>.<hex>`.
    ///
    /// The first record claiming an address keeps it.
    fn index_reverse(&mut self, coins: &CoinTable) {
        let loaded = self.nodes.len();
        for id in 0..loaded {
            let Some(record) = self.nodes[id].record.clone() else { continue };
            for coin in coins.chains() {
                let Some(chain) = coin.chain else { continue };
                let Some(address) = record.address(coin.coin_type) else { continue };
                if address.len() != 20 {
                    continue;
                }
                let hex = hex::encode(address);
                let addr = self.child_or_insert(ROOT, REVERSE_LABEL);
                let chain_node = self.child_or_insert(addr, &chain.to_string());
                let target = self.child_or_insert(chain_node, &hex);
                if self.nodes[target].record.is_some() {
                    tracing::debug!(
                        address = %hex,
                        chain = chain,
                        owner = %self.path(id),
                        "address already indexed"
                    );
                    continue;
                }
                self.nodes[target].record = Some(Arc::clone(&record));
            }
        }
    }

    /// Attach a hidden `count`/`children` summary to every node with children.
    fn summarize(&mut self, coins: &CoinTable) {
        let loaded = self.nodes.len();
        for id in 0..loaded {
            if self.nodes[id].children.is_empty() {
                continue;
            }
            let mut labels: Vec<&str> = self.nodes[id].children.keys().map(String::as_str).collect();
            labels.sort_unstable();
            let mut fields = HashMap::new();
            fields.insert("count".to_string(), RawValue::Text(labels.len().to_string()));
            fields.insert("children".to_string(), RawValue::Text(labels.join(",")));
            let record = Arc::new(Record::new(fields, coins));
            let summary = self.push(id, SUMMARY_LABEL, true);
            self.nodes[summary].record = Some(record);
        }
    }

    /// Finish loading: build the reverse index and summaries.
    pub fn build(mut self, coins: &CoinTable) -> Tree {
        self.index_reverse(coins);
        self.summarize(coins);
        if self.basenames.is_empty() {
            tracing::warn!("tree has no basenames, every lookup will miss");
        }
        Tree { nodes: self.nodes, basenames: self.basenames }
    }
}

fn path_of(nodes: &[Node], mut id: NodeId) -> String {
    let mut labels = Vec::new();
    while let Some(parent) = nodes[id].parent {
        labels.push(nodes[id].label.as_str());
        id = parent;
    }
    if labels.is_empty() {
        "[root]".to_string()
    } else {
        labels.join(".")
    }
}

/// An immutable, fully indexed record tree.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    basenames: Basenames,
}

impl Tree {
    /// Record for a name given as labels, most specific first.
    pub fn lookup(&self, labels: &[String]) -> Option<Arc<Record>> {
        let labels: Vec<String> = labels.iter().map(|l| normalize_label(l)).collect();
        let rest = self.basenames.strip(&labels)?;

        if let Some(first) = rest.first().filter(|l| is_address_like(l)) {
            let mut stripped = rest.to_vec();
            stripped[0] = first.trim_start_matches("0x").to_string();
            let record = self.record_at(&stripped);
            if let Some(alias) = record.as_ref().and_then(|r| r.alias()) {
                let target = split_name(&alias);
                return self.basenames.strip(&target).and_then(|rest| self.record_at(rest));
            }
            if record.is_some() {
                return record;
            }
        }

        self.record_at(rest)
    }

    fn record_at(&self, labels: &[String]) -> Option<Arc<Record>> {
        self.find(labels).and_then(|id| self.nodes[id].record.clone())
    }

    /// The hidden summary record of a node: `count` and `children` fields.
    pub fn directory(&self, labels: &[String]) -> Option<Arc<Record>> {
        let labels: Vec<String> = labels.iter().map(|l| normalize_label(l)).collect();
        let rest = self.basenames.strip(&labels)?;
        let id = self.find(rest)?;
        let summary = *self.nodes[id].children.get(SUMMARY_LABEL)?;
        self.nodes[summary].record.clone()
    }

    /// Descend from the root, one label per level, most significant last.
    pub fn find(&self, labels: &[String]) -> Option<NodeId> {
        let mut id = ROOT;
        for label in labels.iter().rev() {
            let child = *self.nodes[id].children.get(label)?;
            if self.nodes[child].hidden {
                return None;
            }
            id = child;
        }
        Some(id)
    }

    pub fn basenames(&self) -> &Basenames {
        &self.basenames
    }

    /// Number of visible nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.hidden).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1 && self.nodes[ROOT].record.is_none()
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = &self.nodes[id];
        let label = if node.parent.is_none() { "[root]" } else { node.label.as_str() };
        write!(f, "{:indent$}{}", "", label, indent = depth * 2)?;
        if let Some(record) = &node.record {
            write!(f, " ({} fields)", record.field_count())?;
        }
        writeln!(f)?;

        let mut children: Vec<(&String, &NodeId)> = node
            .children
            .iter()
            .filter(|(_, c)| !self.nodes[**c].hidden)
            .collect();
        children.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for (_, &child) in children {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, ROOT, 0)
    }
}
