//! Basename suffix matching.
//!
//! A basename is a fully-qualified suffix (`tkn.eth`) this gateway is
//! authoritative for. Names outside every basename are never served.

use crate::name::normalize_label;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct SuffixNode {
    children: HashMap<String, SuffixNode>,
    terminal: bool,
}

/// Suffix tree of basenames, labels stored root-first.
#[derive(Debug, Clone, Default)]
pub struct Basenames {
    root: SuffixNode,
    count: usize,
}

impl Basenames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut basenames = Self::default();
        for name in names {
            basenames.insert(name.as_ref());
        }
        basenames
    }

    /// Add a dotted basename. Empty names are ignored.
    pub fn insert(&mut self, name: &str) {
        let labels: Vec<String> = name
            .split('.')
            .map(normalize_label)
            .filter(|l| !l.is_empty())
            .collect();
        if labels.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for label in labels.into_iter().rev() {
            node = node.children.entry(label).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.count += 1;
        }
    }

    /// Strip the longest matching basename from the end of `labels`.
    ///
    /// Returns the remaining (least-significant) labels, or `None` when the
    /// name does not end in any basename.
    pub fn strip<'a>(&self, labels: &'a [String]) -> Option<&'a [String]> {
        let mut node = &self.root;
        let mut matched = None;
        for i in (0..labels.len()).rev() {
            match node.children.get(&labels[i]) {
                Some(next) => {
                    node = next;
                    if node.terminal {
                        matched = Some(i);
                    }
                }
                None => break,
            }
        }
        matched.map(|i| &labels[..i])
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
