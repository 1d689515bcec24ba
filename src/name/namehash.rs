use alloy_primitives::{keccak256, B256};

/// EIP-137 namehash of a dotted name.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }
    node
}

/// Namehash of a label sequence (root-most label last).
pub fn namehash_labels<S: AsRef<str>>(labels: &[S]) -> B256 {
    let mut node = B256::ZERO;
    for label in labels.iter().rev() {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_ref().as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}
