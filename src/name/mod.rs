//! Domain name handling.
//!
//! - [`codec`]: DNS wire-format decoding into label sequences
//! - [`namehash`]: EIP-137 namehash, the canonical cache key of a name
//!
//! Unicode normalization is performed by callers; [`normalize_label`] only
//! trims and folds case.

pub mod codec;
pub mod namehash;

pub use codec::{decode_labels, encode_labels, encode_name};
pub use namehash::{namehash, namehash_labels};

/// Returns true if the label looks like a hex address (40 hex digits, optional `0x`).
pub fn is_address_like(label: &str) -> bool {
    let hex = label.strip_prefix("0x").unwrap_or(label);
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Canonical form of a single label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Labels of a dotted name, most specific first. One trailing dot is ignored.
pub fn split_name(name: &str) -> Vec<String> {
    let name = name.trim();
    let name = name.strip_suffix('.').unwrap_or(name);
    name.split('.').map(normalize_label).collect()
}

/// Escape and truncate untrusted text for log output.
pub fn safe_str(s: &str) -> String {
    const MAX: usize = 64;
    let mut out: String = s.chars().take(MAX).flat_map(char::escape_debug).collect();
    if s.chars().count() > MAX {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_address_like() {
        assert!(is_address_like("833589fcd6edb6e08f4c7c32d4f71b54bda02913"));
        assert!(is_address_like("0x833589FCD6EDB6E08F4C7C32D4F71B54BDA02913"));
        assert!(!is_address_like("0x833589fcd6edb6e08f4c7c32d4f71b54bda0291"));
        assert!(!is_address_like("wallet"));
        assert!(!is_address_like("zz3589fcd6edb6e08f4c7c32d4f71b54bda02913"));
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("USDC.tkn.eth"), vec!["usdc", "tkn", "eth"]);
        assert_eq!(split_name(" usdc.tkn.eth. "), vec!["usdc", "tkn", "eth"]);
    }

    #[test]
    fn test_safe_str() {
        assert_eq!(safe_str("avatar"), "avatar");
        assert_eq!(safe_str("a\nb"), "a\\nb");
        assert!(safe_str(&"x".repeat(100)).ends_with('…'));
    }
}
