//! Name Module Tests
//!
//! Covers:
//! - DNS wire-format decoding edge cases
//! - namehash agreement between dotted and label forms

use ccip_gateway::base::GatewayError;
use ccip_gateway::name::{decode_labels, encode_labels, encode_name, namehash, namehash_labels};

#[test]
fn test_wire_roundtrip_preserves_order() {
    let wire = encode_name("wallet.base.tkn.eth").unwrap();
    assert_eq!(wire[0], 6);
    assert_eq!(decode_labels(&wire).unwrap(), vec!["wallet", "base", "tkn", "eth"]);
}

#[test]
fn test_truncated_names() {
    // length byte claims more than is left
    assert!(matches!(decode_labels(b"\x05ab"), Err(GatewayError::MalformedName(_))));
    // no terminating zero
    assert!(matches!(decode_labels(b"\x03eth"), Err(GatewayError::MalformedName(_))));
    assert!(matches!(decode_labels(b""), Err(GatewayError::MalformedName(_))));
}

#[test]
fn test_trailing_bytes_ignored() {
    assert_eq!(decode_labels(b"\x03eth\x00\xff\xff").unwrap(), vec!["eth"]);
}

#[test]
fn test_encode_rejects_unrepresentable_labels() {
    assert!(encode_labels(&["a", ""]).is_err());
    assert!(encode_labels(&["x".repeat(256)]).is_err());
    assert_eq!(encode_labels(&["x".repeat(255)]).unwrap().len(), 257);
}

#[test]
fn test_namehash_forms_agree() {
    let labels = decode_labels(&encode_name("usdc.tkn.eth").unwrap()).unwrap();
    assert_eq!(namehash_labels(&labels), namehash("usdc.tkn.eth"));
    assert_ne!(namehash("usdc.tkn.eth"), namehash("usdt.tkn.eth"));
}
