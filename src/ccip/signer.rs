//! secp256k1 response signing.

use crate::base::GatewayError;
use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::SigningKey;
use k256::SecretKey;
use zeroize::Zeroizing;

/// Signs response digests with the gateway's private key.
#[derive(Clone)]
pub struct CcipSigner {
    key: SigningKey,
    address: Address,
}

impl CcipSigner {
    /// Parse a 32-byte hex private key, `0x` prefix optional.
    pub fn from_hex(key: &str) -> Result<Self, GatewayError> {
        let key = key.trim();
        let bytes = Zeroizing::new(
            hex::decode(key.strip_prefix("0x").unwrap_or(key))
                .map_err(|e| GatewayError::InvalidConfig(format!("private key is not hex: {}", e)))?,
        );
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, GatewayError> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|_| GatewayError::InvalidConfig("invalid secp256k1 private key".to_string()))?;
        let key = SigningKey::from(secret);
        let address = address_of(&key);
        Ok(Self { key, address })
    }

    /// The Ethereum address the resolver contract verifies against.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest as `r ‖ s ‖ v`, with `v` in {27, 28}.
    pub fn sign_hash(&self, hash: &B256) -> Result<[u8; 65], GatewayError> {
        let (signature, recovery) = self
            .key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| GatewayError::Signing(e.to_string()))?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery.to_byte();
        Ok(out)
    }
}

fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

impl std::fmt::Debug for CcipSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CcipSigner").field("address", &self.address).finish_non_exhaustive()
    }
}
