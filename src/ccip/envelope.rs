//! Signed CCIP response envelopes.
//!
//! The resolver contract's callback verifies
//! `keccak256(resolver ‖ uint64 expires ‖ keccak256(request) ‖ keccak256(result))`
//! against the signer address and rejects envelopes past `expires`.

use super::signer::CcipSigner;
use crate::base::GatewayError;
use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_sol_types::SolValue;
use std::time::Duration;
use time::OffsetDateTime;

/// Default validity window of a signed response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// The digest a response is signed over.
pub fn digest(resolver: Address, expires: u64, request: &[u8], result: &[u8]) -> B256 {
    let mut packed = Vec::with_capacity(20 + 8 + 32 + 32);
    packed.extend_from_slice(resolver.as_slice());
    packed.extend_from_slice(&expires.to_be_bytes());
    packed.extend_from_slice(keccak256(request).as_slice());
    packed.extend_from_slice(keccak256(result).as_slice());
    keccak256(&packed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub signature: Bytes,
    pub expires: u64,
    pub result: Bytes,
}

impl Envelope {
    /// Sign `result` as the answer to `request`, valid for `ttl` from now.
    pub fn seal(
        signer: &CcipSigner,
        resolver: Address,
        request: &[u8],
        result: Vec<u8>,
        ttl: Duration,
    ) -> Result<Self, GatewayError> {
        let now = OffsetDateTime::now_utc().unix_timestamp().max(0) as u64;
        Self::seal_at(signer, resolver, request, result, now + ttl.as_secs())
    }

    /// Sign with an explicit expiry, in unix seconds.
    pub fn seal_at(
        signer: &CcipSigner,
        resolver: Address,
        request: &[u8],
        result: Vec<u8>,
        expires: u64,
    ) -> Result<Self, GatewayError> {
        let hash = digest(resolver, expires, request, &result);
        let signature = signer.sign_hash(&hash)?;
        Ok(Self {
            signature: Bytes::copy_from_slice(&signature),
            expires,
            result: Bytes::from(result),
        })
    }

    /// ABI-encode as `(bytes signature, uint64 expires, bytes result)`.
    pub fn encode(&self) -> Vec<u8> {
        (self.signature.clone(), self.expires, self.result.clone()).abi_encode_params()
    }

    /// Parse an encoded envelope.
    pub fn decode(data: &[u8]) -> Result<Self, GatewayError> {
        let (signature, expires, result) = <(Bytes, u64, Bytes)>::abi_decode_params(data, false)
            .map_err(|e| GatewayError::call_data("envelope", e))?;
        Ok(Self { signature, expires, result })
    }
}
