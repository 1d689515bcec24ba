//! CCIP-Read response signing.
//!
//! - [`signer`]: the gateway's secp256k1 key and Ethereum address
//! - [`envelope`]: the signed `(signature, expires, result)` response

pub mod envelope;
pub mod signer;

pub use envelope::{digest, Envelope, DEFAULT_TTL};
pub use signer::CcipSigner;
