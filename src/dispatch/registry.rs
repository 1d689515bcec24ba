//! Selector registries.
//!
//! Each layer has a static table mapping a 4-byte selector to a method
//! descriptor. Decoding goes through the descriptor; the engine matches on
//! the decoded call variant.

use crate::base::{GatewayError, Layer};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};

/// ABI definitions of every supported method.
pub mod abi {
    /// CCIP layer: the wildcard resolver entry point and its batch form.
    pub mod ccip {
        alloy_sol_types::sol! {
            function resolve(bytes name, bytes data) external view returns (bytes);
            function multicall(bytes[] calls) external view returns (bytes[]);
        }
    }

    pub mod addr {
        alloy_sol_types::sol! {
            function addr(bytes32 node) external view returns (address);
        }
    }

    pub mod addr_coin {
        alloy_sol_types::sol! {
            function addr(bytes32 node, uint256 coinType) external view returns (bytes);
        }
    }

    /// Resolver layer: the remaining record queries.
    pub mod resolver {
        alloy_sol_types::sol! {
            function text(bytes32 node, string key) external view returns (string);
            function contenthash(bytes32 node) external view returns (bytes);
            function multicall(bytes[] calls) external view returns (bytes[]);
        }
    }
}

/// A decoded CCIP-layer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CcipCall {
    Resolve { name: Bytes, data: Bytes },
    Multicall { calls: Vec<Bytes> },
}

/// A decoded resolver-layer call. The node argument is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverCall {
    Addr,
    AddrCoin { coin_type: U256 },
    Text { key: String },
    ContentHash,
    Multicall { calls: Vec<Bytes> },
}

/// An encodable method result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Address(Address),
    Bytes(Bytes),
    Text(String),
    Batch(Vec<Bytes>),
}

impl Answer {
    /// ABI-encode as the single return value of a method.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Answer::Address(a) => a.abi_encode(),
            Answer::Bytes(b) => b.abi_encode(),
            Answer::Text(s) => s.abi_encode(),
            Answer::Batch(v) => v.abi_encode(),
        }
    }
}

/// One selector table entry.
#[derive(Clone)]
pub struct MethodDescriptor<C: 'static> {
    pub selector: [u8; 4],
    pub name: &'static str,
    pub signature: &'static str,
    pub decode: fn(&[u8]) -> Result<C, GatewayError>,
}

impl<C: 'static> std::fmt::Debug for MethodDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("selector", &format_args!("0x{}", hex::encode(self.selector)))
            .field("signature", &self.signature)
            .finish()
    }
}

/// A static selector table for one layer.
pub struct Registry<C: 'static> {
    layer: Layer,
    methods: &'static [MethodDescriptor<C>],
}

impl<C: 'static> Registry<C> {
    pub const fn new(layer: Layer, methods: &'static [MethodDescriptor<C>]) -> Self {
        Self { layer, methods }
    }

    pub fn methods(&self) -> &'static [MethodDescriptor<C>] {
        self.methods
    }

    /// Descriptor for the selector leading `data`.
    pub fn lookup(&self, data: &[u8]) -> Result<&'static MethodDescriptor<C>, GatewayError> {
        let mut selector = [0u8; 4];
        let n = data.len().min(4);
        selector[..n].copy_from_slice(&data[..n]);
        if n < 4 {
            return Err(GatewayError::UnsupportedMethod { layer: self.layer, selector });
        }
        self.methods
            .iter()
            .find(|m| m.selector == selector)
            .ok_or(GatewayError::UnsupportedMethod { layer: self.layer, selector })
    }

    /// Look up and decode a call.
    pub fn decode(&self, data: &[u8]) -> Result<(&'static MethodDescriptor<C>, C), GatewayError> {
        let method = self.lookup(data)?;
        let call = (method.decode)(data)?;
        Ok((method, call))
    }
}

impl<C: 'static> std::fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("layer", &self.layer)
            .field("methods", &self.methods)
            .finish()
    }
}

fn decode_resolve(data: &[u8]) -> Result<CcipCall, GatewayError> {
    let call = abi::ccip::resolveCall::abi_decode(data, false)
        .map_err(|e| GatewayError::call_data("resolve", e))?;
    Ok(CcipCall::Resolve { name: call.name, data: call.data })
}

fn decode_ccip_multicall(data: &[u8]) -> Result<CcipCall, GatewayError> {
    let call = abi::ccip::multicallCall::abi_decode(data, false)
        .map_err(|e| GatewayError::call_data("multicall", e))?;
    Ok(CcipCall::Multicall { calls: call.calls })
}

fn decode_addr(data: &[u8]) -> Result<ResolverCall, GatewayError> {
    abi::addr::addrCall::abi_decode(data, false).map_err(|e| GatewayError::call_data("addr", e))?;
    Ok(ResolverCall::Addr)
}

fn decode_addr_coin(data: &[u8]) -> Result<ResolverCall, GatewayError> {
    let call = abi::addr_coin::addrCall::abi_decode(data, false)
        .map_err(|e| GatewayError::call_data("addr", e))?;
    Ok(ResolverCall::AddrCoin { coin_type: call.coinType })
}

fn decode_text(data: &[u8]) -> Result<ResolverCall, GatewayError> {
    let call = abi::resolver::textCall::abi_decode(data, false)
        .map_err(|e| GatewayError::call_data("text", e))?;
    Ok(ResolverCall::Text { key: call.key })
}

fn decode_contenthash(data: &[u8]) -> Result<ResolverCall, GatewayError> {
    abi::resolver::contenthashCall::abi_decode(data, false)
        .map_err(|e| GatewayError::call_data("contenthash", e))?;
    Ok(ResolverCall::ContentHash)
}

fn decode_resolver_multicall(data: &[u8]) -> Result<ResolverCall, GatewayError> {
    let call = abi::resolver::multicallCall::abi_decode(data, false)
        .map_err(|e| GatewayError::call_data("multicall", e))?;
    Ok(ResolverCall::Multicall { calls: call.calls })
}

/// Methods the gateway itself answers.
pub static CCIP_METHODS: Registry<CcipCall> = Registry::new(
    Layer::Ccip,
    &[
        MethodDescriptor {
            selector: abi::ccip::resolveCall::SELECTOR,
            name: "resolve",
            signature: abi::ccip::resolveCall::SIGNATURE,
            decode: decode_resolve,
        },
        MethodDescriptor {
            selector: abi::ccip::multicallCall::SELECTOR,
            name: "multicall",
            signature: abi::ccip::multicallCall::SIGNATURE,
            decode: decode_ccip_multicall,
        },
    ],
);

/// Methods answered for a resolved record.
pub static RESOLVER_METHODS: Registry<ResolverCall> = Registry::new(
    Layer::Resolver,
    &[
        MethodDescriptor {
            selector: abi::addr::addrCall::SELECTOR,
            name: "addr",
            signature: abi::addr::addrCall::SIGNATURE,
            decode: decode_addr,
        },
        MethodDescriptor {
            selector: abi::addr_coin::addrCall::SELECTOR,
            name: "addr",
            signature: abi::addr_coin::addrCall::SIGNATURE,
            decode: decode_addr_coin,
        },
        MethodDescriptor {
            selector: abi::resolver::textCall::SELECTOR,
            name: "text",
            signature: abi::resolver::textCall::SIGNATURE,
            decode: decode_text,
        },
        MethodDescriptor {
            selector: abi::resolver::contenthashCall::SELECTOR,
            name: "contenthash",
            signature: abi::resolver::contenthashCall::SIGNATURE,
            decode: decode_contenthash,
        },
        MethodDescriptor {
            selector: abi::resolver::multicallCall::SELECTOR,
            name: "multicall",
            signature: abi::resolver::multicallCall::SIGNATURE,
            decode: decode_resolver_multicall,
        },
    ],
);
