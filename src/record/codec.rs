//! Address codecs.
//!
//! Converts the textual address stored in a record into the binary form a
//! resolver returns from `addr(node, coinType)` (ENSIP-9):
//! - EVM chains: the raw 20 address bytes
//! - Bitcoin family: the output `scriptPubKey`

use alloy_primitives::Address;
use std::str::FromStr;

/// Parameters of a Bitcoin-family chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitcoinParams {
    /// Base58check version byte(s) of pay-to-pubkey-hash addresses.
    pub p2pkh: &'static [u8],
    /// Base58check version byte(s) of pay-to-script-hash addresses.
    pub p2sh: &'static [u8],
    /// Human readable part of segwit addresses, if the chain has segwit.
    pub hrp: Option<&'static str>,
}

pub const BTC: BitcoinParams = BitcoinParams { p2pkh: &[0x00], p2sh: &[0x05], hrp: Some("bc") };
pub const LTC: BitcoinParams = BitcoinParams { p2pkh: &[0x30], p2sh: &[0x32, 0x05], hrp: Some("ltc") };
pub const DOGE: BitcoinParams = BitcoinParams { p2pkh: &[0x1e], p2sh: &[0x16], hrp: None };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCodec {
    Evm,
    Bitcoin(BitcoinParams),
}

impl AddressCodec {
    /// Decode a textual address into its binary form.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>, String> {
        let text = text.trim();
        match self {
            AddressCodec::Evm => Address::from_str(text)
                .map(|a| a.to_vec())
                .map_err(|e| e.to_string()),
            AddressCodec::Bitcoin(params) => decode_bitcoin(params, text),
        }
    }
}

fn decode_bitcoin(params: &BitcoinParams, text: &str) -> Result<Vec<u8>, String> {
    if let Some(hrp) = params.hrp {
        let lower = text.to_lowercase();
        if lower.starts_with(hrp) && lower.as_bytes().get(hrp.len()) == Some(&b'1') {
            return decode_segwit(hrp, text);
        }
    }

    let payload = bs58::decode(text)
        .with_check(None)
        .into_vec()
        .map_err(|e| e.to_string())?;
    if payload.len() != 21 {
        return Err(format!("unexpected base58 payload length {}", payload.len()));
    }
    let (version, hash) = (payload[0], &payload[1..]);
    if params.p2pkh.contains(&version) {
        let mut script = vec![0x76, 0xa9, 0x14];
        script.extend_from_slice(hash);
        script.extend_from_slice(&[0x88, 0xac]);
        Ok(script)
    } else if params.p2sh.contains(&version) {
        let mut script = vec![0xa9, 0x14];
        script.extend_from_slice(hash);
        script.push(0x87);
        Ok(script)
    } else {
        Err(format!("unknown version byte 0x{:02x}", version))
    }
}

/// Decode a segwit address into `OP_n <push> <program>`.
///
/// The checksum variant, version and program length are checked by `bech32`.
fn decode_segwit(hrp: &str, text: &str) -> Result<Vec<u8>, String> {
    let (found, version, program) = bech32::segwit::decode(text).map_err(|e| e.to_string())?;
    if found.to_lowercase() != hrp {
        return Err("wrong human readable part".into());
    }

    let version = version.to_u8();
    let mut script = Vec::with_capacity(program.len() + 2);
    script.push(if version == 0 { 0 } else { 0x50 + version });
    script.push(program.len() as u8);
    script.extend_from_slice(&program);
    Ok(script)
}
