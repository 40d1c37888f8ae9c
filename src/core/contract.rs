//! Contract binding: fixed address + ABI for `makeAnEpicNFT()` and `NewEpicNFTMinted`.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::error::SessionError;

sol! {
    contract MyEpicNft {
        event NewEpicNFTMinted(address sender, uint256 tokenId);
        function makeAnEpicNFT() external;
    }
}

pub use MyEpicNft::{makeAnEpicNFTCall, NewEpicNFTMinted};

/// A log as returned by `eth_getLogs`, receipts and `eth_subscription` messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

/// Payload of one `NewEpicNFTMinted` occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedToken {
    pub recipient: Address,
    pub token_id: U256,
}

impl From<NewEpicNFTMinted> for MintedToken {
    fn from(event: NewEpicNFTMinted) -> Self {
        Self { recipient: event.sender, token_id: event.tokenId }
    }
}

/// Immutable pairing of the on-chain address with its interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractBinding {
    address: Address,
}

impl ContractBinding {
    pub fn new(address: Address) -> Self { Self { address } }

    pub fn address(&self) -> Address { self.address }

    /// Calldata for `makeAnEpicNFT()`.
    pub fn mint_calldata(&self) -> Vec<u8> {
        makeAnEpicNFTCall {}.abi_encode()
    }

    /// `eth_sendTransaction` parameter for a mint from `from`.
    pub fn mint_request(&self, from: &str) -> Value {
        json!({
            "from": from,
            "to": self.address.to_string(),
            "data": format!("0x{}", hex::encode(self.mint_calldata())),
        })
    }

    /// Log filter selecting this contract's mint events.
    pub fn mint_filter(&self) -> Value {
        json!({
            "address": self.address.to_string(),
            "topics": [format!("0x{}", hex::encode(NewEpicNFTMinted::SIGNATURE_HASH))],
        })
    }

    /// Decode a mint event. Logs from other contracts or with other topics yield `None`.
    pub fn decode_mint(&self, log: &RpcLog) -> Result<Option<MintedToken>, SessionError> {
        let emitter = Address::from_str(&log.address)
            .map_err(|e| SessionError::invalid("log", format!("address {}: {e}", log.address)))?;
        if emitter != self.address {
            return Ok(None);
        }
        let topics = log
            .topics
            .iter()
            .map(|t| B256::from_str(t).map_err(|e| SessionError::invalid("log", format!("topic {t}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;
        if topics.first() != Some(&NewEpicNFTMinted::SIGNATURE_HASH) {
            return Ok(None);
        }
        let data = decode_hex(&log.data).map_err(|e| SessionError::invalid("log", format!("data: {e}")))?;
        let event = NewEpicNFTMinted::decode_raw_log(topics, &data)?;
        Ok(Some(event.into()))
    }
}

/// Decode `0x`-prefixed (or bare) hex.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let raw = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).unwrap_or(value);
    hex::decode(raw)
}
