//! Mint configuration - passed from higher layers (CLI flags, JS constructor)

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::networks::ids;

/// Contract deployed on Polygon Mumbai.
pub const DEFAULT_CONTRACT: Address = address!("6290fbac2dd385df6769d0731b0f16ee886b8de6");
pub const DEFAULT_MARKETPLACE_ASSET_BASE: &str = "https://testnets.opensea.io/assets/mumbai";
pub const DEFAULT_SOCIAL_HANDLE: &str = "_buildspace";
pub const DEFAULT_TOTAL_MINT_COUNT: u64 = 50;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 4_000;

/// Native currency of a chain, as `wallet_addEthereumChain` expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Network the app requires. Serializes to the `wallet_addEthereumChain` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

impl Default for NetworkDescriptor {
    fn default() -> Self { Self::polygon_mumbai() }
}

impl NetworkDescriptor {
    pub fn polygon_mumbai() -> Self {
        Self {
            chain_id: ids::POLYGON_MUMBAI.into(),
            chain_name: "Polygon Mumbai Testnet".into(),
            rpc_urls: vec!["https://rpc-mumbai.maticvigil.com/".into()],
            native_currency: NativeCurrency { name: "Mumbai Matic".into(), symbol: "MATIC".into(), decimals: 18 },
            block_explorer_urls: vec!["https://mumbai.polygonscan.com/".into()],
        }
    }

    /// First explorer URL, always with a trailing slash.
    pub fn explorer_base(&self) -> Option<String> {
        self.block_explorer_urls.first().map(|url| {
            if url.ends_with('/') { url.clone() } else { format!("{url}/") }
        })
    }

    /// Explorer page for a transaction hash.
    pub fn explorer_tx_url(&self, hash: &str) -> Option<String> {
        self.explorer_base().map(|base| format!("{base}tx/{hash}"))
    }
}

/// Mint app configuration. Higher layers construct this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MintConfig {
    pub contract_address: Address,
    pub network: NetworkDescriptor,
    pub marketplace_asset_base: String,
    pub social_handle: String,
    pub total_mint_count: u64,
    pub receipt_poll_interval_ms: u64,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT,
            network: NetworkDescriptor::default(),
            marketplace_asset_base: DEFAULT_MARKETPLACE_ASSET_BASE.into(),
            social_handle: DEFAULT_SOCIAL_HANDLE.into(),
            total_mint_count: DEFAULT_TOTAL_MINT_COUNT,
            receipt_poll_interval_ms: DEFAULT_RECEIPT_POLL_INTERVAL_MS,
        }
    }
}

impl MintConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_contract(mut self, address: Address) -> Self { self.contract_address = address; self }
    pub fn with_marketplace(mut self, base: impl Into<String>) -> Self { self.marketplace_asset_base = base.into(); self }
    pub fn with_social_handle(mut self, handle: impl Into<String>) -> Self { self.social_handle = handle.into(); self }
    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn required_network_name(&self) -> &str { &self.network.chain_name }

    pub fn receipt_poll_interval(&self) -> Duration { Duration::from_millis(self.receipt_poll_interval_ms) }

    pub fn social_link(&self) -> String { format!("https://twitter.com/{}", self.social_handle) }

    /// Marketplace page for a minted token.
    pub fn asset_link(&self, token_id: impl std::fmt::Display) -> String {
        format!("{}/{}/{}", self.marketplace_asset_base.trim_end_matches('/'), self.contract_address, token_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_chain_params_use_wallet_field_names() {
        let params = serde_json::to_value(NetworkDescriptor::polygon_mumbai()).unwrap();
        assert_eq!(params, json!({
            "chainId": "0x13881",
            "chainName": "Polygon Mumbai Testnet",
            "rpcUrls": ["https://rpc-mumbai.maticvigil.com/"],
            "nativeCurrency": {"name": "Mumbai Matic", "symbol": "MATIC", "decimals": 18},
            "blockExplorerUrls": ["https://mumbai.polygonscan.com/"]
        }));
    }

    #[test]
    fn test_explorer_tx_url() {
        let mut network = NetworkDescriptor::polygon_mumbai();
        assert_eq!(network.explorer_tx_url("0xabc").as_deref(), Some("https://mumbai.polygonscan.com/tx/0xabc"));
        network.block_explorer_urls = vec!["https://explorer.example".into()];
        assert_eq!(network.explorer_tx_url("0xabc").as_deref(), Some("https://explorer.example/tx/0xabc"));
        network.block_explorer_urls.clear();
        assert_eq!(network.explorer_tx_url("0xabc"), None);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: MintConfig = serde_json::from_value(json!({"socialHandle": "someone"})).unwrap();
        assert_eq!(config.social_handle, "someone");
        assert_eq!(config.contract_address, DEFAULT_CONTRACT);
        assert_eq!(config.required_network_name(), "Polygon Mumbai Testnet");
        assert_eq!(config.receipt_poll_interval(), Duration::from_secs(4));
    }

    #[test]
    fn test_asset_link() {
        let config = MintConfig::new().with_marketplace("https://market.example/assets/");
        assert_eq!(
            config.asset_link(7),
            format!("https://market.example/assets/{}/7", DEFAULT_CONTRACT)
        );
    }
}
