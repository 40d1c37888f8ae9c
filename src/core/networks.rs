//! Network registry: hex chain id → display name.
//!
//! Static, loaded once. Lookup is total: unknown ids resolve to `None`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Chain ids as wallets report them (`eth_chainId`, `chainChanged`).
pub mod ids {
    pub const ETHEREUM: &str = "0x1";
    pub const ROPSTEN: &str = "0x3";
    pub const RINKEBY: &str = "0x4";
    pub const GOERLI: &str = "0x5";
    pub const KOVAN: &str = "0x2a";
    pub const BSC_TESTNET: &str = "0x61";
    pub const BSC: &str = "0x38";
    pub const POLYGON: &str = "0x89";
    pub const POLYGON_MUMBAI: &str = "0x13881";
    pub const AVALANCHE: &str = "0xa86a";
}

static NETWORKS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (ids::ETHEREUM, "Mainnet"),
        (ids::ROPSTEN, "Ropsten"),
        (ids::RINKEBY, "Rinkeby"),
        (ids::GOERLI, "Goerli"),
        (ids::KOVAN, "Kovan"),
        (ids::BSC_TESTNET, "BSC Testnet"),
        (ids::BSC, "BSC Mainnet"),
        (ids::POLYGON, "Polygon Mainnet"),
        (ids::POLYGON_MUMBAI, "Polygon Mumbai Testnet"),
        (ids::AVALANCHE, "AVAX Mainnet"),
    ])
});

/// Resolve a hex chain id to its display name.
pub fn resolve(chain_id: &str) -> Option<&'static str> {
    let key = chain_id.trim();
    NETWORKS
        .get(key)
        .or_else(|| NETWORKS.get(key.to_ascii_lowercase().as_str()))
        .copied()
}
