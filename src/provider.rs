//! Wallet provider capability (EIP-1193 shape).
//!
//! The session never reaches for an ambient `window.ethereum`; it is handed
//! something implementing [`WalletProvider`]. Browser builds inject
//! `wasm::InjectedProvider`, native builds `rpc::HttpProvider`, tests a mock.

use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

use crate::error::ProviderError;

/// Provider methods used by the session.
pub mod methods {
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
    pub const SUBSCRIBE: &str = "eth_subscribe";
    pub const UNSUBSCRIBE: &str = "eth_unsubscribe";
    pub const BLOCK_NUMBER: &str = "eth_blockNumber";
    pub const GET_LOGS: &str = "eth_getLogs";
}

/// Provider events.
pub mod events {
    pub const CHAIN_CHANGED: &str = "chainChanged";
    pub const MESSAGE: &str = "message";
}

/// `message.type` of subscription payloads.
pub const ETH_SUBSCRIPTION: &str = "eth_subscription";

/// Callback for provider events. Single-threaded: handlers are `Rc`.
pub type EventHandler = Rc<dyn Fn(&Value)>;

/// Handle returned by [`WalletProvider::subscribe`]; pass it back to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

#[async_trait(?Send)]
pub trait WalletProvider {
    /// `request({ method, params })`
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Register a handler for a provider event (`chainChanged`, `message`, ...).
    fn subscribe(&self, event: &str, handler: EventHandler) -> SubscriptionId;

    /// Remove a handler. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Parse a JSON-RPC quantity (`"0x1a"`).
pub fn parse_quantity(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Format a JSON-RPC quantity.
pub fn quantity(value: u64) -> String {
    format!("0x{:x}", value)
}
