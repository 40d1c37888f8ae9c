//! HttpProvider - EIP-1193 shaped provider over a JSON-RPC HTTP endpoint.
//!
//! Meant for dev chains with unlocked accounts (`eth_sendTransaction` signs
//! node-side). A node is not a wallet, so the wallet-only methods are
//! answered here:
//!
//! | Method | Answer |
//! |--------|--------|
//! | `eth_requestAccounts` | `eth_accounts` (no prompt) |
//! | `wallet_switchEthereumChain` | `null` when the node is on that chain, else 4902 |
//! | `wallet_addEthereumChain` | 4200, a node cannot change chains |
//! | `eth_subscribe("logs")` | local filter, delivered by [`HttpProvider::poll`] |
//!
//! HTTP cannot push either: `poll` fetches new logs and chain changes and
//! emits them to the registered handlers.

use alloy::providers::{Provider, RootProvider};
use alloy::transports::http::reqwest::Url;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{codes, ProviderError};
use crate::provider::{
    events, methods, parse_quantity, quantity, EventHandler, SubscriptionId, WalletProvider, ETH_SUBSCRIPTION,
};

#[derive(Debug, Clone)]
struct LogFilter {
    filter: Value,
    next_block: u64,
}

pub struct HttpProvider {
    url: String,
    node: RootProvider,
    next_handler: Cell<u64>,
    next_filter: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, String, EventHandler)>>,
    log_filters: RefCell<BTreeMap<String, LogFilter>>,
    last_chain_id: RefCell<Option<String>>,
}

impl HttpProvider {
    pub fn new(url: &str) -> Result<Self, ProviderError> {
        let parsed: Url = url
            .parse()
            .map_err(|e| ProviderError::internal(format!("invalid rpc url {url}: {e}")))?;
        Ok(Self {
            url: url.to_string(),
            node: RootProvider::new_http(parsed),
            next_handler: Cell::new(1),
            next_filter: Cell::new(1),
            handlers: RefCell::new(Vec::new()),
            log_filters: RefCell::new(BTreeMap::new()),
            last_chain_id: RefCell::new(None),
        })
    }

    pub fn url(&self) -> &str { &self.url }

    /// Number of emulated log subscriptions.
    pub fn log_subscriptions(&self) -> usize { self.log_filters.borrow().len() }

    /// Raw JSON-RPC call to the node.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        debug!(method, "rpc call");
        match self.node.raw_request::<Value, Value>(method.to_string().into(), params).await {
            Ok(value) => Ok(value),
            Err(RpcError::NullResp) => Ok(Value::Null),
            Err(e) => Err(self.provider_error(method, e)),
        }
    }

    fn provider_error(&self, method: &str, error: RpcError<TransportErrorKind>) -> ProviderError {
        if let Some(payload) = error.as_error_resp() {
            let data = payload.data.as_ref().and_then(|raw| serde_json::from_str(raw.get()).ok());
            return ProviderError { code: payload.code, message: payload.message.to_string(), data };
        }
        match error {
            RpcError::Transport(e) => ProviderError::new(codes::DISCONNECTED, format!("{}: {e}", self.url)),
            other => ProviderError::internal(format!("{method}: {other}")),
        }
    }

    /// Deliver `payload` to every handler registered for `event`.
    pub fn emit(&self, event: &str, payload: &Value) {
        let targets: Vec<EventHandler> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in targets {
            handler(payload);
        }
    }

    /// Fetch chain changes and new logs, emit them. Returns the number of logs delivered.
    pub async fn poll(&self) -> Result<usize, ProviderError> {
        let chain_id = self.call(methods::CHAIN_ID, json!([])).await?;
        if let Some(id) = chain_id.as_str() {
            let previous = self.last_chain_id.replace(Some(id.to_string()));
            if matches!(previous.as_deref(), Some(prev) if prev != id) {
                self.emit(events::CHAIN_CHANGED, &chain_id);
            }
        }

        if self.log_filters.borrow().is_empty() {
            return Ok(0);
        }
        let latest = self.block_number().await?;
        let due: Vec<(String, LogFilter)> = self
            .log_filters
            .borrow()
            .iter()
            .filter(|(_, f)| f.next_block <= latest)
            .map(|(id, f)| (id.clone(), f.clone()))
            .collect();

        let mut delivered = 0;
        for (id, entry) in due {
            let mut query = entry.filter;
            query["fromBlock"] = json!(quantity(entry.next_block));
            query["toBlock"] = json!(quantity(latest));
            let logs = self.call(methods::GET_LOGS, json!([query])).await?;
            if let Some(filter) = self.log_filters.borrow_mut().get_mut(&id) {
                filter.next_block = latest + 1;
            }
            for log in logs.as_array().cloned().unwrap_or_default() {
                let message = json!({"type": ETH_SUBSCRIPTION, "data": {"subscription": id, "result": log}});
                self.emit(events::MESSAGE, &message);
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        let value = self.call(methods::BLOCK_NUMBER, json!([])).await?;
        parse_quantity(&value).ok_or_else(|| ProviderError::internal(format!("bad block number {value}")))
    }

    /// A node has exactly one chain: "switching" succeeds only if it is already the one asked for.
    async fn switch_chain(&self, params: &Value) -> Result<Value, ProviderError> {
        let wanted = params[0]["chainId"]
            .as_str()
            .ok_or_else(|| ProviderError::internal(format!("bad switch params {params}")))?;
        let current = self.call(methods::CHAIN_ID, json!([])).await?;
        let current = current.as_str().unwrap_or_default();
        if current.eq_ignore_ascii_case(wanted) {
            return Ok(Value::Null);
        }
        info!(node_chain = %current, wanted, "node is on another chain");
        Err(ProviderError::unrecognized_chain(wanted))
    }

    async fn subscribe_logs(&self, params: &Value) -> Result<Value, ProviderError> {
        if params[0] != "logs" {
            return Err(ProviderError::new(
                codes::UNSUPPORTED_METHOD,
                format!("only log subscriptions are emulated, got {}", params[0]),
            ));
        }
        let filter = match &params[1] {
            Value::Object(map) => Value::Object(map.clone()),
            Value::Null => json!({}),
            other => return Err(ProviderError::internal(format!("bad log filter {other}"))),
        };
        let next_block = self.block_number().await? + 1;
        let id = quantity(self.next_filter.replace(self.next_filter.get() + 1));
        debug!(subscription = %id, from_block = next_block, "emulated log subscription");
        self.log_filters.borrow_mut().insert(id.clone(), LogFilter { filter, next_block });
        Ok(json!(id))
    }
}

#[async_trait(?Send)]
impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match method {
            methods::SUBSCRIBE => self.subscribe_logs(&params).await,
            methods::UNSUBSCRIBE => {
                let removed = params[0]
                    .as_str()
                    .map_or(false, |id| self.log_filters.borrow_mut().remove(id).is_some());
                Ok(json!(removed))
            }
            methods::CHAIN_ID => {
                let chain_id = self.call(method, params).await?;
                if let Some(id) = chain_id.as_str() {
                    self.last_chain_id.borrow_mut().get_or_insert_with(|| id.to_string());
                }
                Ok(chain_id)
            }
            methods::REQUEST_ACCOUNTS => self.call(methods::ACCOUNTS, json!([])).await,
            methods::SWITCH_CHAIN => self.switch_chain(&params).await,
            methods::ADD_CHAIN => Err(ProviderError::new(
                codes::UNSUPPORTED_METHOD,
                format!("{} is a JSON-RPC node and cannot add chains", self.url),
            )),
            _ => self.call(method, params).await,
        }
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_handler.replace(self.next_handler.get() + 1));
        self.handlers.borrow_mut().push((id, event.to_string(), handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().retain(|(handler, _, _)| *handler != id);
    }
}
