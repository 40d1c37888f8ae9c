//! Test doubles: a scripted wallet provider and a recording host.

#![allow(dead_code)]

use alloy_primitives::Address;
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use epicmint::core::contract::NewEpicNFTMinted;
use epicmint::error::codes;
use epicmint::provider::{methods, EventHandler, SubscriptionId, WalletProvider, ETH_SUBSCRIPTION};
use epicmint::{Host, MintConfig, ProviderError, WalletSession};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

pub const ALICE: &str = "0x1111111111111111111111111111111111111111";
pub const BOB: &str = "0x2222222222222222222222222222222222222222";
pub const MUMBAI: &str = "0x13881";
pub const MAINNET: &str = "0x1";
pub const TX_HASH: &str = "0xabababababababababababababababababababababababababababababababab";

pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("runtime")
}

// =============================================================================
// MockProvider
// =============================================================================

type Reply = Result<Value, ProviderError>;

/// Answers from a per-method script: queued replies first, then a fixed reply.
#[derive(Default)]
pub struct MockProvider {
    queued: RefCell<HashMap<String, VecDeque<Reply>>>,
    fixed: RefCell<HashMap<String, Reply>>,
    after: RefCell<HashMap<String, Vec<(String, Value)>>>,
    calls: RefCell<Vec<(String, Value)>>,
    handlers: RefCell<Vec<(SubscriptionId, String, EventHandler)>>,
    next_handler: Cell<u64>,
    next_subscription: Cell<u64>,
}

impl MockProvider {
    pub fn new() -> Self { Self::default() }

    /// Every call to `method` answers `value`.
    pub fn respond(&self, method: &str, value: Value) -> &Self {
        self.fixed.borrow_mut().insert(method.to_string(), Ok(value));
        self
    }

    /// Every call to `method` fails with `error`.
    pub fn fail(&self, method: &str, error: ProviderError) -> &Self {
        self.fixed.borrow_mut().insert(method.to_string(), Err(error));
        self
    }

    /// The next call to `method` answers `reply`, ahead of the fixed reply.
    pub fn queue(&self, method: &str, reply: Reply) -> &Self {
        self.queued.borrow_mut().entry(method.to_string()).or_default().push_back(reply);
        self
    }

    /// After each successful non-null answer to `method`, emit `payload` on `event`.
    pub fn emit_after(&self, method: &str, event: &str, payload: Value) -> &Self {
        self.after
            .borrow_mut()
            .entry(method.to_string())
            .or_default()
            .push((event.to_string(), payload));
        self
    }

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

    pub fn calls(&self) -> Vec<(String, Value)> { self.calls.borrow().clone() }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|(name, _)| name == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn call_count(&self, method: &str) -> usize { self.calls_to(method).len() }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.borrow().iter().filter(|(_, name, _)| name == event).count()
    }

    fn reply(&self, method: &str) -> Reply {
        if let Some(reply) = self.queued.borrow_mut().get_mut(method).and_then(VecDeque::pop_front) {
            return reply;
        }
        if let Some(reply) = self.fixed.borrow().get(method) {
            return reply.clone();
        }
        match method {
            methods::SUBSCRIBE => {
                let n = self.next_subscription.get() + 1;
                self.next_subscription.set(n);
                Ok(json!(format!("0xsub{n}")))
            }
            methods::UNSUBSCRIBE => Ok(json!(true)),
            _ => Err(ProviderError::new(codes::METHOD_NOT_FOUND, format!("{method} not scripted"))),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push((method.to_string(), params));
        let reply = self.reply(method);
        if matches!(&reply, Ok(value) if !value.is_null()) {
            let pending = self.after.borrow().get(method).cloned().unwrap_or_default();
            for (event, payload) in pending {
                self.emit(&event, &payload);
            }
        }
        reply
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_handler.get() + 1);
        self.next_handler.set(id.0);
        self.handlers.borrow_mut().push((id, event.to_string(), handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().retain(|(handler, _, _)| *handler != id);
    }
}

// =============================================================================
// MockHost
// =============================================================================

#[derive(Default)]
pub struct MockHost {
    pub notifications: RefCell<Vec<String>>,
    pub reloads: Cell<usize>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl MockHost {
    pub fn new() -> Self { Self::default() }

    pub fn notifications(&self) -> Vec<String> { self.notifications.borrow().clone() }
}

#[async_trait(?Send)]
impl Host for MockHost {
    fn notify(&self, message: &str) {
        self.notifications.borrow_mut().push(message.to_string());
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        // Let a concurrently polled future run, like a real timer would.
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub type MockSession = WalletSession<MockProvider, MockHost>;

pub fn session(provider: MockProvider) -> (MockSession, Rc<MockProvider>, Rc<MockHost>) {
    let provider = Rc::new(provider);
    let host = Rc::new(MockHost::new());
    let session = WalletSession::new(Some(provider.clone()), host.clone(), MintConfig::default());
    (session, provider, host)
}

pub fn no_wallet_session() -> (MockSession, Rc<MockHost>) {
    let host = Rc::new(MockHost::new());
    (WalletSession::new(None, host.clone(), MintConfig::default()), host)
}

/// A `NewEpicNFTMinted(recipient, token_id)` log from `contract`.
pub fn mint_log(contract: Address, recipient: &str, token_id: u64) -> Value {
    let recipient = recipient.trim_start_matches("0x").to_lowercase();
    json!({
        "address": contract.to_string(),
        "topics": [format!("0x{}", hex::encode(NewEpicNFTMinted::SIGNATURE_HASH))],
        "data": format!("0x{recipient:0>64}{token_id:064x}"),
        "transactionHash": TX_HASH,
        "blockNumber": "0x10",
        "removed": false,
    })
}

/// The `message` event a wallet pushes for a log subscription.
pub fn subscription_message(subscription: &str, log: Value) -> Value {
    json!({"type": ETH_SUBSCRIPTION, "data": {"subscription": subscription, "result": log}})
}

/// A mined receipt carrying `logs`.
pub fn receipt(status: &str, logs: Vec<Value>) -> Value {
    json!({
        "transactionHash": TX_HASH,
        "status": status,
        "blockNumber": "0x10",
        "logs": logs,
    })
}

/// A wallet on Mumbai with `accounts` already authorized.
pub fn mumbai_wallet(accounts: &[&str]) -> MockProvider {
    let provider = MockProvider::new();
    provider.respond(methods::ACCOUNTS, json!(accounts)).respond(methods::CHAIN_ID, json!(MUMBAI));
    provider
}
