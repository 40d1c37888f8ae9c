//! Native driver tests: HttpProvider against an unreachable node and a stub node
//!
//! These tests verify:
//! 1. HttpProvider event handlers (subscribe, emit, unsubscribe)
//! 2. Emulated eth_subscribe rejects what it cannot poll for
//! 3. Unreachable nodes surface as provider errors, not panics
//! 4. Wallet-only methods are answered locally (connect, switch, add chain)
//! 5. poll() delivers mint logs to the listener and reports chain changes
//! 6. TerminalHost collects notifications and reload requests

#![cfg(feature = "native")]

mod common;

use axum::{extract::State, routing::post, Json, Router};
use common::{mint_log, runtime, ALICE, MAINNET, MUMBAI};
use epicmint::error::codes;
use epicmint::provider::{events, methods};
use epicmint::{
    ContractBinding, Host, HttpProvider, MintConfig, NetworkSwitch, SessionError, TerminalHost, WalletProvider, WalletSession,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// Nothing listens here.
const DEAD_NODE: &str = "http://127.0.0.1:9";

// =============================================================================
// Stub node: plain eth_* JSON-RPC, no wallet methods
// =============================================================================

#[derive(Debug, Default)]
struct StubChain {
    chain_id: String,
    block: u64,
    accounts: Vec<String>,
    pending_logs: Vec<Value>,
    calls: Vec<(String, Value)>,
}

#[derive(Clone, Default)]
struct StubNode {
    chain: Arc<Mutex<StubChain>>,
}

impl StubNode {
    fn new(chain_id: &str, block: u64, accounts: &[&str]) -> Self {
        let chain = StubChain {
            chain_id: chain_id.to_string(),
            block,
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        };
        Self { chain: Arc::new(Mutex::new(chain)) }
    }

    fn with<R>(&self, f: impl FnOnce(&mut StubChain) -> R) -> R {
        f(&mut self.chain.lock().expect("stub chain"))
    }

    fn calls_to(&self, method: &str) -> Vec<Value> {
        self.with(|c| c.calls.iter().filter(|(m, _)| m == method).map(|(_, p)| p.clone()).collect())
    }

    fn methods_called(&self) -> Vec<String> {
        self.with(|c| c.calls.iter().map(|(m, _)| m.clone()).collect())
    }

    /// Serve on an ephemeral port, return the URL.
    async fn start(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let router = Router::new().route("/", post(rpc)).with_state(self.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }
}

async fn rpc(State(node): State<StubNode>, Json(body): Json<Value>) -> Json<Value> {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    let result = node.with(|chain| {
        chain.calls.push((method.clone(), body["params"].clone()));
        match method.as_str() {
            "eth_chainId" => Ok(json!(chain.chain_id)),
            "eth_blockNumber" => Ok(json!(format!("0x{:x}", chain.block))),
            "eth_accounts" => Ok(json!(chain.accounts)),
            "eth_getLogs" => Ok(json!(std::mem::take(&mut chain.pending_logs))),
            other => Err(json!({
                "code": codes::METHOD_NOT_FOUND,
                "message": format!("the method {other} does not exist/is not available"),
            })),
        }
    });
    Json(match result {
        Ok(result) => json!({"jsonrpc": "2.0", "id": body["id"], "result": result}),
        Err(error) => json!({"jsonrpc": "2.0", "id": body["id"], "error": error}),
    })
}

type NodeSession = WalletSession<HttpProvider, TerminalHost>;

fn node_session(url: &str) -> (NodeSession, Rc<HttpProvider>, Rc<TerminalHost>) {
    let provider = Rc::new(HttpProvider::new(url).expect("provider"));
    let host = Rc::new(TerminalHost::new());
    let session = WalletSession::new(Some(provider.clone()), host.clone(), MintConfig::default());
    (session, provider, host)
}

// =============================================================================
// Offline
// =============================================================================

/// Test: Handlers receive emitted events until unsubscribed
#[test]
fn http_provider_handlers() {
    let provider = HttpProvider::new(DEAD_NODE).expect("provider");
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let id = provider.subscribe(events::CHAIN_CHANGED, Rc::new(move |v: &Value| sink.borrow_mut().push(v.clone())));
    provider.emit(events::CHAIN_CHANGED, &json!("0x1"));
    provider.emit(events::MESSAGE, &json!({"type": "eth_subscription"}));
    provider.unsubscribe(id);
    provider.emit(events::CHAIN_CHANGED, &json!("0x5"));

    assert_eq!(*seen.borrow(), vec![json!("0x1")]);
}

/// Test: A malformed URL is refused up front
#[test]
fn http_provider_rejects_bad_url() {
    let err = HttpProvider::new("not a url").err().expect("bad url accepted");
    assert_eq!(err.code, codes::INTERNAL);
}

/// Test: Only log subscriptions are emulated
#[test]
fn http_provider_rejects_other_subscriptions() {
    runtime().block_on(async {
        let provider = HttpProvider::new(DEAD_NODE).expect("provider");

        let err = provider.request(methods::SUBSCRIBE, json!(["newHeads"])).await.unwrap_err();

        assert_eq!(err.code, codes::UNSUPPORTED_METHOD);
        assert_eq!(provider.log_subscriptions(), 0);
    });
}

/// Test: Unknown subscription ids unsubscribe to false
#[test]
fn http_provider_unsubscribe_unknown() {
    runtime().block_on(async {
        let provider = HttpProvider::new(DEAD_NODE).expect("provider");

        let removed = provider.request(methods::UNSUBSCRIBE, json!(["0x9"])).await.expect("unsubscribe");

        assert_eq!(removed, json!(false));
    });
}

/// Test: A node that cannot be reached is a disconnected provider error
#[test]
fn http_provider_unreachable_node() {
    runtime().block_on(async {
        let provider = HttpProvider::new(DEAD_NODE).expect("provider");

        let err = provider.request(methods::CHAIN_ID, json!([])).await.unwrap_err();

        assert_eq!(err.code, codes::DISCONNECTED);
        assert!(err.message.contains(DEAD_NODE));
    });
}

// =============================================================================
// Wallet-only methods against a plain node
// =============================================================================

/// Test: Connecting reads eth_accounts, the node never sees eth_requestAccounts
#[test]
fn node_connect_uses_accounts() {
    runtime().block_on(async {
        let node = StubNode::new(MUMBAI, 5, &[ALICE]);
        let url = node.start().await;
        let (session, _provider, _host) = node_session(&url);

        let account = session.request_connection().await.expect("connect");

        assert_eq!(account.as_deref(), Some(ALICE));
        assert!(!node.methods_called().iter().any(|m| m == methods::REQUEST_ACCOUNTS));
    });
}

/// Test: Switching to the chain the node is on succeeds without an add
#[test]
fn node_switch_same_chain() {
    runtime().block_on(async {
        let node = StubNode::new(MUMBAI, 5, &[]);
        let url = node.start().await;
        let (session, _provider, _host) = node_session(&url);

        let outcome = session.verify_or_switch_network().await.expect("switch");

        assert_eq!(outcome, NetworkSwitch::Switched);
        assert!(node.methods_called().iter().all(|m| m.starts_with("eth_")));
    });
}

/// Test: A node on another chain reports 4902 and refuses to add chains
#[test]
fn node_switch_other_chain() {
    runtime().block_on(async {
        let node = StubNode::new("0x7a69", 5, &[]);
        let url = node.start().await;
        let (session, provider, _host) = node_session(&url);

        let err = provider
            .request(methods::SWITCH_CHAIN, json!([{"chainId": MUMBAI}]))
            .await
            .unwrap_err();
        assert!(err.is_unrecognized_chain());

        let err = session.verify_or_switch_network().await.unwrap_err();
        assert!(matches!(err, SessionError::Provider(ref e) if e.code == codes::UNSUPPORTED_METHOD));
        assert!(node.methods_called().iter().all(|m| m.starts_with("eth_")));
    });
}

// =============================================================================
// Polling
// =============================================================================

/// Test: A mint log reaches the listener once, over an advancing block window
#[test]
fn poll_delivers_mint_notification() {
    runtime().block_on(async {
        let node = StubNode::new(MUMBAI, 5, &[ALICE]);
        let url = node.start().await;
        let (session, provider, host) = node_session(&url);
        session.detect_existing_connection().await.expect("detect");
        assert_eq!(session.listener().remote_id().as_deref(), Some("0x1"));

        let contract = session.config().contract_address;
        node.with(|c| {
            c.block = 8;
            c.pending_logs.push(mint_log(contract, ALICE, 12));
        });
        assert_eq!(provider.poll().await.expect("poll"), 1);

        let notifications = host.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].contains(ALICE));
        assert!(notifications[0].ends_with(&format!("/{contract}/12")));

        let queries = node.calls_to(methods::GET_LOGS);
        assert_eq!(queries.len(), 1);
        let filter = &queries[0][0];
        assert_eq!(filter["fromBlock"], "0x6");
        assert_eq!(filter["toBlock"], "0x8");
        assert_eq!(filter["address"], contract.to_string());
        assert_eq!(filter["topics"], ContractBinding::new(contract).mint_filter()["topics"]);

        // No new block: nothing is queried.
        assert_eq!(provider.poll().await.expect("poll"), 0);
        assert_eq!(node.calls_to(methods::GET_LOGS).len(), 1);

        node.with(|c| c.block = 10);
        assert_eq!(provider.poll().await.expect("poll"), 0);
        let queries = node.calls_to(methods::GET_LOGS);
        assert_eq!(queries[1][0]["fromBlock"], "0x9");
        assert_eq!(queries[1][0]["toBlock"], "0xa");
        assert!(host.take_notifications().is_empty());
    });
}

/// Test: chainChanged fires only when the node's chain id actually changes
#[test]
fn poll_reports_chain_change() {
    runtime().block_on(async {
        let node = StubNode::new(MUMBAI, 5, &[ALICE]);
        let url = node.start().await;
        let (session, provider, host) = node_session(&url);
        session.detect_existing_connection().await.expect("detect");

        provider.poll().await.expect("poll");
        assert!(!host.take_reload());

        node.with(|c| c.chain_id = MAINNET.to_string());
        provider.poll().await.expect("poll");
        assert!(host.take_reload());

        provider.poll().await.expect("poll");
        assert!(!host.take_reload());
    });
}

// =============================================================================
// TerminalHost
// =============================================================================

/// Test: TerminalHost drains notifications and reports a reload once
#[test]
fn terminal_host_collects() {
    let host = TerminalHost::new();

    host.notify("first");
    host.notify("second");
    host.reload();

    assert_eq!(host.take_notifications(), vec!["first".to_string(), "second".to_string()]);
    assert!(host.take_notifications().is_empty());
    assert!(host.take_reload());
    assert!(!host.take_reload());
}
