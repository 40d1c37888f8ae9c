//! Mint event listener - turns `NewEpicNFTMinted` logs into user notifications.
//!
//! ```text
//! activate() ──► provider.subscribe("message", handler)
//!            └─► eth_subscribe ["logs", {address, topics:[NewEpicNFTMinted]}] → sub id
//!
//! message {type: eth_subscription, data: {subscription, result: log}}
//!            └─► decode_mint(log) ──► host.notify(text with asset link)
//! ```
//!
//! Activation is idempotent: the detection and connection paths may both
//! activate, only the first one subscribes.

use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::core::config::MintConfig;
use crate::core::contract::{ContractBinding, MintedToken, RpcLog};
use crate::error::{SessionError, SessionResult};
use crate::host::Host;
use crate::provider::{events, methods, EventHandler, SubscriptionId, WalletProvider, ETH_SUBSCRIPTION};

pub struct MintEventListener {
    binding: ContractBinding,
    handler: Cell<Option<SubscriptionId>>,
    remote: Rc<RefCell<Option<String>>>,
}

impl MintEventListener {
    pub fn new(binding: ContractBinding) -> Self {
        Self { binding, handler: Cell::new(None), remote: Rc::new(RefCell::new(None)) }
    }

    pub fn is_active(&self) -> bool { self.handler.get().is_some() }

    /// Provider-side subscription id, once `eth_subscribe` answered.
    pub fn remote_id(&self) -> Option<String> { self.remote.borrow().clone() }

    /// Subscribe to mint events. Returns `false` when already active.
    pub async fn activate<P, H>(&self, provider: &P, host: Rc<H>, config: Rc<MintConfig>) -> SessionResult<bool>
    where
        P: WalletProvider + ?Sized,
        H: Host + 'static,
    {
        if self.is_active() {
            debug!("mint listener already active");
            return Ok(false);
        }
        let handler = on_message(self.binding, self.remote.clone(), host, config);
        self.handler.set(Some(provider.subscribe(events::MESSAGE, handler)));

        let filter = self.binding.mint_filter();
        let result = match provider.request(methods::SUBSCRIBE, json!(["logs", filter])).await {
            Ok(Value::String(id)) => Ok(id),
            Ok(other) => Err(SessionError::invalid(methods::SUBSCRIBE, format!("expected id, got {other}"))),
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(id) => {
                info!(subscription = %id, contract = %self.binding.address(), "Setup event listener!");
                *self.remote.borrow_mut() = Some(id);
                Ok(true)
            }
            Err(e) => {
                if let Some(handler) = self.handler.take() {
                    provider.unsubscribe(handler);
                }
                Err(e)
            }
        }
    }

    /// Cancel both the local handler and the provider-side subscription.
    pub async fn deactivate<P: WalletProvider + ?Sized>(&self, provider: &P) {
        if let Some(handler) = self.handler.take() {
            provider.unsubscribe(handler);
        }
        let remote = self.remote.borrow_mut().take();
        if let Some(id) = remote {
            if let Err(e) = provider.request(methods::UNSUBSCRIBE, json!([id])).await {
                warn!(error = %e, "eth_unsubscribe failed");
            }
        }
    }
}

/// The alert shown for one minted token.
pub fn mint_notification(config: &MintConfig, minted: &MintedToken) -> String {
    format!(
        "Hey there! We've minted your NFT and sent it to {}. It may be blank right now. \
         It can take a max of 10 min to show up on OpenSea. Here's the link: {}",
        minted.recipient,
        config.asset_link(minted.token_id)
    )
}

fn on_message<H: Host + 'static>(
    binding: ContractBinding,
    remote: Rc<RefCell<Option<String>>>,
    host: Rc<H>,
    config: Rc<MintConfig>,
) -> EventHandler {
    Rc::new(move |message: &Value| {
        if message["type"] != ETH_SUBSCRIPTION {
            return;
        }
        let data = &message["data"];
        let ours = remote.borrow().clone();
        if let (Some(ours), Some(theirs)) = (ours.as_deref(), data["subscription"].as_str()) {
            if ours != theirs {
                return;
            }
        }
        let log: RpcLog = match serde_json::from_value(data["result"].clone()) {
            Ok(log) => log,
            Err(e) => {
                debug!(error = %e, "ignoring non-log subscription payload");
                return;
            }
        };
        if log.removed {
            debug!(tx = ?log.transaction_hash, "ignoring removed log");
            return;
        }
        match binding.decode_mint(&log) {
            Ok(Some(minted)) => {
                info!(recipient = %minted.recipient, token_id = %minted.token_id, "NewEpicNFTMinted");
                host.notify(&mint_notification(&config, &minted));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "undecodable mint log"),
        }
    })
}
