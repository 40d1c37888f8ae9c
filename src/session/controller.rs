//! WalletSession - the one controller between the page and the wallet.
//!
//! Owns the session state; everything else reads snapshots. Every failure
//! is logged here before it is returned, so callers may drop the error.

use serde::Serialize;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

use super::listener::MintEventListener;
use super::mint::{self, MintReceipt, MintStatus};
use super::state::SessionState;
use crate::core::config::MintConfig;
use crate::core::contract::ContractBinding;
use crate::core::view::{self, View};
use crate::error::{SessionError, SessionResult};
use crate::host::Host;
use crate::provider::{events, methods, SubscriptionId, WalletProvider};

pub const NO_WALLET_ALERT: &str = "Get MetaMask!";
pub const INSTALL_WALLET_ALERT: &str =
    "MetaMask is not installed. Please install it to use this app: https://metamask.io/download.html";

/// How `verify_or_switch_network` got the wallet onto the required chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkSwitch {
    Switched,
    Added,
}

pub struct WalletSession<P, H> {
    provider: Option<Rc<P>>,
    host: Rc<H>,
    config: Rc<MintConfig>,
    binding: ContractBinding,
    state: RefCell<SessionState>,
    listener: MintEventListener,
    chain_watch: Cell<Option<SubscriptionId>>,
    minting: Cell<bool>,
    on_change: RefCell<Option<Rc<dyn Fn()>>>,
}

impl<P, H> WalletSession<P, H>
where
    P: WalletProvider + 'static,
    H: Host + 'static,
{
    pub fn new(provider: Option<Rc<P>>, host: Rc<H>, config: MintConfig) -> Self {
        let binding = ContractBinding::new(config.contract_address);
        Self {
            provider,
            host,
            config: Rc::new(config),
            binding,
            state: RefCell::new(SessionState::default()),
            listener: MintEventListener::new(binding),
            chain_watch: Cell::new(None),
            minting: Cell::new(false),
            on_change: RefCell::new(None),
        }
    }

    pub fn state(&self) -> SessionState { self.state.borrow().clone() }
    pub fn config(&self) -> &MintConfig { &self.config }
    pub fn provider(&self) -> Option<&Rc<P>> { self.provider.as_ref() }
    pub fn host(&self) -> &Rc<H> { &self.host }
    pub fn listener(&self) -> &MintEventListener { &self.listener }
    pub fn is_minting(&self) -> bool { self.minting.get() }
    pub fn is_watching_chain(&self) -> bool { self.chain_watch.get().is_some() }

    /// Called after every change a renderer can see (state, in-flight flag).
    pub fn set_on_change(&self, callback: Rc<dyn Fn()>) {
        *self.on_change.borrow_mut() = Some(callback);
    }

    pub fn view(&self) -> View {
        let state = self.state.borrow();
        View::select(state.account.as_deref(), state.network.as_deref(), self.config.required_network_name())
    }

    pub fn render_html(&self) -> String {
        view::render_html(&self.config, self.view(), self.is_minting())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Startup: pick up an already-authorized account and the current chain.
    pub async fn detect_existing_connection(&self) -> SessionResult<SessionState> {
        let Some(provider) = self.provider.clone() else {
            info!("Make sure you have metamask!");
            return Ok(self.state());
        };
        debug!("We have the ethereum object");

        match self.accounts(&*provider, methods::ACCOUNTS).await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    info!(account = %account, "Found an authorized account");
                    self.state.borrow_mut().account = Some(account);
                    self.changed();
                    self.activate_listener(&provider).await;
                }
                None => info!("No authorized account found"),
            },
            Err(e) => warn!(error = %e, "eth_accounts failed"),
        }

        self.watch_chain(&*provider);

        let chain_id = self.chain_id(&*provider).await.inspect_err(|e| warn!(error = %e, "eth_chainId failed"))?;
        self.state.borrow_mut().observe_chain(&chain_id);
        self.changed();
        info!(chain_id = %chain_id, network = ?self.state.borrow().network, "network detected");
        Ok(self.state())
    }

    /// User asked to connect. May prompt the wallet; rejection leaves state as it was.
    pub async fn request_connection(&self) -> SessionResult<Option<String>> {
        let Some(provider) = self.provider.clone() else {
            self.host.notify(NO_WALLET_ALERT);
            warn!("connect requested without a wallet provider");
            return Err(SessionError::NoProvider);
        };

        let accounts = self
            .accounts(&*provider, methods::REQUEST_ACCOUNTS)
            .await
            .inspect_err(|e| warn!(error = %e, rejected = e.is_user_rejection(), "eth_requestAccounts failed"))?;
        let Some(account) = accounts.into_iter().next() else {
            warn!("wallet granted access to no accounts");
            return Ok(None);
        };

        info!(account = %account, "Connected");
        self.state.borrow_mut().account = Some(account.clone());
        self.changed();
        self.activate_listener(&provider).await;
        Ok(Some(account))
    }

    /// Ask the wallet to switch to the required chain, adding it if the wallet does not know it.
    pub async fn verify_or_switch_network(&self) -> SessionResult<NetworkSwitch> {
        let Some(provider) = self.provider.clone() else {
            self.host.notify(INSTALL_WALLET_ALERT);
            warn!("switch requested without a wallet provider");
            return Err(SessionError::NoProvider);
        };
        let network = &self.config.network;

        match provider.request(methods::SWITCH_CHAIN, json!([{ "chainId": network.chain_id }])).await {
            Ok(_) => {
                info!(chain_id = %network.chain_id, "switched network");
                Ok(NetworkSwitch::Switched)
            }
            Err(e) if e.is_unrecognized_chain() => {
                info!(chain_id = %network.chain_id, "wallet does not know the chain, adding it");
                provider
                    .request(methods::ADD_CHAIN, json!([network]))
                    .await
                    .inspect_err(|e| warn!(error = %e, "wallet_addEthereumChain failed"))?;
                info!(chain = %network.chain_name, "added network");
                Ok(NetworkSwitch::Added)
            }
            Err(e) => {
                warn!(error = %e, "wallet_switchEthereumChain failed");
                Err(e.into())
            }
        }
    }

    /// Broadcast a mint and wait until it is mined. One at a time per session.
    pub async fn submit_mint_transaction(&self) -> SessionResult<MintReceipt> {
        let Some(provider) = self.provider.clone() else {
            warn!("Ethereum object doesn't exist!");
            return Err(SessionError::NoProvider);
        };
        let _guard = MintGuard::acquire(&self.minting, self.on_change.borrow().clone()).ok_or_else(|| {
            warn!("mint already pending, ignoring");
            SessionError::MintInFlight
        })?;
        self.mint(&*provider).await.inspect_err(|e| warn!(error = %e, "mint failed"))
    }

    /// In-process page reload: drop subscriptions and forget the session.
    pub async fn reset(&self) {
        if let Some(provider) = self.provider.clone() {
            self.listener.deactivate(&*provider).await;
            if let Some(id) = self.chain_watch.take() {
                provider.unsubscribe(id);
            }
        }
        *self.state.borrow_mut() = SessionState::default();
        self.changed();
        debug!("session reset");
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn mint(&self, provider: &P) -> SessionResult<MintReceipt> {
        let account = self.state.borrow().account.clone();
        let from = match account {
            Some(account) => account,
            None => self
                .accounts(provider, methods::ACCOUNTS)
                .await?
                .into_iter()
                .next()
                .ok_or(SessionError::NoSigner)?,
        };

        info!(from = %from, "Going to pop wallet now to pay gas...");
        let mut tx = mint::submit(provider, &self.binding, &from).await?;
        info!(tx = %tx.hash, "Mining...please wait.");

        let minted = mint::wait_until_mined(
            provider,
            &*self.host,
            &self.binding,
            &mut tx,
            self.config.receipt_poll_interval(),
        )
        .await?;

        let explorer_url = self.config.network.explorer_tx_url(&tx.hash);
        info!(tx = %tx.hash, url = ?explorer_url, "Mined, see transaction");
        let block_number = match tx.status {
            MintStatus::Confirmed { block_number } => block_number,
            MintStatus::Submitted => None,
        };
        Ok(MintReceipt { hash: tx.hash, block_number, explorer_url, minted })
    }

    fn changed(&self) {
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    async fn activate_listener(&self, provider: &Rc<P>) {
        if let Err(e) = self.listener.activate(&**provider, self.host.clone(), self.config.clone()).await {
            warn!(error = %e, "could not set up mint listener");
        }
    }

    fn watch_chain(&self, provider: &P) {
        if self.chain_watch.get().is_some() {
            return;
        }
        let host = self.host.clone();
        let id = provider.subscribe(
            events::CHAIN_CHANGED,
            Rc::new(move |chain_id: &Value| {
                info!(chain_id = %chain_id, "chain changed, reloading");
                host.reload();
            }),
        );
        self.chain_watch.set(Some(id));
    }

    async fn accounts(&self, provider: &P, method: &str) -> SessionResult<Vec<String>> {
        let value = provider.request(method, json!([])).await?;
        serde_json::from_value(value).map_err(|e| SessionError::invalid(method, e.to_string()))
    }

    async fn chain_id(&self, provider: &P) -> SessionResult<String> {
        match provider.request(methods::CHAIN_ID, json!([])).await? {
            Value::String(id) => Ok(id),
            other => Err(SessionError::invalid(methods::CHAIN_ID, format!("expected hex string, got {other}"))),
        }
    }
}

/// Holds the in-flight flag for the duration of one mint.
struct MintGuard<'a> {
    flag: &'a Cell<bool>,
    on_change: Option<Rc<dyn Fn()>>,
}

impl<'a> MintGuard<'a> {
    fn acquire(flag: &'a Cell<bool>, on_change: Option<Rc<dyn Fn()>>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        if let Some(callback) = &on_change {
            callback();
        }
        Some(Self { flag, on_change })
    }
}

impl Drop for MintGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
        if let Some(callback) = &self.on_change {
            callback();
        }
    }
}
