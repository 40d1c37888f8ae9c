//! Epicmint: connect a wallet, get onto the right network, mint an NFT.
//!
//! # Architecture
//!
//! ```text
//! WalletSession (controller, owns SessionState)
//!   │
//!   ├── WalletProvider (injected: window.ethereum / JSON-RPC / test double)
//!   │     └── request(method, params), subscribe(event, handler)
//!   │
//!   ├── Host (alert, reload, sleep)
//!   │
//!   ├── MintEventListener
//!   │     └── NewEpicNFTMinted → notification with marketplace link
//!   │
//!   └── View (pure: SwitchNetwork | ConnectWallet | Mint)
//! ```
//!
//! # Operations
//!
//! | Operation | Method | Wallet calls |
//! |-----------|--------|--------------|
//! | detect | `session.detect_existing_connection()` | `eth_accounts`, `eth_chainId`, `chainChanged` |
//! | connect | `session.request_connection()` | `eth_requestAccounts` |
//! | switch | `session.verify_or_switch_network()` | `wallet_switchEthereumChain`, `wallet_addEthereumChain` |
//! | mint | `session.submit_mint_transaction()` | `eth_sendTransaction`, `eth_getTransactionReceipt` |
//!
//! # Features
//!
//! - `native` - CLI, JSON-RPC provider over HTTP, terminal logging
//! - `wasm` - browser bindings over `window.ethereum`
//!
//! # Usage
//!
//! ```ignore
//! use epicmint::{MintConfig, View, WalletSession};
//! use epicmint::rpc::{HttpProvider, TerminalHost};
//! use std::rc::Rc;
//!
//! let provider = Rc::new(HttpProvider::new("http://127.0.0.1:8545")?);
//! let session = WalletSession::new(Some(provider), Rc::new(TerminalHost::new()), MintConfig::default());
//!
//! session.detect_existing_connection().await?;
//! if session.view() == View::Mint {
//!     let receipt = session.submit_mint_transaction().await?;
//! }
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod core;
pub mod error;
pub mod host;
pub mod provider;
pub mod session;

// =============================================================================
// Native-only modules (CLI, HTTP, tokio)
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod rpc;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use core::config::{MintConfig, NativeCurrency, NetworkDescriptor};
pub use core::contract::{ContractBinding, MintedToken, RpcLog};
pub use core::view::View;
pub use error::{ProviderError, SessionError, SessionResult};
pub use host::Host;
pub use provider::{EventHandler, SubscriptionId, WalletProvider};
pub use session::{MintReceipt, NetworkSwitch, SessionState, WalletSession};

// =============================================================================
// Re-exports: Native
// =============================================================================
#[cfg(feature = "native")]
pub use rpc::{HttpProvider, TerminalHost};

// =============================================================================
// Re-exports: WASM
// =============================================================================
#[cfg(feature = "wasm")]
pub use wasm::{BrowserHost, InjectedProvider, MintApp};
