//! Wallet session: state, controller, mint listener, mint transactions.
//!
//! ```text
//! WalletSession (controller, owns SessionState)
//!     │
//!     ├── detect_existing_connection ─┐
//!     ├── request_connection ─────────┴──► MintEventListener (idempotent)
//!     ├── verify_or_switch_network           └── message → Host::notify
//!     ├── submit_mint_transaction ──► mint::submit → mint::wait_until_mined
//!     └── reset
//!            │
//!            ▼
//!     WalletProvider (injected)          Host (notify / reload / sleep)
//! ```

mod controller;
mod listener;
pub mod mint;
mod state;

pub use controller::{NetworkSwitch, WalletSession, INSTALL_WALLET_ALERT, NO_WALLET_ALERT};
pub use listener::{mint_notification, MintEventListener};
pub use mint::{MintReceipt, MintStatus, MintTransaction};
pub use state::SessionState;
