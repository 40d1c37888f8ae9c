//! WASM module: the mint page in the browser
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            MintApp (JS API)             │
//! │  start, connect, switchNetwork, mint    │
//! │  state, view, html, mount               │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │        WalletSession (controller)       │
//! │  SessionState + MintEventListener       │
//! └───────┬─────────────────────────┬───────┘
//!         │                         │
//! ┌───────▼──────────┐    ┌─────────▼───────┐
//! │ InjectedProvider │    │   BrowserHost   │
//! │ window.ethereum  │    │ alert / reload  │
//! └──────────────────┘    └─────────────────┘
//! ```

mod app;
mod host;
mod provider;

pub use app::MintApp;
pub use host::BrowserHost;
pub use provider::InjectedProvider;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;
