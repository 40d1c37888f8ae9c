//! Native wallet plumbing: JSON-RPC provider + terminal host.
//!
//! ```text
//! WalletSession<HttpProvider, TerminalHost>
//!     │                          │
//!     ▼                          ▼
//! HttpProvider ── alloy ───► JSON-RPC node       notifications / reload flag
//!     │
//!     └── poll(): eth_chainId → chainChanged, eth_getLogs → message
//! ```

mod client;
mod host;

pub use client::HttpProvider;
pub use host::TerminalHost;
