//! Errors surfaced by the wallet session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// EIP-1193 / EIP-3326 / JSON-RPC error codes the session cares about.
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INTERNAL: i64 = -32603;
}

/// A failed `request(method, params)` as reported by the wallet provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn internal(message: impl Into<String>) -> Self { Self::new(codes::INTERNAL, message) }

    pub fn user_rejected() -> Self { Self::new(codes::USER_REJECTED, "User rejected the request.") }

    pub fn unrecognized_chain(chain_id: &str) -> Self {
        Self::new(codes::UNRECOGNIZED_CHAIN, format!("Unrecognized chain ID \"{chain_id}\"."))
    }

    pub fn is_user_rejection(&self) -> bool { self.code == codes::USER_REJECTED }

    pub fn is_unrecognized_chain(&self) -> bool { self.code == codes::UNRECOGNIZED_CHAIN }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no wallet provider detected")]
    NoProvider,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("no signer: wallet has no authorized account")]
    NoSigner,
    #[error("a mint transaction is already pending")]
    MintInFlight,
    #[error("invalid {method} response: {reason}")]
    InvalidResponse { method: String, reason: String },
    #[error("transaction {hash} reverted")]
    Reverted { hash: String },
    #[error("abi: {0}")]
    Abi(#[from] alloy_sol_types::Error),
}

impl SessionError {
    pub fn invalid(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse { method: method.into(), reason: reason.into() }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, SessionError::Provider(e) if e.is_user_rejection())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
