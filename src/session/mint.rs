//! Mint transaction record: submitted → confirmed. Transient, never stored.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::core::contract::{ContractBinding, MintedToken, RpcLog};
use crate::error::{SessionError, SessionResult};
use crate::host::Host;
use crate::provider::{methods, parse_quantity, WalletProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum MintStatus {
    Submitted,
    Confirmed { block_number: Option<u64> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintTransaction {
    pub hash: String,
    #[serde(flatten)]
    pub status: MintStatus,
}

/// Outcome of a mined mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub hash: String,
    pub block_number: Option<u64>,
    pub explorer_url: Option<String>,
    pub minted: Option<MintedToken>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    block_number: Value,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

/// Broadcast `makeAnEpicNFT()` from `from`. The wallet may prompt for gas here.
pub async fn submit<P>(provider: &P, binding: &ContractBinding, from: &str) -> SessionResult<MintTransaction>
where
    P: WalletProvider + ?Sized,
{
    let result = provider
        .request(methods::SEND_TRANSACTION, json!([binding.mint_request(from)]))
        .await?;
    let hash = result
        .as_str()
        .ok_or_else(|| SessionError::invalid(methods::SEND_TRANSACTION, format!("expected hash, got {result}")))?;
    Ok(MintTransaction { hash: hash.to_string(), status: MintStatus::Submitted })
}

/// Poll the receipt until the transaction is mined. No timeout.
pub async fn wait_until_mined<P, H>(
    provider: &P,
    host: &H,
    binding: &ContractBinding,
    tx: &mut MintTransaction,
    interval: Duration,
) -> SessionResult<Option<MintedToken>>
where
    P: WalletProvider + ?Sized,
    H: Host + ?Sized,
{
    loop {
        let raw = provider.request(methods::TRANSACTION_RECEIPT, json!([tx.hash])).await?;
        if !raw.is_null() {
            let receipt: RpcReceipt = serde_json::from_value(raw)
                .map_err(|e| SessionError::invalid(methods::TRANSACTION_RECEIPT, e.to_string()))?;
            if receipt.block_number.is_null() {
                debug!(tx = %tx.hash, "receipt without block, still pending");
            } else {
                if receipt.status.as_ref().and_then(parse_quantity) == Some(0) {
                    return Err(SessionError::Reverted { hash: tx.hash.clone() });
                }
                tx.status = MintStatus::Confirmed {
                    block_number: parse_quantity(&receipt.block_number),
                };
                return Ok(minted_from_logs(binding, &receipt.logs));
            }
        }
        host.sleep(interval).await;
    }
}

fn minted_from_logs(binding: &ContractBinding, logs: &[RpcLog]) -> Option<MintedToken> {
    logs.iter().find_map(|log| binding.decode_mint(log).ok().flatten())
}
