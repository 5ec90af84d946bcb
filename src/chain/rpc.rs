//! Minimal Ethereum JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Result, TrailfundError};
use crate::units::TokenAmount;
use crate::wallet::WalletAddress;

use super::{TransactionRequest, TransactionSubmitter};

/// `balanceOf(address)` selector.
const BALANCE_OF_SELECTOR: &str = "70a08231";

/// Blocking JSON-RPC 2.0 client for a node or wallet signer endpoint.
pub struct JsonRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl JsonRpcClient {
    /// Create a client for `url` with a request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("trailfund")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invoke `method` and decode its `result`.
    pub fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!("JSON-RPC {} -> {}", method, self.url);

        let response = self.client.post(&self.url).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(TrailfundError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let decoded: RpcResponse<T> = response.json()?;
        if let Some(err) = decoded.error {
            return Err(TrailfundError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        decoded.result.ok_or_else(|| TrailfundError::MalformedPayload {
            message: format!("{} response has neither result nor error", method),
        })
    }

    /// Accounts the endpoint can sign for.
    pub fn accounts(&self) -> Result<Vec<String>> {
        self.call("eth_accounts", json!([]))
    }

    /// ERC-20 `balanceOf(owner)` on `token`.
    pub fn erc20_balance(&self, token: &str, owner: &WalletAddress) -> Result<TokenAmount> {
        let data = format!(
            "0x{}{:0>64}",
            BALANCE_OF_SELECTOR,
            owner.as_str().trim_start_matches("0x")
        );
        let raw: String = self.call("eth_call", json!([{ "to": token, "data": data }, "latest"]))?;
        TokenAmount::from_raw_str(&raw)
    }
}

impl TransactionSubmitter for JsonRpcClient {
    fn chain_id(&self) -> Result<u64> {
        let raw: String = self.call("eth_chainId", json!([]))?;
        parse_hex_u64(&raw)
    }

    fn submit(&self, tx: &TransactionRequest) -> Result<String> {
        let params = json!([{
            "from": tx.from.as_str(),
            "to": tx.to,
            "data": tx.data,
            "value": format!("0x{:x}", tx.value),
        }]);
        let hash: String = self.call("eth_sendTransaction", params)?;
        tracing::info!("Transaction sent: {}", hash);
        Ok(hash)
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_hex_u64(raw: &str) -> Result<u64> {
    let digits = raw.trim().trim_start_matches("0x");
    u64::from_str_radix(digits, 16).map_err(|e| TrailfundError::MalformedPayload {
        message: format!("'{}' is not a hex quantity: {}", raw, e),
    })
}
