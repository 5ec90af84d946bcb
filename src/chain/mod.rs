//! Direct chain access over JSON-RPC.
//!
//! Used for two things the trail API does not do: handing transactions to
//! a wallet signer and, optionally, reading token balances straight from a
//! node.

pub mod rpc;

use serde::Serialize;

use crate::error::Result;
use crate::wallet::WalletAddress;

pub use rpc::JsonRpcClient;

/// A transaction ready to be signed and broadcast by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: WalletAddress,
    pub to: String,
    pub data: String,
    /// Native currency value in wei.
    pub value: u128,
}

/// Something that can sign and broadcast transactions.
pub trait TransactionSubmitter {
    /// Chain the signer is currently on.
    fn chain_id(&self) -> Result<u64>;

    /// Sign and broadcast, returning the transaction hash.
    fn submit(&self, tx: &TransactionRequest) -> Result<String>;
}
