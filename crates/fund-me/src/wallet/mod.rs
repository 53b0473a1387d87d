//! The wallet boundary.
//!
//! Everything that needs keys or network access goes through a [`WalletProvider`]: requesting
//! accounts, reading balances, signing and submitting transactions and observing when a
//! transaction is mined. The rest of the crate never talks to the network directly.

use alloy_primitives::{Address, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportError;
use async_trait::async_trait;
use tokio::sync::oneshot;

mod rpc;
pub use rpc::{RpcWallet, WalletSigner};

/// EIP-1193 error code returned when the user rejects a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC error code for an unsupported method.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// One-time notification that fires once a transaction is mined.
///
/// The sending half is dropped without a value if the watch is abandoned.
pub type MinedNotification = oneshot::Receiver<MinedReceipt>;

/// What the network reports about a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinedReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// Number of blocks on top of, and including, the one holding the transaction.
    pub confirmations: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("{operation} rejected by the wallet: {reason}")]
    Rejected { operation: &'static str, reason: String },
    #[error("the wallet did not expose any account")]
    NoAccounts,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl WalletError {
    /// Classifies a JSON-RPC failure of `operation`, singling out user rejections.
    pub fn from_rpc(operation: &'static str, err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) if payload.code == USER_REJECTED_CODE => {
                Self::Rejected { operation, reason: payload.message.to_string() }
            }
            _ => Self::Transport(err),
        }
    }

    /// Returns `true` if the user declined the request in their wallet.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Account access, balance reads, signing and mined notifications of an installed wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for account access, returning the granted accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Returns the balance of `address` in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, WalletError>;

    /// Signs and submits `tx` from the connected account.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError>;

    /// Registers a one-time notification for `hash` being mined.
    fn watch_mined(&self, hash: TxHash) -> MinedNotification;
}
