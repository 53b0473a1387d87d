//! An in-memory wallet for driving the controller without a node.

use alloy_primitives::{Address, TxHash, U256, address};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::{RpcError, TransportError};
use async_trait::async_trait;
use fund_me::{MinedNotification, MinedReceipt, WalletError, WalletProvider};
use parking_lot::Mutex;
use tokio::sync::oneshot;

pub const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

/// Every call the controller made, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    RequestAccounts,
    GetBalance(Address),
    SendTransaction(TransactionRequest),
    WatchMined(TxHash),
}

#[derive(Debug, Default)]
pub struct MockWallet {
    calls: Mutex<Vec<Call>>,
    reject_accounts: bool,
    send_error: Option<String>,
    balance_error: Option<String>,
    balance: U256,
    /// Fire mined notifications right away with this many confirmations.
    auto_mine: Option<u64>,
    pending: Mutex<Vec<(TxHash, oneshot::Sender<MinedReceipt>)>>,
}

impl MockWallet {
    /// A wallet that approves everything and mines instantly with `confirmations`.
    pub fn mining(confirmations: u64) -> Self {
        Self { auto_mine: Some(confirmations), ..Default::default() }
    }

    /// A wallet whose transactions are only mined through [`Self::mine_pending`].
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn rejecting_accounts(mut self) -> Self {
        self.reject_accounts = true;
        self
    }

    pub fn failing_sends(mut self, message: &str) -> Self {
        self.send_error = Some(message.to_string());
        self
    }

    pub fn failing_balance(mut self, message: &str) -> Self {
        self.balance_error = Some(message.to_string());
        self
    }

    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendTransaction(tx) => Some(tx),
                _ => None,
            })
            .collect()
    }

    pub fn watching(&self) -> usize {
        self.pending.lock().len()
    }

    /// Fires every registered notification.
    pub fn mine_pending(&self, confirmations: u64) {
        for (hash, sender) in self.pending.lock().drain(..) {
            let _ = sender.send(receipt(hash, confirmations));
        }
    }
}

fn receipt(hash: TxHash, confirmations: u64) -> MinedReceipt {
    MinedReceipt { transaction_hash: hash, block_number: 1, confirmations }
}

fn error_response(code: i64, message: &str) -> TransportError {
    let payload = serde_json::json!({ "code": code, "message": message });
    RpcError::ErrorResp(serde_json::from_value(payload).unwrap())
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.calls.lock().push(Call::RequestAccounts);
        if self.reject_accounts {
            let err = error_response(4001, "User rejected the request.");
            return Err(WalletError::from_rpc("Connection", err));
        }
        Ok(vec![ALICE])
    }

    async fn get_balance(&self, address: Address) -> Result<U256, WalletError> {
        self.calls.lock().push(Call::GetBalance(address));
        if let Some(message) = &self.balance_error {
            return Err(WalletError::from_rpc("Balance", error_response(-32000, message)));
        }
        Ok(self.balance)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let mut calls = self.calls.lock();
        calls.push(Call::SendTransaction(tx));
        if let Some(message) = &self.send_error {
            return Err(WalletError::from_rpc("Transaction", error_response(-32000, message)));
        }
        Ok(TxHash::with_last_byte(calls.len() as u8))
    }

    fn watch_mined(&self, hash: TxHash) -> MinedNotification {
        self.calls.lock().push(Call::WatchMined(hash));
        let (sender, notification) = oneshot::channel();
        match self.auto_mine {
            Some(confirmations) => {
                let _ = sender.send(receipt(hash, confirmations));
            }
            None => self.pending.lock().push((hash, sender)),
        }
        notification
    }
}
