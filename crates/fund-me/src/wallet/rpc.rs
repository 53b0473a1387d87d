use super::{
    METHOD_NOT_FOUND_CODE, MinedNotification, MinedReceipt, WalletError, WalletProvider,
};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::sync::oneshot;

/// How transactions sent through an [`RpcWallet`] get signed.
#[derive(Clone, Debug)]
pub enum WalletSigner {
    /// Sign locally with a private key and submit the raw transaction.
    Local(PrivateKeySigner),
    /// Let the node sign with one of its unlocked accounts via `eth_sendTransaction`.
    ///
    /// Without an explicit sender the first account granted by the node is used.
    Unlocked(Option<Address>),
}

/// A [`WalletProvider`] backed by a JSON-RPC endpoint.
#[derive(Clone, Debug)]
pub struct RpcWallet {
    provider: DynProvider,
    signer: WalletSigner,
    /// Accounts granted by the last successful account request.
    accounts: Arc<Mutex<Vec<Address>>>,
    poll_interval: Duration,
}

impl RpcWallet {
    /// Connects to the endpoint at `url`.
    ///
    /// `url` is an `http` or `https` endpoint.
    pub async fn connect(
        url: &str,
        signer: WalletSigner,
        poll_interval: Duration,
    ) -> Result<Self, WalletError> {
        debug!(%url, ?poll_interval, "connecting wallet");
        let provider = match &signer {
            WalletSigner::Local(local) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(local.clone()))
                .connect(url)
                .await?
                .erased(),
            WalletSigner::Unlocked(_) => ProviderBuilder::new().connect(url).await?.erased(),
        };
        Ok(Self::new(provider, signer, poll_interval))
    }

    /// Wraps an already connected provider.
    pub fn new(provider: DynProvider, signer: WalletSigner, poll_interval: Duration) -> Self {
        // `tokio::time::interval` panics on a zero period.
        let poll_interval = poll_interval.max(Duration::from_millis(1));
        Self { provider, signer, accounts: Default::default(), poll_interval }
    }

    /// Returns the accounts granted so far.
    pub fn accounts(&self) -> Vec<Address> {
        self.accounts.lock().clone()
    }

    async fn unlocked_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let requested = self
            .provider
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), ())
            .await;
        match requested {
            Ok(accounts) => Ok(accounts),
            // Plain nodes don't know about the EIP-1102 method.
            Err(err)
                if err
                    .as_error_resp()
                    .is_some_and(|payload| payload.code == METHOD_NOT_FOUND_CODE) =>
            {
                trace!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.provider
                    .get_accounts()
                    .await
                    .map_err(|err| WalletError::from_rpc("Connection", err))
            }
            Err(err) => Err(WalletError::from_rpc("Connection", err)),
        }
    }

    async fn sender(&self) -> Result<Address, WalletError> {
        match &self.signer {
            WalletSigner::Local(local) => Ok(local.address()),
            WalletSigner::Unlocked(Some(from)) => Ok(*from),
            WalletSigner::Unlocked(None) => {
                if let Some(&first) = self.accounts().first() {
                    return Ok(first);
                }
                self.request_accounts().await?.first().copied().ok_or(WalletError::NoAccounts)
            }
        }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let accounts = match &self.signer {
            WalletSigner::Local(local) => {
                // A local key needs no permission, but the endpoint must be reachable.
                let chain_id = self
                    .provider
                    .get_chain_id()
                    .await
                    .map_err(|err| WalletError::from_rpc("Connection", err))?;
                debug!(chain_id, address = %local.address(), "using local signer");
                vec![local.address()]
            }
            WalletSigner::Unlocked(from) => {
                let accounts = self.unlocked_accounts().await?;
                match from {
                    Some(from) if !accounts.contains(from) => {
                        warn!(%from, "sender is not among the accounts granted by the node");
                    }
                    _ => {}
                }
                accounts
            }
        };
        if accounts.is_empty() {
            return Err(WalletError::NoAccounts);
        }
        *self.accounts.lock() = accounts.clone();
        Ok(accounts)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, WalletError> {
        trace!(%address, "querying balance");
        self.provider
            .get_balance(address)
            .await
            .map_err(|err| WalletError::from_rpc("Balance", err))
    }

    async fn send_transaction(&self, mut tx: TransactionRequest) -> Result<TxHash, WalletError> {
        tx.from = Some(self.sender().await?);
        debug!(from = ?tx.from, to = ?tx.to, value = ?tx.value, "sending transaction");
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|err| WalletError::from_rpc("Transaction", err))?;
        Ok(*pending.tx_hash())
    }

    fn watch_mined(&self, hash: TxHash) -> MinedNotification {
        let (notify, notification) = oneshot::channel();
        tokio::spawn(poll_mined(self.provider.clone(), hash, self.poll_interval, notify));
        notification
    }
}

/// Polls for the receipt of `hash` until it is included in a block, then sends it on `notify`.
///
/// Returns early once the receiving half of `notify` is dropped.
async fn poll_mined(
    provider: DynProvider,
    hash: TxHash,
    poll_interval: Duration,
    mut notify: oneshot::Sender<MinedReceipt>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            biased;
            _ = notify.closed() => {
                trace!(%hash, "mined watch abandoned");
                return;
            }
            _ = ticker.tick() => {}
        }

        let receipt = match provider.get_transaction_receipt(hash).await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => continue,
            Err(err) => {
                warn!(%hash, %err, "failed to fetch receipt");
                continue;
            }
        };
        // Pending receipts carry no block yet.
        let Some(block_number) = receipt.block_number else { continue };
        let latest = match provider.get_block_number().await {
            Ok(latest) => latest,
            Err(err) => {
                warn!(%hash, %err, "failed to fetch latest block");
                continue;
            }
        };

        let receipt = MinedReceipt {
            transaction_hash: hash,
            block_number,
            confirmations: latest.saturating_sub(block_number) + 1,
        };
        debug!(?receipt, "transaction mined");
        let _ = notify.send(receipt);
        return;
    }
}
