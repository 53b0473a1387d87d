//! Waiting for submitted transactions to be mined.

use crate::{
    contract::TransactionHandle,
    page::Page,
    wallet::{MinedReceipt, WalletProvider},
};
use std::time::Duration;

/// How a wait for a transaction ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchOutcome {
    Mined(MinedReceipt),
    /// No notification arrived within the configured timeout.
    TimedOut,
}

/// Turns a wallet's one-time mined notification into a single, optionally bounded, wait.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionWatcher {
    timeout: Option<Duration>,
}

impl TransactionWatcher {
    /// Creates a watcher. `None` waits for as long as it takes.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Waits until the transaction behind `handle` is mined, reporting progress to `page`.
    ///
    /// Resolves exactly once. A notification source that goes away without firing is treated
    /// like one that never fires, so only the timeout can end the wait early.
    pub async fn await_mined<W, P>(
        &self,
        handle: &TransactionHandle,
        wallet: &W,
        page: &P,
    ) -> WatchOutcome
    where
        W: WalletProvider + ?Sized,
        P: Page + ?Sized,
    {
        page.log(&format!("Mining {:#x}...", handle.hash));

        let notification = wallet.watch_mined(handle.hash);
        let mined = async move {
            match notification.await {
                Ok(receipt) => receipt,
                Err(_) => {
                    warn!(hash = %handle.hash, "mined notification dropped without firing");
                    std::future::pending().await
                }
            }
        };

        let receipt = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, mined).await {
                Ok(receipt) => receipt,
                Err(_) => {
                    debug!(hash = %handle.hash, ?timeout, "timed out waiting for transaction");
                    return WatchOutcome::TimedOut;
                }
            },
            None => mined.await,
        };

        page.log(&format!("Completed with {} confirmations", receipt.confirmations));
        WatchOutcome::Mined(receipt)
    }
}
