//! The four page actions: connect, get balance, fund and withdraw.

use crate::{
    contract::{ContractError, FundMeContract},
    page::Page,
    units::{self, AmountError},
    wallet::{WalletError, WalletProvider},
    watcher::{TransactionWatcher, WatchOutcome},
};
use alloy_primitives::U256;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Label shown once the wallet granted account access.
pub const CONNECTED_LABEL: &str = "Connected!";

/// Label shown when there is no wallet to connect to.
pub const INSTALL_WALLET_LABEL: &str = "Please install a wallet";

/// How an action ended. Actions never return errors; failures are logged to the page and
/// reported here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    Completed,
    /// The contract balance, in wei.
    Balance(U256),
    /// There is no wallet, nothing was done.
    NoWallet,
    /// The same action is already in flight.
    Busy,
    /// The transaction was submitted but not seen mined in time.
    TimedOut,
    Failed(String),
}

impl ActionStatus {
    /// Returns `true` unless the action failed or timed out.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_) | Self::TimedOut)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Balance(balance) => write!(f, "balance {}", units::format_amount(*balance)),
            Self::NoWallet => f.write_str("no wallet"),
            Self::Busy => f.write_str("already in progress"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ActionError {
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Marks an action kind as running until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct InFlightFlags {
    connect: AtomicBool,
    balance: AtomicBool,
    fund: AtomicBool,
    withdraw: AtomicBool,
}

/// Binds the page actions to a wallet and the `FundMe` contract.
///
/// A missing wallet turns every action but [`connect`](Self::connect) into a no-op. Each action
/// kind runs at most once at a time; clicking again while it is in flight returns
/// [`ActionStatus::Busy`].
pub struct FundMeController<W: ?Sized, P> {
    wallet: Option<Arc<W>>,
    page: P,
    contract: FundMeContract,
    watcher: TransactionWatcher,
    in_flight: InFlightFlags,
}

impl<W: ?Sized, P: fmt::Debug> fmt::Debug for FundMeController<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundMeController")
            .field("has_wallet", &self.wallet.is_some())
            .field("page", &self.page)
            .field("contract", &self.contract.address)
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}

impl<W, P> FundMeController<W, P>
where
    W: WalletProvider + ?Sized,
    P: Page,
{
    pub fn new(
        wallet: Option<Arc<W>>,
        page: P,
        contract: FundMeContract,
        watcher: TransactionWatcher,
    ) -> Self {
        Self { wallet, page, contract, watcher, in_flight: Default::default() }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn contract(&self) -> &FundMeContract {
        &self.contract
    }

    /// Requests account access from the wallet.
    pub async fn connect(&self) -> ActionStatus {
        let Some(wallet) = &self.wallet else {
            self.page.log("No wallet detected!");
            self.page.set_label(INSTALL_WALLET_LABEL);
            return ActionStatus::NoWallet;
        };
        let Some(_guard) = InFlight::acquire(&self.in_flight.connect) else {
            return ActionStatus::Busy;
        };

        match wallet.request_accounts().await {
            Ok(accounts) => {
                debug!(?accounts, "wallet connected");
                self.page.set_label(CONNECTED_LABEL);
                ActionStatus::Completed
            }
            Err(err) => self.fail("connect", err.into()),
        }
    }

    /// Logs the contract's balance in ether.
    pub async fn get_balance(&self) -> ActionStatus {
        let Some(wallet) = &self.wallet else { return ActionStatus::NoWallet };
        let Some(_guard) = InFlight::acquire(&self.in_flight.balance) else {
            return ActionStatus::Busy;
        };

        match wallet.get_balance(self.contract.address).await {
            Ok(balance) => {
                self.page.log(&units::format_amount(balance));
                ActionStatus::Balance(balance)
            }
            Err(err) => self.fail("get balance", err.into()),
        }
    }

    /// Funds the contract with the amount currently in the page's amount input.
    pub async fn fund(&self) -> ActionStatus {
        let amount = self.page.amount();
        self.fund_amount(&amount).await
    }

    /// Funds the contract with `amount` ether, as typed by the user.
    ///
    /// The amount is fixed when the call is made, later edits of the page input don't affect it.
    pub async fn fund_amount(&self, amount: &str) -> ActionStatus {
        let Some(wallet) = &self.wallet else { return ActionStatus::NoWallet };
        let Some(_guard) = InFlight::acquire(&self.in_flight.fund) else {
            return ActionStatus::Busy;
        };

        self.page.log(&format!("Funding with {amount}..."));

        let value = match units::parse_amount(amount) {
            Ok(value) => value,
            Err(err) => return self.fail("fund", err.into()),
        };
        let handle = match self.contract.bind(&**wallet).fund(value).await {
            Ok(handle) => handle,
            Err(err) => return self.fail("fund", err.into()),
        };

        match self.watcher.await_mined(&handle, &**wallet, &self.page).await {
            WatchOutcome::Mined(_) => {
                self.page.log("Done!");
                ActionStatus::Completed
            }
            WatchOutcome::TimedOut => self.timed_out(&handle.hash),
        }
    }

    /// Withdraws all funds from the contract.
    pub async fn withdraw(&self) -> ActionStatus {
        let Some(wallet) = &self.wallet else { return ActionStatus::NoWallet };
        let Some(_guard) = InFlight::acquire(&self.in_flight.withdraw) else {
            return ActionStatus::Busy;
        };

        self.page.log("Withdrawing...");
        let handle = match self.contract.bind(&**wallet).withdraw().await {
            Ok(handle) => handle,
            Err(err) => return self.fail("withdraw", err.into()),
        };

        match self.watcher.await_mined(&handle, &**wallet, &self.page).await {
            WatchOutcome::Mined(_) => ActionStatus::Completed,
            WatchOutcome::TimedOut => self.timed_out(&handle.hash),
        }
    }

    fn fail(&self, action: &str, err: ActionError) -> ActionStatus {
        debug!(action, %err, "action failed");
        let message = err.to_string();
        self.page.log(&message);
        ActionStatus::Failed(message)
    }

    fn timed_out(&self, hash: &impl fmt::LowerHex) -> ActionStatus {
        self.page.log(&format!("Timed out waiting for {hash:#x}"));
        ActionStatus::TimedOut
    }
}
