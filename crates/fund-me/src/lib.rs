//! # fund-me
//!
//! A thin client around a deployed `FundMe` contract.
//!
//! The client connects a wallet, reads the contract balance, and submits `fund` and `withdraw`
//! transactions, reporting progress to a [`Page`] until each transaction is mined.
//!
//! Signing and account management are left to the [`WalletProvider`] implementation and the
//! node behind it.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod contract;
pub mod controller;
pub mod page;
pub mod units;
pub mod wallet;
pub mod watcher;

pub use config::{Config, ConfigError};
pub use contract::{ContractError, ContractRef, FundMeContract, TransactionHandle};
pub use controller::{ActionStatus, CONNECTED_LABEL, FundMeController, INSTALL_WALLET_LABEL};
pub use page::{MemoryPage, Page};
pub use units::{AmountError, format_amount, parse_amount};
pub use wallet::{
    MinedNotification, MinedReceipt, RpcWallet, WalletError, WalletProvider, WalletSigner,
};
pub use watcher::{TransactionWatcher, WatchOutcome};
