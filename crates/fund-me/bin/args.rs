use alloy_primitives::{Address, B256, hex::FromHex};
use alloy_signer_local::PrivateKeySigner;
use clap::{Parser, Subcommand};
use eyre::Result;
use figment::{
    Metadata, Profile, Provider,
    value::{Dict, Map},
};
use fund_me::{Config, WalletSigner};
use std::path::PathBuf;

/// Fund and drain a deployed FundMe contract from the command line.
#[derive(Debug, Parser)]
#[command(name = "fund-me", version, next_display_order = None)]
pub struct FundMeArgs {
    #[command(subcommand)]
    pub cmd: FundMeSubcommand,

    #[command(flatten)]
    pub eth: EthereumOpts,
}

#[derive(Debug, Subcommand)]
pub enum FundMeSubcommand {
    /// Request account access from the wallet.
    #[command(visible_alias = "c")]
    Connect,

    /// Print the contract balance in ether.
    #[command(visible_alias = "b")]
    Balance,

    /// Fund the contract and wait until the transaction is mined.
    #[command(visible_alias = "f")]
    Fund {
        /// The amount of ether to send, e.g. `0.1`.
        amount: String,
    },

    /// Withdraw all funds and wait until the transaction is mined.
    #[command(visible_alias = "w")]
    Withdraw,

    /// Keep a page open and read actions from standard input, one per line.
    Console,
}

#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Ethereum options")]
pub struct EthereumOpts {
    /// The RPC endpoint of the wallet. Without one, no wallet is available.
    #[arg(short, long = "rpc-url", env = "ETH_RPC_URL", value_name = "URL")]
    pub rpc_url: Option<String>,

    /// The address of the deployed FundMe contract.
    #[arg(long = "contract", value_name = "ADDRESS")]
    pub contract_address: Option<Address>,

    /// Path to the contract's JSON ABI.
    #[arg(long, value_name = "PATH")]
    pub abi: Option<PathBuf>,

    /// Seconds to wait for a transaction to be mined, 0 waits forever.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Milliseconds between receipt polls.
    #[arg(long, value_name = "MILLIS")]
    pub poll_interval: Option<u64>,

    /// Path to the configuration file.
    #[arg(long, env = "FUND_ME_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub wallet: WalletOpts,
}

impl EthereumOpts {
    /// Loads the configuration, with these options taking precedence.
    pub fn load_config(&self) -> Result<Config> {
        let figment = match &self.config {
            Some(file) => Config::figment_with_file(file),
            None => Config::figment(),
        };
        Ok(Config::try_from(figment.merge(self.clone()))?)
    }

    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.rpc_url {
            dict.insert("rpc_url".into(), url.clone().into());
        }
        if let Some(address) = self.contract_address {
            dict.insert("contract_address".into(), address.to_string().into());
        }
        if let Some(abi) = &self.abi {
            dict.insert("abi".into(), abi.display().to_string().into());
        }
        if let Some(timeout) = self.timeout {
            dict.insert("transaction_timeout".into(), timeout.into());
        }
        if let Some(interval) = self.poll_interval {
            dict.insert("poll_interval".into(), interval.into());
        }
        if let Some(from) = self.wallet.from {
            dict.insert("sender".into(), from.to_string().into());
        }
        dict
    }
}

// Make the args a `Figment` provider so they can be merged into the `Config`.
impl Provider for EthereumOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("Ethereum Opts Provider")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Profile::Default, self.dict())]))
    }
}

#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Wallet options")]
pub struct WalletOpts {
    /// Sign with the provided private key instead of an unlocked node account.
    #[arg(long, env = "ETH_PRIVATE_KEY", value_name = "RAW_PRIVATE_KEY")]
    pub private_key: Option<String>,

    /// The unlocked account to send from.
    #[arg(long, short, env = "ETH_FROM", value_name = "ADDRESS")]
    pub from: Option<Address>,
}

impl WalletOpts {
    /// Returns the signer to send transactions with.
    ///
    /// Falls back to the node's unlocked `sender` when no private key is given.
    pub fn signer(&self, sender: Option<Address>) -> Result<WalletSigner> {
        match &self.private_key {
            Some(private_key) => Ok(WalletSigner::Local(create_private_key_signer(private_key)?)),
            None => Ok(WalletSigner::Unlocked(self.from.or(sender))),
        }
    }
}

fn ensure_pk_not_env(pk: &str) -> Result<()> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        eyre::bail!(
            "Failed to create wallet from private key. Invalid private key. But env var {pk} exists. Is the `$` anchor missing?"
        );
    }
    Ok(())
}

/// Validates and sanitizes a raw private key.
fn create_private_key_signer(private_key: &str) -> Result<PrivateKeySigner> {
    let private_key = private_key.trim();
    let Ok(bytes) = B256::from_hex(private_key) else {
        ensure_pk_not_env(private_key)?;
        eyre::bail!("Failed to decode private key")
    };
    match PrivateKeySigner::from_bytes(&bytes) {
        Ok(signer) => Ok(signer),
        Err(err) => {
            ensure_pk_not_env(private_key)?;
            eyre::bail!("Failed to create wallet from private key: {err}")
        }
    }
}
