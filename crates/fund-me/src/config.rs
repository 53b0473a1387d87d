//! Configuration, layered with [`figment`].
//!
//! Values are merged in this order, later sources overriding earlier ones:
//!
//! 1. [`Config::default`]
//! 2. `fund-me.toml` in the current directory, or the file named by `FUND_ME_CONFIG`
//! 3. `FUND_ME_*` environment variables, e.g. `FUND_ME_CONTRACT_ADDRESS`
//! 4. anything merged on top by the caller, such as command line arguments
//!
//! Wallet credentials are never read from here.

use crate::contract::{ContractError, FundMeContract};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Extract(#[from] figment::Error),
    #[error(
        "no contract address configured; set `contract_address` in {} or {}CONTRACT_ADDRESS",
        Config::FILE_NAME,
        Config::ENV_PREFIX
    )]
    MissingContractAddress,
    #[error("failed to read contract interface {}: {source}", path.display())]
    ReadAbi {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load contract interface {}: {source}", path.display())]
    ParseAbi {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Everything fixed for the life of the process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet. Without one there is no wallet to talk to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Address of the deployed `FundMe` contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    /// Path to the contract's JSON ABI. Defaults to the bundled `FundMe` ABI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi: Option<PathBuf>,
    /// Unlocked node account to send from when no private key is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    /// Seconds to wait for a transaction to be mined, `0` waits forever.
    pub transaction_timeout: u64,
    /// Milliseconds between receipt polls.
    pub poll_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: None,
            abi: None,
            sender: None,
            transaction_timeout: 120,
            poll_interval: 1000,
        }
    }
}

impl Config {
    /// Default configuration file name.
    pub const FILE_NAME: &'static str = "fund-me.toml";

    /// Prefix of environment variables overriding configuration keys.
    pub const ENV_PREFIX: &'static str = "FUND_ME_";

    /// Environment variable pointing at an alternative configuration file.
    pub const CONFIG_ENV: &'static str = "FUND_ME_CONFIG";

    /// Loads the configuration from the current directory and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::try_from(Self::figment())
    }

    /// Returns the default [`Figment`].
    ///
    /// Reads the file named by [`Self::CONFIG_ENV`] if set, otherwise [`Self::FILE_NAME`] in the
    /// current directory.
    pub fn figment() -> Figment {
        let file = std::env::var_os(Self::CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME));
        Self::figment_with_file(&file)
    }

    /// Returns the default [`Figment`] reading configuration from `file`.
    ///
    /// A missing file is not an error.
    pub fn figment_with_file(file: &Path) -> Figment {
        trace!(file = %file.display(), "loading config");
        Figment::from(Self::default())
            .merge(Toml::file(file))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG"]))
    }

    /// Extracts a `Config` from `provider`.
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ConfigError> {
        Ok(Figment::from(provider).extract()?)
    }

    /// The mined-wait timeout, `None` if disabled.
    pub fn transaction_timeout(&self) -> Option<Duration> {
        (self.transaction_timeout > 0).then(|| Duration::from_secs(self.transaction_timeout))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }

    /// Resolves the contract address and interface.
    pub fn contract(&self) -> Result<FundMeContract, ConfigError> {
        let address = self.contract_address.ok_or(ConfigError::MissingContractAddress)?;
        let Some(path) = &self.abi else {
            return Ok(FundMeContract::with_default_interface(address)?);
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadAbi { path: path.clone(), source })?;
        let interface: JsonAbi = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::ParseAbi { path: path.clone(), source })?;
        Ok(FundMeContract::new(address, interface))
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("fund-me defaults")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
