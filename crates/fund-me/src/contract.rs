//! Typed calls into the deployed `FundMe` contract.

use crate::wallet::{WalletError, WalletProvider};
use alloy_dyn_abi::JsonAbiExt;
use alloy_json_abi::{Function, JsonAbi, StateMutability};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use std::sync::Arc;

/// JSON ABI of the `FundMe` contract, used when no interface file is configured.
pub const FUND_ME_ABI: &str = include_str!("../abi/FundMe.json");

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("the contract interface has no `{0}` function")]
    UnknownFunction(String),
    #[error("`{0}` takes arguments, only argument-less calls are supported")]
    UnexpectedInputs(String),
    #[error("`{0}` is not payable and cannot receive value")]
    NotPayable(String),
    #[error("invalid contract interface: {0}")]
    InvalidInterface(#[from] serde_json::Error),
    #[error(transparent)]
    Encode(#[from] alloy_dyn_abi::Error),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// A submitted, not yet mined, transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionHandle {
    pub hash: TxHash,
}

/// Where the contract lives and what it looks like. Fixed for the life of the process.
#[derive(Clone, Debug)]
pub struct FundMeContract {
    pub address: Address,
    pub interface: Arc<JsonAbi>,
}

impl FundMeContract {
    pub fn new(address: Address, interface: JsonAbi) -> Self {
        Self { address, interface: Arc::new(interface) }
    }

    /// Uses the bundled [`FUND_ME_ABI`].
    pub fn with_default_interface(address: Address) -> Result<Self, ContractError> {
        Ok(Self::new(address, serde_json::from_str(FUND_ME_ABI)?))
    }

    /// Binds the contract to `signer` for a single action.
    pub fn bind<'a, W: WalletProvider + ?Sized>(&'a self, signer: &'a W) -> ContractRef<'a, W> {
        ContractRef { address: self.address, interface: &self.interface, signer }
    }
}

/// An (address, interface, signer) triple. Built per action and dropped afterwards.
#[derive(Debug)]
pub struct ContractRef<'a, W: ?Sized> {
    address: Address,
    interface: &'a JsonAbi,
    signer: &'a W,
}

impl<W: WalletProvider + ?Sized> ContractRef<'_, W> {
    /// Calls the payable `fund()` with `value` wei attached.
    pub async fn fund(&self, value: U256) -> Result<TransactionHandle, ContractError> {
        self.transact("fund", value).await
    }

    /// Calls `withdraw()`.
    pub async fn withdraw(&self) -> Result<TransactionHandle, ContractError> {
        self.transact("withdraw", U256::ZERO).await
    }

    /// Signs and submits a call to the argument-less function `name`.
    pub async fn transact(
        &self,
        name: &str,
        value: U256,
    ) -> Result<TransactionHandle, ContractError> {
        let tx = self.request(name, value)?;
        let hash = self.signer.send_transaction(tx).await?;
        trace!(%hash, function = name, "submitted contract call");
        Ok(TransactionHandle { hash })
    }

    /// Builds the transaction request for calling `name` with `value` attached.
    pub fn request(&self, name: &str, value: U256) -> Result<TransactionRequest, ContractError> {
        let function = self.function(name)?;
        if !value.is_zero() && function.state_mutability != StateMutability::Payable {
            return Err(ContractError::NotPayable(name.to_string()));
        }

        let input = function.abi_encode_input(&[])?;
        let mut tx = TransactionRequest::default().with_to(self.address).with_input(input);
        if !value.is_zero() {
            tx.set_value(value);
        }
        Ok(tx)
    }

    fn function(&self, name: &str) -> Result<&Function, ContractError> {
        let overloads = self
            .interface
            .function(name)
            .ok_or_else(|| ContractError::UnknownFunction(name.to_string()))?;
        overloads
            .iter()
            .find(|function| function.inputs.is_empty())
            .ok_or_else(|| ContractError::UnexpectedInputs(name.to_string()))
    }
}
