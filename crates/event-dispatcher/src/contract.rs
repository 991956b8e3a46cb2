// Copyright 2022 Compute Oracle Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The on-chain side of the oracle: the contract binding and the result
//! submission seam.

use std::sync::Arc;

use ethers::abi::Detokenize;
use ethers::contract::{abigen, ContractCall};
use ethers::providers::{Middleware, ProviderError};
use ethers::types::{Address, H256, U256, U64};

abigen!(
    ComputeOracleContract,
    r#"[
        event Run(string name, string[] args, uint256 id)
        event Deploy(string name, uint256 memorySize, string code, uint256 id)
        event Edit(string name, uint256 memorySize, string code, uint256 id)
        event Delete(string name, uint256 id)
        function runResult(string message, uint256 id, bool success)
        function deployResult(string message, string name, uint256 id, bool success)
    ]"#
);

/// A result transaction could not be submitted.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The call could not be sent, gas estimation or signing failed.
    #[error("Failed to send the result transaction: {}", _0)]
    Contract(String),
    /// The provider failed while waiting for the transaction.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The transaction never made it into a block.
    #[error("Result transaction {:?} was dropped", _0)]
    Dropped(H256),
    /// The transaction was mined but reverted.
    #[error("Result transaction {:?} reverted", _0)]
    Reverted(H256),
}

/// The contract methods the oracle reports results through.
#[async_trait::async_trait]
pub trait ResultContract: Send + Sync {
    /// Calls `runResult(message, id, success)`.
    async fn run_result(
        &self,
        message: &str,
        value: U256,
        success: bool,
    ) -> Result<(), SubmissionError>;

    /// Calls `deployResult(message, name, id, success)`.
    async fn deploy_result(
        &self,
        message: &str,
        name: &str,
        value: U256,
        success: bool,
    ) -> Result<(), SubmissionError>;
}

/// The oracle contract, deployed at some address on an EVM chain.
#[derive(Debug)]
pub struct OracleContract<M> {
    inner: ComputeOracleContract<M>,
    client: Arc<M>,
}

impl<M> Clone for OracleContract<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            client: self.client.clone(),
        }
    }
}

impl<M: Middleware> OracleContract<M> {
    /// Binds the contract at `address` through `client`.
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self {
            inner: ComputeOracleContract::new(address, client.clone()),
            client,
        }
    }

    /// The client the contract is called through.
    pub fn client(&self) -> &M {
        &self.client
    }

    /// The address of the contract.
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// The generated binding, used to query events.
    pub fn binding(&self) -> &ComputeOracleContract<M> {
        &self.inner
    }
}

async fn submit<M, D>(call: ContractCall<M, D>) -> Result<(), SubmissionError>
where
    M: Middleware,
    D: Detokenize + Send,
{
    let pending = call
        .send()
        .await
        .map_err(|e| SubmissionError::Contract(e.to_string()))?;
    let tx_hash = *pending;
    tracing::debug!(?tx_hash, "Result transaction sent");
    let receipt = pending.await?.ok_or(SubmissionError::Dropped(tx_hash))?;
    match receipt.status {
        Some(status) if status == U64::zero() => {
            Err(SubmissionError::Reverted(tx_hash))
        }
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl<M> ResultContract for OracleContract<M>
where
    M: Middleware + 'static,
{
    async fn run_result(
        &self,
        message: &str,
        value: U256,
        success: bool,
    ) -> Result<(), SubmissionError> {
        let call = self.inner.run_result(message.to_owned(), value, success);
        submit(call).await
    }

    async fn deploy_result(
        &self,
        message: &str,
        name: &str,
        value: U256,
        success: bool,
    ) -> Result<(), SubmissionError> {
        let call = self.inner.deploy_result(
            message.to_owned(),
            name.to_owned(),
            value,
            success,
        );
        submit(call).await
    }
}
