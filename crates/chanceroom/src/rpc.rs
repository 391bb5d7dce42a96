// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The narrow set of chain operations every deployment step is built from.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::errors::DeployError;

/// A transaction to submit, or to simulate with `eth_call`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxRequest {
    /// Sending account.
    pub from: Address,
    /// Recipient; `None` creates a contract from `input`.
    pub to: Option<Address>,
    /// Calldata, or init code for a deployment.
    pub input: Bytes,
    /// Attached value in wei.
    pub value: U256,
}

impl TxRequest {
    /// A call to an existing contract.
    pub fn call(from: Address, to: Address, input: impl Into<Bytes>) -> Self {
        Self { from, to: Some(to), input: input.into(), value: U256::ZERO }
    }

    /// A contract creation.
    pub fn create(from: Address, init_code: impl Into<Bytes>) -> Self {
        Self { from, to: None, input: init_code.into(), value: U256::ZERO }
    }
}

/// The parts of a transaction receipt the tooling relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Execution status.
    pub success: bool,
    /// Address of the contract created by the transaction.
    pub contract_address: Option<Address>,
    /// Gas consumed.
    pub gas_used: u64,
}

/// Confirmed result of a mutating step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    /// Hash of the transaction.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Execution status.
    pub success: bool,
}

/// Asynchronous access to an EVM chain.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Chain ID reported by the node.
    async fn chain_id(&self) -> Result<u64, DeployError>;

    /// Latest block number.
    async fn block_number(&self) -> Result<u64, DeployError>;

    /// Sign and broadcast a transaction as `request.from`, returning its hash.
    async fn send_transaction(&self, request: TxRequest) -> Result<TxHash, DeployError>;

    /// Execute `request` against the latest state without broadcasting it.
    async fn call(&self, request: TxRequest) -> Result<Bytes, DeployError>;

    /// Receipt of a transaction, or `None` while it is pending.
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, DeployError>;

    /// Runtime bytecode at `address`; empty when nothing is deployed.
    async fn code_at(&self, address: Address) -> Result<Bytes, DeployError>;

    /// Gas price the transaction would pay, in wei.
    async fn gas_price(&self) -> Result<u128, DeployError>;

    /// Gas needed to execute `request`.
    async fn estimate_gas(&self, request: TxRequest) -> Result<u64, DeployError>;
}
