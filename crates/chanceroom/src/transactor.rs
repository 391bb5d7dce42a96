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

use std::sync::Arc;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
    sol_types::SolCall,
};
use tokio_util::sync::CancellationToken;

use crate::{
    artifacts::ContractArtifact,
    confirm::{wait_for_receipt, ConfirmationPolicy},
    errors::DeployError,
    rpc::{ChainRpc, TxOutcome, TxReceipt, TxRequest},
};

/// A contract created by a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// Address of the new contract.
    pub address: Address,
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
    /// Confirmed creation transaction.
    pub outcome: TxOutcome,
}

/// Sends transactions and waits for them to be confirmed.
#[derive(Clone)]
pub struct Transactor {
    rpc: Arc<dyn ChainRpc>,
    policy: ConfirmationPolicy,
    cancel: CancellationToken,
}

impl Transactor {
    /// Create a transactor with the default confirmation policy.
    pub fn new(rpc: Arc<dyn ChainRpc>) -> Self {
        Self { rpc, policy: ConfirmationPolicy::default(), cancel: CancellationToken::new() }
    }

    /// Set the confirmation policy.
    pub fn with_policy(self, policy: ConfirmationPolicy) -> Self {
        Self { policy, ..self }
    }

    /// Abort pending waits when `cancel` fires.
    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        Self { cancel, ..self }
    }

    /// The underlying chain binding.
    pub fn rpc(&self) -> &dyn ChainRpc {
        self.rpc.as_ref()
    }

    /// The confirmation policy in use.
    pub fn policy(&self) -> &ConfirmationPolicy {
        &self.policy
    }

    async fn send_confirmed(&self, request: TxRequest) -> Result<TxReceipt, DeployError> {
        let tx_hash = self.rpc.send_transaction(request.clone()).await?;
        tracing::debug!(tx_hash = %tx_hash, "waiting for confirmation");
        let receipt = wait_for_receipt(self.rpc(), tx_hash, &self.policy, &self.cancel).await?;
        if receipt.success {
            return Ok(receipt);
        }

        // Replay the transaction as a call to recover the revert reason.
        let reason = match self.rpc.call(request).await {
            Err(DeployError::Revert { reason, .. }) => reason,
            Err(err) => format!("transaction failed; replay errored: {err}"),
            Ok(_) => "transaction failed without a revert reason".to_string(),
        };
        Err(DeployError::Revert { tx_hash: Some(tx_hash), reason })
    }

    /// Send a transaction and wait for it to be confirmed.
    pub async fn send(&self, request: TxRequest) -> Result<TxOutcome, DeployError> {
        let receipt = self.send_confirmed(request).await?;
        outcome(&receipt)
    }

    /// Deploy raw init code.
    pub async fn deploy_code(
        &self,
        from: Address,
        init_code: Bytes,
        constructor_args: Bytes,
    ) -> Result<DeployedContract, DeployError> {
        let receipt = self.send_confirmed(TxRequest::create(from, init_code)).await?;
        let address = receipt.contract_address.ok_or_else(|| {
            DeployError::Rpc(format!(
                "receipt for {:#x} has no contract address",
                receipt.transaction_hash
            ))
        })?;
        Ok(DeployedContract { address, constructor_args, outcome: outcome(&receipt)? })
    }

    /// Deploy a compiled contract with constructor arguments.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        args: &[DynSolValue],
        from: Address,
    ) -> Result<DeployedContract, DeployError> {
        let constructor_args = artifact.encode_constructor_args(args)?;
        let init_code = artifact.deploy_code(args)?;
        let deployed = self.deploy_code(from, init_code, constructor_args).await?;
        tracing::info!(
            contract = %artifact.contract_name,
            address = %deployed.address,
            tx_hash = %deployed.outcome.transaction_hash,
            "deployed contract"
        );
        Ok(deployed)
    }

    /// Call a view function.
    pub async fn call<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return, DeployError> {
        let data = self.rpc.call(TxRequest::call(Address::ZERO, to, call.abi_encode())).await?;
        C::abi_decode_returns(&data).map_err(|err| {
            DeployError::Abi(format!("failed to decode {} result from {to:#x}: {err}", C::SIGNATURE))
        })
    }

    /// Send a state changing call as `from` and wait for it to be confirmed.
    pub async fn transact<C: SolCall>(
        &self,
        from: Address,
        to: Address,
        call: &C,
    ) -> Result<TxOutcome, DeployError> {
        tracing::debug!(from = %from, to = %to, function = C::SIGNATURE, "sending transaction");
        self.send(TxRequest::call(from, to, call.abi_encode())).await
    }
}

fn outcome(receipt: &TxReceipt) -> Result<TxOutcome, DeployError> {
    let block_number = receipt.block_number.ok_or_else(|| {
        DeployError::Rpc(format!("receipt for {:#x} has no block number", receipt.transaction_hash))
    })?;
    Ok(TxOutcome {
        transaction_hash: receipt.transaction_hash,
        block_number,
        success: receipt.success,
    })
}
