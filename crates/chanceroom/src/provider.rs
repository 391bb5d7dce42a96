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

use alloy::{
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    transports::TransportError,
};
use async_trait::async_trait;
use url::Url;

use crate::{
    accounts::Accounts,
    config::NetworkConfig,
    contracts::decode_revert,
    errors::{ConfigError, DeployError},
    rpc::{ChainRpc, TxReceipt, TxRequest},
};

/// [ChainRpc] backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct AlloyRpc {
    provider: DynProvider,
    gas_price: Option<u128>,
}

impl AlloyRpc {
    /// Connect to a network, signing with every key registered in `accounts`.
    pub fn connect(network: &NetworkConfig, accounts: &Accounts) -> Result<Self, DeployError> {
        let wallet = accounts.wallet()?;
        let provider =
            ProviderBuilder::new().wallet(wallet).connect_http(network.rpc_url.clone()).erased();
        tracing::debug!(network = %network.name, chain_id = network.chain_id, "connected provider");
        Ok(Self { provider, gas_price: network.gas_price })
    }

    /// Connect without any signer, for read-only commands.
    pub fn read_only(rpc_url: Url) -> Self {
        Self { provider: ProviderBuilder::new().connect_http(rpc_url).erased(), gas_price: None }
    }

    /// Use a fixed gas price for every transaction instead of the node's estimate.
    pub fn with_gas_price(self, gas_price: Option<u128>) -> Self {
        Self { gas_price, ..self }
    }

    /// Fail with [ConfigError::ChainMismatch] if the node serves a different chain.
    pub async fn ensure_chain_id(&self, expected: u64) -> Result<(), DeployError> {
        let actual = self.chain_id().await?;
        if actual != expected {
            return Err(ConfigError::ChainMismatch { expected, actual }.into());
        }
        Ok(())
    }

    fn transaction_request(&self, request: TxRequest) -> TransactionRequest {
        let tx = TransactionRequest::default().with_from(request.from).with_value(request.value);
        let tx = match request.to {
            Some(to) => tx.with_to(to).with_input(request.input),
            None => tx.with_deploy_code(request.input),
        };
        match self.gas_price {
            Some(price) => tx.with_gas_price(price),
            None => tx,
        }
    }
}

/// Map a transport error, turning revert data into [DeployError::Revert].
pub(crate) fn rpc_error(err: TransportError) -> DeployError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            return DeployError::revert(decode_revert(&data));
        }
        if payload.message.contains("revert") {
            return DeployError::revert(payload.message.to_string());
        }
    }
    DeployError::Rpc(err.to_string())
}

#[async_trait]
impl ChainRpc for AlloyRpc {
    async fn chain_id(&self) -> Result<u64, DeployError> {
        self.provider.get_chain_id().await.map_err(rpc_error)
    }

    async fn block_number(&self) -> Result<u64, DeployError> {
        self.provider.get_block_number().await.map_err(rpc_error)
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<TxHash, DeployError> {
        let tx = self.transaction_request(request);
        let pending = self.provider.send_transaction(tx).await.map_err(rpc_error)?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, "broadcast transaction");
        Ok(tx_hash)
    }

    async fn call(&self, request: TxRequest) -> Result<Bytes, DeployError> {
        let tx = self.transaction_request(request);
        self.provider.call(tx).await.map_err(rpc_error)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, DeployError> {
        let receipt = self.provider.get_transaction_receipt(hash).await.map_err(rpc_error)?;
        Ok(receipt.map(|r| TxReceipt {
            transaction_hash: r.transaction_hash(),
            block_number: r.block_number(),
            success: r.status(),
            contract_address: r.contract_address(),
            gas_used: r.gas_used(),
        }))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, DeployError> {
        self.provider.get_code_at(address).await.map_err(rpc_error)
    }

    async fn gas_price(&self) -> Result<u128, DeployError> {
        match self.gas_price {
            Some(price) => Ok(price),
            None => self.provider.get_gas_price().await.map_err(rpc_error),
        }
    }

    async fn estimate_gas(&self, request: TxRequest) -> Result<u64, DeployError> {
        let tx = self.transaction_request(request);
        self.provider.estimate_gas(tx).await.map_err(rpc_error)
    }
}
