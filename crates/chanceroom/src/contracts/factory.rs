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

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;

use super::IChanceRoomFactory;
use crate::{errors::DeployError, rpc::TxOutcome, transactor::Transactor};

/// Handle on a deployed ChanceRoomFactory proxy.
#[derive(Clone)]
pub struct FactoryService {
    address: Address,
    tx: Transactor,
}

impl FactoryService {
    /// Creates a new factory handle.
    pub fn new(address: Address, tx: Transactor) -> Self {
        Self { address, tx }
    }

    /// Address of the factory proxy.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Calldata the proxy constructor forwards to the implementation.
    pub fn initialize_calldata() -> Bytes {
        IChanceRoomFactory::initializeCall {}.abi_encode().into()
    }

    /// Register a room implementation. Only the factory owner may do this.
    pub async fn add_implementation(
        &self,
        from: Address,
        implementation: Address,
    ) -> Result<TxOutcome, DeployError> {
        tracing::info!(factory = %self.address, implementation = %implementation, "adding implementation");
        let call = IChanceRoomFactory::addImplementationCall { implAddr: implementation };
        self.tx.transact(from, self.address, &call).await
    }

    /// Register a ticket template. Only the factory owner may do this.
    pub async fn add_template(
        &self,
        from: Address,
        template: Address,
    ) -> Result<TxOutcome, DeployError> {
        tracing::info!(factory = %self.address, template = %template, "adding template");
        let call = IChanceRoomFactory::addTemplateCall { tempAddr: template };
        self.tx.transact(from, self.address, &call).await
    }

    /// Names of the registered implementations.
    pub async fn implementation_names(&self) -> Result<Vec<String>, DeployError> {
        self.tx.call(self.address, &IChanceRoomFactory::implNamesCall {}).await
    }

    /// Names of the registered templates.
    pub async fn template_names(&self) -> Result<Vec<String>, DeployError> {
        self.tx.call(self.address, &IChanceRoomFactory::tempNamesCall {}).await
    }

    /// Address a clone of `implementation_name` with `salt` will be created at.
    pub async fn determine_room_address(
        &self,
        implementation_name: &str,
        salt: B256,
    ) -> Result<Address, DeployError> {
        let call = IChanceRoomFactory::determineChanceRoomAddrCall {
            implName: implementation_name.to_string(),
            salt,
        };
        self.tx.call(self.address, &call).await
    }

    /// Clone an implementation.
    pub async fn new_room(
        &self,
        from: Address,
        implementation_name: &str,
        salt: B256,
    ) -> Result<TxOutcome, DeployError> {
        let call = IChanceRoomFactory::newChanceRoomCall {
            implName: implementation_name.to_string(),
            salt,
        };
        self.tx.transact(from, self.address, &call).await
    }

    /// Rooms cloned by this factory.
    pub async fn rooms(&self) -> Result<Vec<Address>, DeployError> {
        self.tx.call(self.address, &IChanceRoomFactory::getChanceRoomsCall {}).await
    }

    /// Factory token ID at `index` of the enumeration.
    pub async fn token_by_index(&self, index: U256) -> Result<U256, DeployError> {
        self.tx.call(self.address, &IChanceRoomFactory::tokenByIndexCall { index }).await
    }

    /// Metadata URI of a factory token.
    pub async fn token_uri(&self, token_id: U256) -> Result<String, DeployError> {
        self.tx.call(self.address, &IChanceRoomFactory::tokenURICall { tokenId: token_id }).await
    }
}
