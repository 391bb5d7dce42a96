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

//! Cloning and initializing a room.
//!
//! The steps must happen in a fixed order, which the types below enforce:
//!
//! 1. [RoomFlow::predict] asks the factory where the clone will live.
//! 2. [PredictedRoom::approve] approves the prize NFT to that address.
//! 3. [ApprovedRoom::clone_room] creates the clone and checks its code exists.
//! 4. [ClonedRoom::initialize] configures the room and reads its state back.

use alloy::primitives::{hex, keccak256, Address, Bytes, B256, U256};

use crate::{
    contracts::{FactoryService, IChanceRoom, NftService, RoomLayout, RoomService},
    errors::DeployError,
    rpc::TxOutcome,
    transactor::Transactor,
};

const CLONE_PREFIX: [u8; 20] = hex!("3d602d80600a3d3981f3363d3d373d3d3d363d73");
const CLONE_SUFFIX: [u8; 15] = hex!("5af43d82803e903d91602b57fd5bf3");

/// EIP-1167 minimal proxy creation code delegating to `implementation`.
pub fn clone_init_code(implementation: Address) -> Bytes {
    [CLONE_PREFIX.as_slice(), implementation.as_slice(), CLONE_SUFFIX.as_slice()].concat().into()
}

/// CREATE2 address of a minimal proxy of `implementation` created by `deployer` with `salt`.
pub fn predict_clone_address(deployer: Address, implementation: Address, salt: B256) -> Address {
    deployer.create2(salt, keccak256(clone_init_code(implementation)))
}

/// Arguments of a room's `initialize` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomParams {
    /// Registered ticket template, e.g. `BlackTicket`.
    pub template_name: String,
    /// NFT put up as the prize.
    pub nft_address: Address,
    /// Token ID of the prize.
    pub nft_id: U256,
    /// Number of tickets on sale.
    pub maximum_ticket: U256,
    /// Price per ticket in wei.
    pub ticket_price: U256,
    /// How long the room stays open.
    pub holding_time: U256,
}

impl RoomParams {
    /// The `initialize` call for these parameters.
    pub fn initialize_call(&self) -> IChanceRoom::initializeCall {
        IChanceRoom::initializeCall {
            tempName: self.template_name.clone(),
            nftAddr: self.nft_address,
            nftId: self.nft_id,
            maximumTicket: self.maximum_ticket,
            ticketPrice: self.ticket_price,
            holdingTime: self.holding_time,
        }
    }
}

/// Transactions sent while setting up a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSteps {
    /// NFT approval to the predicted address.
    pub approve: TxOutcome,
    /// Factory clone.
    pub clone: TxOutcome,
    /// Room initialization.
    pub initialize: TxOutcome,
}

/// Entry point of the clone flow.
pub struct RoomFlow {
    factory: FactoryService,
    tx: Transactor,
    owner: Address,
    params: RoomParams,
}

impl RoomFlow {
    /// Flow creating a room owned by `owner` with the given parameters.
    pub fn new(factory: FactoryService, tx: Transactor, owner: Address, params: RoomParams) -> Self {
        Self { factory, tx, owner, params }
    }

    /// Ask the factory where a clone of `implementation_name` with `salt` will be created.
    pub async fn predict(
        self,
        implementation_name: &str,
        salt: B256,
    ) -> Result<PredictedRoom, DeployError> {
        let address = self.factory.determine_room_address(implementation_name, salt).await?;
        if address == Address::ZERO {
            return Err(DeployError::revert(format!(
                "factory has no implementation named {implementation_name}"
            )));
        }
        tracing::info!(room = %address, implementation = implementation_name, "predicted room address");
        Ok(PredictedRoom {
            flow: self,
            implementation_name: implementation_name.to_string(),
            salt,
            address,
        })
    }
}

/// A room whose address is known but which does not exist yet.
pub struct PredictedRoom {
    flow: RoomFlow,
    implementation_name: String,
    salt: B256,
    address: Address,
}

impl PredictedRoom {
    /// Address the clone will be created at.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether the factory's prediction equals the local EIP-1167 derivation.
    pub fn matches_local_prediction(&self, implementation: Address) -> bool {
        predict_clone_address(self.flow.factory.address(), implementation, self.salt)
            == self.address
    }

    /// Approve the prize NFT to the predicted room address.
    pub async fn approve(self) -> Result<ApprovedRoom, DeployError> {
        let nft = NftService::new(self.flow.params.nft_address, self.flow.tx.clone());
        let token_id = self.flow.params.nft_id;
        let approve = nft.approve(self.flow.owner, self.address, token_id).await?;
        let approved = nft.get_approved(token_id).await?;
        if approved != self.address {
            return Err(DeployError::revert(format!(
                "NFT {token_id} is approved to {approved:#x}, not to the predicted room {:#x}",
                self.address
            )));
        }
        Ok(ApprovedRoom { predicted: self, approve })
    }
}

/// A room whose prize is approved but which is not cloned yet.
pub struct ApprovedRoom {
    predicted: PredictedRoom,
    approve: TxOutcome,
}

impl ApprovedRoom {
    /// Address the clone will be created at.
    pub fn address(&self) -> Address {
        self.predicted.address
    }

    /// Clone the implementation and check the clone exists at the predicted address.
    pub async fn clone_room(self) -> Result<ClonedRoom, DeployError> {
        let PredictedRoom { flow, implementation_name, salt, address } = self.predicted;
        let clone = flow.factory.new_room(flow.owner, &implementation_name, salt).await?;
        let room = RoomService::new(address, flow.tx.clone());
        room.ensure_deployed().await?;
        tracing::info!(room = %address, tx_hash = %clone.transaction_hash, "cloned room");
        Ok(ClonedRoom { room, owner: flow.owner, params: flow.params, approve: self.approve, clone })
    }
}

/// A cloned room waiting for initialization.
pub struct ClonedRoom {
    room: RoomService,
    owner: Address,
    params: RoomParams,
    approve: TxOutcome,
    clone: TxOutcome,
}

impl ClonedRoom {
    /// Address of the clone.
    pub fn address(&self) -> Address {
        self.room.address()
    }

    /// Initialize the room and read its state back.
    pub async fn initialize(self) -> Result<InitializedRoom, DeployError> {
        let initialize = self.room.initialize(self.owner, &self.params).await?;
        let layout = self.room.layout().await?;
        if !layout.matches(&self.params) {
            tracing::warn!(room = %self.room.address(), ?layout, "room state differs from initialize arguments");
        }
        Ok(InitializedRoom {
            address: self.room.address(),
            layout,
            steps: RoomSteps { approve: self.approve, clone: self.clone, initialize },
        })
    }
}

/// A room ready to sell tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializedRoom {
    /// Address of the room.
    pub address: Address,
    /// Room state read back after initialization.
    pub layout: RoomLayout,
    /// Confirmed transactions of the flow.
    pub steps: RoomSteps,
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const FACTORY: Address = address!("0xfafafafafafafafafafafafafafafafafafafafa");
    const SANG: Address = address!("0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a");

    #[test]
    fn init_code_embeds_implementation() {
        let code = clone_init_code(SANG);
        assert_eq!(code.len(), 55);
        assert_eq!(&code[20..40], SANG.as_slice());
        assert_eq!(code[..2], [0x3d, 0x60]);
    }

    #[test]
    fn prediction_is_pure_and_salt_sensitive() {
        let a = predict_clone_address(FACTORY, SANG, B256::ZERO);
        assert_eq!(a, predict_clone_address(FACTORY, SANG, B256::ZERO));
        assert_ne!(a, Address::ZERO);
        assert_ne!(a, predict_clone_address(FACTORY, SANG, B256::with_last_byte(1)));
        assert_ne!(a, predict_clone_address(FACTORY, Address::repeat_byte(0x5b), B256::ZERO));
        assert_ne!(a, predict_clone_address(Address::repeat_byte(0xfb), SANG, B256::ZERO));
    }

    #[test]
    fn initialize_call_carries_params() {
        let params = RoomParams {
            template_name: "BlackTicket".into(),
            nft_address: Address::repeat_byte(0x0e),
            nft_id: U256::ZERO,
            maximum_ticket: U256::from(6),
            ticket_price: U256::from(100_000_000_000_000_000u64),
            holding_time: U256::from(1_800_000),
        };
        let call = params.initialize_call();
        assert_eq!(call.tempName, "BlackTicket");
        assert_eq!(call.maximumTicket, U256::from(6));
        assert_eq!(call.holdingTime, U256::from(1_800_000));
    }
}
