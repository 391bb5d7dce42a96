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

use alloy::primitives::{Address, U256};

use super::IChanceRoom;
use crate::{clone::RoomParams, errors::DeployError, rpc::TxOutcome, transactor::Transactor};

/// State of an initialized room, as reported by `layout()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLayout {
    /// Ticket template the room sells.
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

impl From<IChanceRoom::Layout> for RoomLayout {
    fn from(layout: IChanceRoom::Layout) -> Self {
        Self {
            template_name: layout.tempName,
            nft_address: layout.nftAddr,
            nft_id: layout.nftId,
            maximum_ticket: layout.maximumTicket,
            ticket_price: layout.ticketPrice,
            holding_time: layout.holdingTime,
        }
    }
}

impl RoomLayout {
    /// Whether the room was initialized with exactly these parameters.
    pub fn matches(&self, params: &RoomParams) -> bool {
        self.template_name == params.template_name
            && self.nft_address == params.nft_address
            && self.nft_id == params.nft_id
            && self.maximum_ticket == params.maximum_ticket
            && self.ticket_price == params.ticket_price
            && self.holding_time == params.holding_time
    }
}

/// Handle on a cloned room.
#[derive(Clone)]
pub struct RoomService {
    address: Address,
    tx: Transactor,
}

impl RoomService {
    /// Creates a new room handle.
    pub fn new(address: Address, tx: Transactor) -> Self {
        Self { address, tx }
    }

    /// Address of the room.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Fail with [DeployError::CloneNotDeployed] unless code exists at the room address.
    pub async fn ensure_deployed(&self) -> Result<(), DeployError> {
        let code = self.tx.rpc().code_at(self.address).await?;
        if code.is_empty() {
            return Err(DeployError::CloneNotDeployed(self.address));
        }
        Ok(())
    }

    /// Configure the room. The room owner must have approved the prize NFT to the room.
    pub async fn initialize(
        &self,
        from: Address,
        params: &RoomParams,
    ) -> Result<TxOutcome, DeployError> {
        self.ensure_deployed().await?;
        tracing::info!(room = %self.address, template = %params.template_name, "initializing room");
        self.tx.transact(from, self.address, &params.initialize_call()).await
    }

    /// Current room state.
    pub async fn layout(&self) -> Result<RoomLayout, DeployError> {
        let layout = self.tx.call(self.address, &IChanceRoom::layoutCall {}).await?;
        Ok(layout.into())
    }

    /// Factory the room was cloned from.
    pub async fn factory(&self) -> Result<Address, DeployError> {
        self.tx.call(self.address, &IChanceRoom::ChanceRoomFactoryCall {}).await
    }
}
