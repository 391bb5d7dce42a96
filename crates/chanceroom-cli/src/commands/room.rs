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

use alloy::primitives::{utils::parse_ether, Address, B256, U256};
use anyhow::{Context, Result};
use chanceroom::RoomParams;
use clap::{Args, Subcommand};

use super::display_for;
use crate::{
    config::{Access, GlobalConfig},
    display::format_eth,
};

/// Commands for ChanceRoom clones
#[derive(Subcommand, Clone, Debug)]
pub enum RoomCommands {
    /// Clone an implementation and initialize the new room
    New(RoomNew),
    /// List rooms created by the factory
    List(RoomList),
    /// Show the state of a room
    Show(RoomShow),
}

impl RoomCommands {
    /// Run the command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        match self {
            Self::New(cmd) => cmd.run(global_config).await,
            Self::List(cmd) => cmd.run(global_config).await,
            Self::Show(cmd) => cmd.run(global_config).await,
        }
    }
}

/// Create a room: approve the prize to the predicted address, clone, then initialize
#[derive(Args, Clone, Debug)]
pub struct RoomNew {
    /// Registered implementation to clone
    #[clap(long, default_value = "ChanceRoom_Sang")]
    pub implementation: String,

    /// CREATE2 salt of the clone
    #[clap(long, default_value_t = B256::ZERO)]
    pub salt: B256,

    /// Registered ticket template the room sells
    #[clap(long, default_value = "BlackTicket")]
    pub template: String,

    /// NFT contract of the prize
    #[clap(long)]
    pub nft_address: Address,

    /// Token ID of the prize
    #[clap(long, default_value_t = U256::ZERO)]
    pub nft_id: U256,

    /// Number of tickets on sale
    #[clap(long, default_value_t = U256::from(6))]
    pub maximum_ticket: U256,

    /// Ticket price in ether
    #[clap(long, value_parser = parse_ether, default_value = "0.1")]
    pub ticket_price: U256,

    /// How long the room stays open
    #[clap(long, default_value_t = U256::from(1_800_000))]
    pub holding_time: U256,
}

impl RoomNew {
    /// Run the new command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let deployer = global_config.deployer(Access::Write, true).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header("Creating ChanceRoom");
        display.address("Owner", deployer.accounts().room_owner()?);

        let params = RoomParams {
            template_name: self.template.clone(),
            nft_address: self.nft_address,
            nft_id: self.nft_id,
            maximum_ticket: self.maximum_ticket,
            ticket_price: self.ticket_price,
            holding_time: self.holding_time,
        };
        let room = deployer
            .new_room(&self.implementation, self.salt, params.clone())
            .await
            .with_context(|| format!("failed to create a {} room", self.implementation))?;

        display.address("Room", room.address);
        display.outcome("Approve", &room.steps.approve);
        display.outcome("Clone", &room.steps.clone);
        display.outcome("Initialize", &room.steps.initialize);
        if room.layout.matches(&params) {
            display.success(&format!("Room ready at {:#x}", room.address));
        } else {
            display.warning("Room state differs from the requested parameters");
        }
        Ok(())
    }
}

/// List the factory's rooms with their token URIs
#[derive(Args, Clone, Debug)]
pub struct RoomList {}

impl RoomList {
    /// Run the list command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let deployer = global_config.deployer(Access::Read, true).await?;
        let display = display_for(&deployer, &global_config.network);
        let rooms = deployer.rooms().await?;

        display.header(&format!("ChanceRooms ({})", rooms.len()));
        for room in &rooms {
            display.address("Room", room.address);
            display.item("Token URI", &room.token_uri);
        }
        if rooms.is_empty() {
            display.note("The factory has not created any rooms yet");
        }
        Ok(())
    }
}

/// Read a room's configuration from chain
#[derive(Args, Clone, Debug)]
pub struct RoomShow {
    /// Address of the room
    pub address: Address,
}

impl RoomShow {
    /// Run the show command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let deployer = global_config.deployer(Access::Read, false).await?;
        let display = display_for(&deployer, &global_config.network);
        let room = deployer.room(self.address);
        room.ensure_deployed().await?;
        let (layout, factory) = tokio::try_join!(room.layout(), room.factory())?;

        display.header("ChanceRoom");
        display.address("Room", self.address);
        display.address("Factory", factory);
        display.item("Template", &layout.template_name);
        display.address("Prize NFT", layout.nft_address);
        display.item("Prize token", layout.nft_id);
        display.item("Tickets", layout.maximum_ticket);
        display.item("Ticket price", format!("{} ETH", format_eth(layout.ticket_price)));
        display.item("Holding time", layout.holding_time);
        Ok(())
    }
}
