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

use alloy::primitives::{utils::parse_ether, B256, U256};
use anyhow::Result;
use chanceroom::BootstrapPlan;
use clap::Args;

use super::{display_for, show_registration};
use crate::{
    config::{Access, GlobalConfig},
    display::format_eth,
};

/// Deploy and wire up a fresh factory, then open a first room with a test NFT as prize
#[derive(Args, Clone, Debug)]
pub struct BootstrapCmd {
    /// Room implementation artifact
    #[clap(long, default_value = "ChanceRoom_Sang")]
    pub implementation: String,

    /// Ticket template artifact
    #[clap(long, default_value = "Template_BlackTicket")]
    pub template_contract: String,

    /// Name the template registers under
    #[clap(long, default_value = "BlackTicket")]
    pub template: String,

    /// CREATE2 salt of the first room
    #[clap(long, default_value_t = B256::ZERO)]
    pub salt: B256,

    /// Tickets on sale in the first room
    #[clap(long, default_value_t = U256::from(6))]
    pub maximum_ticket: U256,

    /// Ticket price in ether
    #[clap(long, value_parser = parse_ether, default_value = "0.1")]
    pub ticket_price: U256,

    /// Holding time of the first room
    #[clap(long, default_value_t = U256::from(1_800_000))]
    pub holding_time: U256,
}

impl BootstrapCmd {
    fn plan(&self) -> BootstrapPlan {
        BootstrapPlan {
            implementation_name: self.implementation.clone(),
            template_contract: self.template_contract.clone(),
            template_name: self.template.clone(),
            salt: self.salt,
            maximum_ticket: self.maximum_ticket,
            ticket_price: self.ticket_price,
            holding_time: self.holding_time,
        }
    }

    /// Run the bootstrap command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let mut deployer = global_config.deployer(Access::Write, false).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header("Bootstrapping ChanceRoom");

        let report = deployer.bootstrap(&self.plan()).await?;

        display.address("Factory", report.factory.proxy.address);
        display.address("Factory logic", report.factory.implementation.contract.address);
        display.verification(&report.factory.implementation.verification);
        display.address(&report.implementation.contract_name, report.implementation.contract.address);
        display.verification(&report.implementation.verification);
        show_registration(&display, "Implementations", &report.implementation_registration);
        display.address(&report.template.template.contract_name, report.template.template.contract.address);
        display.verification(&report.template.template.verification);
        show_registration(&display, "Templates", &report.template.registration);
        display.address("NFT", report.nft.contract.address);
        display.address("Room", report.room.address);
        display.item("Ticket price", format!("{} ETH", format_eth(report.room.layout.ticket_price)));
        display.address("Room factory", report.room_factory);
        display.item("Rooms", report.rooms.len());
        display.item("First token URI", &report.first_token_uri);

        if let Some(path) = deployer.ledger().path() {
            display.note(&format!("Deployments recorded in {}", path.display()));
        }
        display.success("Bootstrap complete");
        Ok(report.ensure_verified()?)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestArgs {
        #[command(flatten)]
        cmd: BootstrapCmd,
    }

    #[test]
    fn defaults_match_the_library_plan() {
        let args = TestArgs::try_parse_from(["bootstrap"]).unwrap();
        assert_eq!(args.cmd.plan(), BootstrapPlan::default());
    }

    #[test]
    fn ticket_price_is_given_in_ether() {
        let args = TestArgs::try_parse_from(["bootstrap", "--ticket-price", "0.25"]).unwrap();
        assert_eq!(args.cmd.ticket_price, U256::from(250_000_000_000_000_000u64));
    }
}
