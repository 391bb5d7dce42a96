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

use anyhow::Result;
use clap::Args;

use super::display_for;
use crate::{
    config::{Access, GlobalConfig},
    display::format_eth,
};

/// Estimate the fee of deploying a contract at the current gas price
#[derive(Args, Clone, Debug)]
pub struct EstimateCmd {
    /// Artifact name, or `source:name` when ambiguous
    pub artifact: String,
}

impl EstimateCmd {
    /// Run the estimate command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let deployer = global_config.deployer(Access::Write, false).await?;
        let display = display_for(&deployer, &global_config.network);
        let estimate = deployer.estimate_deploy_fee(&self.artifact).await?;

        display.header(&format!("Deployment cost of {}", self.artifact));
        display.item("Gas", estimate.gas);
        display.item("Gas price", format!("{} wei", estimate.gas_price));
        display.item("Fee", format!("{} ETH", format_eth(estimate.fee_wei)));
        display.note("Constructor arguments were estimated with zero values");
        Ok(())
    }
}
