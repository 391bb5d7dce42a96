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
use clap::{Args, Subcommand};

use super::display_for;
use crate::config::{Access, GlobalConfig};

/// Commands for room implementation contracts
#[derive(Subcommand, Clone, Debug)]
pub enum ImplementationCommands {
    /// Deploy a room implementation bound to the configured factory
    Deploy(ImplementationDeploy),
}

impl ImplementationCommands {
    /// Run the command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        match self {
            Self::Deploy(cmd) => cmd.run(global_config).await,
        }
    }
}

/// Deploy a `ChanceRoom_*` implementation
#[derive(Args, Clone, Debug)]
pub struct ImplementationDeploy {
    /// Artifact name of the implementation
    #[clap(default_value = "ChanceRoom_Sang")]
    pub name: String,

    /// Register the implementation on the factory after deploying it
    #[clap(long)]
    pub register: bool,
}

impl ImplementationDeploy {
    /// Run the deploy command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let mut deployer = global_config.deployer(Access::Write, true).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header(&format!("Deploying {}", self.name));

        let deployment = deployer.deploy_implementation(&self.name).await?;
        display.address("Implementation", deployment.contract.address);
        display.outcome("Deployed", &deployment.contract.outcome);
        display.verification(&deployment.verification);

        if self.register {
            let registration = deployer.add_implementation(deployment.contract.address).await?;
            super::show_registration(&display, "Implementations", &registration);
        } else {
            display.note(&format!(
                "Register it with: chanceroom factory add-impl {:#x}",
                deployment.contract.address
            ));
        }
        display.success(&format!("{} deployed", deployment.contract_name));
        Ok(deployment.ensure_verified()?)
    }
}
