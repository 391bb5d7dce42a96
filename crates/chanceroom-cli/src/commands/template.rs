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

use super::{display_for, show_registration};
use crate::config::{Access, GlobalConfig};

/// Commands for ticket template contracts
#[derive(Subcommand, Clone, Debug)]
pub enum TemplateCommands {
    /// Deploy a ticket template and register it on the factory
    Deploy(TemplateDeploy),
}

impl TemplateCommands {
    /// Run the command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        match self {
            Self::Deploy(cmd) => cmd.run(global_config).await,
        }
    }
}

/// Deploy a `Template_*` contract
#[derive(Args, Clone, Debug)]
pub struct TemplateDeploy {
    /// Artifact name of the template
    #[clap(default_value = "Template_BlackTicket")]
    pub name: String,
}

impl TemplateDeploy {
    /// Run the deploy command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let mut deployer = global_config.deployer(Access::Write, true).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header(&format!("Deploying {}", self.name));

        let deployment = deployer.deploy_template(&self.name).await?;
        display.address("Template", deployment.template.contract.address);
        display.outcome("Deployed", &deployment.template.contract.outcome);
        display.verification(&deployment.template.verification);
        show_registration(&display, "Templates", &deployment.registration);

        display.success(&format!("{} deployed and registered", deployment.template.contract_name));
        Ok(deployment.template.ensure_verified()?)
    }
}
