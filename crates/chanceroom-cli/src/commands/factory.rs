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

use alloy::primitives::Address;
use anyhow::Result;
use clap::{Args, Subcommand};

use super::{display_for, show_registration};
use crate::config::{Access, GlobalConfig};

/// Commands operating on the ChanceRoomFactory
#[derive(Subcommand, Clone, Debug)]
pub enum FactoryCommands {
    /// Deploy the factory logic behind an ERC-1967 proxy
    Deploy(FactoryDeploy),
    /// Register a room implementation
    #[command(name = "add-impl")]
    AddImpl(FactoryAddImpl),
    /// Register a ticket template
    #[command(name = "add-template")]
    AddTemplate(FactoryAddTemplate),
    /// List registered implementation and template names
    Names(FactoryNames),
}

impl FactoryCommands {
    /// Run the command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        match self {
            Self::Deploy(cmd) => cmd.run(global_config).await,
            Self::AddImpl(cmd) => cmd.run(global_config).await,
            Self::AddTemplate(cmd) => cmd.run(global_config).await,
            Self::Names(cmd) => cmd.run(global_config).await,
        }
    }
}

/// Deploy a new factory
#[derive(Args, Clone, Debug)]
pub struct FactoryDeploy {}

impl FactoryDeploy {
    /// Run the deploy command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let mut deployer = global_config.deployer(Access::Write, false).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header("Deploying ChanceRoomFactory");

        let deployment = deployer.deploy_factory().await?;
        display.address("Implementation", deployment.implementation.contract.address);
        display.outcome("Deployed", &deployment.implementation.contract.outcome);
        display.verification(&deployment.implementation.verification);
        display.address("Proxy", deployment.proxy.address);
        display.outcome("Deployed", &deployment.proxy.outcome);

        display.success(&format!("Factory deployed at {:#x}", deployment.proxy.address));
        display.note("Set factory_address for this network in chanceroom.toml to use it");
        Ok(deployment.implementation.ensure_verified()?)
    }
}

/// Register an implementation contract on the factory
#[derive(Args, Clone, Debug)]
pub struct FactoryAddImpl {
    /// Address of the deployed ChanceRoom implementation
    pub address: Address,
}

impl FactoryAddImpl {
    /// Run the add-impl command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let deployer = global_config.deployer(Access::Write, true).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header("Registering implementation");
        display.address("Implementation", self.address);

        let registration = deployer.add_implementation(self.address).await?;
        show_registration(&display, "Implementations", &registration);
        display.success("Implementation registered");
        Ok(())
    }
}

/// Register a template contract on the factory
#[derive(Args, Clone, Debug)]
pub struct FactoryAddTemplate {
    /// Address of the deployed ticket template
    pub address: Address,
}

impl FactoryAddTemplate {
    /// Run the add-template command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let deployer = global_config.deployer(Access::Write, true).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header("Registering template");
        display.address("Template", self.address);

        let registration = deployer.add_template(self.address).await?;
        show_registration(&display, "Templates", &registration);
        display.success("Template registered");
        Ok(())
    }
}

/// Show what the factory has registered
#[derive(Args, Clone, Debug)]
pub struct FactoryNames {}

impl FactoryNames {
    /// Run the names command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let deployer = global_config.deployer(Access::Read, true).await?;
        let display = display_for(&deployer, &global_config.network);
        let (implementations, templates) = deployer.names().await?;

        display.header("ChanceRoomFactory");
        display.address("Factory", deployer.factory()?.address());
        display.names("Implementations", &implementations);
        display.names("Templates", &templates);
        Ok(())
    }
}
