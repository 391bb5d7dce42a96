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
use anyhow::{Context, Result};
use chanceroom::VerificationStatus;
use clap::Args;

use super::display_for;
use crate::config::{Access, GlobalConfig};

/// Verify the source of a deployed contract on the block explorer
#[derive(Args, Clone, Debug)]
pub struct VerifyCmd {
    /// Address of the deployed contract
    pub address: Address,

    /// Artifact name, or `source:name` when ambiguous
    pub artifact: String,

    /// Constructor arguments, in the order the constructor declares them
    pub args: Vec<String>,
}

impl VerifyCmd {
    /// Run the verify command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let artifact = global_config.artifact_store().load(&self.artifact)?;
        let args = artifact
            .parse_constructor_args(&self.args)
            .with_context(|| format!("invalid constructor arguments for {}", self.artifact))?;

        let deployer = global_config.deployer(Access::Read, false).await?;
        let display = display_for(&deployer, &global_config.network);
        display.header(&format!("Verifying {}", artifact.contract_name));
        display.address("Contract", self.address);

        let status = deployer.verify(self.address, &self.artifact, &args).await?;
        match status {
            VerificationStatus::Verified => display.success("Source verified"),
            VerificationStatus::AlreadyVerified => display.success("Source was already verified"),
        }
        Ok(())
    }
}
