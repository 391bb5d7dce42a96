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

use std::path::Path;

use anyhow::Result;
use chanceroom::{deployments::supported_chain_ids, Accounts, ConfigError, NamedChain};
use clap::Args;

use crate::{
    config::{GlobalConfig, DEFAULT_CONFIG_FILE},
    display::{obscure_url, DisplayManager},
};

/// Show the resolved configuration without contacting the network
#[derive(Args, Clone, Debug)]
pub struct ConfigCmd {}

impl ConfigCmd {
    /// Run the config command
    pub async fn run(&self, global_config: &GlobalConfig) -> Result<()> {
        let resolved = global_config.resolve()?;
        let network = &resolved.network;
        let display = DisplayManager::with_network(&network.name);

        display.header("Network");
        let chain = NamedChain::try_from(network.chain_id)
            .map(|c| c.to_string())
            .unwrap_or_else(|_| "custom".to_string());
        display.item("Chain ID", format!("{} ({chain})", network.chain_id));
        display.item("RPC URL", obscure_url(&network.rpc_url));
        match network.gas_price {
            Some(price) => display.item("Gas price", format!("{price} wei (fixed)")),
            None => display.item("Gas price", "from node"),
        }
        match network.factory_address() {
            Ok(address) => display.address("Factory", address),
            Err(ConfigError::UnsupportedChain(_)) => {
                display.item("Factory", "none (factory commands unavailable)")
            }
            Err(err) => return Err(err.into()),
        }
        match &network.explorer_api_url {
            Some(url) => display.item("Explorer API", url),
            None => display.item("Explorer API", "none"),
        }

        display.header("Factories");
        for chain_id in supported_chain_ids() {
            let name = resolved.config.network_by_chain_id(chain_id)?.name;
            let factory = resolved.config.factory_address(chain_id)?;
            display.address(&format!("{name} ({chain_id})"), factory);
        }

        display.header("Accounts");
        match Accounts::from_secrets(&resolved.secrets) {
            Ok(accounts) => {
                for (role, address) in accounts.iter() {
                    display.address(&role.to_string(), *address);
                }
            }
            Err(ConfigError::Missing(what)) => display.item("Status", format!("no {what}")),
            Err(err) => return Err(err.into()),
        }
        let api_key = if resolved.secrets.explorer_api_key.is_some() { "set" } else { "not set" };
        display.item("Explorer key", api_key);

        let policy = resolved.config.confirmation_policy();
        let timeout = global_config.tx_timeout.unwrap_or(policy.timeout);
        display.header("Confirmation");
        display.item("Timeout", format!("{}s", timeout.as_secs()));
        display.item("Confirmations", policy.confirmations);
        display.item("Poll delay", format!("{:?} .. {:?}", policy.initial_delay, policy.max_delay));

        display.header("Files");
        let config_path =
            global_config.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        display.item("Config", config_path.display());
        display.item("Artifacts", global_config.artifacts.display());
        display.item("Ledger", global_config.ledger_path(network.chain_id).display());
        Ok(())
    }
}
