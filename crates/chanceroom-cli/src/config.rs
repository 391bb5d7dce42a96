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

//! Common configuration options for every command of the ChanceRoom CLI.

use std::{
    num::ParseIntError,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use chanceroom::{
    config::{Config, NetworkConfig, Secrets},
    Accounts, AlloyRpc, ArtifactStore, ConfigError, Deployer, DeploymentLedger, EtherscanVerifier,
    Transactor,
};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "chanceroom.toml";

/// What a command needs from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only view calls; keys are optional.
    Read,
    /// Sends transactions; the deployer key is required.
    Write,
}

/// Configuration after merging presets, the config file, secrets and flags.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Contents of the config file, or the defaults.
    pub config: Config,
    /// Selected network with flag overrides applied.
    pub network: NetworkConfig,
    /// Keys from the secrets file, environment and flags.
    pub secrets: Secrets,
}

/// Common configuration options for all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalConfig {
    /// Network to use: a preset (eth, polygon, polygon-mumbai, localhost) or a network from the
    /// config file.
    #[clap(long, env = "CHANCEROOM_NETWORK", global = true, default_value = "localhost")]
    pub network: String,

    /// JSON-RPC endpoint, overriding the network's.
    #[clap(long, env = "CHANCEROOM_RPC_URL", global = true)]
    pub rpc_url: Option<Url>,

    /// Path of the config file. Must exist when given; otherwise `chanceroom.toml` is read if
    /// present.
    #[clap(long, env = "CHANCEROOM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Path of the secrets file.
    #[clap(long, env = "CHANCEROOM_SECRETS", global = true)]
    pub secrets: Option<PathBuf>,

    /// Hardhat artifacts or Foundry out directory.
    #[clap(long, env = "CHANCEROOM_ARTIFACTS", global = true, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Directory deployments are recorded in, one JSON file per chain.
    #[clap(long, env = "CHANCEROOM_LEDGER_DIR", global = true, default_value = "deployments")]
    pub ledger_dir: PathBuf,

    /// Ethereum transaction timeout in seconds.
    #[clap(long, env = "TX_TIMEOUT", global = true, value_parser = |arg: &str| -> Result<Duration, ParseIntError> {Ok(Duration::from_secs(arg.parse()?))})]
    pub tx_timeout: Option<Duration>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, env = "LOG_LEVEL", global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Deployer private key
    #[clap(long, env = "CHANCEROOM_PRIVATE_KEY", global = true, hide_env_values = true)]
    pub private_key: Option<String>,

    /// Room owner private key; defaults to the deployer
    #[clap(long, env = "CHANCEROOM_ROOM_OWNER_KEY", global = true, hide_env_values = true)]
    pub room_owner_key: Option<String>,

    /// Block explorer API key used for source verification
    #[clap(long, env = "EXPLORER_API_KEY", global = true, hide_env_values = true)]
    pub explorer_api_key: Option<String>,

    /// Cancelled on Ctrl-C to abort pending waits.
    #[clap(skip)]
    pub cancel: CancellationToken,
}

impl GlobalConfig {
    /// Merge presets, config file, secrets and flags. Makes no network requests.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(DEFAULT_CONFIG_FILE)?,
        };
        let mut network = config.network(&self.network)?;
        if let Some(rpc_url) = &self.rpc_url {
            network.rpc_url = rpc_url.clone();
        }

        let mut secrets = match &self.secrets {
            Some(path) => Secrets::load(path)?,
            None => Secrets::default(),
        }
        .with_env();
        if let Some(key) = &self.private_key {
            secrets.private_key = Some(key.clone());
        }
        if let Some(key) = &self.room_owner_key {
            secrets.room_owner_key = Some(key.clone());
        }
        if let Some(key) = &self.explorer_api_key {
            secrets.explorer_api_key = Some(key.clone());
        }
        Ok(ResolvedConfig { config, network, secrets })
    }

    /// Artifact store over [Self::artifacts].
    pub fn artifact_store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.artifacts)
    }

    /// Build a [Deployer] for the selected network.
    ///
    /// With `require_factory` set, networks without a known factory are rejected before any
    /// RPC request is made.
    pub async fn deployer(&self, access: Access, require_factory: bool) -> Result<Deployer> {
        let resolved = self.resolve()?;
        let network = &resolved.network;

        let factory = match network.factory_address() {
            Ok(address) => Some(address),
            Err(err) if require_factory => return Err(err.into()),
            Err(_) => None,
        };

        let (rpc, accounts) = match access {
            Access::Write => {
                let accounts = Accounts::from_secrets(&resolved.secrets)?;
                (AlloyRpc::connect(network, &accounts)?, accounts)
            }
            Access::Read => {
                let accounts = match Accounts::from_secrets(&resolved.secrets) {
                    Ok(accounts) => accounts,
                    Err(ConfigError::Missing(_)) => Accounts::new(),
                    Err(err) => return Err(err.into()),
                };
                let rpc = AlloyRpc::read_only(network.rpc_url.clone())
                    .with_gas_price(network.gas_price);
                (rpc, accounts)
            }
        };
        rpc.ensure_chain_id(network.chain_id)
            .await
            .with_context(|| format!("failed to connect to {}", network.name))?;

        let mut policy = resolved.config.confirmation_policy();
        if let Some(timeout) = self.tx_timeout {
            policy = policy.with_timeout(timeout);
        }
        let tx = Transactor::new(Arc::new(rpc))
            .with_policy(policy)
            .with_cancellation(self.cancel.clone());
        let ledger = DeploymentLedger::open(&self.ledger_dir, network.chain_id)?;

        let mut deployer =
            Deployer::new(network.chain_id, tx, accounts, self.artifact_store(), ledger);
        if let Some(factory) = factory {
            deployer = deployer.with_factory(factory);
        }
        if let Some(verifier) = self.verifier(network, &resolved.secrets)? {
            deployer = deployer.with_verifier(Arc::new(verifier));
        }
        tracing::debug!(network = %network.name, chain_id = network.chain_id, "deployer ready");
        Ok(deployer)
    }

    fn verifier(
        &self,
        network: &NetworkConfig,
        secrets: &Secrets,
    ) -> Result<Option<EtherscanVerifier>> {
        match (&secrets.explorer_api_key, &network.explorer_api_url) {
            (Some(key), Some(_)) => {
                Ok(Some(EtherscanVerifier::for_network(network, Some(key.as_str()))?))
            }
            (Some(_), None) => {
                tracing::warn!(network = %network.name, "network has no explorer API, verification disabled");
                Ok(None)
            }
            (None, _) => Ok(None),
        }
    }

    /// Path of the ledger file for `chain_id`.
    pub fn ledger_path(&self, chain_id: u64) -> PathBuf {
        ledger_file(&self.ledger_dir, chain_id)
    }
}

fn ledger_file(dir: &Path, chain_id: u64) -> PathBuf {
    dir.join(format!("{chain_id}.json"))
}
