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

//! Network presets, the optional `chanceroom.toml` file and the secrets it is paired with.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    accounts::{parse_private_key, Accounts},
    confirm::ConfirmationPolicy,
    deployments::Deployment,
    errors::ConfigError,
};

/// Environment variable holding the deployer private key.
pub const PRIVATE_KEY_ENV: &str = "CHANCEROOM_PRIVATE_KEY";
/// Environment variable holding the room owner private key.
pub const ROOM_OWNER_KEY_ENV: &str = "CHANCEROOM_ROOM_OWNER_KEY";
/// Environment variable holding the block explorer API key.
pub const EXPLORER_API_KEY_ENV: &str = "EXPLORER_API_KEY";

/// Etherscan v2 endpoint, shared by every chain it indexes.
pub const ETHERSCAN_V2_API: &str = "https://api.etherscan.io/v2/api";

/// A network the tooling can talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    /// Short name used on the command line.
    pub name: String,
    /// EIP-155 chain ID.
    pub chain_id: u64,
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Fixed gas price in wei. When unset the node's price is used.
    pub gas_price: Option<u128>,
    /// Block explorer verification API.
    pub explorer_api_url: Option<Url>,
    /// Factory address override for this network.
    pub factory_address: Option<Address>,
}

impl NetworkConfig {
    /// Factory address for this network: the explicit override, else the built-in table.
    pub fn factory_address(&self) -> Result<Address, ConfigError> {
        match self.factory_address {
            Some(address) => Ok(address),
            None => Ok(Deployment::from_chain_id(self.chain_id)?.factory_address),
        }
    }
}

fn preset(
    name: &str,
    chain_id: u64,
    rpc_url: &str,
    gas_price: Option<u128>,
    explorer: Option<&str>,
) -> Result<NetworkConfig, ConfigError> {
    let parse = |s: &str| Url::parse(s).map_err(|e| ConfigError::Invalid(format!("{s}: {e}")));
    Ok(NetworkConfig {
        name: name.to_string(),
        chain_id,
        rpc_url: parse(rpc_url)?,
        gas_price,
        explorer_api_url: explorer.map(parse).transpose()?,
        factory_address: None,
    })
}

/// Built-in network presets.
pub fn presets() -> Result<Vec<NetworkConfig>, ConfigError> {
    Ok(vec![
        preset("eth", 1, "https://eth.llamarpc.com/", None, Some(ETHERSCAN_V2_API))?,
        preset(
            "polygon",
            137,
            "https://polygon-rpc.com/",
            Some(120_000_000_000),
            Some(ETHERSCAN_V2_API),
        )?,
        preset(
            "polygon-mumbai",
            80001,
            "https://polygon-mumbai.blockpi.network/v1/rpc/public",
            None,
            Some(ETHERSCAN_V2_API),
        )?,
        preset("localhost", 31337, "http://127.0.0.1:8545/", None, None)?,
    ])
}

/// Per-network entry of the config file. Every field overrides the preset of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOverride {
    /// EIP-155 chain ID; required for networks without a preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// JSON-RPC endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<Url>,
    /// ChanceRoomFactory proxy address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_address: Option<Address>,
    /// Fixed gas price in wei.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    /// Block explorer verification API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_api_url: Option<Url>,
}

/// `[confirmation]` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Overall bound on waiting for a receipt, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// First polling delay, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_ms: Option<u64>,
    /// Growth factor between polls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_multiplier: Option<f64>,
    /// Largest delay between polls, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    /// Blocks required on top of the inclusion block, counting it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
}

/// Main configuration file (chanceroom.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Network overrides and custom networks, by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, NetworkOverride>,

    /// Receipt polling settings.
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
}

fn check_url(context: &str, url: &Url) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "{context}: unsupported URL scheme '{other}', expected http or https"
        ))),
    }
}

impl Config {
    /// Load and validate the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check the file contents for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let presets = presets()?;
        for (name, entry) in &self.networks {
            let is_preset = presets.iter().any(|p| &p.name == name);
            if entry.chain_id == Some(0) {
                return Err(ConfigError::Invalid(format!("network '{name}': chain_id must be non-zero")));
            }
            if !is_preset && (entry.chain_id.is_none() || entry.rpc_url.is_none()) {
                return Err(ConfigError::Invalid(format!(
                    "network '{name}' has no preset and must set both chain_id and rpc_url"
                )));
            }
            if let Some(url) = &entry.rpc_url {
                check_url(&format!("network '{name}' rpc_url"), url)?;
            }
            if let Some(url) = &entry.explorer_api_url {
                check_url(&format!("network '{name}' explorer_api_url"), url)?;
            }
            if entry.factory_address == Some(Address::ZERO) {
                return Err(ConfigError::Invalid(format!(
                    "network '{name}': factory_address must not be the zero address"
                )));
            }
        }
        let c = &self.confirmation;
        if c.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("confirmation.timeout_secs must be non-zero".into()));
        }
        if let Some(m) = c.backoff_multiplier {
            if !(m.is_finite() && m >= 1.0) {
                return Err(ConfigError::Invalid(
                    "confirmation.backoff_multiplier must be at least 1.0".into(),
                ));
            }
        }
        if c.confirmations == Some(0) {
            return Err(ConfigError::Invalid("confirmation.confirmations must be at least 1".into()));
        }
        if c.initial_delay_ms == Some(0) || c.max_delay_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "confirmation.initial_delay_ms and max_delay_ms must be non-zero".into(),
            ));
        }
        let policy = self.confirmation_policy();
        if policy.max_delay < policy.initial_delay {
            return Err(ConfigError::Invalid(format!(
                "confirmation.max_delay_ms ({}) is below initial_delay_ms ({})",
                policy.max_delay.as_millis(),
                policy.initial_delay.as_millis()
            )));
        }
        Ok(())
    }

    /// Resolve a network by name: the preset merged with any override from the file.
    pub fn network(&self, name: &str) -> Result<NetworkConfig, ConfigError> {
        let base = presets()?.into_iter().find(|p| p.name == name);
        let entry = self.networks.get(name);
        match (base, entry) {
            (Some(base), None) => Ok(base),
            (Some(base), Some(entry)) => Ok(Self::merge(base, entry)),
            (None, Some(entry)) => {
                let chain_id = entry.chain_id.ok_or(ConfigError::Missing("network chain_id"))?;
                let rpc_url = entry.rpc_url.clone().ok_or(ConfigError::Missing("network rpc_url"))?;
                let base = NetworkConfig {
                    name: name.to_string(),
                    chain_id,
                    rpc_url,
                    gas_price: None,
                    explorer_api_url: None,
                    factory_address: None,
                };
                Ok(Self::merge(base, entry))
            }
            (None, None) => Err(ConfigError::UnknownNetwork(name.to_string())),
        }
    }

    /// Resolve a network by chain ID, preferring entries from the file.
    pub fn network_by_chain_id(&self, chain_id: u64) -> Result<NetworkConfig, ConfigError> {
        if let Some(name) = self
            .networks
            .iter()
            .find(|(_, entry)| entry.chain_id == Some(chain_id))
            .map(|(name, _)| name.clone())
        {
            return self.network(&name);
        }
        match presets()?.into_iter().find(|p| p.chain_id == chain_id) {
            Some(preset) => self.network(&preset.name),
            None => Err(ConfigError::UnknownNetwork(format!("chain id {chain_id}"))),
        }
    }

    /// Factory address for a chain: a file override, else the built-in table.
    pub fn factory_address(&self, chain_id: u64) -> Result<Address, ConfigError> {
        let presets = presets()?;
        let overridden = self.networks.iter().find_map(|(name, entry)| {
            let entry_chain = entry
                .chain_id
                .or_else(|| presets.iter().find(|p| &p.name == name).map(|p| p.chain_id));
            (entry_chain == Some(chain_id)).then_some(entry.factory_address).flatten()
        });
        match overridden {
            Some(address) => Ok(address),
            None => Ok(Deployment::from_chain_id(chain_id)?.factory_address),
        }
    }

    /// Receipt polling policy from the `[confirmation]` section.
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        let defaults = ConfirmationPolicy::default();
        let c = &self.confirmation;
        ConfirmationPolicy {
            timeout: c.timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
            initial_delay: c
                .initial_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_delay),
            backoff_multiplier: c.backoff_multiplier.unwrap_or(defaults.backoff_multiplier),
            max_delay: c.max_delay_ms.map(Duration::from_millis).unwrap_or(defaults.max_delay),
            confirmations: c.confirmations.unwrap_or(defaults.confirmations),
        }
    }

    fn merge(mut base: NetworkConfig, entry: &NetworkOverride) -> NetworkConfig {
        if let Some(chain_id) = entry.chain_id {
            base.chain_id = chain_id;
        }
        if let Some(url) = &entry.rpc_url {
            base.rpc_url = url.clone();
        }
        if entry.gas_price.is_some() {
            base.gas_price = entry.gas_price;
        }
        if entry.explorer_api_url.is_some() {
            base.explorer_api_url = entry.explorer_api_url.clone();
        }
        if entry.factory_address.is_some() {
            base.factory_address = entry.factory_address;
        }
        base
    }
}

/// Secrets file (secrets.toml)
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Secrets {
    /// Deployer private key, hex with or without 0x.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Room owner private key; defaults to the deployer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_owner_key: Option<String>,
    /// Block explorer API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("private_key", &redact(&self.private_key))
            .field("room_owner_key", &redact(&self.room_owner_key))
            .field("explorer_api_key", &redact(&self.explorer_api_key))
            .finish()
    }
}

impl Secrets {
    /// Load secrets from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Override file values with the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Override file values with variables from `lookup`.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(PRIVATE_KEY_ENV) {
            self.private_key = Some(v);
        }
        if let Some(v) = non_empty(ROOM_OWNER_KEY_ENV) {
            self.room_owner_key = Some(v);
        }
        if let Some(v) = non_empty(EXPLORER_API_KEY_ENV) {
            self.explorer_api_key = Some(v);
        }
        self
    }
}

impl Accounts {
    /// Build the account registry from the configured keys.
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, ConfigError> {
        let deployer = secrets
            .private_key
            .as_deref()
            .ok_or(ConfigError::Missing("deployer private key"))
            .and_then(parse_private_key)?;
        let room_owner = secrets.room_owner_key.as_deref().map(parse_private_key).transpose()?;
        Ok(Accounts::from_keys(deployer, room_owner))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::deployments::POLYGON_MUMBAI;

    fn parse(s: &str) -> Config {
        let config: Config = toml::from_str(s).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn presets_resolve_without_file() {
        let config = Config::default();
        let polygon = config.network("polygon").unwrap();
        assert_eq!(polygon.chain_id, 137);
        assert_eq!(polygon.gas_price, Some(120_000_000_000));
        assert_eq!(config.network_by_chain_id(80001).unwrap().name, "polygon-mumbai");
        assert!(matches!(config.network("goerli"), Err(ConfigError::UnknownNetwork(_))));
    }

    #[test]
    fn factory_resolution_prefers_file_override() {
        let config = parse(
            r#"
            [networks.polygon-mumbai]
            factory_address = "0x1111111111111111111111111111111111111111"
            "#,
        );
        assert_eq!(config.factory_address(80001).unwrap(), Address::repeat_byte(0x11));
        assert_eq!(config.factory_address(137).unwrap(), crate::deployments::POLYGON.factory_address);
        assert!(matches!(config.factory_address(1), Err(ConfigError::UnsupportedChain(1))));
        assert_eq!(
            Config::default().network("polygon-mumbai").unwrap().factory_address().unwrap(),
            POLYGON_MUMBAI.factory_address
        );
    }

    #[test]
    fn custom_network_requires_chain_and_url() {
        let config: Config = toml::from_str(
            r#"
            [networks.devnet]
            rpc_url = "http://localhost:9545"
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = parse(
            r#"
            [networks.devnet]
            chain_id = 1337
            rpc_url = "http://localhost:9545"
            factory_address = "0x2222222222222222222222222222222222222222"
            "#,
        );
        let devnet = config.network("devnet").unwrap();
        assert_eq!(devnet.chain_id, 1337);
        assert_eq!(config.network_by_chain_id(1337).unwrap().name, "devnet");
        assert_eq!(devnet.factory_address().unwrap(), Address::repeat_byte(0x22));
    }

    #[test]
    fn validation_rejects_bad_values() {
        for bad in [
            "[networks.polygon]\nchain_id = 0",
            "[networks.polygon]\nrpc_url = \"ws://polygon\"",
            "[networks.polygon]\nfactory_address = \"0x0000000000000000000000000000000000000000\"",
            "[confirmation]\ntimeout_secs = 0",
            "[confirmation]\nbackoff_multiplier = 0.5",
        ] {
            let config: Config = toml::from_str(bad).unwrap();
            assert!(config.validate().is_err(), "accepted: {bad}");
        }
    }

    #[test]
    fn polling_delays_must_back_off() {
        for bad in [
            "[confirmation]\ninitial_delay_ms = 0",
            "[confirmation]\nmax_delay_ms = 0",
            "[confirmation]\nmax_delay_ms = 100",
            "[confirmation]\ninitial_delay_ms = 2000\nmax_delay_ms = 1000",
        ] {
            let config: Config = toml::from_str(bad).unwrap();
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "accepted: {bad}");
        }
        let policy = parse("[confirmation]\ninitial_delay_ms = 250\nmax_delay_ms = 250")
            .confirmation_policy();
        assert_eq!(policy.delay_for(5), Duration::from_millis(250));
    }

    #[test]
    fn confirmation_section_overrides_defaults() {
        let config = parse("[confirmation]\ntimeout_secs = 30\nconfirmations = 3");
        let policy = config.confirmation_policy();
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.confirmations, 3);
        assert_eq!(policy.initial_delay, ConfirmationPolicy::default().initial_delay);
    }

    #[test]
    fn load_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chanceroom.toml");
        std::fs::write(&path, "networks = 5").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
        assert!(Config::load_or_default(dir.path().join("missing.toml")).unwrap().networks.is_empty());
    }

    #[test]
    fn env_overrides_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "private_key = \"aa\"\nexplorer_api_key = \"file-key\"").unwrap();
        let env: HashMap<&str, &str> = [
            (PRIVATE_KEY_ENV, "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
            (EXPLORER_API_KEY_ENV, ""),
        ]
        .into_iter()
        .collect();
        let secrets = Secrets::load(&path)
            .unwrap()
            .with_env_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(secrets.explorer_api_key.as_deref(), Some("file-key"));
        assert!(!format!("{secrets:?}").contains("ac0974"));

        let accounts = Accounts::from_secrets(&secrets).unwrap();
        assert_eq!(accounts.deployer().unwrap(), accounts.room_owner().unwrap());
        assert!(matches!(
            Accounts::from_secrets(&Secrets::default()),
            Err(ConfigError::Missing(_))
        ));
    }
}
