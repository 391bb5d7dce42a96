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

//! Explicit registry of the accounts an operation acts as.

use std::{collections::BTreeMap, fmt};

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    signers::local::PrivateKeySigner,
};

use crate::errors::{ConfigError, DeployError};

/// The role an account plays in a deployment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Owns the factory; deploys contracts and registers implementations and templates.
    Deployer,
    /// Owns the NFT put up in a room; approves, clones and initializes rooms.
    RoomOwner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Deployer => f.write_str("deployer"),
            Role::RoomOwner => f.write_str("room-owner"),
        }
    }
}

/// Parse a private key string, adding "0x" prefix if not present
pub fn parse_private_key(key: &str) -> Result<PrivateKeySigner, ConfigError> {
    let key = key.trim();
    let key_with_prefix =
        if key.starts_with("0x") { key.to_string() } else { format!("0x{}", key) };
    key_with_prefix
        .parse()
        .map_err(|err| ConfigError::Invalid(format!("failed to parse private key: {err}")))
}

/// Maps roles to addresses, and for live networks to the signers behind them.
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    addresses: BTreeMap<Role, Address>,
    signers: Vec<PrivateKeySigner>,
}

impl Accounts {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signing key for a role.
    pub fn with_signer(mut self, role: Role, signer: PrivateKeySigner) -> Self {
        self.addresses.insert(role, signer.address());
        if !self.signers.iter().any(|s| s.address() == signer.address()) {
            self.signers.push(signer);
        }
        self
    }

    /// Register an address for a role without a key; the node must be able to sign for it.
    pub fn with_address(mut self, role: Role, address: Address) -> Self {
        self.addresses.insert(role, address);
        self
    }

    /// Build the registry from the deployer key and an optional separate room owner key.
    ///
    /// Without a room owner key the deployer also acts as room owner.
    pub fn from_keys(deployer: PrivateKeySigner, room_owner: Option<PrivateKeySigner>) -> Self {
        let room_owner = room_owner.unwrap_or_else(|| deployer.clone());
        Self::new().with_signer(Role::Deployer, deployer).with_signer(Role::RoomOwner, room_owner)
    }

    /// Address registered for a role.
    pub fn address(&self, role: &Role) -> Result<Address, ConfigError> {
        self.addresses.get(role).copied().ok_or_else(|| ConfigError::MissingAccount(role.clone()))
    }

    /// Address of the deployer.
    pub fn deployer(&self) -> Result<Address, ConfigError> {
        self.address(&Role::Deployer)
    }

    /// Address of the room owner.
    pub fn room_owner(&self) -> Result<Address, ConfigError> {
        self.address(&Role::RoomOwner)
    }

    /// All registered roles with their addresses.
    pub fn iter(&self) -> impl Iterator<Item = (&Role, &Address)> {
        self.addresses.iter()
    }

    /// Wallet holding every registered signer; the deployer signs by default.
    pub fn wallet(&self) -> Result<EthereumWallet, DeployError> {
        let deployer = self.deployer()?;
        let default = self
            .signers
            .iter()
            .find(|s| s.address() == deployer)
            .cloned()
            .ok_or(ConfigError::Missing("deployer private key"))?;
        let mut wallet = EthereumWallet::from(default);
        for signer in self.signers.iter().filter(|s| s.address() != deployer) {
            wallet.register_signer(signer.clone());
        }
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_2: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

    #[test]
    fn parse_key_with_and_without_prefix() {
        let a = parse_private_key(KEY_0).unwrap();
        let b = parse_private_key(&format!("0x{KEY_0}")).unwrap();
        assert_eq!(a.address(), b.address());
        assert!(parse_private_key("not-a-key").is_err());
    }

    #[test]
    fn room_owner_defaults_to_deployer() {
        let deployer = parse_private_key(KEY_0).unwrap();
        let accounts = Accounts::from_keys(deployer.clone(), None);
        assert_eq!(accounts.deployer().unwrap(), deployer.address());
        assert_eq!(accounts.room_owner().unwrap(), deployer.address());
        assert!(accounts.wallet().is_ok());
    }

    #[test]
    fn separate_room_owner() {
        let deployer = parse_private_key(KEY_0).unwrap();
        let owner = parse_private_key(KEY_2).unwrap();
        let accounts = Accounts::from_keys(deployer.clone(), Some(owner.clone()));
        assert_eq!(accounts.room_owner().unwrap(), owner.address());
        assert_ne!(accounts.deployer().unwrap(), accounts.room_owner().unwrap());
    }

    #[test]
    fn missing_role_is_reported() {
        let accounts = Accounts::new().with_address(Role::Deployer, Address::repeat_byte(1));
        let err = accounts.room_owner().unwrap_err();
        assert!(matches!(err, ConfigError::MissingAccount(Role::RoomOwner)));
        // Address-only registries cannot sign.
        assert!(accounts.wallet().is_err());
    }
}
