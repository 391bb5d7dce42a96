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

use alloy::primitives::{address, Address};
use derive_builder::Builder;

pub use alloy_chains::NamedChain;

use crate::errors::ConfigError;

/// Configuration for a deployment of the ChanceRoom factory on one chain.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
pub struct Deployment {
    /// Chain ID of the network.
    pub chain_id: u64,

    /// Address of the [ChanceRoomFactory] proxy.
    ///
    /// [ChanceRoomFactory]: crate::contracts::IChanceRoomFactory
    pub factory_address: Address,
}

impl Deployment {
    /// Lookup the [Deployment] for a named chain.
    pub fn from_chain(chain: NamedChain) -> Option<Deployment> {
        Self::from_chain_id(u64::from(chain)).ok()
    }

    /// Lookup the [Deployment] by chain ID.
    ///
    /// Chains without a known factory are an error; the zero address is never returned.
    pub fn from_chain_id(chain_id: impl Into<u64>) -> Result<Deployment, ConfigError> {
        match chain_id.into() {
            137 => Ok(POLYGON),
            80001 => Ok(POLYGON_MUMBAI),
            chain_id => Err(ConfigError::UnsupportedChain(chain_id)),
        }
    }
}

/// Chain IDs that have a built-in [Deployment].
pub fn supported_chain_ids() -> Vec<u64> {
    vec![POLYGON.chain_id, POLYGON_MUMBAI.chain_id]
}

/// [Deployment] for Polygon PoS mainnet.
pub const POLYGON: Deployment = Deployment {
    chain_id: 137,
    factory_address: address!("0x000004911bedE2053923bAF3b59e1a9f034482C9"),
};

/// [Deployment] for the Polygon Mumbai testnet.
pub const POLYGON_MUMBAI: Deployment = Deployment {
    chain_id: 80001,
    factory_address: address!("0xC5197e5dcEE9268EA665086Fe918872bD3Bb5318"),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_chains_resolve_to_nonzero_factories() {
        for chain_id in supported_chain_ids() {
            let deployment = Deployment::from_chain_id(chain_id).unwrap();
            assert_eq!(deployment.chain_id, chain_id);
            assert_ne!(deployment.factory_address, Address::ZERO);
        }
    }

    #[test]
    fn unsupported_chains_are_errors() {
        for chain_id in [1u64, 5, 31337, 11155111, 0, u64::MAX] {
            let err = Deployment::from_chain_id(chain_id).unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedChain(id) if id == chain_id));
        }
    }

    #[test]
    fn builder_produces_custom_deployment() {
        let deployment = DeploymentBuilder::default()
            .chain_id(31337)
            .factory_address(Address::repeat_byte(0x11))
            .build()
            .unwrap();
        assert_eq!(deployment.chain_id, 31337);
        assert_eq!(Deployment::from_chain(NamedChain::Polygon), Some(POLYGON));
    }

    #[test]
    fn mumbai_resolves_by_raw_chain_id() {
        assert_eq!(Deployment::from_chain_id(80001u64).unwrap(), POLYGON_MUMBAI);
        assert_eq!(
            POLYGON_MUMBAI.factory_address,
            address!("0xC5197e5dcEE9268EA665086Fe918872bD3Bb5318")
        );
    }
}
