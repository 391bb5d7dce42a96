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

//! Deployment and administration of the ChanceRoom factory, its room clones and ticket
//! templates.
//!
//! The [tasks::Deployer] runs one workflow per operator task on top of a [rpc::ChainRpc]
//! binding. [provider::AlloyRpc] talks to a live node; with the `test-utils` feature,
//! `test_utils::MockChain` simulates the contracts in memory.

pub mod accounts;
pub mod artifacts;
pub mod clone;
pub mod config;
pub mod confirm;
pub mod contracts;
pub mod deployments;
pub mod errors;
pub mod gas;
pub mod ledger;
pub mod provider;
pub mod rpc;
pub mod tasks;
pub mod transactor;
pub mod verify;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use accounts::{Accounts, Role};
pub use artifacts::{ArtifactStore, ContractArtifact};
pub use clone::{predict_clone_address, InitializedRoom, RoomParams};
pub use config::{Config, NetworkConfig, Secrets};
pub use confirm::ConfirmationPolicy;
pub use deployments::{Deployment, NamedChain};
pub use errors::{CodedError, ConfigError, DeployError, VerificationError};
pub use gas::FeeEstimate;
pub use ledger::{DeploymentLedger, DeploymentRecord};
pub use provider::AlloyRpc;
pub use rpc::{ChainRpc, TxOutcome, TxReceipt, TxRequest};
pub use tasks::{BootstrapPlan, BootstrapReport, Deployer};
pub use transactor::{DeployedContract, Transactor};
pub use verify::{EtherscanVerifier, SourceVerifier, VerificationStatus};
