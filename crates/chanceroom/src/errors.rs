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

//! Error taxonomy shared by every deployment operation.

use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

use crate::accounts::Role;

/// An error that carries a stable, machine readable code.
pub trait CodedError: std::error::Error {
    /// Short identifier for the error category.
    fn code(&self) -> &str;
}

/// Errors raised while resolving configuration, before any RPC call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No factory deployment is known for the chain.
    #[error("unsupported network: no ChanceRoom factory is configured for chain id {0}")]
    UnsupportedChain(u64),

    /// The named network is neither a preset nor present in the config file.
    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    /// The RPC endpoint reports a different chain than the one configured.
    #[error("RPC chain id {actual} does not match configured chain id {expected}")]
    ChainMismatch {
        /// Chain id from the configuration.
        expected: u64,
        /// Chain id reported by the node.
        actual: u64,
    },

    /// No account is registered for the role.
    #[error("no account registered for role '{0}'")]
    MissingAccount(Role),

    /// A required value was not provided by flags, environment or files.
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    /// The configuration file contents are invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configuration or secrets file could not be read or parsed.
    #[error("failed to load {path}: {message}")]
    Load {
        /// File that failed to load.
        path: String,
        /// Underlying reason.
        message: String,
    },
}

/// Errors from the block-explorer verification service.
#[derive(Error, Debug)]
pub enum VerificationError {
    /// The explorer kept rejecting requests with its rate limit message.
    #[error("verification service rate limited the request after {attempts} attempts")]
    RateLimited {
        /// Number of submissions attempted.
        attempts: u32,
    },

    /// The explorer rejected the submission or the compiled bytecode did not match.
    #[error("verification rejected: {0}")]
    Rejected(String),

    /// Verification stayed pending past the polling bound.
    #[error("verification still pending after {0:?}")]
    Pending(Duration),

    /// Transport level failure talking to the explorer.
    #[error("verification service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The explorer answered with something that is not a verification response.
    #[error("malformed verification response: {0}")]
    Malformed(String),

    /// No API key configured for the explorer.
    #[error("no explorer API key configured for chain id {0}")]
    MissingApiKey(u64),

    /// A contract was deployed but its source could not be verified.
    #[error("{contract} at {address:#x} was deployed but not verified: {reason}")]
    AfterDeploy {
        /// Artifact name of the deployed contract.
        contract: String,
        /// Address of the deployed contract.
        address: Address,
        /// Why verification failed.
        reason: String,
    },
}

/// Errors that can occur while deploying or administering ChanceRoom contracts.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Invalid or unsupported configuration.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Transport or connectivity failure talking to the node.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The transaction or call reverted on chain.
    #[error("{}", revert_message(.tx_hash, .reason))]
    Revert {
        /// Hash of the mined transaction, if it was mined at all.
        tx_hash: Option<TxHash>,
        /// Decoded revert reason.
        reason: String,
    },

    /// No receipt within the configured confirmation bound.
    #[error("transaction {tx_hash:#x} was not confirmed within {timeout:?}")]
    ConfirmationTimeout {
        /// Hash of the transaction being waited on.
        tx_hash: TxHash,
        /// The bound that elapsed.
        timeout: Duration,
    },

    /// Waiting for a transaction was cancelled by the caller.
    #[error("cancelled while waiting for transaction {0:#x}")]
    Cancelled(TxHash),

    /// The clone does not exist (yet) at the predicted address.
    #[error("no ChanceRoom clone is deployed at {0:#x}")]
    CloneNotDeployed(Address),

    /// Explorer verification failed.
    #[error("verification error: {0}")]
    Verification(#[from] VerificationError),

    /// A compiled contract artifact is missing or malformed.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// ABI encoding or decoding failed.
    #[error("abi error: {0}")]
    Abi(String),

    /// The deployment ledger could not be written.
    #[error("ledger error: {0}")]
    Ledger(String),
}

fn revert_message(tx_hash: &Option<TxHash>, reason: &str) -> String {
    match tx_hash {
        Some(hash) => format!("transaction {hash:#x} reverted: {reason}"),
        None => format!("execution reverted: {reason}"),
    }
}

impl DeployError {
    /// Exit code the CLI uses for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::Configuration(_) => 2,
            DeployError::Rpc(_) => 3,
            DeployError::Revert { .. } | DeployError::CloneNotDeployed(_) => 4,
            DeployError::ConfirmationTimeout { .. } | DeployError::Cancelled(_) => 5,
            DeployError::Verification(_) => 6,
            DeployError::Artifact(_) | DeployError::Abi(_) | DeployError::Ledger(_) => 1,
        }
    }

    /// Build a revert error without a mined transaction.
    pub fn revert(reason: impl Into<String>) -> Self {
        DeployError::Revert { tx_hash: None, reason: reason.into() }
    }
}

impl From<alloy::sol_types::Error> for DeployError {
    fn from(err: alloy::sol_types::Error) -> Self {
        DeployError::Abi(err.to_string())
    }
}

impl CodedError for DeployError {
    fn code(&self) -> &str {
        match self {
            DeployError::Configuration(_) => "[CR-CFG-001]",
            DeployError::Rpc(_) => "[CR-RPC-002]",
            DeployError::Revert { .. } => "[CR-REV-003]",
            DeployError::CloneNotDeployed(_) => "[CR-REV-004]",
            DeployError::ConfirmationTimeout { .. } => "[CR-TMO-005]",
            DeployError::Cancelled(_) => "[CR-TMO-006]",
            DeployError::Verification(_) => "[CR-VER-007]",
            DeployError::Artifact(_) => "[CR-ART-008]",
            DeployError::Abi(_) => "[CR-ABI-009]",
            DeployError::Ledger(_) => "[CR-LDG-010]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_categorized() {
        assert_eq!(DeployError::from(ConfigError::UnsupportedChain(5)).exit_code(), 2);
        assert_eq!(DeployError::Rpc("connection refused".into()).exit_code(), 3);
        assert_eq!(DeployError::revert("Ownable: caller is not the owner").exit_code(), 4);
        let timeout = DeployError::ConfirmationTimeout {
            tx_hash: TxHash::ZERO,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(timeout.exit_code(), 5);
        assert_eq!(
            DeployError::from(VerificationError::RateLimited { attempts: 3 }).exit_code(),
            6
        );
    }

    #[test]
    fn revert_message_mentions_reason_and_hash() {
        let err = DeployError::Revert {
            tx_hash: Some(TxHash::repeat_byte(0xab)),
            reason: "ChanceRoom: already initialized".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0xabab"));
        assert!(msg.contains("already initialized"));

        let err = DeployError::revert("boom");
        assert_eq!(err.to_string(), "execution reverted: boom");
        assert_eq!(err.code(), "[CR-REV-003]");
    }

    #[test]
    fn unsupported_chain_message() {
        let err = DeployError::from(ConfigError::UnsupportedChain(42));
        assert!(err.to_string().contains("unsupported network"));
        assert!(err.to_string().contains("42"));
    }
}
