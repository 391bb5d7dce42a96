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

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};

use crate::{errors::DeployError, transactor::DeployedContract};

/// One contract deployed by the tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Contract name from the artifact.
    pub contract_name: String,
    /// Deployed address.
    pub address: Address,
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
    /// Creation transaction.
    pub tx_hash: TxHash,
    /// Block the creation was included in.
    pub block_number: u64,
    /// Chain the contract lives on.
    pub chain_id: u64,
}

impl DeploymentRecord {
    /// Record for a confirmed deployment.
    pub fn new(contract_name: impl Into<String>, chain_id: u64, deployed: &DeployedContract) -> Self {
        Self {
            contract_name: contract_name.into(),
            address: deployed.address,
            constructor_args: deployed.constructor_args.clone(),
            tx_hash: deployed.outcome.transaction_hash,
            block_number: deployed.outcome.block_number,
            chain_id,
        }
    }
}

/// Append-only list of deployments on one chain, kept as `<dir>/<chain_id>.json`.
#[derive(Debug, Clone)]
pub struct DeploymentLedger {
    chain_id: u64,
    path: Option<PathBuf>,
    records: Vec<DeploymentRecord>,
}

impl DeploymentLedger {
    /// Open the ledger of `chain_id` in `dir`, starting empty if the file does not exist.
    pub fn open(dir: impl AsRef<Path>, chain_id: u64) -> Result<Self, DeployError> {
        let path = dir.as_ref().join(format!("{chain_id}.json"));
        let records = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                DeployError::Ledger(format!("failed to read {}: {e}", path.display()))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                DeployError::Ledger(format!("failed to parse {}: {e}", path.display()))
            })?
        } else {
            Vec::new()
        };
        Ok(Self { chain_id, path: Some(path), records })
    }

    /// A ledger that is never written to disk.
    pub fn in_memory(chain_id: u64) -> Self {
        Self { chain_id, path: None, records: Vec::new() }
    }

    /// File backing the ledger.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[DeploymentRecord] {
        &self.records
    }

    /// Most recent deployment of `contract_name`.
    pub fn latest(&self, contract_name: &str) -> Option<&DeploymentRecord> {
        self.records.iter().rev().find(|r| r.contract_name == contract_name)
    }

    /// Append a record and persist the ledger.
    pub fn record(&mut self, record: DeploymentRecord) -> Result<(), DeployError> {
        if record.chain_id != self.chain_id {
            return Err(DeployError::Ledger(format!(
                "record for chain {} does not belong in the ledger of chain {}",
                record.chain_id, self.chain_id
            )));
        }
        self.records.push(record);
        self.save()
    }

    fn save(&self) -> Result<(), DeployError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                DeployError::Ledger(format!("failed to create {}: {e}", dir.display()))
            })?;
        }
        let contents = serde_json::to_string_pretty(&self.records)
            .map_err(|e| DeployError::Ledger(e.to_string()))?;
        // Write then rename so an interrupted run never leaves a truncated ledger.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .map_err(|e| DeployError::Ledger(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, path)
            .map_err(|e| DeployError::Ledger(format!("failed to write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, byte: u8) -> DeploymentRecord {
        DeploymentRecord {
            contract_name: name.to_string(),
            address: Address::repeat_byte(byte),
            constructor_args: Bytes::new(),
            tx_hash: TxHash::repeat_byte(byte),
            block_number: byte as u64,
            chain_id: 80001,
        }
    }

    #[test]
    fn persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = DeploymentLedger::open(dir.path(), 80001).unwrap();
        ledger.record(record("ChanceRoom_Sang", 1)).unwrap();
        ledger.record(record("ChanceRoom_Sang", 2)).unwrap();
        ledger.record(record("NFT", 3)).unwrap();
        assert!(dir.path().join("80001.json").exists());

        let reopened = DeploymentLedger::open(dir.path(), 80001).unwrap();
        assert_eq!(reopened.records().len(), 3);
        assert_eq!(reopened.latest("ChanceRoom_Sang").unwrap().address, Address::repeat_byte(2));
        assert!(reopened.latest("Template_BlackTicket").is_none());
    }

    #[test]
    fn rejects_records_of_other_chains() {
        let mut ledger = DeploymentLedger::in_memory(137);
        let err = ledger.record(record("NFT", 1)).unwrap_err();
        assert!(matches!(err, DeployError::Ledger(_)));
        assert!(ledger.records().is_empty());
    }
}
