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

//! Compiled contract artifacts from Hardhat or Foundry builds.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::{Address, Bytes, B256, I256, U256},
};
use serde_json::Value;

use crate::errors::DeployError;

/// ABI and creation bytecode of one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    /// Contract name, e.g. `ChanceRoom_Sang`.
    pub contract_name: String,
    /// Source file the contract is defined in, e.g. `contracts/ChanceRoom_Sang.sol`.
    pub source_name: Option<String>,
    /// Contract ABI.
    pub abi: JsonAbi,
    /// Creation bytecode without constructor arguments.
    pub bytecode: Bytes,
    /// JSON file the artifact was read from.
    pub path: Option<PathBuf>,
}

/// Inputs the block explorer needs to rebuild a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationSource {
    /// Compiler version in explorer format, e.g. `v0.8.19+commit.7dd6d404`.
    pub compiler_version: String,
    /// Standard JSON compiler input.
    pub standard_json: Value,
    /// `source:name` identifier of the contract.
    pub contract_name: String,
}

fn read_json(path: &Path) -> Result<Value, DeployError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        DeployError::Artifact(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| DeployError::Artifact(format!("failed to parse JSON at {}: {e}", path.display())))
}

fn zero_value(ty: &DynSolType) -> Option<DynSolValue> {
    Some(match ty {
        DynSolType::Address => DynSolValue::Address(Address::ZERO),
        DynSolType::Bool => DynSolValue::Bool(false),
        DynSolType::Int(bits) => DynSolValue::Int(I256::ZERO, *bits),
        DynSolType::Uint(bits) => DynSolValue::Uint(U256::ZERO, *bits),
        DynSolType::FixedBytes(size) => DynSolValue::FixedBytes(B256::ZERO, *size),
        DynSolType::Bytes => DynSolValue::Bytes(Vec::new()),
        DynSolType::String => DynSolValue::String(String::new()),
        DynSolType::Array(_) => DynSolValue::Array(Vec::new()),
        DynSolType::FixedArray(inner, len) => {
            DynSolValue::FixedArray(vec![zero_value(inner)?; *len])
        }
        DynSolType::Tuple(inner) => {
            DynSolValue::Tuple(inner.iter().map(zero_value).collect::<Option<Vec<_>>>()?)
        }
        _ => return None,
    })
}

impl ContractArtifact {
    /// Parse an artifact JSON document.
    ///
    /// Hardhat stores `bytecode` as a hex string, Foundry as `bytecode.object`.
    pub fn from_json(name_hint: &str, value: &Value) -> Result<Self, DeployError> {
        let contract_name = value
            .get("contractName")
            .and_then(Value::as_str)
            .unwrap_or(name_hint)
            .to_string();
        let abi: JsonAbi = value
            .get("abi")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| DeployError::Artifact(format!("{contract_name}: invalid ABI: {e}")))?
            .ok_or_else(|| DeployError::Artifact(format!("{contract_name}: missing ABI")))?;

        let bytecode = match value.get("bytecode") {
            Some(Value::String(code)) => code.as_str(),
            Some(obj) => obj.get("object").and_then(Value::as_str).unwrap_or_default(),
            None => "",
        };
        let bytecode = bytecode.strip_prefix("0x").unwrap_or(bytecode);
        if bytecode.is_empty() {
            return Err(DeployError::Artifact(format!(
                "{contract_name}: no deployable bytecode (abstract contract or interface?)"
            )));
        }
        if bytecode.contains("__") {
            return Err(DeployError::Artifact(format!(
                "{contract_name}: bytecode has unlinked library placeholders"
            )));
        }
        let bytecode = hex::decode(bytecode)
            .map_err(|e| DeployError::Artifact(format!("{contract_name}: invalid bytecode: {e}")))?;

        let source_name = value
            .get("sourceName")
            .and_then(Value::as_str)
            .or_else(|| {
                value
                    .pointer("/metadata/settings/compilationTarget")
                    .and_then(Value::as_object)
                    .and_then(|target| target.keys().next())
                    .map(String::as_str)
            })
            .map(str::to_string);

        Ok(Self { contract_name, source_name, abi, bytecode: bytecode.into(), path: None })
    }

    /// Read an artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let path = path.as_ref();
        let name_hint = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let mut artifact = Self::from_json(name_hint, &read_json(path)?)?;
        artifact.path = Some(path.to_path_buf());
        Ok(artifact)
    }

    /// `source:name` identifier, or the bare name when the source is unknown.
    pub fn fully_qualified_name(&self) -> String {
        match &self.source_name {
            Some(source) => format!("{source}:{}", self.contract_name),
            None => self.contract_name.clone(),
        }
    }

    /// ABI-encode constructor arguments.
    pub fn encode_constructor_args(&self, args: &[DynSolValue]) -> Result<Bytes, DeployError> {
        match &self.abi.constructor {
            Some(constructor) => constructor.abi_encode_input(args).map(Bytes::from).map_err(|e| {
                DeployError::Abi(format!("{}: constructor arguments: {e}", self.contract_name))
            }),
            None if args.is_empty() => Ok(Bytes::new()),
            None => Err(DeployError::Abi(format!(
                "{} takes no constructor arguments, got {}",
                self.contract_name,
                args.len()
            ))),
        }
    }

    /// Creation bytecode followed by the encoded constructor arguments.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, DeployError> {
        let encoded = self.encode_constructor_args(args)?;
        Ok([self.bytecode.as_ref(), encoded.as_ref()].concat().into())
    }

    /// Solidity types of the constructor parameters.
    pub fn constructor_types(&self) -> Result<Vec<DynSolType>, DeployError> {
        let Some(constructor) = &self.abi.constructor else {
            return Ok(Vec::new());
        };
        constructor
            .inputs
            .iter()
            .map(|input| {
                input.resolve().map_err(|e| {
                    DeployError::Abi(format!("{}: parameter {}: {e}", self.contract_name, input.name))
                })
            })
            .collect()
    }

    /// Zero values for every constructor parameter, for fee estimates.
    pub fn placeholder_args(&self) -> Result<Vec<DynSolValue>, DeployError> {
        self.constructor_types()?
            .iter()
            .map(|ty| {
                zero_value(ty).ok_or_else(|| {
                    DeployError::Abi(format!("{}: no placeholder for type {ty}", self.contract_name))
                })
            })
            .collect()
    }

    /// Parse constructor arguments given as strings, e.g. from the command line.
    pub fn parse_constructor_args(&self, args: &[String]) -> Result<Vec<DynSolValue>, DeployError> {
        let types = self.constructor_types()?;
        if types.len() != args.len() {
            return Err(DeployError::Abi(format!(
                "{} expects {} constructor arguments, got {}",
                self.contract_name,
                types.len(),
                args.len()
            )));
        }
        types
            .iter()
            .zip(args)
            .map(|(ty, arg)| {
                ty.coerce_str(arg)
                    .map_err(|e| DeployError::Abi(format!("cannot parse '{arg}' as {ty}: {e}")))
            })
            .collect()
    }
}

/// Lookup of compiled contracts by name.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    root: Option<PathBuf>,
    preloaded: BTreeMap<String, ContractArtifact>,
}

impl ArtifactStore {
    /// Store reading from a Hardhat `artifacts/` or Foundry `out/` directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()), preloaded: BTreeMap::new() }
    }

    /// Store over artifacts already in memory.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = ContractArtifact>) -> Self {
        let preloaded = artifacts.into_iter().map(|a| (a.contract_name.clone(), a)).collect();
        Self { root: None, preloaded }
    }

    /// Find an artifact by contract name or by `source:name`.
    pub fn load(&self, name: &str) -> Result<ContractArtifact, DeployError> {
        let (source, contract) = match name.rsplit_once(':') {
            Some((source, contract)) => (Some(source), contract),
            None => (None, name),
        };
        if let Some(artifact) = self.preloaded.get(contract) {
            return Ok(artifact.clone());
        }
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| DeployError::Artifact(format!("no artifact named {name}")))?;

        let mut candidates = Vec::new();
        find_files(root, &format!("{contract}.json"), &mut candidates)?;
        let mut found = Vec::new();
        for path in candidates {
            let artifact = ContractArtifact::load(&path)?;
            if source.is_none() || artifact.source_name.as_deref() == source {
                found.push(artifact);
            }
        }
        match found.len() {
            0 => Err(DeployError::Artifact(format!(
                "no artifact named {name} under {}",
                root.display()
            ))),
            1 => Ok(found.remove(0)),
            n => Err(DeployError::Artifact(format!(
                "{n} artifacts named {contract}; use the fully qualified source:name form"
            ))),
        }
    }

    /// Compiler version and standard JSON input from the Hardhat build info of an artifact.
    pub fn verification_source(
        &self,
        artifact: &ContractArtifact,
    ) -> Result<VerificationSource, DeployError> {
        let path = artifact.path.as_ref().ok_or_else(|| {
            DeployError::Artifact(format!("{} was not loaded from disk", artifact.contract_name))
        })?;
        let dbg_path = path.with_extension("dbg.json");
        let dbg = read_json(&dbg_path)?;
        let build_info = dbg.get("buildInfo").and_then(Value::as_str).ok_or_else(|| {
            DeployError::Artifact(format!("{} has no buildInfo entry", dbg_path.display()))
        })?;
        let build_info_path = dbg_path.parent().unwrap_or(Path::new(".")).join(build_info);
        let build_info = read_json(&build_info_path)?;

        let version = build_info
            .get("solcLongVersion")
            .or_else(|| build_info.get("solcVersion"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DeployError::Artifact(format!(
                    "{} has no compiler version",
                    build_info_path.display()
                ))
            })?;
        let standard_json = build_info.get("input").cloned().ok_or_else(|| {
            DeployError::Artifact(format!("{} has no compiler input", build_info_path.display()))
        })?;

        Ok(VerificationSource {
            compiler_version: format!("v{}", version.trim_start_matches('v')),
            standard_json,
            contract_name: artifact.fully_qualified_name(),
        })
    }
}

fn find_files(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> Result<(), DeployError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| DeployError::Artifact(format!("failed to read {}: {e}", dir.display())))?;
    for entry in entries {
        let entry = entry.map_err(|e| DeployError::Artifact(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            find_files(&path, file_name, out)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SANG_ABI: &str = r#"[{"type":"constructor","inputs":[{"name":"factory","type":"address","internalType":"address"}],"stateMutability":"nonpayable"}]"#;

    fn write_hardhat_project(dir: &Path) {
        let artifact_dir = dir.join("contracts/ChanceRoom_Sang.sol");
        fs::create_dir_all(&artifact_dir).unwrap();
        fs::create_dir_all(dir.join("build-info")).unwrap();
        let abi: Value = serde_json::from_str(SANG_ABI).unwrap();
        fs::write(
            artifact_dir.join("ChanceRoom_Sang.json"),
            json!({
                "_format": "hh-sol-artifact-1",
                "contractName": "ChanceRoom_Sang",
                "sourceName": "contracts/ChanceRoom_Sang.sol",
                "abi": abi,
                "bytecode": "0x6080604052",
                "deployedBytecode": "0x6080"
            })
            .to_string(),
        )
        .unwrap();
        fs::write(
            artifact_dir.join("ChanceRoom_Sang.dbg.json"),
            json!({ "_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/abc123.json" })
                .to_string(),
        )
        .unwrap();
        fs::write(
            dir.join("build-info/abc123.json"),
            json!({
                "solcVersion": "0.8.19",
                "solcLongVersion": "0.8.19+commit.7dd6d404",
                "input": { "language": "Solidity", "sources": {} }
            })
            .to_string(),
        )
        .unwrap();
    }

    #[test]
    fn loads_hardhat_artifact_and_build_info() {
        let dir = tempfile::tempdir().unwrap();
        write_hardhat_project(dir.path());
        let store = ArtifactStore::new(dir.path());

        let artifact = store.load("ChanceRoom_Sang").unwrap();
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(artifact.fully_qualified_name(), "contracts/ChanceRoom_Sang.sol:ChanceRoom_Sang");

        let source = store.verification_source(&artifact).unwrap();
        assert_eq!(source.compiler_version, "v0.8.19+commit.7dd6d404");
        assert_eq!(source.standard_json["language"], "Solidity");

        assert!(store.load("contracts/Other.sol:ChanceRoom_Sang").is_err());
        assert!(matches!(store.load("Template_BlackTicket"), Err(DeployError::Artifact(_))));
    }

    #[test]
    fn reads_foundry_bytecode_object() {
        let artifact = ContractArtifact::from_json(
            "NFT",
            &json!({
                "abi": [],
                "bytecode": { "object": "0x6001", "linkReferences": {} },
                "metadata": { "settings": { "compilationTarget": { "src/NFT.sol": "NFT" } } }
            }),
        )
        .unwrap();
        assert_eq!(artifact.contract_name, "NFT");
        assert_eq!(artifact.fully_qualified_name(), "src/NFT.sol:NFT");
        assert!(artifact.deploy_code(&[]).unwrap().len() == 2);
        assert!(artifact.encode_constructor_args(&[DynSolValue::Bool(true)]).is_err());
    }

    #[test]
    fn rejects_interfaces() {
        let err = ContractArtifact::from_json("IFactory", &json!({ "abi": [], "bytecode": "0x" }))
            .unwrap_err();
        assert!(err.to_string().contains("no deployable bytecode"));
    }

    #[test]
    fn constructor_args_are_appended() {
        let abi: Value = serde_json::from_str(SANG_ABI).unwrap();
        let artifact = ContractArtifact::from_json(
            "ChanceRoom_Sang",
            &json!({ "abi": abi, "bytecode": "0x6080" }),
        )
        .unwrap();

        let factory = Address::repeat_byte(0x42);
        let code = artifact.deploy_code(&[DynSolValue::Address(factory)]).unwrap();
        assert_eq!(code.len(), 2 + 32);
        assert_eq!(&code[2 + 12..], factory.as_slice());

        let placeholder = artifact.placeholder_args().unwrap();
        assert_eq!(placeholder, vec![DynSolValue::Address(Address::ZERO)]);

        let parsed =
            artifact.parse_constructor_args(&[format!("{factory}")]).unwrap();
        assert_eq!(parsed, vec![DynSolValue::Address(factory)]);
        assert!(artifact.parse_constructor_args(&[]).is_err());
    }
}
