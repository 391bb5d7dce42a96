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

//! Deployment and administration tasks, one per operator workflow.

use std::sync::Arc;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, B256, U256},
};
use futures::future::try_join_all;

use crate::{
    accounts::Accounts,
    artifacts::{ArtifactStore, ContractArtifact},
    clone::{InitializedRoom, RoomFlow, RoomParams},
    contracts::{room_token_id, FactoryService, NftService, RoomService},
    errors::{ConfigError, DeployError, VerificationError},
    gas::FeeEstimate,
    ledger::{DeploymentLedger, DeploymentRecord},
    rpc::{TxOutcome, TxRequest},
    transactor::{DeployedContract, Transactor},
    verify::{SourceVerifier, VerificationRequest, VerificationStatus},
};

/// Artifact name of the factory logic contract.
pub const FACTORY_CONTRACT: &str = "ChanceRoomFactory";
/// Artifact name of the proxy placed in front of the factory.
pub const PROXY_CONTRACT: &str = "ERC1967Proxy";
/// Artifact name of the test NFT.
pub const NFT_CONTRACT: &str = "NFT";
/// Ledger name of the factory implementation behind the proxy.
pub const FACTORY_IMPLEMENTATION_RECORD: &str = "ChanceRoomFactory (implementation)";

/// What happened when verifying a freshly deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The explorer accepted the source.
    Verified(VerificationStatus),
    /// No verifier is configured.
    Skipped,
    /// Verification failed; the deployment itself stands.
    Failed(String),
}

/// A deployed contract and its verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDeployment {
    /// Artifact name.
    pub contract_name: String,
    /// The confirmed deployment.
    pub contract: DeployedContract,
    /// Verification result.
    pub verification: VerificationOutcome,
}

impl ContractDeployment {
    /// Fail with [VerificationError::AfterDeploy] if verification of this contract failed.
    ///
    /// Skipped verification is not a failure.
    pub fn ensure_verified(&self) -> Result<(), DeployError> {
        match &self.verification {
            VerificationOutcome::Failed(reason) => Err(VerificationError::AfterDeploy {
                contract: self.contract_name.clone(),
                address: self.contract.address,
                reason: reason.clone(),
            }
            .into()),
            VerificationOutcome::Verified(_) | VerificationOutcome::Skipped => Ok(()),
        }
    }
}

/// The factory implementation and the proxy in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryDeployment {
    /// Factory logic contract.
    pub implementation: ContractDeployment,
    /// Proxy users interact with.
    pub proxy: DeployedContract,
}

/// A registration on the factory and the names registered afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The `addImplementation` or `addTemplate` transaction.
    pub outcome: TxOutcome,
    /// Registered names read back from the factory.
    pub names: Vec<String>,
}

/// A deployed and registered ticket template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDeployment {
    /// The template contract.
    pub template: ContractDeployment,
    /// Its registration on the factory.
    pub registration: Registration,
}

/// A test NFT with one minted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedNft {
    /// The NFT contract.
    pub contract: DeployedContract,
    /// The minted token.
    pub token_id: U256,
    /// Owner of the minted token.
    pub owner: Address,
}

/// A room as listed by the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    /// Address of the room.
    pub address: Address,
    /// Factory token ID of the room.
    pub token_id: U256,
    /// Factory token metadata URI.
    pub token_uri: String,
}

/// Parameters of a full bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    /// Room implementation artifact, e.g. `ChanceRoom_Sang`.
    pub implementation_name: String,
    /// Ticket template artifact, e.g. `Template_BlackTicket`.
    pub template_contract: String,
    /// Name the template registers under, e.g. `BlackTicket`.
    pub template_name: String,
    /// CREATE2 salt of the first room.
    pub salt: B256,
    /// Tickets on sale in the first room.
    pub maximum_ticket: U256,
    /// Ticket price in wei.
    pub ticket_price: U256,
    /// Holding time of the first room.
    pub holding_time: U256,
}

impl Default for BootstrapPlan {
    fn default() -> Self {
        Self {
            implementation_name: "ChanceRoom_Sang".to_string(),
            template_contract: "Template_BlackTicket".to_string(),
            template_name: "BlackTicket".to_string(),
            salt: B256::ZERO,
            maximum_ticket: U256::from(6),
            ticket_price: U256::from(100_000_000_000_000_000u64),
            holding_time: U256::from(1_800_000),
        }
    }
}

/// Everything a bootstrap produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Factory and proxy.
    pub factory: FactoryDeployment,
    /// Room implementation.
    pub implementation: ContractDeployment,
    /// Implementation registration.
    pub implementation_registration: Registration,
    /// Ticket template and its registration.
    pub template: TemplateDeployment,
    /// Prize NFT.
    pub nft: MintedNft,
    /// The first room.
    pub room: InitializedRoom,
    /// Factory reported by the room.
    pub room_factory: Address,
    /// Rooms listed by the factory.
    pub rooms: Vec<RoomSummary>,
    /// Metadata URI of the first factory token.
    pub first_token_uri: String,
}

impl BootstrapReport {
    /// Fail with the first verification failure among the deployed contracts.
    pub fn ensure_verified(&self) -> Result<(), DeployError> {
        self.factory.implementation.ensure_verified()?;
        self.implementation.ensure_verified()?;
        self.template.template.ensure_verified()
    }
}

/// Runs deployment tasks against one chain.
pub struct Deployer {
    chain_id: u64,
    tx: Transactor,
    accounts: Accounts,
    artifacts: ArtifactStore,
    ledger: DeploymentLedger,
    factory_address: Option<Address>,
    verifier: Option<Arc<dyn SourceVerifier>>,
}

impl Deployer {
    /// Creates a deployer for `chain_id`.
    pub fn new(
        chain_id: u64,
        tx: Transactor,
        accounts: Accounts,
        artifacts: ArtifactStore,
        ledger: DeploymentLedger,
    ) -> Self {
        Self { chain_id, tx, accounts, artifacts, ledger, factory_address: None, verifier: None }
    }

    /// Use an existing factory.
    pub fn with_factory(self, factory_address: Address) -> Self {
        Self { factory_address: Some(factory_address), ..self }
    }

    /// Verify deployed contracts with `verifier`.
    pub fn with_verifier(self, verifier: Arc<dyn SourceVerifier>) -> Self {
        Self { verifier: Some(verifier), ..self }
    }

    /// Chain the deployer acts on.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Deployment ledger.
    pub fn ledger(&self) -> &DeploymentLedger {
        &self.ledger
    }

    /// Registered accounts.
    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    /// Handle on the configured factory.
    pub fn factory(&self) -> Result<FactoryService, DeployError> {
        let address =
            self.factory_address.ok_or(ConfigError::UnsupportedChain(self.chain_id))?;
        Ok(FactoryService::new(address, self.tx.clone()))
    }

    /// Handle on a room cloned by the factory.
    pub fn room(&self, address: Address) -> RoomService {
        RoomService::new(address, self.tx.clone())
    }

    async fn deploy_and_record(
        &mut self,
        artifact: &ContractArtifact,
        args: &[DynSolValue],
        record_name: &str,
    ) -> Result<DeployedContract, DeployError> {
        let deployer = self.accounts.deployer()?;
        let deployed = self.tx.deploy(artifact, args, deployer).await?;
        self.ledger.record(DeploymentRecord::new(record_name, self.chain_id, &deployed))?;
        Ok(deployed)
    }

    async fn verify_deployment(
        &self,
        artifact: &ContractArtifact,
        deployed: &DeployedContract,
    ) -> VerificationOutcome {
        let Some(verifier) = &self.verifier else {
            tracing::debug!(contract = %artifact.contract_name, "no verifier configured, skipping");
            return VerificationOutcome::Skipped;
        };
        let request = match self.artifacts.verification_source(artifact) {
            Ok(source) => VerificationRequest {
                chain_id: self.chain_id,
                address: deployed.address,
                source,
                constructor_args: deployed.constructor_args.clone(),
            },
            Err(err) => return VerificationOutcome::Failed(err.to_string()),
        };
        match verifier.verify(&request).await {
            Ok(status) => VerificationOutcome::Verified(status),
            Err(err) => {
                tracing::warn!(address = %deployed.address, "verification failed: {err}");
                VerificationOutcome::Failed(err.to_string())
            }
        }
    }

    /// Deploy the factory logic behind an ERC-1967 proxy that calls `initialize()`.
    pub async fn deploy_factory(&mut self) -> Result<FactoryDeployment, DeployError> {
        let factory = self.artifacts.load(FACTORY_CONTRACT)?;
        let proxy = self.artifacts.load(PROXY_CONTRACT)?;

        let implementation =
            self.deploy_and_record(&factory, &[], FACTORY_IMPLEMENTATION_RECORD).await?;
        let proxy_args = [
            DynSolValue::Address(implementation.address),
            DynSolValue::Bytes(FactoryService::initialize_calldata().to_vec()),
        ];
        let proxy = self.deploy_and_record(&proxy, &proxy_args, FACTORY_CONTRACT).await?;
        self.factory_address = Some(proxy.address);
        tracing::info!(factory = %proxy.address, implementation = %implementation.address, "factory deployed");

        let verification = self.verify_deployment(&factory, &implementation).await;
        Ok(FactoryDeployment {
            implementation: ContractDeployment {
                contract_name: factory.contract_name,
                contract: implementation,
                verification,
            },
            proxy,
        })
    }

    /// Deploy a room implementation bound to the factory.
    pub async fn deploy_implementation(
        &mut self,
        name: &str,
    ) -> Result<ContractDeployment, DeployError> {
        let factory = self.factory()?.address();
        let artifact = self.artifacts.load(name)?;
        let deployed = self
            .deploy_and_record(&artifact, &[DynSolValue::Address(factory)], &artifact.contract_name)
            .await?;
        let verification = self.verify_deployment(&artifact, &deployed).await;
        Ok(ContractDeployment { contract_name: artifact.contract_name, contract: deployed, verification })
    }

    /// Deploy a ticket template and register it on the factory.
    pub async fn deploy_template(&mut self, name: &str) -> Result<TemplateDeployment, DeployError> {
        self.factory()?;
        let artifact = self.artifacts.load(name)?;
        let deployed = self.deploy_and_record(&artifact, &[], &artifact.contract_name).await?;
        let verification = self.verify_deployment(&artifact, &deployed).await;
        let registration = self.add_template(deployed.address).await?;
        Ok(TemplateDeployment {
            template: ContractDeployment {
                contract_name: artifact.contract_name,
                contract: deployed,
                verification,
            },
            registration,
        })
    }

    /// Register a room implementation and read back the implementation names.
    pub async fn add_implementation(&self, address: Address) -> Result<Registration, DeployError> {
        let factory = self.factory()?;
        let outcome = factory.add_implementation(self.accounts.deployer()?, address).await?;
        let names = factory.implementation_names().await?;
        Ok(Registration { outcome, names })
    }

    /// Register a ticket template and read back the template names.
    pub async fn add_template(&self, address: Address) -> Result<Registration, DeployError> {
        let factory = self.factory()?;
        let outcome = factory.add_template(self.accounts.deployer()?, address).await?;
        let names = factory.template_names().await?;
        Ok(Registration { outcome, names })
    }

    /// Registered implementation and template names.
    pub async fn names(&self) -> Result<(Vec<String>, Vec<String>), DeployError> {
        let factory = self.factory()?;
        futures::try_join!(factory.implementation_names(), factory.template_names())
    }

    /// Clone `implementation_name` and initialize the room as the room owner.
    pub async fn new_room(
        &self,
        implementation_name: &str,
        salt: B256,
        params: RoomParams,
    ) -> Result<InitializedRoom, DeployError> {
        let factory = self.factory()?;
        let owner = self.accounts.room_owner()?;
        let predicted = RoomFlow::new(factory, self.tx.clone(), owner, params)
            .predict(implementation_name, salt)
            .await?;
        if let Some(record) = self.ledger.latest(implementation_name) {
            if !predicted.matches_local_prediction(record.address) {
                tracing::debug!(
                    room = %predicted.address(),
                    "factory prediction differs from a plain EIP-1167 CREATE2 derivation"
                );
            }
        }
        predicted.approve().await?.clone_room().await?.initialize().await
    }

    /// Deploy the test NFT and mint token 0 to `owner`.
    pub async fn mint_test_nft(&mut self, owner: Address) -> Result<MintedNft, DeployError> {
        let artifact = self.artifacts.load(NFT_CONTRACT)?;
        let contract = self.deploy_and_record(&artifact, &[], &artifact.contract_name).await?;
        let nft = NftService::new(contract.address, self.tx.clone());
        nft.safe_mint(self.accounts.deployer()?, owner).await?;

        let token_id = U256::ZERO;
        let minted_to = nft.owner_of(token_id).await?;
        if minted_to != owner {
            return Err(DeployError::Artifact(format!(
                "{NFT_CONTRACT} minted token {token_id} to {minted_to}, expected {owner}"
            )));
        }
        Ok(MintedNft { contract, token_id, owner })
    }

    /// Rooms cloned by the factory with their token URIs.
    pub async fn rooms(&self) -> Result<Vec<RoomSummary>, DeployError> {
        let factory = self.factory()?;
        let rooms = factory.rooms().await?;
        try_join_all(rooms.into_iter().map(|address| {
            let factory = factory.clone();
            async move {
                let token_id = room_token_id(address);
                let token_uri = factory.token_uri(token_id).await?;
                Ok::<_, DeployError>(RoomSummary { address, token_id, token_uri })
            }
        }))
        .await
    }

    /// Fee of deploying an artifact, with zero values for constructor arguments.
    pub async fn estimate_deploy_fee(&self, name: &str) -> Result<FeeEstimate, DeployError> {
        let artifact = self.artifacts.load(name)?;
        let code = artifact.deploy_code(&artifact.placeholder_args()?)?;
        let request = TxRequest::create(self.accounts.deployer()?, code);
        let rpc = self.tx.rpc();
        let (gas, gas_price) = futures::try_join!(rpc.estimate_gas(request), rpc.gas_price())?;
        Ok(FeeEstimate::new(gas, gas_price))
    }

    /// Verify a contract deployed earlier.
    pub async fn verify(
        &self,
        address: Address,
        name: &str,
        args: &[DynSolValue],
    ) -> Result<VerificationStatus, DeployError> {
        let verifier =
            self.verifier.as_ref().ok_or(ConfigError::Missing("explorer API key"))?;
        let artifact = self.artifacts.load(name)?;
        let request = VerificationRequest {
            chain_id: self.chain_id,
            address,
            source: self.artifacts.verification_source(&artifact)?,
            constructor_args: artifact.encode_constructor_args(args)?,
        };
        Ok(verifier.verify(&request).await?)
    }

    /// Deploy and wire up everything from scratch, then open a first room.
    pub async fn bootstrap(&mut self, plan: &BootstrapPlan) -> Result<BootstrapReport, DeployError> {
        let factory = self.deploy_factory().await?;
        let implementation = self.deploy_implementation(&plan.implementation_name).await?;
        let implementation_registration =
            self.add_implementation(implementation.contract.address).await?;
        let template = self.deploy_template(&plan.template_contract).await?;

        let owner = self.accounts.room_owner()?;
        let nft = self.mint_test_nft(owner).await?;

        let params = RoomParams {
            template_name: plan.template_name.clone(),
            nft_address: nft.contract.address,
            nft_id: nft.token_id,
            maximum_ticket: plan.maximum_ticket,
            ticket_price: plan.ticket_price,
            holding_time: plan.holding_time,
        };
        let room = self.new_room(&plan.implementation_name, plan.salt, params).await?;

        let factory_service = self.factory()?;
        let room_service = self.room(room.address);
        let (rooms, room_factory, first_token) = futures::try_join!(
            self.rooms(),
            room_service.factory(),
            factory_service.token_by_index(U256::ZERO)
        )?;
        let first_token_uri = factory_service.token_uri(first_token).await?;

        Ok(BootstrapReport {
            factory,
            implementation,
            implementation_registration,
            template,
            nft,
            room,
            room_factory,
            rooms,
            first_token_uri,
        })
    }
}
