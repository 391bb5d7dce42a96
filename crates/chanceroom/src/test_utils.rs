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

//! In-memory chain for tests.
//!
//! [MockChain] implements [ChainRpc] and simulates the factory, its clones, templates and the
//! test NFT by decoding calldata with the same ABIs the library sends. Contract artifacts from
//! [MockChain::artifacts] carry a marker instead of real bytecode so deployments can be
//! recognized.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{keccak256, Address, Bytes, TxHash, B256, U256},
    sol_types::{SolInterface, SolValue},
};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use crate::{
    accounts::{Accounts, Role},
    artifacts::{ArtifactStore, ContractArtifact},
    clone::predict_clone_address,
    confirm::ConfirmationPolicy,
    contracts::{room_token_id, FactoryService, IChanceRoom, IChanceRoomFactory, INFT},
    errors::{DeployError, VerificationError},
    ledger::DeploymentLedger,
    rpc::{ChainRpc, TxReceipt, TxRequest},
    tasks::{Deployer, FACTORY_CONTRACT, NFT_CONTRACT, PROXY_CONTRACT},
    transactor::Transactor,
    verify::{SourceVerifier, VerificationRequest, VerificationStatus},
};

/// Deployer account of [mock_accounts].
pub const MOCK_DEPLOYER: Address = Address::new([0x0d; 20]);
/// Room owner account of [mock_accounts].
pub const MOCK_ROOM_OWNER: Address = Address::new([0x0e; 20]);

const RUNTIME_CODE: &[u8] = &[0x60, 0x80, 0x60, 0x40, 0x52];

/// Marker used as creation code of a mock artifact.
pub fn mock_bytecode(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// Artifact for `name` whose bytecode the mock chain recognizes.
pub fn mock_artifact(name: &str) -> ContractArtifact {
    let abi = if name == PROXY_CONTRACT {
        json!([{ "type": "constructor", "stateMutability": "payable", "inputs": [
            { "name": "implementation", "type": "address", "internalType": "address" },
            { "name": "_data", "type": "bytes", "internalType": "bytes" }
        ]}])
    } else if name.starts_with("ChanceRoom_") {
        json!([{ "type": "constructor", "stateMutability": "nonpayable", "inputs": [
            { "name": "factory", "type": "address", "internalType": "address" }
        ]}])
    } else {
        json!([])
    };
    ContractArtifact {
        contract_name: name.to_string(),
        source_name: Some(format!("contracts/{name}.sol")),
        abi: serde_json::from_value::<JsonAbi>(abi).unwrap_or_default(),
        bytecode: mock_bytecode(name).to_vec().into(),
        path: None,
    }
}

/// Deployer and a separate room owner, without keys.
pub fn mock_accounts() -> Accounts {
    Accounts::new()
        .with_address(Role::Deployer, MOCK_DEPLOYER)
        .with_address(Role::RoomOwner, MOCK_ROOM_OWNER)
}

/// Confirmation policy with short delays, suitable for the mock chain.
pub fn fast_policy() -> ConfirmationPolicy {
    ConfirmationPolicy {
        timeout: Duration::from_secs(10),
        initial_delay: Duration::from_millis(1),
        backoff_multiplier: 1.5,
        max_delay: Duration::from_millis(10),
        confirmations: 1,
    }
}

/// A [Deployer] wired to `chain` with mock artifacts, accounts and an in-memory ledger.
pub fn mock_deployer(chain: Arc<MockChain>) -> Deployer {
    let artifacts = chain.artifacts();
    let chain_id = chain.chain_id;
    let tx = Transactor::new(chain).with_policy(fast_policy());
    Deployer::new(chain_id, tx, mock_accounts(), artifacts, DeploymentLedger::in_memory(chain_id))
}

#[derive(Clone, Debug, Default)]
struct FactoryState {
    owner: Address,
    implementations: Vec<(String, Address)>,
    templates: Vec<(String, Address)>,
    rooms: Vec<Address>,
}

impl FactoryState {
    fn only_owner(&self, from: Address) -> Result<(), String> {
        if from != self.owner {
            return Err("Ownable: caller is not the owner".into());
        }
        Ok(())
    }

    fn implementation(&self, name: &str) -> Option<Address> {
        self.implementations.iter().find(|(n, _)| n == name).map(|(_, a)| *a)
    }
}

#[derive(Clone, Debug, Default)]
struct NftState {
    owners: BTreeMap<U256, Address>,
    approvals: BTreeMap<U256, Address>,
    next_id: U256,
}

#[derive(Clone, Debug)]
enum Contract {
    FactoryLogic,
    Factory(FactoryState),
    Implementation { name: String },
    Template { name: String },
    Nft(NftState),
    Room { factory: Address, layout: Option<IChanceRoom::Layout> },
}

#[derive(Clone, Debug, Default)]
struct State {
    block: u64,
    tx_count: u64,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, Contract>,
    receipts: HashMap<TxHash, TxReceipt>,
    polls: HashMap<TxHash, u32>,
    sent: Vec<TxRequest>,
}

struct Execution {
    output: Bytes,
    created: Option<Address>,
}

impl Execution {
    fn empty() -> Self {
        Self { output: Bytes::new(), created: None }
    }

    fn returns(value: impl SolValue) -> Self {
        Self { output: value.abi_encode().into(), created: None }
    }
}

/// Simulated chain implementing [ChainRpc].
pub struct MockChain {
    chain_id: u64,
    names: Vec<String>,
    gas_price: u128,
    receipt_delay: u32,
    withhold_receipts: bool,
    mine_reverts: bool,
    state: Mutex<State>,
}

impl MockChain {
    /// A chain knowing the factory, proxy, NFT, `ChanceRoom_Sang` and `Template_BlackTicket`.
    pub fn new(chain_id: u64) -> Self {
        let names = [
            FACTORY_CONTRACT,
            PROXY_CONTRACT,
            NFT_CONTRACT,
            "ChanceRoom_Sang",
            "Template_BlackTicket",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        Self {
            chain_id,
            names,
            gas_price: 30_000_000_000,
            receipt_delay: 0,
            withhold_receipts: false,
            mine_reverts: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Never return receipts.
    pub fn withhold_receipts(mut self) -> Self {
        self.withhold_receipts = true;
        self
    }

    /// Return receipts only after they were polled `polls` times.
    pub fn with_receipt_delay(mut self, polls: u32) -> Self {
        self.receipt_delay = polls;
        self
    }

    /// Mine reverting transactions with a failed receipt instead of rejecting them on send.
    pub fn mine_reverts(mut self) -> Self {
        self.mine_reverts = true;
        self
    }

    /// Gas price reported by the node.
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Artifacts for every recognized contract.
    pub fn artifacts(&self) -> ArtifactStore {
        ArtifactStore::from_artifacts(self.names.iter().map(|n| mock_artifact(n)))
    }

    /// Write every recognized contract under `root` as a Hardhat artifact with build info.
    ///
    /// Unlike [MockChain::artifacts], the returned store can produce verification sources.
    pub fn write_artifacts(&self, root: &Path) -> std::io::Result<ArtifactStore> {
        let build_info = root.join("build-info");
        fs::create_dir_all(&build_info)?;
        fs::write(
            build_info.join("mock.json"),
            json!({
                "solcLongVersion": "0.8.19+commit.7dd6d404",
                "input": { "language": "Solidity", "sources": {} }
            })
            .to_string(),
        )?;
        for name in &self.names {
            let artifact = mock_artifact(name);
            let dir = root.join(format!("contracts/{name}.sol"));
            fs::create_dir_all(&dir)?;
            let contents = json!({
                "_format": "hh-sol-artifact-1",
                "contractName": name,
                "sourceName": artifact.source_name,
                "abi": artifact.abi,
                "bytecode": artifact.bytecode,
            });
            fs::write(dir.join(format!("{name}.json")), contents.to_string())?;
            fs::write(
                dir.join(format!("{name}.dbg.json")),
                json!({ "_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/mock.json" })
                    .to_string(),
            )?;
        }
        Ok(ArtifactStore::new(root))
    }

    /// Transactions sent so far.
    pub async fn sent_transactions(&self) -> Vec<TxRequest> {
        self.state.lock().await.sent.clone()
    }

    fn execute(&self, state: &mut State, request: &TxRequest) -> Result<Execution, String> {
        let Some(to) = request.to else {
            return self.deploy(state, request.from, &request.input);
        };
        match state.contracts.get(&to).cloned() {
            None => Ok(Execution::empty()),
            Some(Contract::Factory(_)) => factory_call(state, to, request.from, &request.input, self.chain_id),
            Some(Contract::Room { .. }) => room_call(state, to, request.from, &request.input),
            Some(Contract::Nft(_)) => nft_call(state, to, request.from, &request.input),
            Some(_) => Err("function selector was not recognized and there's no fallback function".into()),
        }
    }

    fn deploy(&self, state: &mut State, from: Address, input: &[u8]) -> Result<Execution, String> {
        if input.len() < 32 {
            return Err("mock: init code too short".into());
        }
        let (marker, args) = input.split_at(32);
        let name = self
            .names
            .iter()
            .find(|n| mock_bytecode(n).as_slice() == marker)
            .ok_or("mock: unknown init code")?;
        let address = from.create(state.nonces.get(&from).copied().unwrap_or_default());

        let contract = match name.as_str() {
            FACTORY_CONTRACT => Contract::FactoryLogic,
            PROXY_CONTRACT => {
                let (implementation, data) =
                    <(Address, Bytes)>::abi_decode_params(args).map_err(|e| e.to_string())?;
                if !matches!(state.contracts.get(&implementation), Some(Contract::FactoryLogic)) {
                    return Err("ERC1967: new implementation is not a contract".into());
                }
                if data != FactoryService::initialize_calldata() {
                    return Err("mock: proxy must call initialize()".into());
                }
                Contract::Factory(FactoryState { owner: from, ..Default::default() })
            }
            NFT_CONTRACT => Contract::Nft(NftState::default()),
            n if n.starts_with("ChanceRoom_") => {
                Address::abi_decode(args).map_err(|e| e.to_string())?;
                Contract::Implementation { name: n.to_string() }
            }
            n if n.starts_with("Template_") => {
                Contract::Template { name: n.trim_start_matches("Template_").to_string() }
            }
            n => return Err(format!("mock: no behaviour for {n}")),
        };
        state.contracts.insert(address, contract);
        Ok(Execution { output: Bytes::new(), created: Some(address) })
    }

    fn tx_hash(&self, state: &State) -> TxHash {
        keccak256(format!("mock-tx-{}-{}", self.chain_id, state.tx_count))
    }
}

fn factory_mut(state: &mut State, factory: Address) -> Result<&mut FactoryState, String> {
    match state.contracts.get_mut(&factory) {
        Some(Contract::Factory(f)) => Ok(f),
        _ => Err("mock: not a factory".into()),
    }
}

fn factory_call(
    state: &mut State,
    factory: Address,
    from: Address,
    input: &[u8],
    chain_id: u64,
) -> Result<Execution, String> {
    use IChanceRoomFactory::IChanceRoomFactoryCalls as Calls;

    let call = Calls::abi_decode(input).map_err(|_| "mock: unknown factory function".to_string())?;
    match call {
        Calls::initialize(_) => Err("Initializable: contract is already initialized".into()),
        Calls::addImplementation(c) => {
            let name = match state.contracts.get(&c.implAddr) {
                Some(Contract::Implementation { name }) => name.clone(),
                _ => return Err("ChanceRoomFactory: invalid implementation".into()),
            };
            let f = factory_mut(state, factory)?;
            f.only_owner(from)?;
            if f.implementation(&name).is_some() {
                return Err("ChanceRoomFactory: implementation already exists".into());
            }
            f.implementations.push((name, c.implAddr));
            Ok(Execution::empty())
        }
        Calls::addTemplate(c) => {
            let name = match state.contracts.get(&c.tempAddr) {
                Some(Contract::Template { name }) => name.clone(),
                _ => return Err("ChanceRoomFactory: invalid template".into()),
            };
            let f = factory_mut(state, factory)?;
            f.only_owner(from)?;
            if f.templates.iter().any(|(n, _)| n == &name) {
                return Err("ChanceRoomFactory: template already exists".into());
            }
            f.templates.push((name, c.tempAddr));
            Ok(Execution::empty())
        }
        Calls::implNames(_) => {
            let f = factory_mut(state, factory)?;
            let names: Vec<String> = f.implementations.iter().map(|(n, _)| n.clone()).collect();
            Ok(Execution::returns(names))
        }
        Calls::tempNames(_) => {
            let f = factory_mut(state, factory)?;
            let names: Vec<String> = f.templates.iter().map(|(n, _)| n.clone()).collect();
            Ok(Execution::returns(names))
        }
        Calls::determineChanceRoomAddr(c) => {
            let f = factory_mut(state, factory)?;
            let predicted = f
                .implementation(&c.implName)
                .map(|implementation| predict_clone_address(factory, implementation, c.salt))
                .unwrap_or(Address::ZERO);
            Ok(Execution::returns(predicted))
        }
        Calls::newChanceRoom(c) => {
            let implementation = factory_mut(state, factory)?
                .implementation(&c.implName)
                .ok_or("ChanceRoomFactory: implementation not found")?;
            let room = predict_clone_address(factory, implementation, c.salt);
            if state.contracts.contains_key(&room) {
                return Err("ERC1167: create2 failed".into());
            }
            state.contracts.insert(room, Contract::Room { factory, layout: None });
            factory_mut(state, factory)?.rooms.push(room);
            Ok(Execution::empty())
        }
        Calls::getChanceRooms(_) => Ok(Execution::returns(factory_mut(state, factory)?.rooms.clone())),
        Calls::tokenByIndex(c) => {
            let f = factory_mut(state, factory)?;
            let room = usize::try_from(c.index)
                .ok()
                .and_then(|i| f.rooms.get(i))
                .ok_or("ERC721Enumerable: global index out of bounds")?;
            Ok(Execution::returns(room_token_id(*room)))
        }
        Calls::tokenURI(c) => {
            let f = factory_mut(state, factory)?;
            let room = f
                .rooms
                .iter()
                .find(|r| room_token_id(**r) == c.tokenId)
                .ok_or("ERC721: invalid token ID")?;
            Ok(Execution::returns(format!("https://chanceroom.mock/{chain_id}/{room:#x}.json")))
        }
    }
}

fn room_call(
    state: &mut State,
    room: Address,
    from: Address,
    input: &[u8],
) -> Result<Execution, String> {
    use IChanceRoom::IChanceRoomCalls as Calls;

    let (room_factory, layout) = match state.contracts.get(&room) {
        Some(Contract::Room { factory, layout }) => (*factory, layout.clone()),
        _ => return Err("mock: not a room".into()),
    };
    let call = Calls::abi_decode(input).map_err(|_| "mock: unknown room function".to_string())?;
    match call {
        Calls::initialize(c) => {
            if layout.is_some() {
                return Err("Initializable: contract is already initialized".into());
            }
            let template_known = match state.contracts.get(&room_factory) {
                Some(Contract::Factory(f)) => f.templates.iter().any(|(n, _)| n == &c.tempName),
                _ => false,
            };
            if !template_known {
                return Err("ChanceRoom: template not found".into());
            }
            if c.maximumTicket.is_zero() {
                return Err("ChanceRoom: maximumTicket must be positive".into());
            }
            let nft = match state.contracts.get_mut(&c.nftAddr) {
                Some(Contract::Nft(nft)) => nft,
                _ => return Err("ChanceRoom: invalid NFT".into()),
            };
            let owner = *nft.owners.get(&c.nftId).ok_or("ERC721: invalid token ID")?;
            if owner != from {
                return Err("ChanceRoom: caller is not the NFT owner".into());
            }
            if nft.approvals.get(&c.nftId) != Some(&room) {
                return Err("ERC721: caller is not token owner or approved".into());
            }
            nft.owners.insert(c.nftId, room);
            nft.approvals.remove(&c.nftId);

            let layout = IChanceRoom::Layout {
                tempName: c.tempName,
                nftAddr: c.nftAddr,
                nftId: c.nftId,
                maximumTicket: c.maximumTicket,
                ticketPrice: c.ticketPrice,
                holdingTime: c.holdingTime,
            };
            if let Some(Contract::Room { layout: slot, .. }) = state.contracts.get_mut(&room) {
                *slot = Some(layout);
            }
            Ok(Execution::empty())
        }
        Calls::layout(_) => Ok(Execution::returns(layout.unwrap_or(IChanceRoom::Layout {
            tempName: String::new(),
            nftAddr: Address::ZERO,
            nftId: U256::ZERO,
            maximumTicket: U256::ZERO,
            ticketPrice: U256::ZERO,
            holdingTime: U256::ZERO,
        }))),
        Calls::ChanceRoomFactory(_) => Ok(Execution::returns(room_factory)),
    }
}

fn nft_call(
    state: &mut State,
    address: Address,
    from: Address,
    input: &[u8],
) -> Result<Execution, String> {
    use INFT::INFTCalls as Calls;

    let Some(Contract::Nft(nft)) = state.contracts.get_mut(&address) else {
        return Err("mock: not an NFT".into());
    };
    let call = Calls::abi_decode(input).map_err(|_| "mock: unknown NFT function".to_string())?;
    match call {
        Calls::safeMint(c) => {
            let id = nft.next_id;
            nft.owners.insert(id, c.to);
            nft.next_id = id + U256::from(1);
            Ok(Execution::empty())
        }
        Calls::approve(c) => {
            let owner = *nft.owners.get(&c.tokenId).ok_or("ERC721: invalid token ID")?;
            if owner != from {
                return Err("ERC721: approve caller is not token owner or approved for all".into());
            }
            nft.approvals.insert(c.tokenId, c.to);
            Ok(Execution::empty())
        }
        Calls::getApproved(c) => {
            nft.owners.get(&c.tokenId).ok_or("ERC721: invalid token ID")?;
            Ok(Execution::returns(nft.approvals.get(&c.tokenId).copied().unwrap_or_default()))
        }
        Calls::ownerOf(c) => {
            let owner = *nft.owners.get(&c.tokenId).ok_or("ERC721: invalid token ID")?;
            Ok(Execution::returns(owner))
        }
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> Result<u64, DeployError> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64, DeployError> {
        Ok(self.state.lock().await.block)
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<TxHash, DeployError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let execution = match self.execute(&mut next, &request) {
            Ok(execution) => {
                *state = next;
                Some(execution)
            }
            Err(reason) if !self.mine_reverts => return Err(DeployError::revert(reason)),
            Err(_) => None,
        };

        *state.nonces.entry(request.from).or_default() += 1;
        state.block += 1;
        state.tx_count += 1;
        let tx_hash = self.tx_hash(&state);
        let receipt = TxReceipt {
            transaction_hash: tx_hash,
            block_number: Some(state.block),
            success: execution.is_some(),
            contract_address: execution.and_then(|e| e.created),
            gas_used: 21_000 + 16 * request.input.len() as u64,
        };
        state.receipts.insert(tx_hash, receipt);
        state.sent.push(request);
        Ok(tx_hash)
    }

    async fn call(&self, request: TxRequest) -> Result<Bytes, DeployError> {
        let mut state = self.state.lock().await.clone();
        self.execute(&mut state, &request).map(|e| e.output).map_err(DeployError::revert)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, DeployError> {
        if self.withhold_receipts {
            return Ok(None);
        }
        let mut state = self.state.lock().await;
        let polls = state.polls.entry(hash).or_default();
        *polls += 1;
        if *polls <= self.receipt_delay {
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, DeployError> {
        let state = self.state.lock().await;
        Ok(if state.contracts.contains_key(&address) {
            Bytes::from_static(RUNTIME_CODE)
        } else {
            Bytes::new()
        })
    }

    async fn gas_price(&self) -> Result<u128, DeployError> {
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, request: TxRequest) -> Result<u64, DeployError> {
        let mut state = self.state.lock().await.clone();
        self.execute(&mut state, &request).map_err(DeployError::revert)?;
        Ok(21_000 + 16 * request.input.len() as u64)
    }
}

/// [SourceVerifier] that records requests and answers with a fixed result.
pub struct RecordingVerifier {
    status: Result<VerificationStatus, String>,
    calls: AtomicU32,
    requests: Mutex<Vec<VerificationRequest>>,
}

impl RecordingVerifier {
    /// A verifier answering every request with `status`.
    pub fn new(status: VerificationStatus) -> Self {
        Self { status: Ok(status), calls: AtomicU32::new(0), requests: Mutex::new(Vec::new()) }
    }

    /// A verifier rejecting every request with `reason`.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            status: Err(reason.to_string()),
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of verification requests received.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<VerificationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SourceVerifier for RecordingVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationStatus, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());
        self.status.clone().map_err(VerificationError::Rejected)
    }
}
