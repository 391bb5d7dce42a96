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

use alloy::primitives::{Address, U256};

use super::INFT;
use crate::{errors::DeployError, rpc::TxOutcome, transactor::Transactor};

/// Handle on the ERC-721 used as a room prize.
#[derive(Clone)]
pub struct NftService {
    address: Address,
    tx: Transactor,
}

impl NftService {
    /// Creates a new NFT handle.
    pub fn new(address: Address, tx: Transactor) -> Self {
        Self { address, tx }
    }

    /// Address of the NFT contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Mint the next token to `to`.
    pub async fn safe_mint(&self, from: Address, to: Address) -> Result<TxOutcome, DeployError> {
        self.tx.transact(from, self.address, &INFT::safeMintCall { to }).await
    }

    /// Approve `spender` to transfer `token_id`.
    pub async fn approve(
        &self,
        from: Address,
        spender: Address,
        token_id: U256,
    ) -> Result<TxOutcome, DeployError> {
        tracing::debug!(nft = %self.address, spender = %spender, %token_id, "approving NFT");
        self.tx.transact(from, self.address, &INFT::approveCall { to: spender, tokenId: token_id }).await
    }

    /// Account approved for `token_id`.
    pub async fn get_approved(&self, token_id: U256) -> Result<Address, DeployError> {
        self.tx.call(self.address, &INFT::getApprovedCall { tokenId: token_id }).await
    }

    /// Owner of `token_id`.
    pub async fn owner_of(&self, token_id: U256) -> Result<Address, DeployError> {
        self.tx.call(self.address, &INFT::ownerOfCall { tokenId: token_id }).await
    }
}
