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

//! Pinned ABIs of the ChanceRoom contracts and typed handles over them.

use alloy::{
    primitives::{Address, U256},
    sol_types::{decode_revert_reason, Panic, Revert, SolError},
};

mod factory;
mod nft;
mod room;

pub use factory::FactoryService;
pub use nft::NftService;
pub use room::{RoomLayout, RoomService};

alloy::sol! {
    /// The upgradeable factory that registers implementations and templates and clones rooms.
    interface IChanceRoomFactory {
        function initialize() external;
        function addImplementation(address implAddr) external;
        function addTemplate(address tempAddr) external;
        function implNames() external view returns (string[] memory);
        function tempNames() external view returns (string[] memory);
        function determineChanceRoomAddr(string memory implName, bytes32 salt) external view returns (address);
        function newChanceRoom(string memory implName, bytes32 salt) external;
        function getChanceRooms() external view returns (address[] memory);
        function tokenByIndex(uint256 index) external view returns (uint256);
        function tokenURI(uint256 tokenId) external view returns (string memory);
    }
}

alloy::sol! {
    /// A cloned room.
    interface IChanceRoom {
        #[derive(Debug, PartialEq, Eq)]
        struct Layout {
            string tempName;
            address nftAddr;
            uint256 nftId;
            uint256 maximumTicket;
            uint256 ticketPrice;
            uint256 holdingTime;
        }

        function initialize(
            string memory tempName,
            address nftAddr,
            uint256 nftId,
            uint256 maximumTicket,
            uint256 ticketPrice,
            uint256 holdingTime
        ) external;
        function layout() external view returns (Layout memory);
        function ChanceRoomFactory() external view returns (address);
    }
}

alloy::sol! {
    /// The ERC-721 subset used for the test prize.
    interface INFT {
        function safeMint(address to) external;
        function approve(address to, uint256 tokenId) external;
        function getApproved(uint256 tokenId) external view returns (address);
        function ownerOf(uint256 tokenId) external view returns (address);
    }
}

/// Factory token ID of a room: the room address as an integer.
pub fn room_token_id(room: Address) -> U256 {
    U256::from_be_slice(room.as_slice())
}

/// Human readable reason from revert data.
pub fn decode_revert(data: &[u8]) -> String {
    if data.is_empty() {
        return "execution reverted without a reason".to_string();
    }
    if let Ok(revert) = Revert::abi_decode(data) {
        return revert.reason;
    }
    if let Ok(panic) = Panic::abi_decode(data) {
        return format!("panic code {:#x}", panic.code);
    }
    decode_revert_reason(data).unwrap_or_else(|| format!("custom error 0x{}", hex::encode(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_is_the_room_address() {
        let room = Address::repeat_byte(0xff);
        assert_eq!(room_token_id(room), (U256::from(1) << 160) - U256::from(1));
        assert_eq!(room_token_id(Address::ZERO), U256::ZERO);
    }

    #[test]
    fn decodes_revert_variants() {
        let data = Revert { reason: "ChanceRoomFactory: template exists".into() }.abi_encode();
        assert_eq!(decode_revert(&data), "ChanceRoomFactory: template exists");

        let data = Panic { code: U256::from(0x11) }.abi_encode();
        assert_eq!(decode_revert(&data), "panic code 0x11");

        assert_eq!(decode_revert(&[]), "execution reverted without a reason");
        assert!(decode_revert(&[0xde, 0xad, 0xbe, 0xef]).contains("deadbeef"));
    }
}
