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

use std::fmt;

use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;

/// Expected cost of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    /// Estimated gas.
    pub gas: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// `gas * gas_price` in wei.
    pub fee_wei: U256,
}

impl FeeEstimate {
    /// Estimate from gas and gas price.
    pub fn new(gas: u64, gas_price: u128) -> Self {
        Self { gas, gas_price, fee_wei: U256::from(gas) * U256::from(gas_price) }
    }

    /// Fee in ether, as a decimal string.
    pub fn fee_ether(&self) -> String {
        format_ether(self.fee_wei)
    }
}

impl fmt::Display for FeeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gas at {} wei = {} ETH", self.gas, self.gas_price, self.fee_ether())
    }
}
