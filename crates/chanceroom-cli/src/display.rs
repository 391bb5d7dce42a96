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

//! Display utilities for consistent CLI output formatting

use std::fmt::Display;

use alloy::primitives::{utils::format_ether, Address, U256};
use chanceroom::{rpc::TxOutcome, tasks::VerificationOutcome, VerificationStatus};
use colored::Colorize;
use url::Url;

/// Standard display formatter for CLI output
pub struct DisplayManager {
    /// Optional network name to display in headers
    network: Option<String>,
}

impl DisplayManager {
    /// Create a new display manager
    pub fn new() -> Self {
        Self { network: None }
    }

    /// Create a display manager with network context
    pub fn with_network(network: impl Into<String>) -> Self {
        Self { network: Some(network.into()) }
    }

    /// Print a section header with optional network badge
    pub fn header(&self, title: &str) {
        match &self.network {
            Some(network) => println!("\n{} [{}]", title.bold(), network.blue().bold()),
            None => println!("\n{}", title.bold()),
        }
    }

    /// Print a labeled value with standard indentation
    pub fn item(&self, label: &str, value: impl Display) {
        println!("  {:<18} {}", format!("{}:", label), value);
    }

    /// Print an address with standard formatting
    pub fn address(&self, label: &str, address: Address) {
        self.item(label, format!("{:#x}", address).dimmed());
    }

    /// Print a confirmed transaction with its block
    pub fn outcome(&self, label: &str, outcome: &TxOutcome) {
        self.item(
            label,
            format!("{} (block {})", format!("{:#x}", outcome.transaction_hash).cyan(), outcome.block_number),
        );
    }

    /// Print the result of a source verification
    pub fn verification(&self, outcome: &VerificationOutcome) {
        let status = match outcome {
            VerificationOutcome::Verified(VerificationStatus::Verified) => "verified".green(),
            VerificationOutcome::Verified(VerificationStatus::AlreadyVerified) => {
                "already verified".green()
            }
            VerificationOutcome::Skipped => "skipped (no explorer API key)".dimmed(),
            VerificationOutcome::Failed(reason) => format!("failed: {reason}").yellow(),
        };
        self.item("Verification", status);
    }

    /// Print a list of names, or a placeholder when empty
    pub fn names(&self, label: &str, names: &[String]) {
        if names.is_empty() {
            self.item(label, "(none)".dimmed());
        } else {
            self.item(label, names.join(", "));
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("\n{} {}", "✓".green().bold(), message.green().bold());
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        println!("\n{} {}", "⚠".yellow(), message.yellow());
    }

    /// Print a note or additional info
    pub fn note(&self, message: &str) {
        println!("  {}", message.dimmed());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Format ETH amount from wei
pub fn format_eth(wei: U256) -> String {
    let formatted = format_ether(wei);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Hide credentials and API keys that RPC providers embed in URLs
pub fn obscure_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    let hidden = !url.username().is_empty()
        || url.password().is_some()
        || url.query().is_some()
        || url.path().len() > 1;
    if hidden {
        format!("{}://{host}{port}/****", url.scheme())
    } else {
        format!("{}://{host}{port}", url.scheme())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eth_amounts_are_trimmed() {
        assert_eq!(format_eth(U256::from(100_000_000_000_000_000u128)), "0.1");
        assert_eq!(format_eth(U256::from(2_000_000_000_000_000_000u128)), "2");
        assert_eq!(format_eth(U256::ZERO), "0");
    }

    #[test]
    fn rpc_keys_are_hidden() {
        let url = Url::parse("https://polygon-mainnet.g.alchemy.com/v2/secret-key").unwrap();
        assert_eq!(obscure_url(&url), "https://polygon-mainnet.g.alchemy.com/****");
        let url = Url::parse("http://127.0.0.1:8545/").unwrap();
        assert_eq!(obscure_url(&url), "http://127.0.0.1:8545");
    }
}
