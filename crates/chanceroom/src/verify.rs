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

//! Source verification against Etherscan compatible block explorers.

use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{
    artifacts::VerificationSource,
    config::NetworkConfig,
    errors::{ConfigError, DeployError, VerificationError},
};

/// Everything needed to verify one deployed contract.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Chain the contract lives on.
    pub chain_id: u64,
    /// Address of the deployed contract.
    pub address: Address,
    /// Compiler input and version.
    pub source: VerificationSource,
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
}

/// Successful verification outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The explorer verified the source now.
    Verified,
    /// The explorer had already verified this contract.
    AlreadyVerified,
}

/// A service that publishes contract sources.
#[async_trait]
pub trait SourceVerifier: Send + Sync {
    /// Verify a deployed contract. Verifying an already verified contract succeeds.
    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationStatus, VerificationError>;
}

/// Retry and polling bounds of the verifier.
#[derive(Debug, Clone)]
pub struct VerifyPolicy {
    /// Submissions attempted before giving up on rate limiting or indexing lag.
    pub max_attempts: u32,
    /// Delay before the first retry or poll.
    pub initial_delay: Duration,
    /// Upper bound on the delay between retries or polls.
    pub max_delay: Duration,
    /// How long to poll a submitted verification.
    pub poll_timeout: Duration,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(15),
            poll_timeout: Duration::from_secs(120),
        }
    }
}

impl VerifyPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay.saturating_mul(1 << attempt.min(16)).min(self.max_delay)
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

impl ExplorerResponse {
    fn ok(&self) -> bool {
        self.status == "1"
    }

    fn result_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => self.message.clone(),
            other => other.to_string(),
        }
    }
}

enum Reply {
    Accepted(String),
    AlreadyVerified,
    RateLimited,
    NotIndexed,
    Pending,
    Rejected(String),
}

fn classify(response: &ExplorerResponse) -> Reply {
    let text = response.result_text();
    let lower = text.to_lowercase();
    if lower.contains("already verified") {
        Reply::AlreadyVerified
    } else if lower.contains("rate limit") {
        Reply::RateLimited
    } else if lower.contains("unable to locate contractcode") {
        Reply::NotIndexed
    } else if lower.contains("pending") {
        Reply::Pending
    } else if response.ok() {
        Reply::Accepted(text)
    } else {
        Reply::Rejected(text)
    }
}

/// Client for the Etherscan v2 verification API.
#[derive(Debug, Clone)]
pub struct EtherscanVerifier {
    client: reqwest::Client,
    api_url: Url,
    api_key: String,
    policy: VerifyPolicy,
}

impl EtherscanVerifier {
    /// Creates a verifier for the given endpoint.
    pub fn new(api_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key: api_key.into(),
            policy: VerifyPolicy::default(),
        }
    }

    /// Verifier for a configured network.
    pub fn for_network(network: &NetworkConfig, api_key: Option<&str>) -> Result<Self, DeployError> {
        let api_url = network
            .explorer_api_url
            .clone()
            .ok_or(ConfigError::Missing("explorer_api_url for this network"))?;
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(VerificationError::MissingApiKey(network.chain_id))?;
        Ok(Self::new(api_url, api_key))
    }

    /// Set the retry and polling bounds.
    pub fn with_policy(self, policy: VerifyPolicy) -> Self {
        Self { policy, ..self }
    }

    async fn submit(
        &self,
        request: &VerificationRequest,
    ) -> Result<ExplorerResponse, VerificationError> {
        let source_code = serde_json::to_string(&request.source.standard_json)
            .map_err(|e| VerificationError::Malformed(e.to_string()))?;
        let chain_id = request.chain_id.to_string();
        let address = format!("{:#x}", request.address);
        let constructor_args = hex::encode(&request.constructor_args);
        let form = [
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("apikey", self.api_key.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("sourceCode", source_code.as_str()),
            ("contractaddress", address.as_str()),
            ("contractname", request.source.contract_name.as_str()),
            ("compilerversion", request.source.compiler_version.as_str()),
            ("constructorArguements", constructor_args.as_str()),
        ];
        let response = self
            .client
            .post(self.api_url.clone())
            .query(&[("chainid", chain_id.as_str())])
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        response.json().await.map_err(|e| VerificationError::Malformed(e.to_string()))
    }

    async fn check(&self, chain_id: u64, guid: &str) -> Result<ExplorerResponse, VerificationError> {
        let chain_id = chain_id.to_string();
        let response = self
            .client
            .get(self.api_url.clone())
            .query(&[
                ("chainid", chain_id.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        response.json().await.map_err(|e| VerificationError::Malformed(e.to_string()))
    }

    async fn poll(&self, chain_id: u64, guid: &str) -> Result<VerificationStatus, VerificationError> {
        let deadline = tokio::time::Instant::now() + self.policy.poll_timeout;
        let mut attempt = 0u32;
        loop {
            tokio::time::sleep(self.policy.delay_for(attempt)).await;
            attempt = attempt.saturating_add(1);

            let response = self.check(chain_id, guid).await?;
            match classify(&response) {
                Reply::AlreadyVerified => return Ok(VerificationStatus::AlreadyVerified),
                Reply::Accepted(_) => return Ok(VerificationStatus::Verified),
                Reply::Pending | Reply::RateLimited => {
                    tracing::debug!(guid = %guid, "verification pending");
                }
                Reply::NotIndexed => {
                    return Err(VerificationError::Rejected(response.result_text()));
                }
                Reply::Rejected(reason) => return Err(VerificationError::Rejected(reason)),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(VerificationError::Pending(self.policy.poll_timeout));
            }
        }
    }
}

#[async_trait]
impl SourceVerifier for EtherscanVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationStatus, VerificationError> {
        let attempts = self.policy.max_attempts.max(1);
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.policy.delay_for(attempt - 1)).await;
            }
            let response = self.submit(request).await?;
            match classify(&response) {
                Reply::Accepted(guid) => {
                    tracing::info!(address = %request.address, guid = %guid, "verification submitted");
                    return self.poll(request.chain_id, &guid).await;
                }
                Reply::AlreadyVerified => {
                    tracing::info!(address = %request.address, "contract already verified");
                    return Ok(VerificationStatus::AlreadyVerified);
                }
                Reply::RateLimited => {
                    tracing::warn!(address = %request.address, attempt, "explorer rate limit hit");
                    if attempt + 1 == attempts {
                        return Err(VerificationError::RateLimited { attempts });
                    }
                }
                Reply::NotIndexed | Reply::Pending => {
                    tracing::debug!(address = %request.address, attempt, "explorer has not indexed the contract yet");
                    if attempt + 1 == attempts {
                        return Err(VerificationError::Rejected(response.result_text()));
                    }
                }
                Reply::Rejected(reason) => return Err(VerificationError::Rejected(reason)),
            }
        }
        Err(VerificationError::RateLimited { attempts })
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn request() -> VerificationRequest {
        VerificationRequest {
            chain_id: 80001,
            address: Address::repeat_byte(0x5a),
            source: VerificationSource {
                compiler_version: "v0.8.19+commit.7dd6d404".into(),
                standard_json: json!({ "language": "Solidity", "sources": {} }),
                contract_name: "contracts/ChanceRoom_Sang.sol:ChanceRoom_Sang".into(),
            },
            constructor_args: Bytes::from(vec![0u8; 32]),
        }
    }

    fn verifier(server: &MockServer) -> EtherscanVerifier {
        EtherscanVerifier::new(server.url("/v2/api").parse().unwrap(), "test-key").with_policy(
            VerifyPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                poll_timeout: Duration::from_secs(5),
            },
        )
    }

    #[tokio::test]
    async fn already_verified_succeeds_repeatedly() {
        let server = MockServer::start();
        let submit = server.mock(|when, then| {
            when.method(POST).path("/v2/api").query_param("chainid", "80001");
            then.status(200).json_body(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Contract source code already verified"
            }));
        });

        let verifier = verifier(&server);
        for _ in 0..2 {
            let status = verifier.verify(&request()).await.unwrap();
            assert_eq!(status, VerificationStatus::AlreadyVerified);
        }
        submit.assert_hits(2);
    }

    #[tokio::test]
    async fn submit_then_poll_until_verified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v2/api")
                .body_contains("action=verifysourcecode")
                .body_contains("compilerversion=v0.8.19");
            then.status(200).json_body(json!({ "status": "1", "message": "OK", "result": "guid-123" }));
        });
        let check = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/api")
                .query_param("action", "checkverifystatus")
                .query_param("guid", "guid-123");
            then.status(200).json_body(json!({ "status": "1", "message": "OK", "result": "Pass - Verified" }));
        });

        let status = verifier(&server).verify(&request()).await.unwrap();
        assert_eq!(status, VerificationStatus::Verified);
        check.assert();
    }

    #[tokio::test]
    async fn rate_limit_is_retried_then_reported() {
        let server = MockServer::start();
        let submit = server.mock(|when, then| {
            when.method(POST).path("/v2/api");
            then.status(200).json_body(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Max rate limit reached, please use API Key for higher rate limit"
            }));
        });

        let err = verifier(&server).verify(&request()).await.unwrap_err();
        assert!(matches!(err, VerificationError::RateLimited { attempts: 3 }));
        submit.assert_hits(3);
    }

    #[tokio::test]
    async fn failed_verification_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v2/api");
            then.status(200).json_body(json!({ "status": "1", "message": "OK", "result": "guid-9" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v2/api");
            then.status(200).json_body(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Fail - Unable to verify"
            }));
        });

        let err = verifier(&server).verify(&request()).await.unwrap_err();
        assert!(matches!(err, VerificationError::Rejected(reason) if reason.contains("Unable to verify")));
    }

    #[test]
    fn network_without_key_is_an_error() {
        let network = crate::config::Config::default().network("polygon").unwrap();
        let err = EtherscanVerifier::for_network(&network, None).unwrap_err();
        assert!(matches!(err, DeployError::Verification(VerificationError::MissingApiKey(137))));
        assert!(EtherscanVerifier::for_network(&network, Some("key")).is_ok());

        let local = crate::config::Config::default().network("localhost").unwrap();
        assert!(matches!(
            EtherscanVerifier::for_network(&local, Some("key")),
            Err(DeployError::Configuration(_))
        ));
    }
}
