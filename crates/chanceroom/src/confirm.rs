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

//! Bounded, cancellable waiting for transaction receipts.

use std::{future::Future, time::Duration};

use alloy::primitives::TxHash;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    errors::DeployError,
    rpc::{ChainRpc, TxReceipt},
};

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationPolicy {
    /// Overall bound on the wait.
    pub timeout: Duration,
    /// Delay before the second poll.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each poll
    pub backoff_multiplier: f64,
    /// Maximum delay between polls, regardless of backoff
    pub max_delay: Duration,
    /// Required confirmations, counting the inclusion block.
    pub confirmations: u64,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 1.5,
            max_delay: Duration::from_secs(8),
            confirmations: 1,
        }
    }
}

impl ConfirmationPolicy {
    /// Policy with a different overall timeout.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Delay after the given zero-based poll attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay;
        }
        let backoff = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let backoff_ms = backoff.min(self.max_delay.as_millis() as f64) as u64;
        Duration::from_millis(backoff_ms)
    }
}

/// Run one RPC call, bounded by the wait deadline and the cancellation token.
async fn bounded<T>(
    fut: impl Future<Output = Result<T, DeployError>>,
    tx_hash: TxHash,
    deadline: Instant,
    policy: &ConfirmationPolicy,
    cancel: &CancellationToken,
) -> Result<T, DeployError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(DeployError::Cancelled(tx_hash)),
        res = tokio::time::timeout_at(deadline, fut) => match res {
            Ok(res) => res,
            Err(_) => Err(DeployError::ConfirmationTimeout { tx_hash, timeout: policy.timeout }),
        },
    }
}

/// Poll for the receipt of `tx_hash` until it has the required confirmations.
///
/// Fails with [DeployError::ConfirmationTimeout] once `policy.timeout` elapses and with
/// [DeployError::Cancelled] as soon as `cancel` fires. Transient RPC failures are retried
/// until the deadline.
pub async fn wait_for_receipt(
    rpc: &dyn ChainRpc,
    tx_hash: TxHash,
    policy: &ConfirmationPolicy,
    cancel: &CancellationToken,
) -> Result<TxReceipt, DeployError> {
    let deadline = Instant::now() + policy.timeout;
    let mut attempt = 0u32;

    loop {
        match bounded(rpc.transaction_receipt(tx_hash), tx_hash, deadline, policy, cancel).await {
            Ok(Some(receipt)) => {
                if policy.confirmations <= 1 {
                    return Ok(receipt);
                }
                if let Some(included) = receipt.block_number {
                    match bounded(rpc.block_number(), tx_hash, deadline, policy, cancel).await {
                        Ok(head) => {
                            let confirmations = head.saturating_sub(included) + 1;
                            if confirmations >= policy.confirmations {
                                return Ok(receipt);
                            }
                            tracing::trace!(
                                tx_hash = %tx_hash,
                                confirmations,
                                "waiting for confirmations"
                            );
                        }
                        Err(DeployError::Rpc(err)) => tracing::warn!(
                            tx_hash = %tx_hash,
                            "failed to fetch block number, retrying: {err}"
                        ),
                        Err(err) => return Err(err),
                    }
                }
            }
            Ok(None) => tracing::trace!(tx_hash = %tx_hash, attempt, "receipt not available yet"),
            Err(DeployError::Rpc(err)) => {
                tracing::warn!(tx_hash = %tx_hash, "failed to fetch receipt, retrying: {err}")
            }
            Err(err) => return Err(err),
        }

        if Instant::now() >= deadline {
            return Err(DeployError::ConfirmationTimeout { tx_hash, timeout: policy.timeout });
        }
        let wake = (Instant::now() + policy.delay_for(attempt)).min(deadline);
        attempt = attempt.saturating_add(1);
        tokio::select! {
            _ = cancel.cancelled() => return Err(DeployError::Cancelled(tx_hash)),
            _ = tokio::time::sleep_until(wake) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use alloy::primitives::{Address, Bytes};
    use async_trait::async_trait;

    use super::*;
    use crate::rpc::TxRequest;

    /// Returns a receipt after `ready_after` polls, never if `None`.
    struct Stub {
        ready_after: Option<u32>,
        polls: AtomicU32,
        head: u64,
        /// Number of leading `block_number` calls that fail.
        head_failures: u32,
        head_calls: AtomicU32,
    }

    impl Stub {
        fn new(ready_after: Option<u32>) -> Self {
            Self {
                ready_after,
                polls: AtomicU32::new(0),
                head: 10,
                head_failures: 0,
                head_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ChainRpc for Stub {
        async fn chain_id(&self) -> Result<u64, DeployError> {
            Ok(80001)
        }
        async fn block_number(&self) -> Result<u64, DeployError> {
            let calls = self.head_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if calls <= self.head_failures {
                return Err(DeployError::Rpc("connection reset".into()));
            }
            Ok(self.head)
        }
        async fn send_transaction(&self, _: TxRequest) -> Result<TxHash, DeployError> {
            unimplemented!()
        }
        async fn call(&self, _: TxRequest) -> Result<Bytes, DeployError> {
            unimplemented!()
        }
        async fn transaction_receipt(
            &self,
            hash: TxHash,
        ) -> Result<Option<TxReceipt>, DeployError> {
            let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.ready_after {
                Some(n) if polls >= n => Ok(Some(TxReceipt {
                    transaction_hash: hash,
                    block_number: Some(10),
                    success: true,
                    contract_address: None,
                    gas_used: 21_000,
                })),
                _ => Ok(None),
            }
        }
        async fn code_at(&self, _: Address) -> Result<Bytes, DeployError> {
            Ok(Bytes::new())
        }
        async fn gas_price(&self) -> Result<u128, DeployError> {
            Ok(1)
        }
        async fn estimate_gas(&self, _: TxRequest) -> Result<u64, DeployError> {
            Ok(21_000)
        }
    }

    #[test]
    fn delay_backs_off_and_is_capped() {
        let policy = ConfirmationPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(750));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1125));
        assert_eq!(policy.delay_for(50), policy.max_delay);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_receipt_once_available() {
        let stub = Stub::new(Some(3));
        let receipt = wait_for_receipt(
            &stub,
            TxHash::repeat_byte(1),
            &ConfirmationPolicy::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(receipt.success);
        assert_eq!(stub.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_within_bound() {
        let stub = Stub::new(None);
        let policy = ConfirmationPolicy::default().with_timeout(Duration::from_secs(30));
        let start = Instant::now();
        let err = wait_for_receipt(&stub, TxHash::ZERO, &policy, &CancellationToken::new())
            .await
            .unwrap_err();
        let elapsed = start.elapsed();
        assert!(matches!(err, DeployError::ConfirmationTimeout { timeout, .. } if timeout == policy.timeout));
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(31), "waited {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_wait() {
        let stub = Stub::new(None);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            trigger.cancel();
        });
        let err = wait_for_receipt(&stub, TxHash::ZERO, &ConfirmationPolicy::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Cancelled(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_extra_confirmations() {
        // Receipt lands in block 10 and the head stays at 10, so 3 confirmations never arrive.
        let stub = Stub::new(Some(1));
        let policy = ConfirmationPolicy { confirmations: 3, ..Default::default() }
            .with_timeout(Duration::from_secs(5));
        let err = wait_for_receipt(&stub, TxHash::ZERO, &policy, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::ConfirmationTimeout { .. }));

        let policy = ConfirmationPolicy { confirmations: 1, ..policy };
        assert!(wait_for_receipt(&stub, TxHash::ZERO, &policy, &CancellationToken::new())
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn block_number_failure_is_retried() {
        // Receipt in block 10, head at 20, so two confirmations are reached once the head is read.
        let stub = Stub { head: 20, head_failures: 1, ..Stub::new(Some(1)) };
        let policy = ConfirmationPolicy { confirmations: 2, ..Default::default() }
            .with_timeout(Duration::from_secs(10));
        let receipt = wait_for_receipt(&stub, TxHash::ZERO, &policy, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(receipt.block_number, Some(10));
        assert_eq!(stub.head_calls.load(Ordering::SeqCst), 2);
    }
}
