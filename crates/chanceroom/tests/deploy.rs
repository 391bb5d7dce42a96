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

use std::{sync::Arc, time::Duration};

use alloy::primitives::{Address, B256, U256};
use chanceroom::{
    clone::RoomFlow,
    contracts::{FactoryService, RoomService},
    rpc::ChainRpc,
    tasks::{BootstrapPlan, VerificationOutcome, FACTORY_CONTRACT, FACTORY_IMPLEMENTATION_RECORD},
    test_utils::{
        fast_policy, mock_accounts, mock_deployer, MockChain, MOCK_DEPLOYER, MOCK_ROOM_OWNER,
    },
    Deployer, DeployError, RoomParams, Transactor,
};
use tracing_test::traced_test;

const MUMBAI: u64 = 80001;

fn room_params(nft_address: Address) -> RoomParams {
    RoomParams {
        template_name: "BlackTicket".into(),
        nft_address,
        nft_id: U256::ZERO,
        maximum_ticket: U256::from(6),
        ticket_price: U256::from(100_000_000_000_000_000u128),
        holding_time: U256::from(1_800_000),
    }
}

/// Deploys the factory, the `ChanceRoom_Sang` implementation and the `BlackTicket` template.
async fn wired_factory(deployer: &mut Deployer) -> FactoryService {
    deployer.deploy_factory().await.unwrap();
    let implementation = deployer.deploy_implementation("ChanceRoom_Sang").await.unwrap();
    deployer.add_implementation(implementation.contract.address).await.unwrap();
    deployer.deploy_template("Template_BlackTicket").await.unwrap();
    deployer.factory().unwrap()
}

#[tokio::test]
#[traced_test]
async fn bootstrap_opens_a_room_matching_its_parameters() {
    let chain = Arc::new(MockChain::new(MUMBAI));
    let mut deployer = mock_deployer(chain.clone());
    let plan = BootstrapPlan::default();

    let report = deployer.bootstrap(&plan).await.unwrap();

    assert_eq!(report.implementation_registration.names, vec!["ChanceRoom_Sang".to_string()]);
    assert_eq!(report.template.registration.names, vec!["BlackTicket".to_string()]);
    assert_eq!(report.nft.owner, MOCK_ROOM_OWNER);

    let room = &report.room;
    assert_eq!(room.layout.template_name, plan.template_name);
    assert_eq!(room.layout.nft_address, report.nft.contract.address);
    assert_eq!(room.layout.nft_id, U256::ZERO);
    assert_eq!(room.layout.maximum_ticket, plan.maximum_ticket);
    assert_eq!(room.layout.ticket_price, plan.ticket_price);
    assert_eq!(room.layout.holding_time, plan.holding_time);
    assert!(room.steps.approve.success && room.steps.clone.success && room.steps.initialize.success);

    assert_eq!(report.room_factory, report.factory.proxy.address);
    assert_eq!(report.rooms.len(), 1);
    assert_eq!(report.rooms[0].address, room.address);
    assert_eq!(report.first_token_uri, report.rooms[0].token_uri);

    let ledger = deployer.ledger();
    let names: Vec<_> = ledger.records().iter().map(|r| r.contract_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            FACTORY_IMPLEMENTATION_RECORD,
            FACTORY_CONTRACT,
            "ChanceRoom_Sang",
            "Template_BlackTicket",
            "NFT"
        ]
    );
    assert!(ledger.records().iter().all(|r| r.chain_id == MUMBAI));
    assert_eq!(report.factory.implementation.verification, VerificationOutcome::Skipped);
    report.ensure_verified().unwrap();
}

#[tokio::test]
async fn room_is_created_at_the_locally_predicted_address() {
    let chain = Arc::new(MockChain::new(MUMBAI));
    let mut deployer = mock_deployer(chain.clone());
    let factory = wired_factory(&mut deployer).await;
    let nft = deployer.mint_test_nft(MOCK_ROOM_OWNER).await.unwrap();
    let implementation = deployer.ledger().latest("ChanceRoom_Sang").unwrap().address;

    let salt = B256::repeat_byte(7);
    let room = deployer
        .new_room("ChanceRoom_Sang", salt, room_params(nft.contract.address))
        .await
        .unwrap();

    assert_eq!(
        room.address,
        chanceroom::predict_clone_address(factory.address(), implementation, salt)
    );
    let again = deployer.new_room("ChanceRoom_Sang", salt, room_params(nft.contract.address)).await;
    assert!(matches!(again, Err(DeployError::Revert { .. })));
}

#[tokio::test]
async fn initialize_before_clone_fails_with_clone_not_deployed() {
    let chain = Arc::new(MockChain::new(MUMBAI));
    let mut deployer = mock_deployer(chain.clone());
    let factory = wired_factory(&mut deployer).await;
    let nft = deployer.mint_test_nft(MOCK_ROOM_OWNER).await.unwrap();

    let predicted = factory.determine_room_address("ChanceRoom_Sang", B256::ZERO).await.unwrap();
    let tx = Transactor::new(chain.clone()).with_policy(fast_policy());
    let room = RoomService::new(predicted, tx);
    let sent_before = chain.sent_transactions().await.len();

    let err = room.initialize(MOCK_ROOM_OWNER, &room_params(nft.contract.address)).await.unwrap_err();

    assert!(matches!(err, DeployError::CloneNotDeployed(address) if address == predicted));
    assert_eq!(chain.sent_transactions().await.len(), sent_before);
}

#[tokio::test]
async fn approved_clone_initializes_through_the_typestate_flow() {
    let chain = Arc::new(MockChain::new(MUMBAI));
    let mut deployer = mock_deployer(chain.clone());
    let factory = wired_factory(&mut deployer).await;
    let nft = deployer.mint_test_nft(MOCK_ROOM_OWNER).await.unwrap();
    let tx = Transactor::new(chain.clone()).with_policy(fast_policy());

    let predicted = RoomFlow::new(factory, tx, MOCK_ROOM_OWNER, room_params(nft.contract.address))
        .predict("ChanceRoom_Sang", B256::ZERO)
        .await
        .unwrap();
    let address = predicted.address();
    let approved = predicted.approve().await.unwrap();
    assert!(chain.code_at(address).await.unwrap().is_empty());

    let cloned = approved.clone_room().await.unwrap();
    assert!(!chain.code_at(address).await.unwrap().is_empty());

    let room = cloned.initialize().await.unwrap();
    assert_eq!(room.address, address);
    assert_eq!(room.layout.template_name, "BlackTicket");
}

#[tokio::test]
async fn unknown_implementation_cannot_be_predicted() {
    let chain = Arc::new(MockChain::new(MUMBAI));
    let mut deployer = mock_deployer(chain);
    wired_factory(&mut deployer).await;

    let err = deployer
        .new_room("ChanceRoom_Unknown", B256::ZERO, room_params(Address::ZERO))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ChanceRoom_Unknown"));
}

#[tokio::test]
async fn mined_revert_is_replayed_for_its_reason() {
    let chain = Arc::new(MockChain::new(MUMBAI).mine_reverts());
    let mut deployer = mock_deployer(chain.clone());
    let factory = wired_factory(&mut deployer).await;
    let template = deployer.ledger().latest("Template_BlackTicket").unwrap().address;

    let err = factory.add_template(MOCK_ROOM_OWNER, template).await.unwrap_err();
    match err {
        DeployError::Revert { tx_hash, reason } => {
            assert!(tx_hash.is_some());
            assert_eq!(reason, "Ownable: caller is not the owner");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn duplicate_registration_reverts_before_sending() {
    let chain = Arc::new(MockChain::new(MUMBAI));
    let mut deployer = mock_deployer(chain.clone());
    wired_factory(&mut deployer).await;
    let implementation = deployer.ledger().latest("ChanceRoom_Sang").unwrap().address;

    let err = deployer.add_implementation(implementation).await.unwrap_err();
    assert!(matches!(err, DeployError::Revert { tx_hash: None, .. }));
    assert_eq!(err.exit_code(), 4);

    let (implementations, templates) = deployer.names().await.unwrap();
    assert_eq!(implementations, vec!["ChanceRoom_Sang".to_string()]);
    assert_eq!(templates, vec!["BlackTicket".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn withheld_receipt_times_out() {
    let chain = Arc::new(MockChain::new(MUMBAI).withhold_receipts());
    let tx = Transactor::new(chain.clone())
        .with_policy(fast_policy().with_timeout(Duration::from_secs(30)));
    let mut deployer = Deployer::new(
        MUMBAI,
        tx,
        mock_accounts(),
        chain.artifacts(),
        chanceroom::DeploymentLedger::in_memory(MUMBAI),
    );

    let started = tokio::time::Instant::now();
    let err = deployer.deploy_factory().await.unwrap_err();

    assert!(matches!(
        err,
        DeployError::ConfirmationTimeout { timeout, .. } if timeout == Duration::from_secs(30)
    ));
    assert!(started.elapsed() <= Duration::from_secs(31));
    assert!(deployer.ledger().records().is_empty());
}

#[tokio::test]
async fn delayed_receipts_are_polled_until_available() {
    let chain = Arc::new(MockChain::new(MUMBAI).with_receipt_delay(3));
    let mut deployer = mock_deployer(chain);
    let deployment = deployer.deploy_factory().await.unwrap();
    assert!(deployment.proxy.outcome.success);
}

#[tokio::test]
async fn factory_operations_need_a_factory() {
    let chain = Arc::new(MockChain::new(1));
    let deployer = mock_deployer(chain);
    let err = deployer.names().await.unwrap_err();
    assert!(matches!(err, DeployError::Configuration(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn deploy_fee_uses_placeholder_arguments() {
    let chain = Arc::new(MockChain::new(MUMBAI).with_gas_price(2_000_000_000));
    let deployer = mock_deployer(chain);

    let estimate = deployer.estimate_deploy_fee("ChanceRoom_Sang").await.unwrap();
    // 32 byte marker plus one address argument.
    assert_eq!(estimate.gas, 21_000 + 16 * 64);
    assert_eq!(estimate.gas_price, 2_000_000_000);
    assert_eq!(estimate.fee_wei, U256::from(estimate.gas) * U256::from(2_000_000_000u64));
}

#[tokio::test]
async fn deployer_sends_from_the_deployer_account() {
    let chain = Arc::new(MockChain::new(MUMBAI));
    let mut deployer = mock_deployer(chain.clone());
    deployer.deploy_factory().await.unwrap();
    let sent = chain.sent_transactions().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|tx| tx.from == MOCK_DEPLOYER && tx.to.is_none()));
}
