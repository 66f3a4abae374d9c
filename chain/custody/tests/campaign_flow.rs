//! End-to-end campaign and deposit-state flows
//!
//! Drives the engine the way an external client does: resolve the address,
//! initialize once, deposit from any party, withdraw as the owner, and read
//! the record back after every step.

use custody::address::{CAMPAIGN_SEED, DEPOSIT_STATE_SEED};
use custody::config::EngineConfig;
use custody::errors::CustodyError;
use custody::events::ContractEvent;
use custody::CustodyEngine;
use ledger_types::ids::Identity;

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_campaign_create_donate_withdraw() {
    init_tracing();
    let mut engine = CustodyEngine::new();
    let owner = Identity::new_unique();
    let stranger = Identity::new_unique();
    engine.fund(owner.wallet(), 2 * LAMPORTS_PER_SOL).unwrap();
    engine.fund(stranger.wallet(), LAMPORTS_PER_SOL).unwrap();

    let (campaign, _bump) = engine.derive_address(CAMPAIGN_SEED, &owner).unwrap();

    // create
    let created = engine
        .initialize(
            "test campaign",
            Some("test description"),
            5 * LAMPORTS_PER_SOL,
            &owner,
        )
        .unwrap();
    assert_eq!(created, campaign);

    let record = engine.fetch(&campaign).unwrap();
    assert_eq!(record.name, "test campaign");
    assert_eq!(record.description.as_deref(), Some("test description"));
    assert_eq!(record.target_amount, 5_000_000_000);
    assert_eq!(record.owner, owner);
    assert_eq!(record.amount_accumulated, 0);

    // donate
    engine.deposit(&campaign, 330_000_000, &owner).unwrap();
    assert_eq!(
        engine.fetch(&campaign).unwrap().amount_accumulated,
        330_000_000
    );

    // withdraw by owner
    engine.withdraw(&campaign, 100_000_000, &owner).unwrap();
    assert_eq!(
        engine.fetch(&campaign).unwrap().amount_accumulated,
        230_000_000
    );

    // withdraw by someone else
    let result = engine.withdraw(&campaign, 100_000_000, &stranger);
    assert_eq!(result, Err(CustodyError::Unauthorized));
    assert_eq!(
        engine.fetch(&campaign).unwrap().amount_accumulated,
        230_000_000
    );
}

#[test]
fn test_deposit_state_flow_with_separate_depositor() {
    init_tracing();
    let config = EngineConfig::for_namespace(DEPOSIT_STATE_SEED);
    let mut engine = CustodyEngine::with_config(config).unwrap();
    let deposit_owner = Identity::new_unique();
    let user = Identity::new_unique();
    engine.fund(deposit_owner.wallet(), LAMPORTS_PER_SOL).unwrap();
    engine.fund(user.wallet(), 2 * LAMPORTS_PER_SOL).unwrap();

    let addr = engine
        .initialize("test deposit", None, 5 * LAMPORTS_PER_SOL, &deposit_owner)
        .unwrap();
    assert_eq!(
        addr,
        engine.derive_address(DEPOSIT_STATE_SEED, &deposit_owner).unwrap().0
    );

    engine.deposit(&addr, 330_000_000, &user).unwrap();
    engine.withdraw(&addr, 100_000_000, &deposit_owner).unwrap();

    // 0.33 - 0.1 = 0.23
    assert_eq!(engine.fetch(&addr).unwrap().amount_accumulated, 230_000_000);
    assert_eq!(
        engine.held_balance(&user.wallet()),
        2 * LAMPORTS_PER_SOL - 330_000_000
    );
}

#[test]
fn test_event_trail_matches_operations() {
    let mut engine = CustodyEngine::new();
    let owner = Identity::new_unique();
    let donor = Identity::new_unique();
    engine.fund(owner.wallet(), LAMPORTS_PER_SOL).unwrap();
    engine.fund(donor.wallet(), LAMPORTS_PER_SOL).unwrap();

    let addr = engine.initialize("trail", None, 1_000, &owner).unwrap();
    engine.deposit(&addr, 600, &donor).unwrap();
    engine.withdraw(&addr, 250, &owner).unwrap();
    let refunded = engine.close(&addr, &owner).unwrap();

    let events = engine.drain_events();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.address() == &addr));

    match &events[1] {
        ContractEvent::DepositReceived(e) => {
            assert_eq!(e.depositor, donor);
            assert_eq!(e.amount_accumulated, 600);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match &events[2] {
        ContractEvent::WithdrawalExecuted(e) => assert_eq!(e.amount_accumulated, 350),
        other => panic!("unexpected event: {:?}", other),
    }
    match &events[3] {
        ContractEvent::RecordClosed(e) => assert_eq!(e.refunded, refunded),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_owner_recovers_everything_after_close() {
    let mut engine = CustodyEngine::new();
    let owner = Identity::new_unique();
    let donor = Identity::new_unique();
    engine.fund(owner.wallet(), LAMPORTS_PER_SOL).unwrap();
    engine.fund(donor.wallet(), LAMPORTS_PER_SOL).unwrap();

    let addr = engine.initialize("wind down", None, 0, &owner).unwrap();
    engine.deposit(&addr, 400_000_000, &donor).unwrap();
    engine.close(&addr, &owner).unwrap();

    assert_eq!(
        engine.held_balance(&owner.wallet()),
        LAMPORTS_PER_SOL + 400_000_000
    );
    assert_eq!(engine.held_balance(&addr), 0);
    assert!(matches!(
        engine.withdraw(&addr, 1, &owner),
        Err(CustodyError::NotFound { .. })
    ));
}
