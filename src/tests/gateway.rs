use crate::chain::PollContract;
use crate::error::SyncError;
use crate::mock::*;
use crate::sync::{MutationGateway, RevertClassifier};
use std::sync::Arc;

fn gateway(ledger: &Arc<MockLedger>, signer: crate::models::address::Address) -> MutationGateway {
    let contract: Arc<dyn PollContract> = Arc::new(MockContract::new(ledger.clone(), signer));
    MutationGateway::new(Some(contract), RevertClassifier::default())
}

fn open_poll() -> Arc<MockLedger> {
    MockLedger::new(vec![record("Lunch?", &["Pizza", "Sushi"], &[0, 0], alice())])
}

#[tokio::test]
async fn one_real_option_is_rejected_locally() {
    let ledger = open_poll();
    let result = gateway(&ledger, alice())
        .create_poll("Q", &["A".to_owned(), "".to_owned()])
        .await;
    assert!(matches!(result, Err(SyncError::InvalidPoll(_))));

    let state = ledger.state();
    assert_eq!(state.submissions, 0);
    assert_eq!(state.reads, 0);
}

#[tokio::test]
async fn create_waits_for_confirmation() {
    let ledger = open_poll();
    let options = vec!["Yes".to_owned(), " ".to_owned(), "No".to_owned()];
    let confirmation = gateway(&ledger, bob())
        .create_poll("Ship it?", &options)
        .await
        .unwrap();
    assert_eq!(confirmation.block, Some(1));

    let state = ledger.state();
    assert_eq!(state.slots.len(), 2);
    assert_eq!(state.slots[1].options, vec!["Yes".to_owned(), "No".to_owned()]);
    assert_eq!(state.slots[1].creator, bob());
}

#[tokio::test]
async fn vote_needs_a_contract() {
    let gateway = MutationGateway::new(None, RevertClassifier::default());
    assert_eq!(gateway.vote(0, 0).await, Err(SyncError::NotConnected));
    assert_eq!(
        gateway.delete_poll(0, |_| true).await,
        Err(SyncError::NotConnected)
    );
}

#[tokio::test]
async fn second_vote_is_already_voted() {
    let ledger = open_poll();
    let gateway = gateway(&ledger, bob());
    assert!(gateway.vote(0, 1).await.is_ok());
    assert_eq!(gateway.vote(0, 0).await, Err(SyncError::AlreadyVoted));
    assert_eq!(ledger.state().submissions, 2);
}

#[tokio::test]
async fn unknown_reason_stays_a_generic_revert() {
    let ledger = open_poll();
    let contract: Arc<dyn PollContract> = Arc::new(MockContract::new(ledger.clone(), bob()));
    let gateway = MutationGateway::new(
        Some(contract),
        RevertClassifier::new(vec!["Already voted".to_owned()]),
    );
    gateway.vote(0, 0).await.unwrap();
    assert_eq!(
        gateway.vote(0, 0).await,
        Err(SyncError::ExecutionReverted(Some(ALREADY_VOTED.to_owned())))
    );
}

#[tokio::test]
async fn revert_while_waiting_carries_reason() {
    let ledger = open_poll();
    ledger.state().revert_on_wait = Some("Poll closed".to_owned());
    assert_eq!(
        gateway(&ledger, bob()).vote(0, 0).await,
        Err(SyncError::ExecutionReverted(Some("Poll closed".to_owned())))
    );
    assert_eq!(ledger.state().slots[0].total_votes.to_u64(), Ok(0));
}

#[tokio::test]
async fn declined_delete_submits_nothing() {
    let ledger = open_poll();
    let mut asked = None;
    let result = gateway(&ledger, alice())
        .delete_poll(0, |prompt| {
            asked = Some(prompt.to_owned());
            false
        })
        .await;
    assert_eq!(result, Ok(None));
    assert_eq!(asked.as_deref(), Some(crate::sync::gateway::DELETE_PROMPT));
    assert_eq!(ledger.state().submissions, 0);
}

/// Creator identity is not checked locally; the contract refuses.
#[tokio::test]
async fn delete_by_stranger_reaches_the_contract() {
    let ledger = open_poll();
    let result = gateway(&ledger, bob()).delete_poll(0, |_| true).await;
    assert!(matches!(result, Err(SyncError::ExecutionReverted(Some(_)))));
    assert_eq!(ledger.state().submissions, 1);
    assert!(!ledger.state().slots[0].is_tombstone());
}

#[tokio::test]
async fn creator_deletes() {
    let ledger = open_poll();
    let confirmation = gateway(&ledger, alice()).delete_poll(0, |_| true).await.unwrap();
    assert!(confirmation.is_some());
    assert!(ledger.state().slots[0].is_tombstone());
}
