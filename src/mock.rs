//! In-memory wallet and poll contract for tests.

use crate::chain::{
    ChainLink, Confirmation, PendingTransaction, PollContract, Settlement, WalletProvider,
};
use crate::error::SyncError;
use crate::models::address::Address;
use crate::models::events::SyncEvent;
use crate::models::poll::PollRecord;
use crate::models::wide::WideUint;
use crate::sync::{RevertClassifier, SyncCoordinator};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::Notify;

pub const ALREADY_VOTED: &str = "You have already voted on this poll";

pub fn address(n: u64) -> Address {
    format!("0x{:040x}", n).parse().unwrap()
}

pub fn alice() -> Address {
    address(0xa11ce)
}

pub fn bob() -> Address {
    address(0xb0b)
}

pub fn record(question: &str, options: &[&str], counts: &[u64], creator: Address) -> PollRecord {
    PollRecord {
        question: question.to_owned(),
        options: options.iter().map(|o| o.to_string()).collect(),
        vote_counts: counts.iter().map(|&c| WideUint::Number(c)).collect(),
        total_votes: WideUint::Number(counts.iter().sum()),
        creator,
    }
}

pub fn tombstone() -> PollRecord {
    record("", &[], &[], Address::zero())
}

#[derive(Default)]
pub struct LedgerState {
    pub slots: Vec<PollRecord>,
    /// Overrides the slot count reported by `getPollCount`.
    pub count: Option<WideUint>,
    pub count_fails: bool,
    /// Slot ids whose `getPoll` raises.
    pub broken: HashSet<u64>,
    pub leaderboard: Vec<WideUint>,
    pub voters: HashSet<(Address, u64)>,
    /// Every read issued against the contract.
    pub reads: usize,
    /// Every submission attempt, including ones the simulation rejects.
    pub submissions: usize,
    /// Makes the next confirmation wait report a revert.
    pub revert_on_wait: Option<String>,
    next_hash: u64,
}

#[derive(Default)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
    gate: Mutex<Option<Arc<Notify>>>,
    read_gate: Mutex<Option<Arc<Notify>>>,
    /// Signalled whenever a transaction starts waiting for confirmation.
    pub submitted: Notify,
    /// Signalled whenever a `getPoll` read starts.
    pub reading: Notify,
}

impl MockLedger {
    pub fn new(slots: Vec<PollRecord>) -> Arc<Self> {
        let ledger = MockLedger::default();
        ledger.state().slots = slots;
        Arc::new(ledger)
    }

    pub fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap()
    }

    /// Holds every confirmation until the returned notify fires.
    pub fn hold_confirmations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Holds every `getPoll` read until [`MockLedger::release_reads`].
    pub fn hold_reads(&self) {
        *self.read_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release_reads(&self) {
        if let Some(gate) = self.read_gate.lock().unwrap().take() {
            gate.notify_waiters();
        }
    }

    fn apply(&self, action: &Action) {
        let mut state = self.state();
        match action {
            Action::Create { question, options, creator } => {
                let opts: Vec<&str> = options.iter().map(String::as_str).collect();
                let counts = vec![0; options.len()];
                state.slots.push(record(question, &opts, &counts, creator.clone()));
            }
            Action::Vote { voter, poll, option } => {
                state.voters.insert((voter.clone(), *poll));
                let slot = &mut state.slots[*poll as usize];
                let count = slot.vote_counts[*option as usize].to_u64().unwrap();
                slot.vote_counts[*option as usize] = WideUint::Number(count + 1);
                let total = slot.total_votes.to_u64().unwrap();
                slot.total_votes = WideUint::Number(total + 1);
            }
            Action::Delete { poll } => {
                state.slots[*poll as usize] = tombstone();
            }
        }
    }
}

enum Action {
    Create { question: String, options: Vec<String>, creator: Address },
    Vote { voter: Address, poll: u64, option: u64 },
    Delete { poll: u64 },
}

pub struct MockContract {
    ledger: Arc<MockLedger>,
    signer: Address,
}

impl MockContract {
    pub fn new(ledger: Arc<MockLedger>, signer: Address) -> Self {
        MockContract { ledger, signer }
    }

    fn pending(&self, action: Action) -> Box<dyn PendingTransaction> {
        let mut state = self.ledger.state();
        state.next_hash += 1;
        Box::new(MockPending {
            ledger: self.ledger.clone(),
            hash: format!("0x{:064x}", state.next_hash),
            action,
        })
    }

    fn live_slot(state: &LedgerState, poll: u64) -> Option<&PollRecord> {
        state.slots.get(poll as usize).filter(|slot| !slot.is_tombstone())
    }
}

fn revert(reason: &str) -> SyncError {
    SyncError::ExecutionReverted(Some(reason.to_owned()))
}

#[async_trait]
impl PollContract for MockContract {
    async fn get_poll_count(&self) -> Result<WideUint, SyncError> {
        let mut state = self.ledger.state();
        state.reads += 1;
        if state.count_fails {
            return Err(SyncError::Remote("getPollCount failed".to_owned()));
        }
        Ok(state
            .count
            .clone()
            .unwrap_or(WideUint::Number(state.slots.len() as u64)))
    }

    async fn get_poll(&self, id: u64) -> Result<PollRecord, SyncError> {
        let gate = self.ledger.read_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let released = gate.notified();
            self.ledger.reading.notify_one();
            released.await;
        }
        let mut state = self.ledger.state();
        state.reads += 1;
        if state.broken.contains(&id) {
            return Err(SyncError::Remote(format!("call exception on getPoll({})", id)));
        }
        state
            .slots
            .get(id as usize)
            .cloned()
            .ok_or_else(|| SyncError::Remote("index out of range".to_owned()))
    }

    async fn get_leaderboard(&self) -> Result<Vec<WideUint>, SyncError> {
        let mut state = self.ledger.state();
        state.reads += 1;
        Ok(state.leaderboard.clone())
    }

    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
    ) -> Result<Box<dyn PendingTransaction>, SyncError> {
        self.ledger.state().submissions += 1;
        Ok(self.pending(Action::Create {
            question: question.to_owned(),
            options: options.to_vec(),
            creator: self.signer.clone(),
        }))
    }

    async fn vote(
        &self,
        poll_id: u64,
        option_index: u64,
    ) -> Result<Box<dyn PendingTransaction>, SyncError> {
        {
            let mut state = self.ledger.state();
            state.submissions += 1;
            let slot = Self::live_slot(&state, poll_id).ok_or_else(|| revert("Poll does not exist"))?;
            if option_index as usize >= slot.options.len() {
                return Err(revert("Invalid option"));
            }
            if state.voters.contains(&(self.signer.clone(), poll_id)) {
                return Err(revert(ALREADY_VOTED));
            }
        }
        Ok(self.pending(Action::Vote {
            voter: self.signer.clone(),
            poll: poll_id,
            option: option_index,
        }))
    }

    async fn delete_poll(&self, poll_id: u64) -> Result<Box<dyn PendingTransaction>, SyncError> {
        {
            let mut state = self.ledger.state();
            state.submissions += 1;
            let slot = Self::live_slot(&state, poll_id).ok_or_else(|| revert("Poll does not exist"))?;
            if slot.creator != self.signer {
                return Err(revert("Only the creator can delete this poll"));
            }
        }
        Ok(self.pending(Action::Delete { poll: poll_id }))
    }
}

pub struct MockPending {
    ledger: Arc<MockLedger>,
    hash: String,
    action: Action,
}

#[async_trait]
impl PendingTransaction for MockPending {
    fn hash(&self) -> &str {
        &self.hash
    }

    async fn wait(&self) -> Result<Settlement, SyncError> {
        self.ledger.submitted.notify_one();
        let gate = self.ledger.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(reason) = self.ledger.state().revert_on_wait.take() {
            return Ok(Settlement::Reverted(Some(reason)));
        }
        self.ledger.apply(&self.action);
        Ok(Settlement::Confirmed(Confirmation {
            hash: self.hash.clone(),
            block: Some(1),
        }))
    }
}

pub struct MockWallet {
    pub ledger: Arc<MockLedger>,
    pub available: bool,
    pub rejects: bool,
    /// Returned by the prompting request.
    pub grants: Vec<Address>,
    /// Returned by the silent lookup.
    pub authorized: Vec<Address>,
}

impl MockWallet {
    pub fn new(ledger: Arc<MockLedger>) -> Self {
        MockWallet {
            ledger,
            available: true,
            rejects: false,
            grants: vec![alice()],
            authorized: Vec::new(),
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, SyncError> {
        if self.rejects {
            return Err(SyncError::UserRejected);
        }
        Ok(self.grants.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, SyncError> {
        Ok(self.authorized.clone())
    }

    fn bind_contract(&self, _contract: &Address, signer: &Address) -> Arc<dyn PollContract> {
        Arc::new(MockContract::new(self.ledger.clone(), signer.clone()))
    }
}

pub fn contract_address() -> Address {
    address(0xc0de)
}

pub fn new_coordinator(wallet: MockWallet) -> (Arc<SyncCoordinator>, UnboundedReceiver<SyncEvent>) {
    let (sender, receiver) = unbounded_channel();
    let link = ChainLink::new(Arc::new(wallet), contract_address());
    let coordinator = SyncCoordinator::new(link, RevertClassifier::default(), sender);
    (Arc::new(coordinator), receiver)
}

pub fn drain(receiver: &mut UnboundedReceiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
