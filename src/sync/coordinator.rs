//! Owns the view model and serializes everything that touches it.
//!
//! At most one connect, sync or mutation runs at a time. The state flag is
//! claimed under the lock before the first `.await`, and every operation
//! carries the epoch it started in: an account change bumps the epoch, and
//! results from an older epoch are dropped on arrival.

use super::gateway::{MutationGateway, RevertClassifier};
use super::repository::{load_leaderboard, load_polls};
use crate::chain::{ChainLink, PollContract, Session};
use crate::error::SyncError;
use crate::models::address::Address;
use crate::models::draft::{validate_poll, PollDraft};
use crate::models::events::SyncEvent;
use crate::models::view::ViewModel;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Connecting,
    Syncing,
    Mutating,
    Error,
}

impl SyncState {
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SyncState::Connecting | SyncState::Syncing | SyncState::Mutating
        )
    }
}

struct Inner {
    state: SyncState,
    view: ViewModel,
    session: Option<Session>,
    epoch: u64,
}

/// The context an operation was started in.
struct Ticket {
    epoch: u64,
    session: Option<Session>,
}

pub struct SyncCoordinator {
    link: ChainLink,
    classifier: RevertClassifier,
    inner: Mutex<Inner>,
    events: UnboundedSender<SyncEvent>,
}

impl SyncCoordinator {
    pub fn new(
        link: ChainLink,
        classifier: RevertClassifier,
        events: UnboundedSender<SyncEvent>,
    ) -> Self {
        SyncCoordinator {
            link,
            classifier,
            inner: Mutex::new(Inner {
                state: SyncState::Idle,
                view: ViewModel::default(),
                session: None,
                epoch: 0,
            }),
            events,
        }
    }

    pub fn view(&self) -> ViewModel {
        self.lock().view.clone()
    }

    pub fn state(&self) -> SyncState {
        self.lock().state
    }

    pub fn account(&self) -> Option<Address> {
        self.lock().view.account.clone()
    }

    /// Startup: picks up an already-authorized account without prompting.
    pub async fn start(&self) -> Result<(), SyncError> {
        let ticket = self.begin(SyncState::Connecting, "Checking wallet")?;
        match self.link.resume().await {
            Ok(Some(session)) => self.attach_and_sync(ticket, session).await,
            Ok(None) => {
                info!("No authorized account, waiting for connect");
                let mut inner = self.lock();
                if inner.epoch == ticket.epoch {
                    inner.state = SyncState::Idle;
                    inner.view.loading = false;
                    inner.view.status_message = "Not connected".to_owned();
                }
                Ok(())
            }
            Err(e) => Err(self.fail(&ticket, e, Failure::Connect)),
        }
    }

    /// Prompts the wallet for access, then syncs.
    pub async fn connect(&self) -> Result<(), SyncError> {
        let ticket = self.begin(SyncState::Connecting, "Connecting wallet")?;
        match self.link.connect().await {
            Ok(session) => self.attach_and_sync(ticket, session).await,
            Err(e) => Err(self.fail(&ticket, e, Failure::Connect)),
        }
    }

    /// Re-reads polls and leaderboard for the current account.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let ticket = self.begin(SyncState::Syncing, "Syncing")?;
        self.sync(ticket).await
    }

    pub async fn create_poll(&self, question: &str, options: &[String]) -> Result<(), SyncError> {
        let (question, options) = validate_poll(question, options).map_err(|e| {
            self.emit(SyncEvent::MutationFailed {
                kind: e.kind(),
                detail: e.to_string(),
            });
            e
        })?;
        let ticket = self.begin(SyncState::Mutating, "Creating poll")?;
        let result = self.gateway(&ticket).create_poll(&question, &options).await;
        match result {
            Ok(_) => self.sync(ticket).await,
            Err(e) => Err(self.fail(&ticket, e, Failure::Mutation)),
        }
    }

    /// Submits the draft and clears it once the poll is on chain.
    pub async fn create_from_draft(&self, draft: &mut PollDraft) -> Result<(), SyncError> {
        let (question, options) = draft.submission()?;
        self.create_poll(&question, &options).await?;
        draft.reset();
        Ok(())
    }

    /// Casts a vote. The local "already voted" hint is never consulted here:
    /// the contract is the one that refuses a second vote.
    pub async fn vote(&self, poll_id: u64, option_index: u64) -> Result<(), SyncError> {
        let ticket = self.begin(SyncState::Mutating, "Submitting vote")?;
        let result = self.gateway(&ticket).vote(poll_id, option_index).await;
        match result {
            Ok(_) => {
                self.lock().view.locally_voted.insert(poll_id);
                self.sync(ticket).await
            }
            Err(e) => Err(self.fail(&ticket, e, Failure::Mutation)),
        }
    }

    /// Deletes a poll after `confirm` agrees. Returns whether anything was
    /// submitted.
    pub async fn delete_poll<F>(&self, poll_id: u64, confirm: F) -> Result<bool, SyncError>
    where
        F: FnOnce(&str) -> bool + Send,
    {
        let ticket = self.begin(SyncState::Mutating, "Deleting poll")?;
        let result = self.gateway(&ticket).delete_poll(poll_id, confirm).await;
        match result {
            Ok(Some(_)) => self.sync(ticket).await.map(|_| true),
            Ok(None) => {
                self.settle_idle(&ticket, "Deletion cancelled");
                Ok(false)
            }
            Err(e) => Err(self.fail(&ticket, e, Failure::Mutation)),
        }
    }

    /// The wallet switched accounts. Anything still in flight for the old
    /// account finishes, but its results are dropped.
    pub async fn on_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), SyncError> {
        let ticket = {
            let mut inner = self.lock();
            inner.epoch += 1;
            match accounts.into_iter().next() {
                None => {
                    info!("Wallet disconnected");
                    inner.session = None;
                    inner.state = SyncState::Idle;
                    inner.view.account = None;
                    inner.view.polls.clear();
                    inner.view.leaderboard.clear();
                    inner.view.loading = false;
                    inner.view.status_message = "Disconnected".to_owned();
                    None
                }
                Some(address) => {
                    info!("Account changed to {}", address);
                    let session = self.link.rebind(address.clone());
                    inner.session = Some(session.clone());
                    inner.state = SyncState::Connecting;
                    inner.view.account = Some(address);
                    inner.view.loading = true;
                    inner.view.status_message = "Account changed".to_owned();
                    Some(Ticket {
                        epoch: inner.epoch,
                        session: Some(session),
                    })
                }
            }
        };

        match ticket {
            Some(ticket) => {
                if let Some(session) = &ticket.session {
                    self.emit(SyncEvent::Connected {
                        account: session.address.clone(),
                    });
                }
                self.sync(ticket).await
            }
            None => {
                self.emit(SyncEvent::Disconnected);
                Ok(())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SyncEvent) {
        debug!("Event: {:?}", event);
        let _ = self.events.send(event);
    }

    fn gateway(&self, ticket: &Ticket) -> MutationGateway {
        let contract: Option<Arc<dyn PollContract>> =
            ticket.session.as_ref().map(|s| s.contract.clone());
        MutationGateway::new(contract, self.classifier.clone())
    }

    /// Claims the state flag, or rejects with `Busy` leaving everything as is.
    fn begin(&self, next: SyncState, status: &str) -> Result<Ticket, SyncError> {
        let ticket = {
            let mut inner = self.lock();
            if inner.state.is_busy() {
                None
            } else {
                inner.state = next;
                inner.view.loading = true;
                inner.view.status_message = status.to_owned();
                Some(Ticket {
                    epoch: inner.epoch,
                    session: inner.session.clone(),
                })
            }
        };
        ticket.ok_or_else(|| {
            warn!("Rejected {:?} request: another operation is running", next);
            self.emit(SyncEvent::BusyRejected);
            SyncError::Busy
        })
    }

    async fn attach_and_sync(&self, mut ticket: Ticket, session: Session) -> Result<(), SyncError> {
        {
            let mut inner = self.lock();
            if inner.epoch != ticket.epoch {
                debug!("Dropping connect result for {}: account changed", session.address);
                return Ok(());
            }
            inner.session = Some(session.clone());
            inner.view.account = Some(session.address.clone());
        }
        self.emit(SyncEvent::Connected {
            account: session.address.clone(),
        });
        ticket.session = Some(session);
        self.sync(ticket).await
    }

    async fn sync(&self, ticket: Ticket) -> Result<(), SyncError> {
        {
            let mut inner = self.lock();
            if inner.epoch == ticket.epoch {
                inner.state = SyncState::Syncing;
                inner.view.loading = true;
            }
        }
        self.emit(SyncEvent::SyncStarted);

        let contract = match &ticket.session {
            Some(session) => session.contract.clone(),
            None => return Err(self.fail(&ticket, SyncError::NotConnected, Failure::Sync)),
        };

        let loaded = async {
            let polls = load_polls(contract.as_ref()).await?;
            let leaderboard = load_leaderboard(contract.as_ref()).await?;
            Ok::<_, SyncError>((polls, leaderboard))
        }
        .await;

        let (polls, leaderboard) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.fail(&ticket, e, Failure::Sync)),
        };

        let counts = (polls.len(), leaderboard.len());
        {
            let mut inner = self.lock();
            if inner.epoch != ticket.epoch {
                debug!("Dropping sync result from a previous account");
                return Ok(());
            }
            inner.view.polls = polls;
            inner.view.leaderboard = leaderboard;
            inner.view.loading = false;
            inner.view.status_message = format!("Synced {} polls", counts.0);
            inner.state = SyncState::Idle;
        }
        info!("Synced {} polls, {} leaderboard entries", counts.0, counts.1);
        self.emit(SyncEvent::SyncCompleted {
            polls: counts.0,
            leaderboard: counts.1,
        });
        Ok(())
    }

    fn settle_idle(&self, ticket: &Ticket, status: &str) {
        let mut inner = self.lock();
        if inner.epoch == ticket.epoch {
            inner.state = SyncState::Idle;
            inner.view.loading = false;
            inner.view.status_message = status.to_owned();
        }
    }

    /// Surfaces `err` through `Error` and back to `Idle`. Returns it for the caller.
    /// A failure from a replaced account context is only logged.
    fn fail(&self, ticket: &Ticket, err: SyncError, failure: Failure) -> SyncError {
        let current = {
            let mut inner = self.lock();
            let current = inner.epoch == ticket.epoch;
            if current {
                inner.state = SyncState::Error;
                inner.view.loading = false;
                inner.view.status_message = err.to_string();
            }
            current
        };
        if !current {
            debug!("Dropping {:?} failure from a previous account: {}", failure, err);
            return err;
        }
        error!("{:?} failed: {}", failure, err);

        let (kind, detail) = (err.kind(), err.to_string());
        self.emit(match failure {
            Failure::Connect => SyncEvent::ConnectFailed { kind, detail },
            Failure::Sync => SyncEvent::SyncFailed { kind, detail },
            Failure::Mutation => SyncEvent::MutationFailed { kind, detail },
        });

        let mut inner = self.lock();
        if inner.epoch == ticket.epoch && inner.state == SyncState::Error {
            inner.state = SyncState::Idle;
        }
        err
    }
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Connect,
    Sync,
    Mutation,
}
