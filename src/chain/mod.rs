//! Seams to the wallet and the poll contract.
//!
//! Everything behind these traits is an external collaborator: the wallet
//! signs, the contract stores polls and tallies votes.

use crate::error::SyncError;
use crate::models::address::Address;
use crate::models::poll::PollRecord;
use crate::models::wide::WideUint;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

pub mod link;

pub use link::{ChainLink, Session};

#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn is_available(&self) -> bool;

    /// Prompts the user for account access.
    async fn request_accounts(&self) -> Result<Vec<Address>, SyncError>;

    /// Accounts already authorized, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, SyncError>;

    /// A contract handle that signs as `signer`.
    fn bind_contract(&self, contract: &Address, signer: &Address) -> Arc<dyn PollContract>;
}

#[async_trait]
pub trait PollContract: Send + Sync {
    async fn get_poll_count(&self) -> Result<WideUint, SyncError>;
    async fn get_poll(&self, id: u64) -> Result<PollRecord, SyncError>;
    async fn get_leaderboard(&self) -> Result<Vec<WideUint>, SyncError>;

    /// Submissions fail with [`SyncError::ExecutionReverted`] when the
    /// pre-submission simulation reverts.
    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
    ) -> Result<Box<dyn PendingTransaction>, SyncError>;
    async fn vote(
        &self,
        poll_id: u64,
        option_index: u64,
    ) -> Result<Box<dyn PendingTransaction>, SyncError>;
    async fn delete_poll(&self, poll_id: u64) -> Result<Box<dyn PendingTransaction>, SyncError>;
}

/// A submitted transaction waiting to be included.
#[async_trait]
pub trait PendingTransaction: Send + Sync {
    fn hash(&self) -> &str;
    async fn wait(&self) -> Result<Settlement, SyncError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub hash: String,
    pub block: Option<u64>,
}

/// How the ledger settled a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Confirmed(Confirmation),
    Reverted(Option<String>),
}

/// Blocks until `pending` settles; a revert becomes an error.
pub async fn settle(pending: Box<dyn PendingTransaction>) -> Result<Confirmation, SyncError> {
    info!("Waiting for transaction {}", pending.hash());
    match pending.wait().await? {
        Settlement::Confirmed(confirmation) => {
            info!("Transaction {} confirmed", confirmation.hash);
            Ok(confirmation)
        }
        Settlement::Reverted(reason) => {
            warn!("Transaction {} reverted: {:?}", pending.hash(), reason);
            Err(SyncError::ExecutionReverted(reason))
        }
    }
}
