use crate::chain::{settle, Confirmation, PollContract};
use crate::error::SyncError;
use crate::models::draft::validate_poll;
use log::info;
use std::sync::Arc;

pub const DEFAULT_ALREADY_VOTED_REASON: &str = "You have already voted on this poll";

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this poll?";

/// Maps revert reasons onto the error kinds that need their own handling.
///
/// Matching is exact on the structured reason the runtime reports. A contract
/// that rewords its revert message needs its reason added here.
#[derive(Debug, Clone)]
pub struct RevertClassifier {
    already_voted: Vec<String>,
}

impl Default for RevertClassifier {
    fn default() -> Self {
        RevertClassifier::new(vec![DEFAULT_ALREADY_VOTED_REASON.to_owned()])
    }
}

impl RevertClassifier {
    pub fn new(already_voted: Vec<String>) -> Self {
        RevertClassifier { already_voted }
    }

    pub fn classify(&self, err: SyncError) -> SyncError {
        match err {
            SyncError::ExecutionReverted(Some(ref reason))
                if self.already_voted.iter().any(|known| known == reason.trim()) =>
            {
                SyncError::AlreadyVoted
            }
            other => other,
        }
    }
}

/// Submits state-changing calls and waits for the ledger to settle them.
pub struct MutationGateway {
    contract: Option<Arc<dyn PollContract>>,
    classifier: RevertClassifier,
}

impl MutationGateway {
    pub fn new(contract: Option<Arc<dyn PollContract>>, classifier: RevertClassifier) -> Self {
        MutationGateway {
            contract,
            classifier,
        }
    }

    fn contract(&self) -> Result<&dyn PollContract, SyncError> {
        self.contract.as_deref().ok_or(SyncError::NotConnected)
    }

    pub async fn create_poll(
        &self,
        question: &str,
        options: &[String],
    ) -> Result<Confirmation, SyncError> {
        let (question, options) = validate_poll(question, options)?;
        let contract = self.contract()?;
        info!("Creating poll {:?} with {} options", question, options.len());
        let pending = contract.create_poll(&question, &options).await?;
        settle(pending).await
    }

    pub async fn vote(&self, poll_id: u64, option_index: u64) -> Result<Confirmation, SyncError> {
        let contract = self.contract()?;
        info!("Voting for option {} on poll {}", option_index, poll_id);
        let pending = contract
            .vote(poll_id, option_index)
            .await
            .map_err(|e| self.classifier.classify(e))?;
        settle(pending).await.map_err(|e| self.classifier.classify(e))
    }

    /// Deletes `poll_id` once `confirm` agrees. `Ok(None)` when it declined,
    /// in which case nothing was submitted.
    pub async fn delete_poll<F>(
        &self,
        poll_id: u64,
        confirm: F,
    ) -> Result<Option<Confirmation>, SyncError>
    where
        F: FnOnce(&str) -> bool + Send,
    {
        let contract = self.contract()?;
        if !confirm(DELETE_PROMPT) {
            info!("Deletion of poll {} cancelled", poll_id);
            return Ok(None);
        }
        info!("Deleting poll {}", poll_id);
        let pending = contract.delete_poll(poll_id).await?;
        settle(pending).await.map(Some)
    }
}
