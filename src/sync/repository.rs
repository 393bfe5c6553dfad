//! Reads the contract into plain [`Poll`] and [`LeaderboardEntry`] lists.
//!
//! Slots are fetched one at a time. A slot that errors or holds a tombstone
//! is skipped and the walk carries on; only a count query failure or a
//! numeric overflow aborts the load.

use crate::chain::PollContract;
use crate::error::SyncError;
use crate::models::poll::{LeaderboardEntry, Poll, PollRecord};
use crate::models::wide::{WideUint, WideUintError};
use log::{debug, warn};

pub async fn load_polls(contract: &dyn PollContract) -> Result<Vec<Poll>, SyncError> {
    let count = contract
        .get_poll_count()
        .await?
        .to_u64()
        .map_err(|e| SyncError::numeric("poll count", e))?;
    debug!("Poll count: {}", count);

    let mut polls = Vec::new();
    for id in 0..count {
        match fetch_poll(contract, id).await {
            Ok(poll) => polls.push(poll),
            Err(SyncError::ItemUnavailable { id, reason }) => {
                warn!("Skipping poll {}: {}", id, reason);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(polls)
}

pub async fn load_leaderboard(
    contract: &dyn PollContract,
) -> Result<Vec<LeaderboardEntry>, SyncError> {
    let ids = contract.get_leaderboard().await?;
    debug!("Leaderboard ids: {:?}", ids);

    let mut entries = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.to_u64().map_err(|e| SyncError::numeric("leaderboard id", e))?;
        match fetch_poll(contract, id).await {
            Ok(poll) => entries.push(LeaderboardEntry {
                id: poll.id,
                question: poll.question,
                total_votes: poll.total_votes,
            }),
            Err(SyncError::ItemUnavailable { id, reason }) => {
                warn!("Skipping leaderboard poll {}: {}", id, reason);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(entries)
}

/// One slot. Remote errors and tombstones come back as `ItemUnavailable`.
async fn fetch_poll(contract: &dyn PollContract, id: u64) -> Result<Poll, SyncError> {
    let record = contract
        .get_poll(id)
        .await
        .map_err(|e| SyncError::ItemUnavailable {
            id,
            reason: e.to_string(),
        })?;
    if record.is_tombstone() {
        return Err(SyncError::ItemUnavailable {
            id,
            reason: "empty slot".to_owned(),
        });
    }
    normalize(id, record)
}

fn normalize(id: u64, record: PollRecord) -> Result<Poll, SyncError> {
    if record.vote_counts.len() != record.options.len() {
        return Err(SyncError::ItemUnavailable {
            id,
            reason: format!(
                "{} options but {} vote counts",
                record.options.len(),
                record.vote_counts.len()
            ),
        });
    }
    let vote_counts = record
        .vote_counts
        .iter()
        .map(|count| convert(id, "vote count", count))
        .collect::<Result<Vec<_>, _>>()?;
    let total_votes = convert(id, "total votes", &record.total_votes)?;

    Ok(Poll {
        id,
        question: record.question,
        options: record.options,
        vote_counts,
        total_votes,
        creator: record.creator,
    })
}

/// Overflow fails the whole load; a malformed value only loses its slot.
fn convert(id: u64, field: &'static str, value: &WideUint) -> Result<u64, SyncError> {
    value.to_u64().map_err(|e| match e {
        WideUintError::Overflow(value) => SyncError::NumericOverflow { field, value },
        WideUintError::Malformed(value) => SyncError::ItemUnavailable {
            id,
            reason: format!("malformed {}: {}", field, value),
        },
    })
}
