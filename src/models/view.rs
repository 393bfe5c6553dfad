use super::address::Address;
use super::poll::{LeaderboardEntry, Poll};
use std::collections::BTreeSet;

/// Everything the presentation layer renders. Rebuilt by the coordinator on
/// each sync, never patched item by item.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub account: Option<Address>,
    pub polls: Vec<Poll>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub loading: bool,
    /// Polls voted on from this process. A display hint only; the contract
    /// decides whether a vote is accepted.
    pub locally_voted: BTreeSet<u64>,
    pub status_message: String,
}

impl Default for ViewModel {
    fn default() -> Self {
        ViewModel {
            account: None,
            polls: Vec::new(),
            leaderboard: Vec::new(),
            loading: true,
            locally_voted: BTreeSet::new(),
            status_message: "Idle".to_owned(),
        }
    }
}

impl ViewModel {
    /// Leaderboard rows paired with their 1-based rank.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &LeaderboardEntry)> {
        self.leaderboard.iter().enumerate().map(|(i, entry)| (i + 1, entry))
    }

    pub fn has_voted_hint(&self, poll_id: u64) -> bool {
        self.locally_voted.contains(&poll_id)
    }

    /// Whether to offer deletion. The contract still enforces it.
    pub fn can_delete(&self, poll: &Poll) -> bool {
        self.account.as_ref() == Some(&poll.creator)
    }
}
