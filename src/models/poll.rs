use super::address::Address;
use super::wide::WideUint;
use serde::{Deserialize, Serialize};

/// A poll slot as `getPoll` returns it, before any numeric conversion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PollRecord {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "voteCounts")]
    pub vote_counts: Vec<WideUint>,
    #[serde(rename = "totalVotes")]
    pub total_votes: WideUint,
    pub creator: Address,
}

impl PollRecord {
    /// Deleted or never-written slots come back with an empty question or a
    /// zero creator.
    pub fn is_tombstone(&self) -> bool {
        self.question.is_empty() || self.creator.is_zero()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    pub vote_counts: Vec<u64>,
    /// As reported by the contract, not recomputed from `vote_counts`.
    pub total_votes: u64,
    pub creator: Address,
}

impl Poll {
    /// Share of `total_votes` held by `option`, in percent. Zero when nobody voted.
    pub fn percentage(&self, option: usize) -> f64 {
        match self.vote_counts.get(option) {
            Some(&count) if self.total_votes > 0 => {
                count as f64 / self.total_votes as f64 * 100.0
            }
            _ => 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: u64,
    pub question: String,
    pub total_votes: u64,
}
