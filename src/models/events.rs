use super::address::Address;
use crate::error::ErrorKind;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Connected { account: Address },
    ConnectFailed { kind: ErrorKind, detail: String },
    Disconnected,
    SyncStarted,
    SyncCompleted { polls: usize, leaderboard: usize },
    SyncFailed { kind: ErrorKind, detail: String },
    MutationFailed { kind: ErrorKind, detail: String },
    BusyRejected,
}
