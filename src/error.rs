use crate::models::wide::WideUintError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("No wallet provider is available")]
    ProviderUnavailable,
    #[error("Account access was rejected")]
    UserRejected,
    #[error("Wallet is not connected")]
    NotConnected,
    #[error("Invalid poll: {0}")]
    InvalidPoll(String),
    #[error("Numeric overflow in {field}: {value}")]
    NumericOverflow { field: &'static str, value: String },
    #[error("You have already voted on this poll")]
    AlreadyVoted,
    #[error("Execution reverted: {}", .0.as_deref().unwrap_or("no reason given"))]
    ExecutionReverted(Option<String>),
    #[error("Another operation is in progress")]
    Busy,
    /// One enumerated slot could not be used. Never leaves the repository.
    #[error("Poll {id} unavailable: {reason}")]
    ItemUnavailable { id: u64, reason: String },
    #[error("Remote call failed: {0}")]
    Remote(String),
}

/// Payload-free discriminant of [`SyncError`], carried on events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ProviderUnavailable,
    UserRejected,
    NotConnected,
    InvalidPoll,
    NumericOverflow,
    AlreadyVoted,
    ExecutionReverted,
    Busy,
    ItemUnavailable,
    Remote,
}

impl ErrorKind {
    /// Whether trying the same action again can succeed.
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::AlreadyVoted | ErrorKind::InvalidPoll)
    }
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::ProviderUnavailable => ErrorKind::ProviderUnavailable,
            SyncError::UserRejected => ErrorKind::UserRejected,
            SyncError::NotConnected => ErrorKind::NotConnected,
            SyncError::InvalidPoll(_) => ErrorKind::InvalidPoll,
            SyncError::NumericOverflow { .. } => ErrorKind::NumericOverflow,
            SyncError::AlreadyVoted => ErrorKind::AlreadyVoted,
            SyncError::ExecutionReverted(_) => ErrorKind::ExecutionReverted,
            SyncError::Busy => ErrorKind::Busy,
            SyncError::ItemUnavailable { .. } => ErrorKind::ItemUnavailable,
            SyncError::Remote(_) => ErrorKind::Remote,
        }
    }

    pub(crate) fn numeric(field: &'static str, err: WideUintError) -> Self {
        match err {
            WideUintError::Overflow(value) => SyncError::NumericOverflow { field, value },
            WideUintError::Malformed(value) => {
                SyncError::Remote(format!("malformed {}: {}", field, value))
            }
        }
    }
}
