//! Mirrors an on-chain poll contract into a local view model and submits
//! create/vote/delete transactions against it.

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod models;
pub mod sync;
pub mod websocket;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

pub use error::{ErrorKind, SyncError};
pub use sync::{SyncCoordinator, SyncState};
