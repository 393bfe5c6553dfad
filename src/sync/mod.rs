pub mod coordinator;
pub mod gateway;
pub mod repository;

pub use coordinator::{SyncCoordinator, SyncState};
pub use gateway::{MutationGateway, RevertClassifier};
pub use repository::{load_leaderboard, load_polls};
