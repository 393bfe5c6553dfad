//! The JSON-RPC bridge backend for [`crate::chain`].

pub mod contract;
pub mod rpc;
pub mod wallet;

pub use contract::{BridgeContract, BridgePending};
pub use rpc::{RpcClient, RpcError};
pub use wallet::BridgeWallet;
