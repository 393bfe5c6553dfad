use super::contract::BridgeContract;
use super::rpc::RpcClient;
use crate::chain::{PollContract, WalletProvider};
use crate::error::SyncError;
use crate::models::address::Address;
use async_trait::async_trait;
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// A wallet reached through the JSON-RPC bridge.
pub struct BridgeWallet {
    rpc: Arc<RpcClient>,
    receipt_interval: Duration,
}

impl BridgeWallet {
    pub fn new(rpc: Arc<RpcClient>, receipt_interval: Duration) -> Self {
        BridgeWallet {
            rpc,
            receipt_interval,
        }
    }

    async fn fetch_accounts(&self, method: &str) -> Result<Vec<Address>, SyncError> {
        match self.rpc.request::<Vec<Address>>(method, json!([])).await {
            Ok(accounts) => {
                info!("{} returned {} account(s)", method, accounts.len());
                Ok(accounts)
            }
            Err(e) if e.is_unreachable() => {
                error!("Wallet bridge unreachable at {}: {}", self.rpc.url(), e);
                Err(SyncError::ProviderUnavailable)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl WalletProvider for BridgeWallet {
    fn is_available(&self) -> bool {
        !self.rpc.url().is_empty()
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, SyncError> {
        self.fetch_accounts("eth_requestAccounts").await
    }

    async fn accounts(&self) -> Result<Vec<Address>, SyncError> {
        self.fetch_accounts("eth_accounts").await
    }

    fn bind_contract(&self, contract: &Address, signer: &Address) -> Arc<dyn PollContract> {
        Arc::new(BridgeContract::new(
            self.rpc.clone(),
            contract.clone(),
            signer.clone(),
            self.receipt_interval,
        ))
    }
}
