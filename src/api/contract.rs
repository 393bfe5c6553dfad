use super::rpc::RpcClient;
use crate::chain::{Confirmation, PendingTransaction, PollContract, Settlement};
use crate::error::SyncError;
use crate::models::address::Address;
use crate::models::poll::PollRecord;
use crate::models::rpc::{ContractCall, TransactionReceipt};
use crate::models::wide::WideUint;
use async_trait::async_trait;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// The poll contract at `address`, signing as `signer`.
pub struct BridgeContract {
    rpc: Arc<RpcClient>,
    address: Address,
    signer: Address,
    receipt_interval: Duration,
}

impl BridgeContract {
    pub fn new(
        rpc: Arc<RpcClient>,
        address: Address,
        signer: Address,
        receipt_interval: Duration,
    ) -> Self {
        BridgeContract {
            rpc,
            address,
            signer,
            receipt_interval,
        }
    }

    fn params(&self, function: &str, args: Value) -> Value {
        let call = ContractCall {
            to: &self.address,
            from: &self.signer,
            function,
            args,
        };
        json!([call])
    }

    async fn call<T: DeserializeOwned>(&self, function: &str, args: Value) -> Result<T, SyncError> {
        let result = self
            .rpc
            .request::<T>("contract_call", self.params(function, args))
            .await?;
        Ok(result)
    }

    async fn send(
        &self,
        function: &str,
        args: Value,
    ) -> Result<Box<dyn PendingTransaction>, SyncError> {
        let hash: String = self
            .rpc
            .request("contract_send", self.params(function, args))
            .await?;
        info!("{} submitted as {}", function, hash);
        Ok(Box::new(BridgePending {
            rpc: self.rpc.clone(),
            hash,
            interval: self.receipt_interval,
        }))
    }
}

#[async_trait]
impl PollContract for BridgeContract {
    async fn get_poll_count(&self) -> Result<WideUint, SyncError> {
        self.call("getPollCount", json!([])).await
    }

    async fn get_poll(&self, id: u64) -> Result<PollRecord, SyncError> {
        self.call("getPoll", json!([id])).await
    }

    async fn get_leaderboard(&self) -> Result<Vec<WideUint>, SyncError> {
        self.call("getLeaderboard", json!([])).await
    }

    async fn create_poll(
        &self,
        question: &str,
        options: &[String],
    ) -> Result<Box<dyn PendingTransaction>, SyncError> {
        self.send("createPoll", json!([question, options])).await
    }

    async fn vote(
        &self,
        poll_id: u64,
        option_index: u64,
    ) -> Result<Box<dyn PendingTransaction>, SyncError> {
        self.send("vote", json!([poll_id, option_index])).await
    }

    async fn delete_poll(&self, poll_id: u64) -> Result<Box<dyn PendingTransaction>, SyncError> {
        self.send("deletePoll", json!([poll_id])).await
    }
}

/// Polls for the receipt of `hash` until the bridge has one.
pub struct BridgePending {
    rpc: Arc<RpcClient>,
    hash: String,
    interval: Duration,
}

#[async_trait]
impl PendingTransaction for BridgePending {
    fn hash(&self) -> &str {
        &self.hash
    }

    async fn wait(&self) -> Result<Settlement, SyncError> {
        loop {
            let receipt: Option<TransactionReceipt> = self
                .rpc
                .request("eth_getTransactionReceipt", json!([self.hash]))
                .await?;
            match receipt {
                Some(receipt) if receipt.succeeded() => {
                    return Ok(Settlement::Confirmed(Confirmation {
                        block: receipt
                            .block_number
                            .and_then(|n| WideUint::Text(n).to_u64().ok()),
                        hash: receipt.transaction_hash,
                    }));
                }
                Some(receipt) => return Ok(Settlement::Reverted(receipt.revert_reason)),
                None => {
                    debug!("{} not mined yet", self.hash);
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}
