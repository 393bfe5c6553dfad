use crate::error::SyncError;
use crate::models::rpc::{RpcErrorObject, RpcRequest, RpcResponse};
use log::{debug, error};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// Execution reverted, as reported by the pre-submission simulation.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bridge answered with HTTP {0}")]
    Http(reqwest::StatusCode),
    #[error("rpc error {}: {}", .0.code, .0.message)]
    Rpc(RpcErrorObject),
    #[error("unexpected result: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RpcError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RpcError::Transport(e) if e.is_connect() || e.is_timeout())
    }
}

impl From<RpcError> for SyncError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rpc(object) if object.code == USER_REJECTED_CODE => SyncError::UserRejected,
            RpcError::Rpc(object)
                if object.code == EXECUTION_REVERTED_CODE || object.revert_reason().is_some() =>
            {
                SyncError::ExecutionReverted(object.revert_reason())
            }
            other => SyncError::Remote(other.to_string()),
        }
    }
}

pub struct RpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        RpcClient {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("Request: {:?}", request);
        let resp = self.client.post(&self.url).json(&request).send().await?;

        if !resp.status().is_success() {
            error!("{} failed with HTTP {}", method, resp.status());
            return Err(RpcError::Http(resp.status()));
        }

        let response = resp.json::<RpcResponse>().await?;
        if let Some(err) = response.error {
            debug!("{} returned error: {:?}", method, err);
            return Err(RpcError::Rpc(err));
        }
        Ok(serde_json::from_value(response.result.unwrap_or(Value::Null))?)
    }
}
