use super::address::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Debug)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'a str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Deserialize, Debug)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    /// The structured revert reason, if the bridge attached one.
    pub fn revert_reason(&self) -> Option<String> {
        match self.data.as_ref()? {
            Value::String(reason) => Some(reason.clone()),
            Value::Object(fields) => fields
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        }
    }
}

/// Parameters of `contract_call` and `contract_send`.
#[derive(Serialize, Debug)]
pub struct ContractCall<'a> {
    pub to: &'a Address,
    pub from: &'a Address,
    pub function: &'a str,
    pub args: Value,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TransactionReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    pub status: String,
    #[serde(rename = "blockNumber", default)]
    pub block_number: Option<String>,
    #[serde(rename = "revertReason", default)]
    pub revert_reason: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        matches!(self.status.as_str(), "0x1" | "1")
    }
}
