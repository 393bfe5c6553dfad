use crate::models::address::Address;
use crate::sync::gateway::DEFAULT_ALREADY_VOTED_REASON;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xad2A3F4bCC60aeC1ae945061F9C59cb3909BF76A";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// Floor for the receipt polling interval.
pub const MIN_RECEIPT_POLL_INTERVAL_MS: u64 = 100;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(rename = "rpcUrl")]
    pub rpc_url: String,
    #[serde(rename = "eventsUrl", default)]
    pub events_url: Option<String>,
    #[serde(rename = "contractAddress", default = "default_contract")]
    pub contract_address: Address,
    #[serde(rename = "alreadyVotedReasons", default = "default_reasons")]
    pub already_voted_reasons: Vec<String>,
    #[serde(rename = "receiptPollIntervalMs", default = "default_interval")]
    pub receipt_poll_interval_ms: u64,
}

fn default_contract() -> Address {
    Address::new_unchecked(DEFAULT_CONTRACT_ADDRESS)
}

fn default_reasons() -> Vec<String> {
    vec![DEFAULT_ALREADY_VOTED_REASON.to_owned()]
}

fn default_interval() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            events_url: None,
            contract_address: default_contract(),
            already_voted_reasons: default_reasons(),
            receipt_poll_interval_ms: default_interval(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Defaults, overridden by `POLL_SYNC_RPC_URL`, `POLL_SYNC_EVENTS_URL`
    /// and `POLL_SYNC_CONTRACT`.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        if let Ok(url) = std::env::var("POLL_SYNC_RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(url) = std::env::var("POLL_SYNC_EVENTS_URL") {
            config.events_url = Some(url);
        }
        if let Ok(address) = std::env::var("POLL_SYNC_CONTRACT") {
            config.contract_address = address
                .parse()
                .context("POLL_SYNC_CONTRACT is not an address")?;
        }
        Ok(config)
    }

    pub fn receipt_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms.max(MIN_RECEIPT_POLL_INTERVAL_MS))
    }
}
