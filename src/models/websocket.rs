use super::address::Address;
use serde::{Deserialize, Serialize};

/// Sent once after connecting so the bridge starts pushing wallet events.
#[derive(Serialize)]
pub struct SubscribeMessage<'a> {
    #[serde(rename = "requestType")]
    pub msg_type: &'a str,
    pub events: &'a [&'a str],
}

/// Messages pushed by the wallet bridge over the events socket.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum WalletEvent {
    #[serde(rename = "accountsChanged")]
    AccountsChanged { accounts: Vec<Address> },
}
