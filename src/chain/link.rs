use super::{PollContract, WalletProvider};
use crate::error::SyncError;
use crate::models::address::Address;
use log::{debug, info};
use std::sync::Arc;

/// A connected account and the contract handle signing as it.
#[derive(Clone)]
pub struct Session {
    pub address: Address,
    pub contract: Arc<dyn PollContract>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("address", &self.address).finish()
    }
}

pub struct ChainLink {
    wallet: Arc<dyn WalletProvider>,
    contract_address: Address,
}

impl ChainLink {
    pub fn new(wallet: Arc<dyn WalletProvider>, contract_address: Address) -> Self {
        ChainLink {
            wallet,
            contract_address,
        }
    }

    pub fn is_available(&self) -> bool {
        self.wallet.is_available()
    }

    /// Prompts for account access. A rejection is returned as is, never retried.
    pub async fn connect(&self) -> Result<Session, SyncError> {
        if !self.wallet.is_available() {
            return Err(SyncError::ProviderUnavailable);
        }
        let accounts = self.wallet.request_accounts().await?;
        let address = accounts.into_iter().next().ok_or(SyncError::UserRejected)?;
        info!("Connected as {}", address);
        Ok(self.rebind(address))
    }

    /// The session for an account that is already authorized, if any.
    pub async fn resume(&self) -> Result<Option<Session>, SyncError> {
        if !self.wallet.is_available() {
            return Err(SyncError::ProviderUnavailable);
        }
        let accounts = self.wallet.accounts().await?;
        debug!("Authorized accounts: {:?}", accounts);
        Ok(accounts.into_iter().next().map(|address| self.rebind(address)))
    }

    pub fn rebind(&self, address: Address) -> Session {
        let contract = self.wallet.bind_contract(&self.contract_address, &address);
        Session { address, contract }
    }
}
