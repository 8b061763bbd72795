//! Remote program capability.
//!
//! [`ProgramClient`] is the only path from this crate to the prediction
//! program: account reads plus the instructions a player or admin submits.
//! [`Lookup`] layers the derive-then-fetch pattern on top of it once, so
//! "does this record exist?" is always `Ok(None)` rather than an error.

use crate::address;
use crate::error::ProgramError;
use crate::types::{Address, BetRecord, OracleEvent, PlayerProfile};
use serde::{Deserialize, Serialize};
use std::future::Future;

pub type ProgramResult<T> = Result<T, ProgramError>;

/// Any account the program owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Account {
    Profile(PlayerProfile),
    Bet(BetRecord),
    Event(OracleEvent),
}

/// Request/response access to the prediction program.
///
/// Every call either resolves with data or rejects with a
/// [`ProgramError`] whose message is shown to the user unchanged.
pub trait ProgramClient: Send + Sync {
    fn program_id(&self) -> Address;

    fn fetch_events(&self) -> impl Future<Output = ProgramResult<Vec<OracleEvent>>> + Send;

    fn fetch_bets(&self) -> impl Future<Output = ProgramResult<Vec<BetRecord>>> + Send;

    fn find_account(
        &self,
        address: &Address,
    ) -> impl Future<Output = ProgramResult<Option<Account>>> + Send;

    fn initialize_player(&self, signer: &Address) -> impl Future<Output = ProgramResult<()>> + Send;

    /// Stake `amount` lamports on `chosen_outcome`.
    fn place_bet(
        &self,
        signer: &Address,
        event_id: u64,
        chosen_outcome: bool,
        amount: u64,
    ) -> impl Future<Output = ProgramResult<()>> + Send;

    fn create_event(
        &self,
        signer: &Address,
        event_id: u64,
        description: &str,
    ) -> impl Future<Output = ProgramResult<()>> + Send;

    fn resolve_event(
        &self,
        signer: &Address,
        event_id: u64,
        outcome: bool,
    ) -> impl Future<Output = ProgramResult<()>> + Send;

    /// Returns the lamports paid out.
    fn claim_winnings(
        &self,
        signer: &Address,
        event_id: u64,
    ) -> impl Future<Output = ProgramResult<u64>> + Send;

    fn close_bet(&self, signer: &Address, bet: &Address) -> impl Future<Output = ProgramResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find records by derived address. Missing records are `Ok(None)`.
pub struct Lookup<'a, C> {
    client: &'a C,
}

impl<'a, C: ProgramClient> Lookup<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn find(&self, address: &Address) -> ProgramResult<Option<Account>> {
        self.client.find_account(address).await
    }

    pub async fn profile(&self, owner: &Address) -> ProgramResult<Option<PlayerProfile>> {
        let addr = address::profile_address(&self.client.program_id(), owner);
        Ok(match self.find(&addr).await? {
            Some(Account::Profile(p)) => Some(p),
            _ => None,
        })
    }

    pub async fn bet(&self, owner: &Address, event_id: u64) -> ProgramResult<Option<BetRecord>> {
        let addr = address::bet_address(&self.client.program_id(), owner, event_id);
        Ok(match self.find(&addr).await? {
            Some(Account::Bet(b)) => Some(b),
            _ => None,
        })
    }

    pub async fn event(&self, event_id: u64) -> ProgramResult<Option<OracleEvent>> {
        let addr = address::event_address(&self.client.program_id(), event_id);
        Ok(match self.find(&addr).await? {
            Some(Account::Event(e)) => Some(e),
            _ => None,
        })
    }
}
