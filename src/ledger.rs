//! `LocalProgram` – in-process stand-in for the prediction program.
//!
//! Holds profiles, events and bets keyed by derived address and enforces
//! the same rules the deployed program does (duplicate accounts, event
//! authority, single resolution, 2× payout on a winning claim). State can
//! be saved to and loaded from a JSON file so several CLI invocations
//! share one ledger.

use crate::address;
use crate::error::{LedgerError, ProgramError};
use crate::program::{Account, ProgramClient, ProgramResult};
use crate::types::{Address, BetRecord, OracleEvent, PlayerProfile};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerState {
    profiles: BTreeMap<Address, PlayerProfile>,
    events: BTreeMap<Address, OracleEvent>,
    bets: BTreeMap<Address, BetRecord>,
}

/// Per-call counters, read by callers that need to know whether a call
/// actually reached the program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStats {
    pub fetch_events: u64,
    pub fetch_bets: u64,
    pub lookups: u64,
    pub submissions: u64,
}

pub struct LocalProgram {
    program_id: Address,
    admin: Address,
    state: Mutex<LedgerState>,
    stats: Mutex<CallStats>,
    offline: Mutex<Option<String>>,
}

impl LocalProgram {
    pub fn new(program_id: Address, admin: Address) -> Self {
        Self {
            program_id,
            admin,
            state: Mutex::new(LedgerState::default()),
            stats: Mutex::new(CallStats::default()),
            offline: Mutex::new(None),
        }
    }

    /// Load a ledger file. A missing file yields an empty ledger.
    pub fn load(program_id: Address, admin: Address, path: &Path) -> Result<Self, LedgerError> {
        let program = Self::new(program_id, admin);
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let state: LedgerState = serde_json::from_str(&raw)?;
            info!(
                "Loaded ledger {} ({} events, {} bets, {} profiles)",
                path.display(),
                state.events.len(),
                state.bets.len(),
                state.profiles.len()
            );
            *program.state.lock() = state;
        } else {
            debug!("No ledger at {} – starting empty", path.display());
        }
        Ok(program)
    }

    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let raw = serde_json::to_string_pretty(&*self.state.lock())?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// While set, every call rejects with `reason`.
    pub fn set_offline(&self, reason: Option<&str>) {
        *self.offline.lock() = reason.map(str::to_string);
    }

    pub fn stats(&self) -> CallStats {
        self.stats.lock().clone()
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    fn check_online(&self) -> ProgramResult<()> {
        match &*self.offline.lock() {
            Some(reason) => Err(ProgramError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }

    fn submission(&self) -> ProgramResult<()> {
        self.stats.lock().submissions += 1;
        self.check_online()
    }
}

impl ProgramClient for LocalProgram {
    fn program_id(&self) -> Address {
        self.program_id
    }

    async fn fetch_events(&self) -> ProgramResult<Vec<OracleEvent>> {
        self.stats.lock().fetch_events += 1;
        self.check_online()?;
        let mut events: Vec<_> = self.state.lock().events.values().cloned().collect();
        events.sort_by_key(|e| e.id);
        Ok(events)
    }

    async fn fetch_bets(&self) -> ProgramResult<Vec<BetRecord>> {
        self.stats.lock().fetch_bets += 1;
        self.check_online()?;
        Ok(self.state.lock().bets.values().cloned().collect())
    }

    async fn find_account(&self, address: &Address) -> ProgramResult<Option<Account>> {
        self.stats.lock().lookups += 1;
        self.check_online()?;
        let state = self.state.lock();
        if let Some(p) = state.profiles.get(address) {
            return Ok(Some(Account::Profile(p.clone())));
        }
        if let Some(b) = state.bets.get(address) {
            return Ok(Some(Account::Bet(b.clone())));
        }
        Ok(state.events.get(address).cloned().map(Account::Event))
    }

    async fn initialize_player(&self, signer: &Address) -> ProgramResult<()> {
        self.submission()?;
        let addr = address::profile_address(&self.program_id, signer);
        let mut state = self.state.lock();
        if state.profiles.contains_key(&addr) {
            return Err(ProgramError::AccountInUse(addr.to_hex()));
        }
        state.profiles.insert(addr, PlayerProfile::new(*signer));
        info!("Player initialized: {}", signer.short());
        Ok(())
    }

    async fn place_bet(
        &self,
        signer: &Address,
        event_id: u64,
        chosen_outcome: bool,
        amount: u64,
    ) -> ProgramResult<()> {
        self.submission()?;
        if amount == 0 {
            return Err(ProgramError::InvalidAmount);
        }
        let profile_addr = address::profile_address(&self.program_id, signer);
        let event_addr = address::event_address(&self.program_id, event_id);
        let bet_addr = address::bet_address(&self.program_id, signer, event_id);

        let mut state = self.state.lock();
        if state.bets.contains_key(&bet_addr) {
            return Err(ProgramError::AccountInUse(bet_addr.to_hex()));
        }
        if !state.profiles.contains_key(&profile_addr) {
            return Err(ProgramError::AccountNotFound(profile_addr.to_hex()));
        }
        let event = state
            .events
            .get_mut(&event_addr)
            .ok_or_else(|| ProgramError::AccountNotFound(event_addr.to_hex()))?;
        if event.resolved {
            return Err(ProgramError::AlreadyResolved);
        }
        let total_amount = event
            .total_amount
            .checked_add(amount)
            .ok_or(ProgramError::ArithmeticOverflow)?;

        event.total_bets += 1;
        event.total_amount = total_amount;
        if chosen_outcome {
            event.yes_votes += 1;
        } else {
            event.no_votes += 1;
        }
        if let Some(profile) = state.profiles.get_mut(&profile_addr) {
            profile.total_bets += 1;
        }
        state.bets.insert(
            bet_addr,
            BetRecord {
                address: bet_addr,
                player: *signer,
                event_id,
                chosen_outcome,
                amount,
                claimed: false,
            },
        );
        info!(
            "Bet placed: {} lamports on {} (event {})",
            amount,
            if chosen_outcome { "YES" } else { "NO" },
            event_id
        );
        Ok(())
    }

    async fn create_event(&self, signer: &Address, event_id: u64, description: &str) -> ProgramResult<()> {
        self.submission()?;
        if *signer != self.admin {
            return Err(ProgramError::Unauthorized);
        }
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(ProgramError::DescriptionTooLong);
        }
        let addr = address::event_address(&self.program_id, event_id);
        let mut state = self.state.lock();
        if state.events.contains_key(&addr) {
            return Err(ProgramError::AccountInUse(addr.to_hex()));
        }
        state
            .events
            .insert(addr, OracleEvent::new(event_id, description, *signer));
        info!("Event created: {}", description);
        Ok(())
    }

    async fn resolve_event(&self, signer: &Address, event_id: u64, outcome: bool) -> ProgramResult<()> {
        self.submission()?;
        let addr = address::event_address(&self.program_id, event_id);
        let mut state = self.state.lock();
        let event = state
            .events
            .get_mut(&addr)
            .ok_or_else(|| ProgramError::AccountNotFound(addr.to_hex()))?;
        if event.authority != *signer {
            return Err(ProgramError::Unauthorized);
        }
        if event.resolved {
            return Err(ProgramError::AlreadyResolved);
        }
        event.resolved = true;
        event.outcome = Some(outcome);
        info!("Event resolved: {}", if outcome { "YES" } else { "NO" });
        Ok(())
    }

    async fn claim_winnings(&self, signer: &Address, event_id: u64) -> ProgramResult<u64> {
        self.submission()?;
        let bet_addr = address::bet_address(&self.program_id, signer, event_id);
        let event_addr = address::event_address(&self.program_id, event_id);
        let profile_addr = address::profile_address(&self.program_id, signer);

        let mut state = self.state.lock();
        let outcome = {
            let event = state
                .events
                .get(&event_addr)
                .ok_or_else(|| ProgramError::AccountNotFound(event_addr.to_hex()))?;
            match (event.resolved, event.outcome) {
                (true, Some(outcome)) => outcome,
                _ => return Err(ProgramError::EventNotResolved),
            }
        };
        let balance = state
            .profiles
            .get(&profile_addr)
            .map(|p| p.balance)
            .ok_or_else(|| ProgramError::AccountNotFound(profile_addr.to_hex()))?;
        let bet = state
            .bets
            .get(&bet_addr)
            .ok_or_else(|| ProgramError::AccountNotFound(bet_addr.to_hex()))?;
        if bet.claimed {
            return Err(ProgramError::AlreadyClaimed);
        }
        if bet.chosen_outcome != outcome {
            return Err(ProgramError::BetLost);
        }
        let winnings = bet
            .amount
            .checked_mul(2)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        let balance = balance
            .checked_add(winnings)
            .ok_or(ProgramError::ArithmeticOverflow)?;

        if let Some(bet) = state.bets.get_mut(&bet_addr) {
            bet.claimed = true;
        }
        if let Some(profile) = state.profiles.get_mut(&profile_addr) {
            profile.bets_won += 1;
            profile.balance = balance;
        }
        info!("Winnings claimed: {} lamports", winnings);
        Ok(winnings)
    }

    async fn close_bet(&self, signer: &Address, bet: &Address) -> ProgramResult<()> {
        self.submission()?;
        if *signer != self.admin {
            return Err(ProgramError::Unauthorized);
        }
        let mut state = self.state.lock();
        if state.bets.remove(bet).is_none() {
            return Err(ProgramError::AccountNotFound(bet.to_hex()));
        }
        info!("Bet account {} closed", bet.short());
        Ok(())
    }
}
