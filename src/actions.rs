//! Player and admin actions.
//!
//! Every action catches program rejections where it makes the call and
//! folds them into an [`ActionOutcome`]. Nothing here returns `Err`; the
//! message is meant to be shown to the user as-is.

use crate::error::ProgramError;
use crate::program::{Lookup, ProgramClient};
use crate::types::{sol_to_lamports, Address, Wallet};
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const WALLET_NOT_CONNECTED: &str = "Wallet not connected";
pub const DUPLICATE_BET: &str = "You have already placed a bet on this event";
pub const PROFILE_EXISTS: &str = "Player profile already initialized";
pub const PROFILE_MISSING: &str = "Player profile not found. Initialize your profile first.";
pub const INVALID_AMOUNT: &str = "Please enter a valid bet amount";
pub const UNAUTHORIZED: &str = "Unauthorized: admin wallet required";

/// Uniform result of a user-facing action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    fn rejected(context: &str, err: &ProgramError) -> Self {
        warn!("{} failed: {}", context, err);
        Self::fail(err.to_string())
    }
}

/// Payout shown in the bet prompt: winners receive twice their stake.
pub fn potential_winnings(amount_sol: f64) -> f64 {
    amount_sol * 2.0
}

/// Client-side admin gate. The program enforces real authority.
pub fn is_admin(wallet: Option<&Wallet>, admin: &Address) -> bool {
    wallet.is_some_and(|w| w.address == *admin)
}

fn outcome_label(outcome: bool) -> &'static str {
    if outcome {
        "YES"
    } else {
        "NO"
    }
}

// ---------------------------------------------------------------------------
// Player actions
// ---------------------------------------------------------------------------

pub async fn initialize_player<C: ProgramClient>(client: &C, wallet: Option<&Wallet>) -> ActionOutcome {
    let Some(wallet) = wallet else {
        return ActionOutcome::fail(WALLET_NOT_CONNECTED);
    };

    match Lookup::new(client).profile(&wallet.address).await {
        Ok(Some(_)) => return ActionOutcome::ok(PROFILE_EXISTS),
        Ok(None) => {}
        Err(e) => return ActionOutcome::rejected("profile lookup", &e),
    }

    info!("Initializing player profile for {}", wallet.address.short());
    match client.initialize_player(&wallet.address).await {
        Ok(()) => ActionOutcome::ok("Player profile initialized!"),
        Err(e) if e.is_duplicate() => ActionOutcome::ok(PROFILE_EXISTS),
        Err(e) => ActionOutcome::rejected("initialize_player", &e),
    }
}

/// Place a bet of `amount_sol` SOL on `chosen_outcome`.
///
/// A bet that already exists is reported without submitting anything.
pub async fn place_bet<C: ProgramClient>(
    client: &C,
    wallet: Option<&Wallet>,
    event_id: u64,
    chosen_outcome: bool,
    amount_sol: f64,
) -> ActionOutcome {
    let Some(wallet) = wallet else {
        return ActionOutcome::fail(WALLET_NOT_CONNECTED);
    };
    if !amount_sol.is_finite() || amount_sol <= 0.0 {
        return ActionOutcome::fail(INVALID_AMOUNT);
    }
    let lamports = sol_to_lamports(amount_sol);
    if lamports == 0 {
        return ActionOutcome::fail(INVALID_AMOUNT);
    }

    let lookup = Lookup::new(client);
    match lookup.bet(&wallet.address, event_id).await {
        Ok(Some(_)) => return ActionOutcome::fail(DUPLICATE_BET),
        Ok(None) => {}
        Err(e) => return ActionOutcome::rejected("bet lookup", &e),
    }
    match lookup.profile(&wallet.address).await {
        Ok(Some(_)) => {}
        Ok(None) => return ActionOutcome::fail(PROFILE_MISSING),
        Err(e) => return ActionOutcome::rejected("profile lookup", &e),
    }

    info!(
        "Placing bet: event {} {} {} SOL",
        event_id,
        outcome_label(chosen_outcome),
        amount_sol
    );
    match client
        .place_bet(&wallet.address, event_id, chosen_outcome, lamports)
        .await
    {
        Ok(()) => ActionOutcome::ok(format!(
            "Bet placed: {} SOL on {}",
            amount_sol,
            outcome_label(chosen_outcome)
        )),
        Err(e) if e.is_duplicate() => ActionOutcome::fail(DUPLICATE_BET),
        Err(e) => ActionOutcome::rejected("place_bet", &e),
    }
}

pub async fn claim_winnings<C: ProgramClient>(client: &C, wallet: Option<&Wallet>, event_id: u64) -> ActionOutcome {
    let Some(wallet) = wallet else {
        return ActionOutcome::fail(WALLET_NOT_CONNECTED);
    };
    match client.claim_winnings(&wallet.address, event_id).await {
        Ok(lamports) => ActionOutcome::ok(format!(
            "Claimed {} SOL",
            crate::types::lamports_to_sol(lamports)
        )),
        Err(e) => ActionOutcome::rejected("claim_winnings", &e),
    }
}

// ---------------------------------------------------------------------------
// Admin actions
// ---------------------------------------------------------------------------

fn admin_wallet<'w>(wallet: Option<&'w Wallet>, admin: &Address) -> Result<&'w Wallet, ActionOutcome> {
    match wallet {
        None => Err(ActionOutcome::fail(WALLET_NOT_CONNECTED)),
        Some(w) if w.address == *admin => Ok(w),
        Some(_) => Err(ActionOutcome::fail(UNAUTHORIZED)),
    }
}

pub async fn create_event<C: ProgramClient>(
    client: &C,
    wallet: Option<&Wallet>,
    admin: &Address,
    event_id: u64,
    description: &str,
) -> ActionOutcome {
    let wallet = match admin_wallet(wallet, admin) {
        Ok(w) => w,
        Err(outcome) => return outcome,
    };
    match client.create_event(&wallet.address, event_id, description).await {
        Ok(()) => ActionOutcome::ok(format!("Event created: {}", description)),
        Err(e) if e.is_duplicate() => ActionOutcome::fail(format!("Event #{} already exists", event_id)),
        Err(e) => ActionOutcome::rejected("create_event", &e),
    }
}

pub async fn resolve_event<C: ProgramClient>(
    client: &C,
    wallet: Option<&Wallet>,
    admin: &Address,
    event_id: u64,
    outcome: bool,
) -> ActionOutcome {
    let wallet = match admin_wallet(wallet, admin) {
        Ok(w) => w,
        Err(outcome) => return outcome,
    };
    match client.resolve_event(&wallet.address, event_id, outcome).await {
        Ok(()) => ActionOutcome::ok(format!(
            "Event #{} resolved to {}",
            event_id,
            outcome_label(outcome)
        )),
        Err(e) => ActionOutcome::rejected("resolve_event", &e),
    }
}

pub async fn close_bet<C: ProgramClient>(
    client: &C,
    wallet: Option<&Wallet>,
    admin: &Address,
    bet: &Address,
) -> ActionOutcome {
    let wallet = match admin_wallet(wallet, admin) {
        Ok(w) => w,
        Err(outcome) => return outcome,
    };
    match client.close_bet(&wallet.address, bet).await {
        Ok(()) => ActionOutcome::ok(format!("Bet {}... closed", bet.short())),
        Err(e) => ActionOutcome::rejected("close_bet", &e),
    }
}
