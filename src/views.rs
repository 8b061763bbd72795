//! Read-side views: landing status, events browser, quest log, admin overview.

use crate::actions::is_admin;
use crate::program::{Lookup, ProgramClient, ProgramResult};
use crate::types::{lamports_to_sol, Address, BetRecord, OracleEvent, PlayerProfile, Wallet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Landing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileStatus {
    NoWallet,
    NotInitialized,
    Initialized(PlayerProfile),
}

pub async fn profile_status<C: ProgramClient>(client: &C, wallet: Option<&Wallet>) -> ProgramResult<ProfileStatus> {
    let Some(wallet) = wallet else {
        return Ok(ProfileStatus::NoWallet);
    };
    Ok(match Lookup::new(client).profile(&wallet.address).await? {
        Some(profile) => ProfileStatus::Initialized(profile),
        None => ProfileStatus::NotInitialized,
    })
}

// ---------------------------------------------------------------------------
// Events browser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFilter {
    #[default]
    All,
    Active,
    Resolved,
}

impl EventFilter {
    pub fn matches(&self, event: &OracleEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Active => !event.resolved,
            EventFilter::Resolved => event.resolved,
        }
    }
}

impl std::str::FromStr for EventFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(EventFilter::All),
            "active" => Ok(EventFilter::Active),
            "resolved" => Ok(EventFilter::Resolved),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCard {
    pub id: u64,
    pub description: String,
    pub resolved: bool,
    pub outcome: Option<bool>,
    pub total_bets: u64,
    pub yes_percentage: f64,
    pub no_percentage: f64,
    pub pool_sol: f64,
}

impl From<&OracleEvent> for EventCard {
    fn from(event: &OracleEvent) -> Self {
        let yes = event.yes_percentage();
        Self {
            id: event.id,
            description: event.description.clone(),
            resolved: event.resolved,
            outcome: event.outcome,
            total_bets: event.total_bets,
            yes_percentage: yes,
            no_percentage: 100.0 - yes,
            pool_sol: lamports_to_sol(event.total_amount),
        }
    }
}

/// Filter and sort (by id) a fetched event list.
pub fn event_cards(events: &[OracleEvent], filter: EventFilter) -> Vec<EventCard> {
    let mut cards: Vec<EventCard> = events
        .iter()
        .filter(|e| filter.matches(e))
        .map(EventCard::from)
        .collect();
    cards.sort_by_key(|c| c.id);
    cards
}

pub async fn browse_events<C: ProgramClient>(client: &C, filter: EventFilter) -> ProgramResult<Vec<EventCard>> {
    let events = client.fetch_events().await?;
    Ok(event_cards(&events, filter))
}

// ---------------------------------------------------------------------------
// Quest log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestEntry {
    pub event_id: u64,
    pub description: String,
    pub chosen_outcome: bool,
    pub amount_sol: f64,
    pub resolved: bool,
    pub event_outcome: Option<bool>,
    /// `Some` once the event is resolved.
    pub won: Option<bool>,
    pub claimed: bool,
}

/// The wallet's bets joined with their events, newest event first.
pub async fn quest_log<C: ProgramClient>(client: &C, wallet: &Wallet) -> ProgramResult<Vec<QuestEntry>> {
    let bets = client.fetch_bets().await?;
    let lookup = Lookup::new(client);

    let mut entries = Vec::new();
    for bet in bets.iter().filter(|b| b.player == wallet.address) {
        let event = match lookup.event(bet.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!("quest log: event {} missing – skipping bet", bet.event_id);
                continue;
            }
            Err(e) => {
                warn!("quest log: failed to fetch event {}: {}", bet.event_id, e);
                continue;
            }
        };
        let won = event
            .resolved
            .then(|| event.outcome == Some(bet.chosen_outcome));
        entries.push(QuestEntry {
            event_id: bet.event_id,
            description: event.description,
            chosen_outcome: bet.chosen_outcome,
            amount_sol: lamports_to_sol(bet.amount),
            resolved: event.resolved,
            event_outcome: event.outcome,
            won,
            claimed: bet.claimed,
        });
    }
    entries.sort_by(|a, b| b.event_id.cmp(&a.event_id));
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Admin overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AdminOverview {
    pub events: Vec<OracleEvent>,
    pub bets: Vec<BetRecord>,
}

/// Everything the admin panel lists. `Ok(None)` when the wallet is not the
/// admin.
pub async fn admin_overview<C: ProgramClient>(
    client: &C,
    wallet: Option<&Wallet>,
    admin: &Address,
) -> ProgramResult<Option<AdminOverview>> {
    if !is_admin(wallet, admin) {
        return Ok(None);
    }
    let mut events = client.fetch_events().await?;
    events.sort_by_key(|e| e.id);
    let mut bets = client.fetch_bets().await?;
    bets.sort_by_key(|b| (b.event_id, b.player));
    Ok(Some(AdminOverview { events, bets }))
}
