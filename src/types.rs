//! Core types shared across all modules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Basic math
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn distance(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// A 32-byte account / wallet address, rendered as lowercase hex.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut out).ok()?;
        Some(Self(out))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight hex characters, for log lines and confirmations.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s).ok_or_else(|| format!("invalid address '{}': expected 64 hex chars", s))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid hex address"))
    }
}

/// A connected wallet. Signing is the wallet adapter's concern; here a
/// wallet is only its public address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wallet {
    pub address: Address,
}

impl Wallet {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

// ---------------------------------------------------------------------------
// Records mirrored from the program
// ---------------------------------------------------------------------------

/// A prediction event ("oracle"). Read-only from the scene's point of view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleEvent {
    pub id: u64,
    pub description: String,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<bool>,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub total_bets: u64,
    /// Sum of all stakes in lamports.
    #[serde(default)]
    pub total_amount: u64,
    pub authority: Address,
}

impl OracleEvent {
    pub fn new(id: u64, description: impl Into<String>, authority: Address) -> Self {
        Self {
            id,
            description: description.into(),
            resolved: false,
            outcome: None,
            yes_votes: 0,
            no_votes: 0,
            total_bets: 0,
            total_amount: 0,
            authority,
        }
    }

    /// Share of YES bets in percent; 50 when nobody has bet yet.
    pub fn yes_percentage(&self) -> f64 {
        if self.total_bets == 0 {
            50.0
        } else {
            self.yes_votes as f64 / self.total_bets as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BetRecord {
    /// Derived address of this bet.
    pub address: Address,
    pub player: Address,
    pub event_id: u64,
    pub chosen_outcome: bool,
    /// Stake in lamports.
    pub amount: u64,
    pub claimed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerProfile {
    pub owner: Address,
    pub balance: u64,
    pub total_bets: u64,
    pub bets_won: u64,
}

impl PlayerProfile {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            balance: 0,
            total_bets: 0,
            bets_won: 0,
        }
    }
}

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

// ---------------------------------------------------------------------------
// Scene config & stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// World width in scene units.
    pub width: f32,
    /// World height in scene units.
    pub height: f32,
    /// Border kept free of markers on every side.
    pub margin: f32,
    /// Player speed in units per second.
    pub player_speed: f32,
    /// Markers strictly closer than this are "nearby".
    pub proximity_radius: f32,
    /// How long to wait for an `events-loaded` reply before timing out.
    pub request_timeout: Duration,
}

impl SceneConfig {
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 100.0,
            player_speed: 160.0,
            proximity_radius: 50.0,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneStats {
    pub markers: usize,
    pub requests_sent: u64,
    pub interactions: u64,
    pub total_ticks: u64,
}
