//! Layered application settings.
//!
//! Defaults → optional TOML file → `ORACLE_QUEST_*` environment variables.
//! CLI flags in the binary override the result.
//!
//! | Key                    | Default                          |
//! |------------------------|----------------------------------|
//! | `program_id`           | [`DEFAULT_PROGRAM_ID`]           |
//! | `cluster_url`          | `https://api.devnet.solana.com`  |
//! | `admin`                | [`DEFAULT_ADMIN`]                |
//! | `ledger_path`          | `oracle-quest-ledger.json`       |
//! | `debounce_ms`          | `300`                            |
//! | `request_timeout_secs` | `10`                             |
//! | `tick_rate_hz`         | `30`                             |

use crate::error::ConfigError;
use crate::types::{Address, SceneConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROGRAM_ID: &str = "80e1c5fa3d2b9c47e6a10f58b2d4e7c9a3f60b1d5e8c2a7f49b06d3e1c8a5f72";
pub const DEFAULT_CLUSTER_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_ADMIN: &str = "4e9a1f3c7b2d8e60a5c4f19b3d7e2a8c6f01b5d9e3a7c2f48b6d0e1a9c5f3b27";
pub const DEFAULT_LEDGER_PATH: &str = "oracle-quest-ledger.json";

/// Upper bound for `tick_rate_hz`; beyond it the tick period rounds to zero.
pub const MAX_TICK_RATE_HZ: f32 = 1000.0;

#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    program_id: String,
    cluster_url: String,
    admin: String,
    ledger_path: PathBuf,
    debounce_ms: u64,
    request_timeout_secs: u64,
    tick_rate_hz: f32,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub program_id: Address,
    /// Where a networked client would connect. The local program ignores it.
    pub cluster_url: String,
    pub admin: Address,
    pub ledger_path: PathBuf,
    pub debounce: Duration,
    pub request_timeout: Duration,
    pub tick_rate_hz: f32,
}

impl Settings {
    /// Build settings from defaults, `file` (if given, must exist) and the
    /// environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("program_id", DEFAULT_PROGRAM_ID)?
            .set_default("cluster_url", DEFAULT_CLUSTER_URL)?
            .set_default("admin", DEFAULT_ADMIN)?
            .set_default("ledger_path", DEFAULT_LEDGER_PATH)?
            .set_default("debounce_ms", 300)?
            .set_default("request_timeout_secs", 10)?
            .set_default("tick_rate_hz", 30.0)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let raw: RawSettings = builder
            .add_source(config::Environment::with_prefix("ORACLE_QUEST").try_parsing(true))
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let parse = |key: &'static str, value: &str| {
            Address::from_hex(value).ok_or_else(|| ConfigError::InvalidAddress {
                key,
                value: value.to_string(),
            })
        };
        if !(raw.tick_rate_hz.is_finite() && raw.tick_rate_hz > 0.0 && raw.tick_rate_hz <= MAX_TICK_RATE_HZ) {
            return Err(ConfigError::InvalidValue {
                key: "tick_rate_hz",
                value: raw.tick_rate_hz.to_string(),
            });
        }
        Ok(Self {
            program_id: parse("program_id", &raw.program_id)?,
            cluster_url: raw.cluster_url,
            admin: parse("admin", &raw.admin)?,
            ledger_path: raw.ledger_path,
            debounce: Duration::from_millis(raw.debounce_ms),
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
            tick_rate_hz: raw.tick_rate_hz,
        })
    }

    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            request_timeout: self.request_timeout,
            ..Default::default()
        }
    }
}
