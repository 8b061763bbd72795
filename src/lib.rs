//! Oracle Quest
//!
//! A small world scene where the player walks up to "oracle" markers, each
//! standing for a prediction event, and places bets through a remote
//! program.
//!
//! ## Architecture
//!
//! ```text
//! SceneController  (scene.rs)  ← tick loop: movement, proximity, markers
//!        │  ▲
//!        ▼  │  EventBus (bus.rs) – protocol.rs vocabulary
//!        │  ▲
//! GamePage  (page.rs)          ← host lifecycle, debounce, bet prompt
//!        └── ProgramClient (program.rs)
//!              └── LocalProgram (ledger.rs)
//! ```
//!
//! The bus is created explicitly and handed to both sides; nothing in the
//! crate is process-global.

// Bridge, scene and program types are always available.
pub mod actions;
pub mod address;
pub mod bus;
pub mod config;
pub mod error;
pub mod layout;
pub mod ledger;
pub mod program;
pub mod protocol;
pub mod scene;
pub mod types;
pub mod views;

// The page controller needs the async runtime.
#[cfg(feature = "host")]
pub mod page;

pub use actions::ActionOutcome;
pub use bus::{EventBus, Subscription};
pub use error::{ConfigError, LedgerError, ProgramError};
pub use ledger::LocalProgram;
#[cfg(feature = "host")]
pub use page::{GamePage, PageConfig};
pub use program::{Account, Lookup, ProgramClient};
pub use protocol::{BridgeEvent, EventName, SceneInfo};
pub use scene::{InputState, SceneController, SceneState};
pub use types::{Address, BetRecord, OracleEvent, PlayerProfile, SceneConfig, Vec2, Wallet};
