//! Bridge event vocabulary.
//!
//! This module owns **every message that crosses the bridge** between the
//! scene (simulation loop) and the host page (UI lifecycle).
//!
//! ## Event names
//!
//! | Tag                   | Direction     | Payload                              |
//! |-----------------------|---------------|--------------------------------------|
//! | `current-scene-ready` | scene → host  | [`SceneInfo`]                        |
//! | `request-events`      | scene → host  | correlation token                    |
//! | `events-loaded`       | host → scene  | token (or none) + full record list   |
//! | `oracle-interact`     | scene → host  | the single [`OracleEvent`] involved  |
//!
//! ## Design rules
//!
//! 1. Payloads are `Serialize + Deserialize` with snake_case JSON so a
//!    non-Rust host can sit on the other side.
//! 2. `events-loaded` always carries the *full* set. There is no patch
//!    message.
//! 3. A reply echoes the `request_id` it answers; `None` marks an
//!    unsolicited refresh push.

use crate::types::OracleEvent;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// The closed set of bridge tags.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    CurrentSceneReady,
    RequestEvents,
    EventsLoaded,
    OracleInteract,
}

impl EventName {
    pub const ALL: [EventName; 4] = [
        EventName::CurrentSceneReady,
        EventName::RequestEvents,
        EventName::EventsLoaded,
        EventName::OracleInteract,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::CurrentSceneReady => subjects::CURRENT_SCENE_READY,
            EventName::RequestEvents => subjects::REQUEST_EVENTS,
            EventName::EventsLoaded => subjects::EVENTS_LOADED,
            EventName::OracleInteract => subjects::ORACLE_INTERACT,
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.as_str() == tag)
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// What the scene tells the host about itself once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneInfo {
    pub key: String,
    pub width: f32,
    pub height: f32,
}

/// Bridge event envelope: a tag plus its payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum BridgeEvent {
    CurrentSceneReady(SceneInfo),
    RequestEvents {
        request_id: u64,
    },
    EventsLoaded {
        #[serde(default)]
        request_id: Option<u64>,
        events: Vec<OracleEvent>,
    },
    OracleInteract(OracleEvent),
}

impl BridgeEvent {
    pub fn name(&self) -> EventName {
        match self {
            BridgeEvent::CurrentSceneReady(_) => EventName::CurrentSceneReady,
            BridgeEvent::RequestEvents { .. } => EventName::RequestEvents,
            BridgeEvent::EventsLoaded { .. } => EventName::EventsLoaded,
            BridgeEvent::OracleInteract(_) => EventName::OracleInteract,
        }
    }

    /// Reply to the request identified by `request_id`.
    pub fn reply(request_id: u64, events: Vec<OracleEvent>) -> Self {
        BridgeEvent::EventsLoaded {
            request_id: Some(request_id),
            events,
        }
    }

    /// Unsolicited full refresh.
    pub fn push(events: Vec<OracleEvent>) -> Self {
        BridgeEvent::EventsLoaded {
            request_id: None,
            events,
        }
    }
}

// ---------------------------------------------------------------------------
// Subject helpers
// ---------------------------------------------------------------------------

/// All bridge tags, as constants.
pub mod subjects {
    pub const CURRENT_SCENE_READY: &str = "current-scene-ready";
    pub const REQUEST_EVENTS: &str = "request-events";
    pub const EVENTS_LOADED: &str = "events-loaded";
    pub const ORACLE_INTERACT: &str = "oracle-interact";
}
