//! Scene controller – player movement, oracle markers, proximity, interaction.
//!
//! ## Lifecycle
//!
//! ```text
//! start() ──► Loading{id} ──events-loaded(id, [])──► Empty
//!                 │  └─────events-loaded(id, [..])──► Populated
//!                 └──request_timeout elapsed────────► TimedOut
//! refresh() from Empty / Populated / TimedOut ──► Loading{new id}
//! ```
//!
//! The scene subscribes to `events-loaded` once, in [`SceneController::start`],
//! and holds that subscription until [`SceneController::shutdown`] (or drop).
//! While loading it accepts exactly one reply carrying its outstanding
//! token. Unsolicited pushes (`request_id: None`) replace the marker set in
//! any state; during loading they leave the request outstanding. Replies
//! with any other token are stale and ignored. The subscription outlives a
//! timeout so later pushes still land.
//!
//! The scene never emits while holding its own lock, so a host may answer
//! synchronously from inside a bridge handler.

use crate::bus::{EventBus, Subscription};
use crate::layout::{self, GridLayout};
use crate::protocol::{BridgeEvent, EventName, SceneInfo};
use crate::types::{OracleEvent, SceneConfig, SceneStats, Vec2};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub const SCENE_KEY: &str = "MainGame";

pub const LOADING_TEXT: &str = "Loading oracles...";
pub const EMPTY_TEXT: &str = "No oracle events found";
pub const TIMEOUT_TEXT: &str = "Oracles did not answer. Refresh to try again.";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SceneState {
    /// Waiting for the reply to `request_id`.
    Loading { request_id: u64, waited: Duration },
    /// Reply arrived with no records.
    Empty,
    /// At least one marker is on the map.
    Populated,
    /// No reply within the request timeout.
    TimedOut,
}

impl SceneState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SceneState::Loading { .. })
    }
}

/// Text overlay drawn over the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Placeholder(String),
    NoData(String),
    Error(String),
}

/// Directional keys held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// An interactive marker standing for one oracle event.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub event: OracleEvent,
    pub position: Vec2,
}

struct SceneCore {
    config: SceneConfig,
    state: SceneState,
    overlay: Overlay,
    player: Player,
    markers: Vec<Marker>,
    layout: Option<GridLayout>,
    /// Index into `markers`.
    nearby: Option<usize>,
    next_request_id: u64,
    stats: SceneStats,
}

impl SceneCore {
    fn begin_request(&mut self) -> u64 {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.state = SceneState::Loading {
            request_id,
            waited: Duration::ZERO,
        };
        self.overlay = Overlay::Placeholder(LOADING_TEXT.into());
        self.stats.requests_sent += 1;
        request_id
    }

    /// Accept `events-loaded` if it answers the outstanding request or is an
    /// unsolicited push. Returns whether the markers were replaced.
    ///
    /// A push that lands while loading shows its markers but leaves the
    /// request outstanding, so the matching reply still counts.
    fn on_events_loaded(&mut self, request_id: Option<u64>, events: &[OracleEvent]) -> bool {
        if request_id.is_none() && self.state.is_loading() {
            let pending = self.state.clone();
            let overlay = self.overlay.clone();
            self.replace_markers(events);
            self.state = pending;
            if self.markers.is_empty() {
                self.overlay = overlay;
            }
            return true;
        }
        match (request_id, &self.state) {
            (None, _) => {}
            (Some(id), SceneState::Loading { request_id: want, .. }) if id == *want => {}
            (Some(id), _) => {
                debug!("scene: ignoring stale events-loaded for request {}", id);
                return false;
            }
        }
        self.replace_markers(events);
        true
    }

    fn replace_markers(&mut self, events: &[OracleEvent]) {
        if events.is_empty() {
            self.markers.clear();
            self.layout = None;
            self.state = SceneState::Empty;
            self.overlay = Overlay::NoData(EMPTY_TEXT.into());
        } else {
            let grid = layout::compute(events.len(), &self.config);
            self.markers = events
                .iter()
                .cloned()
                .zip(grid.positions.iter().copied())
                .map(|(event, position)| Marker { event, position })
                .collect();
            self.layout = Some(grid);
            self.state = SceneState::Populated;
            self.overlay = Overlay::None;
        }
        self.stats.markers = self.markers.len();
        self.nearby = nearest_marker(&self.markers, self.player.position, self.config.proximity_radius);
        info!("scene: {} oracle marker(s) placed", self.markers.len());
    }

    fn step(&mut self, dt: Duration, input: &InputState) -> bool {
        self.stats.total_ticks += 1;

        let speed = self.config.player_speed;
        let vx = if input.left {
            -speed
        } else if input.right {
            speed
        } else {
            0.0
        };
        let vy = if input.up {
            -speed
        } else if input.down {
            speed
        } else {
            0.0
        };
        self.player.velocity = Vec2::new(vx, vy);

        let secs = dt.as_secs_f32();
        self.player.position = Vec2::new(
            (self.player.position.x + vx * secs).clamp(0.0, self.config.width),
            (self.player.position.y + vy * secs).clamp(0.0, self.config.height),
        );

        self.nearby = nearest_marker(&self.markers, self.player.position, self.config.proximity_radius);

        if let SceneState::Loading { request_id, waited } = &mut self.state {
            *waited += dt;
            if *waited >= self.config.request_timeout {
                warn!(
                    "scene: request {} timed out after {:?}",
                    request_id, self.config.request_timeout
                );
                self.state = SceneState::TimedOut;
                self.overlay = Overlay::Error(TIMEOUT_TEXT.into());
                return true;
            }
        }
        false
    }
}

/// Index of the marker strictly inside `radius` of `position`: nearest
/// first, lowest event id on an exact distance tie.
pub fn nearest_marker(markers: &[Marker], position: Vec2, radius: f32) -> Option<usize> {
    markers
        .iter()
        .enumerate()
        .map(|(i, m)| (i, m.position.distance(position), m.event.id))
        .filter(|(_, d, _)| *d < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)))
        .map(|(i, _, _)| i)
}

// ---------------------------------------------------------------------------
// SceneController
// ---------------------------------------------------------------------------

pub struct SceneController {
    bus: EventBus,
    core: Arc<Mutex<SceneCore>>,
    reply_sub: Mutex<Option<Subscription>>,
}

impl SceneController {
    pub fn new(bus: EventBus, config: SceneConfig) -> Self {
        let player = Player {
            position: config.spawn_point(),
            velocity: Vec2::zero(),
        };
        let core = SceneCore {
            config,
            state: SceneState::Loading {
                request_id: 0,
                waited: Duration::ZERO,
            },
            overlay: Overlay::Placeholder(LOADING_TEXT.into()),
            player,
            markers: Vec::new(),
            layout: None,
            nearby: None,
            next_request_id: 0,
            stats: SceneStats {
                markers: 0,
                requests_sent: 0,
                interactions: 0,
                total_ticks: 0,
            },
        };
        Self {
            bus,
            core: Arc::new(Mutex::new(core)),
            reply_sub: Mutex::new(None),
        }
    }

    /// Announce the scene, subscribe for replies and ask for the event list.
    pub fn start(&self) {
        let request_id = self.core.lock().begin_request();

        self.bus.emit(BridgeEvent::CurrentSceneReady(self.info()));

        {
            let mut slot = self.reply_sub.lock();
            if slot.is_none() {
                let core = self.core.clone();
                *slot = Some(self.bus.on(EventName::EventsLoaded, move |ev| {
                    if let BridgeEvent::EventsLoaded { request_id, events } = ev {
                        core.lock().on_events_loaded(*request_id, events);
                    }
                }));
            }
        }

        debug!("scene: requesting events (request {})", request_id);
        self.bus.emit(BridgeEvent::RequestEvents { request_id });
    }

    /// Ask again for the event list. Returns the new token, or `None` while
    /// a request is still outstanding.
    pub fn refresh(&self) -> Option<u64> {
        let request_id = {
            let mut core = self.core.lock();
            if core.state.is_loading() {
                return None;
            }
            core.begin_request()
        };
        self.bus.emit(BridgeEvent::RequestEvents { request_id });
        Some(request_id)
    }

    /// Advance the simulation by `dt` with the given held keys.
    ///
    /// Returns `true` on the tick where an outstanding request times out.
    pub fn tick(&self, dt: Duration, input: &InputState) -> bool {
        self.core.lock().step(dt, input)
    }

    /// Interact with the nearby oracle, if any. Emits `oracle-interact` and
    /// returns the record.
    pub fn interact(&self) -> Option<OracleEvent> {
        let event = {
            let mut core = self.core.lock();
            let idx = core.nearby?;
            core.stats.interactions += 1;
            core.markers[idx].event.clone()
        };
        debug!("scene: interacting with oracle {}", event.id);
        self.bus.emit(BridgeEvent::OracleInteract(event.clone()));
        Some(event)
    }

    /// Remove the scene's bridge subscription.
    pub fn shutdown(&self) {
        if let Some(sub) = self.reply_sub.lock().take() {
            self.bus.off(&sub);
            debug!("scene: shut down");
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn info(&self) -> SceneInfo {
        let core = self.core.lock();
        SceneInfo {
            key: SCENE_KEY.into(),
            width: core.config.width,
            height: core.config.height,
        }
    }

    pub fn state(&self) -> SceneState {
        self.core.lock().state.clone()
    }

    pub fn overlay(&self) -> Overlay {
        self.core.lock().overlay.clone()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.core.lock().markers.clone()
    }

    pub fn layout(&self) -> Option<GridLayout> {
        self.core.lock().layout.clone()
    }

    pub fn player(&self) -> Player {
        self.core.lock().player
    }

    /// Place the player directly (spawn / teleport).
    pub fn set_player_position(&self, position: Vec2) {
        let mut core = self.core.lock();
        let clamped = Vec2::new(
            position.x.clamp(0.0, core.config.width),
            position.y.clamp(0.0, core.config.height),
        );
        core.player.position = clamped;
        core.nearby = nearest_marker(&core.markers, clamped, core.config.proximity_radius);
    }

    pub fn nearby(&self) -> Option<OracleEvent> {
        let core = self.core.lock();
        core.nearby.map(|i| core.markers[i].event.clone())
    }

    pub fn stats(&self) -> SceneStats {
        self.core.lock().stats.clone()
    }
}

impl Drop for SceneController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
