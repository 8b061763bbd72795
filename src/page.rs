//! Game page controller – the host side of the bridge.
//!
//! ## Threading model
//!
//! ```text
//! scene (tick loop)            │  page task (tokio)
//! ─────────────────────────────│─────────────────────────────────
//! emit request-events(id) ───► │ handler → signal_tx.send(..)
//!                              │   signal_rx.recv()
//!                              │   debounce window (collapse burst)
//!                              │   client.fetch_events().await
//! handler ◄── events-loaded ── │   emit reply (only while mounted)
//! emit oracle-interact ──────► │ handler → bet prompt opens
//! ```
//!
//! Bridge handlers never block: they only push into an unbounded channel.
//! The page owns the only path to the program.
//!
//! Unmounting removes both handlers, which drops the channel's senders. The
//! task then sees the channel close: a pending debounce ends without a
//! fetch, and a fetch already in flight completes but its reply is dropped.

use crate::actions::{self, ActionOutcome};
use crate::bus::{EventBus, Subscription};
use crate::program::ProgramClient;
use crate::protocol::{BridgeEvent, EventName};
use crate::types::{OracleEvent, Wallet};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub const NO_ORACLE_SELECTED: &str = "No oracle selected";

#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Requests arriving within this window of the first are answered once.
    pub debounce: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

/// The bet dialog opened by an `oracle-interact`.
#[derive(Debug, Clone, PartialEq)]
pub struct BetPrompt {
    pub event: OracleEvent,
}

#[derive(Debug)]
enum Signal {
    RequestEvents(u64),
    Interact(OracleEvent),
}

struct Shared<C> {
    bus: EventBus,
    client: Arc<C>,
    mounted: AtomicBool,
    prompt: Mutex<Option<BetPrompt>>,
}

impl<C: ProgramClient> Shared<C> {
    fn open_prompt(&self, event: OracleEvent) {
        info!("page: bet prompt for oracle {}", event.id);
        *self.prompt.lock() = Some(BetPrompt { event });
    }

    /// Fetch the full event list and emit it, unless the page went away
    /// while the fetch was in flight.
    async fn answer(&self, request_id: Option<u64>) -> bool {
        let events = match self.client.fetch_events().await {
            Ok(events) => events,
            Err(e) => {
                warn!("page: failed to fetch events: {}", e);
                return false;
            }
        };
        if !self.mounted.load(Ordering::SeqCst) {
            debug!("page: unmounted during fetch – dropping {} event(s)", events.len());
            return false;
        }
        let reply = match request_id {
            Some(id) => BridgeEvent::reply(id, events),
            None => BridgeEvent::push(events),
        };
        self.bus.emit(reply);
        true
    }
}

// ---------------------------------------------------------------------------
// GamePage
// ---------------------------------------------------------------------------

pub struct GamePage<C> {
    shared: Arc<Shared<C>>,
    wallet: Option<Wallet>,
    subscriptions: Vec<Subscription>,
}

impl<C: ProgramClient + 'static> GamePage<C> {
    /// Subscribe to the bridge and start the page task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(bus: EventBus, client: Arc<C>, wallet: Option<Wallet>, config: PageConfig) -> Self {
        let shared = Arc::new(Shared {
            bus: bus.clone(),
            client,
            mounted: AtomicBool::new(true),
            prompt: Mutex::new(None),
        });

        let (tx, rx) = mpsc::unbounded_channel();

        let request_tx = tx.clone();
        let request_sub = bus.on(EventName::RequestEvents, move |ev| {
            if let BridgeEvent::RequestEvents { request_id } = ev {
                let _ = request_tx.send(Signal::RequestEvents(*request_id));
            }
        });

        let interact_sub = bus.on(EventName::OracleInteract, move |ev| {
            if let BridgeEvent::OracleInteract(event) = ev {
                let _ = tx.send(Signal::Interact(event.clone()));
            }
        });

        tokio::spawn(run(rx, shared.clone(), config.debounce));
        debug!("page: mounted");

        Self {
            shared,
            wallet,
            subscriptions: vec![request_sub, interact_sub],
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    pub fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    pub fn bet_prompt(&self) -> Option<BetPrompt> {
        self.shared.prompt.lock().clone()
    }

    pub fn close_prompt(&self) {
        *self.shared.prompt.lock() = None;
    }

    /// Bet on the oracle in the open prompt. On success the prompt closes
    /// and a fresh event list is pushed to the scene.
    pub async fn place_bet(&self, chosen_outcome: bool, amount_sol: f64) -> ActionOutcome {
        let Some(prompt) = self.bet_prompt() else {
            return ActionOutcome::fail(NO_ORACLE_SELECTED);
        };
        let outcome = actions::place_bet(
            &*self.shared.client,
            self.wallet.as_ref(),
            prompt.event.id,
            chosen_outcome,
            amount_sol,
        )
        .await;
        if outcome.success {
            self.close_prompt();
            self.push_refresh().await;
        }
        outcome
    }

    /// Fetch and push the full event list without a request.
    pub async fn push_refresh(&self) -> bool {
        self.shared.answer(None).await
    }
}

impl<C> GamePage<C> {
    /// Remove bridge subscriptions; the page task winds down once its
    /// channel closes. Idempotent.
    pub fn unmount(&mut self) {
        self.shared.mounted.store(false, Ordering::SeqCst);
        if self.subscriptions.is_empty() {
            return;
        }
        for sub in self.subscriptions.drain(..) {
            self.shared.bus.off(&sub);
        }
        debug!("page: unmounted");
    }
}

impl<C> Drop for GamePage<C> {
    fn drop(&mut self) {
        self.unmount();
    }
}

// ---------------------------------------------------------------------------
// Page task
// ---------------------------------------------------------------------------

async fn run<C: ProgramClient>(
    mut rx: mpsc::UnboundedReceiver<Signal>,
    shared: Arc<Shared<C>>,
    debounce: Duration,
) {
    while let Some(signal) = rx.recv().await {
        if !shared.mounted.load(Ordering::SeqCst) {
            break;
        }
        let mut request_id = match signal {
            Signal::Interact(event) => {
                shared.open_prompt(event);
                continue;
            }
            Signal::RequestEvents(id) => id,
        };

        // Collapse every request arriving inside the window into one fetch,
        // answered with the newest token.
        let deadline = Instant::now() + debounce;
        let mut collapsed = 0u32;
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                next = rx.recv() => match next {
                    Some(Signal::RequestEvents(id)) => {
                        request_id = id;
                        collapsed += 1;
                    }
                    Some(Signal::Interact(event)) => shared.open_prompt(event),
                    None => return,
                },
            }
        }
        if collapsed > 0 {
            debug!("page: collapsed {} duplicate request(s)", collapsed);
        }
        if !shared.mounted.load(Ordering::SeqCst) {
            break;
        }

        shared.answer(Some(request_id)).await;
    }
    debug!("page: task finished");
}
