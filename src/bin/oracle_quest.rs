//! oracle-quest binary
//!
//! Terminal front end: landing status, events browser, the game scene,
//! quest log and admin panel, all against a [`LocalProgram`] ledger file.
//!
//! ## Configuration (env / TOML via `config` crate)
//!
//! | Key                                 | Default                     |
//! |-------------------------------------|-----------------------------|
//! | `ORACLE_QUEST_PROGRAM_ID`           | built-in program id         |
//! | `ORACLE_QUEST_ADMIN`                | built-in admin wallet       |
//! | `ORACLE_QUEST_LEDGER_PATH`          | `oracle-quest-ledger.json`  |
//! | `ORACLE_QUEST_DEBOUNCE_MS`          | `300`                       |
//! | `ORACLE_QUEST_REQUEST_TIMEOUT_SECS` | `10`                        |
//! | `ORACLE_QUEST_TICK_RATE_HZ`         | `30`                        |
//! | `ORACLE_QUEST_WALLET`               | *(none – disconnected)*     |

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use oracle_quest::{
    actions,
    config::Settings,
    page::{GamePage, PageConfig},
    protocol::{BridgeEvent, EventName},
    scene::{InputState, Overlay, SceneController, SceneState},
    types::{Address, Wallet},
    views::{self, EventFilter, ProfileStatus},
    EventBus, LocalProgram,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "oracle-quest", about = "Oracle Quest prediction game", version)]
struct Args {
    /// Optional TOML settings file
    #[arg(long, env = "ORACLE_QUEST_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger file (overrides settings)
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Connected wallet address (64 hex chars)
    #[arg(long, env = "ORACLE_QUEST_WALLET", global = true)]
    wallet: Option<Address>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether the wallet has a player profile
    Status,
    /// Create the wallet's player profile
    Init,
    /// Browse prediction events
    Events {
        #[arg(long, default_value = "all")]
        filter: EventFilter,
    },
    /// Enter the game world (reads commands from stdin)
    Play,
    /// List the wallet's bets
    Quests,
    /// Claim winnings on a resolved event
    Claim {
        #[arg(long)]
        event: u64,
    },
    /// Admin panel
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// Create an event
    Create {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        description: String,
    },
    /// Resolve an event to yes or no
    Resolve {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        outcome: Outcome,
    },
    /// List all events and bets
    Bets,
    /// Close a bet account
    Close {
        #[arg(long)]
        bet: Address,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Outcome {
    Yes,
    No,
}

impl Outcome {
    fn as_bool(self) -> bool {
        matches!(self, Outcome::Yes)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oracle_quest=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(ledger) = args.ledger {
        settings.ledger_path = ledger;
    }

    tracing::info!(
        program_id = %settings.program_id.short(),
        cluster = %settings.cluster_url,
        ledger = %settings.ledger_path.display(),
        "Starting oracle-quest"
    );

    let program = Arc::new(
        LocalProgram::load(settings.program_id, settings.admin, &settings.ledger_path)
            .context("Failed to load ledger")?,
    );
    let wallet = args.wallet.map(Wallet::new);

    match args.command {
        Command::Status => status(&program, wallet.as_ref()).await?,
        Command::Init => {
            report(actions::initialize_player(&*program, wallet.as_ref()).await);
        }
        Command::Events { filter } => events(&program, filter).await?,
        Command::Play => play(&settings, program.clone(), wallet).await?,
        Command::Quests => quests(&program, wallet.as_ref()).await?,
        Command::Claim { event } => {
            report(actions::claim_winnings(&*program, wallet.as_ref(), event).await);
        }
        Command::Admin { action } => admin(&settings, &program, wallet.as_ref(), action).await?,
    }

    program
        .save(&settings.ledger_path)
        .context("Failed to save ledger")?;
    Ok(())
}

fn report(outcome: actions::ActionOutcome) {
    if outcome.success {
        println!("✔ {}", outcome.message);
    } else {
        println!("✘ Error: {}", outcome.message);
    }
}

fn yes_no(outcome: bool) -> &'static str {
    if outcome {
        "YES"
    } else {
        "NO"
    }
}

// ---------------------------------------------------------------------------
// Landing / events / quests
// ---------------------------------------------------------------------------

async fn status(program: &LocalProgram, wallet: Option<&Wallet>) -> Result<()> {
    match views::profile_status(program, wallet).await? {
        ProfileStatus::NoWallet => println!("Connect a wallet (--wallet) to see your profile."),
        ProfileStatus::NotInitialized => println!("Profile not initialized. Run `oracle-quest init`."),
        ProfileStatus::Initialized(p) => println!(
            "Profile initialized – {} bet(s), {} won, balance {} SOL",
            p.total_bets,
            p.bets_won,
            oracle_quest::types::lamports_to_sol(p.balance)
        ),
    }
    Ok(())
}

async fn events(program: &LocalProgram, filter: EventFilter) -> Result<()> {
    let cards = views::browse_events(program, filter).await?;
    if cards.is_empty() {
        println!("No events found matching your filters");
        return Ok(());
    }
    for card in cards {
        let state = match (card.resolved, card.outcome) {
            (true, Some(o)) => format!("resolved {}", yes_no(o)),
            (true, None) => "resolved".to_string(),
            (false, _) => "active".to_string(),
        };
        println!(
            "#{:<4} {:<50} [{}] YES {:.0}% / NO {:.0}% – {} bet(s), pool {} SOL",
            card.id,
            card.description,
            state,
            card.yes_percentage,
            card.no_percentage,
            card.total_bets,
            card.pool_sol
        );
    }
    Ok(())
}

async fn quests(program: &LocalProgram, wallet: Option<&Wallet>) -> Result<()> {
    let Some(wallet) = wallet else {
        bail!("Connect a wallet (--wallet) to see your quest log");
    };
    let entries = views::quest_log(program, wallet).await?;
    if entries.is_empty() {
        println!("No bets placed yet. Explore the world and find oracles!");
    }
    for q in entries {
        let status = match q.won {
            Some(true) if q.claimed => "WON (claimed)",
            Some(true) => "WON",
            Some(false) => "LOST",
            None => "PENDING",
        };
        println!(
            "Event #{} {} – your bet {} {} SOL – {}",
            q.event_id,
            q.description,
            yes_no(q.chosen_outcome),
            q.amount_sol,
            status
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

async fn admin(settings: &Settings, program: &LocalProgram, wallet: Option<&Wallet>, action: AdminAction) -> Result<()> {
    let admin = &settings.admin;
    match action {
        AdminAction::Create { id, description } => {
            report(actions::create_event(program, wallet, admin, id, &description).await);
        }
        AdminAction::Resolve { id, outcome } => {
            report(actions::resolve_event(program, wallet, admin, id, outcome.as_bool()).await);
        }
        AdminAction::Close { bet } => {
            report(actions::close_bet(program, wallet, admin, &bet).await);
        }
        AdminAction::Bets => match views::admin_overview(program, wallet, admin).await? {
            None => println!("Access denied: this wallet is not the admin."),
            Some(overview) => {
                println!("{} event(s):", overview.events.len());
                for e in &overview.events {
                    println!(
                        "  #{} {} – {} bet(s) (YES {} / NO {}){}",
                        e.id,
                        e.description,
                        e.total_bets,
                        e.yes_votes,
                        e.no_votes,
                        if e.resolved { " [resolved]" } else { "" }
                    );
                }
                println!("{} bet(s):", overview.bets.len());
                for b in &overview.bets {
                    println!(
                        "  {} player {} event #{} {} {} SOL{}",
                        b.address,
                        b.player.short(),
                        b.event_id,
                        yes_no(b.chosen_outcome),
                        oracle_quest::types::lamports_to_sol(b.amount),
                        if b.claimed { " [claimed]" } else { "" }
                    );
                }
            }
        },
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

async fn play(settings: &Settings, program: Arc<LocalProgram>, wallet: Option<Wallet>) -> Result<()> {
    let bus = EventBus::create();

    let ready = bus.once(EventName::CurrentSceneReady, |ev| {
        if let BridgeEvent::CurrentSceneReady(info) = ev {
            tracing::debug!(scene = %info.key, "scene ready");
        }
    });

    let mut page = GamePage::mount(
        bus.clone(),
        program.clone(),
        wallet,
        PageConfig {
            debounce: settings.debounce,
        },
    );
    let scene = SceneController::new(bus.clone(), settings.scene_config());
    scene.start();

    println!("Commands: left | right | up | down | stop | interact | bet yes|no <sol> | goto <id> | where | refresh | quit");

    let dt = Duration::from_secs_f32(1.0 / settings.tick_rate_hz);
    let mut timer = tokio::time::interval(dt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input = InputState::default();
    let mut last_state = scene.state();
    let mut last_nearby: Option<u64> = None;
    let mut prompt_shown: Option<u64> = None;

    loop {
        tokio::select! {
            _ = timer.tick() => {
                scene.tick(dt, &input);

                let state = scene.state();
                if std::mem::discriminant(&state) != std::mem::discriminant(&last_state) {
                    describe_state(&scene, &state);
                    last_state = state;
                }

                let nearby = scene.nearby();
                let nearby_id = nearby.as_ref().map(|e| e.id);
                if nearby_id != last_nearby {
                    if let Some(e) = &nearby {
                        println!("Near oracle #{}: {} (type `interact`)", e.id, e.description);
                    }
                    last_nearby = nearby_id;
                }

                let prompt = page.bet_prompt();
                let prompt_id = prompt.as_ref().map(|p| p.event.id);
                if prompt_id != prompt_shown {
                    if let Some(p) = &prompt {
                        println!(
                            "Place your bet on #{} \"{}\" – `bet yes|no <sol>` (winners get 2x)",
                            p.event.id, p.event.description
                        );
                    }
                    prompt_shown = prompt_id;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let words: Vec<&str> = line.split_whitespace().collect();
                match words.as_slice() {
                    ["left"] => input = InputState { left: true, ..Default::default() },
                    ["right"] => input = InputState { right: true, ..Default::default() },
                    ["up"] => input = InputState { up: true, ..Default::default() },
                    ["down"] => input = InputState { down: true, ..Default::default() },
                    ["stop"] => input = InputState::default(),
                    ["interact"] => {
                        if scene.interact().is_none() {
                            println!("No oracle nearby.");
                        }
                    }
                    ["bet", side, amount] => {
                        let side = match *side {
                            "yes" => true,
                            "no" => false,
                            _ => {
                                println!("Please select YES or NO");
                                continue;
                            }
                        };
                        let amount: f64 = amount.parse().unwrap_or(f64::NAN);
                        let outcome = page.place_bet(side, amount).await;
                        report(outcome);
                        program
                            .save(&settings.ledger_path)
                            .context("Failed to save ledger")?;
                    }
                    ["goto", id] => {
                        let target = id
                            .parse::<u64>()
                            .ok()
                            .and_then(|id| scene.markers().into_iter().find(|m| m.event.id == id));
                        match target {
                            Some(m) => scene.set_player_position(m.position),
                            None => println!("No oracle #{} on the map.", id),
                        }
                    }
                    ["where"] => println!("Player at {}", scene.player().position),
                    ["refresh"] => {
                        if scene.refresh().is_none() {
                            println!("Still loading...");
                        }
                    }
                    ["quit"] | ["exit"] => break,
                    [] => {}
                    _ => println!("Unknown command: {}", line.trim()),
                }
            }
        }
    }

    scene.shutdown();
    page.unmount();
    bus.off(&ready);
    bus.dispose();
    Ok(())
}

fn describe_state(scene: &SceneController, state: &SceneState) {
    match (state, scene.overlay()) {
        (SceneState::Populated, _) => {
            println!("The world holds {} oracle(s):", scene.markers().len());
            for m in scene.markers() {
                println!("  #{} at {} – {}", m.event.id, m.position, m.event.description);
            }
        }
        (_, Overlay::NoData(text)) | (_, Overlay::Error(text)) | (_, Overlay::Placeholder(text)) => {
            println!("{}", text)
        }
        (_, Overlay::None) => {}
    }
}
