//! Authoritative battle engine for turn-based tactical grid combat.
//!
//! Two players command stacks of creatures on a small rectangular grid.
//! Every match is an independent state machine advanced only by player
//! actions submitted over HTTP; the server owns ordering, legality, and
//! all stochastic resolution.
//!
//! ## Modules
//!
//! - [`catalog`] — immutable unit-kind and field-preset lookup
//! - [`board`] — grid geometry, obstacles, reachability, attack range
//! - [`battle`] — match state, initiative, actions, combat, event log
//! - [`database`] — PostgreSQL schema and the atomic load/save gateway
//! - [`registry`] — per-match serialization of inbound requests
//! - [`hosting`] — actix-web server and route handlers
//! - [`dto`] — wire request/response shapes

pub mod battle;
pub mod board;
pub mod catalog;
pub mod database;
pub mod dto;
pub mod error;
pub mod hosting;
pub mod registry;

/// Player account identifier.
pub type PlayerId = i64;
/// Match identifier.
pub type GameId = i64;
/// Battle-unit (stack) identifier.
pub type StackId = i64;
/// Catalog unit-kind identifier.
pub type KindId = i64;
/// Hit points of a single creature.
pub type Hp = i32;
/// Damage dealt in one strike, after defense.
pub type Damage = i32;
/// Creatures in a stack.
pub type Count = i32;
/// Position of an event within a match's log, starting at 1.
pub type Ordinal = i64;
/// Bernoulli parameters carried by the unit catalog.
pub type Probability = f64;

/// Rounds after which a match is force-settled.
pub const ROUND_CAP: u32 = 200;
/// Attempts to commit a match before surfacing `conflict`.
pub const SAVE_RETRIES: usize = 3;
/// Bound on waiting for a match's exclusive lock.
pub const LOCK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// Soft bound on read-only snapshot queries.
pub const READ_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);

/// Incoming damage multiplier when the attacker counters the target's kind.
pub const EFFECTIVE_BONUS: f64 = 1.5;
/// Damage multiplier on a critical strike.
pub const CRIT_BONUS: f64 = 2.0;
/// Damage multiplier on a lucky strike, stacking with crit.
pub const LUCK_BONUS: f64 = 1.25;

/// One obstacle is rolled per this many field cells at activation.
pub const OBSTACLE_DENSITY: u32 = 10;

/// Route engine logging to the terminal and a per-run file.
/// The terminal stays at INFO; `logs/arena-<epoch>.log` captures DEBUG,
/// which includes every event a match appends.
pub fn log() {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_secs();
    std::fs::create_dir_all("logs").expect("create logs directory");
    let sink =
        std::fs::File::create(format!("logs/arena-{}.log", stamp)).expect("create log file");
    let format = simplelog::ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .set_location_level(log::LevelFilter::Off)
        .build();
    simplelog::CombinedLogger::init(vec![
        simplelog::TermLogger::new(
            log::LevelFilter::Info,
            format.clone(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ),
        simplelog::WriteLogger::new(log::LevelFilter::Debug, format, sink),
    ])
    .expect("install combined logger");
}

/// Exit on Ctrl+C. Mutating requests are not cancellable inside their
/// critical section, so shutdown is immediate: whatever has not committed
/// is never saved, and the next load sees the last committed state.
pub fn interrupt() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        log::warn!("interrupt: abandoning in-flight requests, last committed state stands");
        std::process::exit(0);
    });
}
