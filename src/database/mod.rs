//! PostgreSQL persistence for matches.
//!
//! - [`db()`] — connection from the `DB_URL` environment variable
//! - [`migrate`] — idempotent DDL plus seed rows for the catalog
//! - [`Gateway`] / [`Postgres`] — atomic load/save of one match
//!
//! Stored stack and match rows are a cache of the event fold; the
//! `game_logs` table is the system of record.

mod gateway;
mod rows;
mod schema;

pub use gateway::*;
pub use rows::*;
pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Connects to PostgreSQL using the `DB_URL` environment variable and
/// spawns the connection driver onto the runtime.
pub async fn connect() -> Client {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").expect("DB_URL must be set");
    let (client, connection) = tokio_postgres::connect(url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    client
}

/// Shared read connection; queries pipeline freely across requests.
pub async fn db() -> Arc<Client> {
    Arc::new(connect().await)
}

/// Table for player accounts.
#[rustfmt::skip]
pub const USERS:     &str = "game_users";
/// Table for the unit-kind catalog.
#[rustfmt::skip]
pub const UNITS:     &str = "units";
/// Table for field presets.
#[rustfmt::skip]
pub const FIELDS:    &str = "fields";
/// Table for matches.
#[rustfmt::skip]
pub const GAMES:     &str = "games";
/// Table for stacks, one row per battle unit, corpses included.
#[rustfmt::skip]
pub const STACKS:    &str = "battle_units";
/// Table for per-match obstacle cells.
#[rustfmt::skip]
pub const OBSTACLES: &str = "obstacles";
/// Table for the append-only event log.
#[rustfmt::skip]
pub const LOGS:      &str = "game_logs";
