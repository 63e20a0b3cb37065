use crate::GameId;
use crate::Ordinal;
use crate::PlayerId;
use crate::battle::Stack;
use crate::battle::Status;
use crate::board::Cell;
use crate::catalog::FieldPreset;
use crate::catalog::UnitKind;
use serde::Serialize;
use tokio_postgres::Row;

impl From<Row> for UnitKind {
    fn from(row: Row) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("name"),
            damage: row.get("damage"),
            defense: row.get("defense"),
            max_hp: row.get("max_hp"),
            speed: row.get("speed"),
            attack_range: row.get("attack_range"),
            initiative: row.get("initiative"),
            is_flying: row.get("is_flying"),
            is_kamikaze: row.get("is_kamikaze"),
            dodge_chance: row.get("dodge_chance"),
            crit_chance: row.get("crit_chance"),
            luck: row.get("luck"),
            counter_chance: row.get("counter_chance"),
            effective_against: row.get("effective_against"),
            stack_size: row.get("stack_size"),
        }
    }
}

impl From<Row> for FieldPreset {
    fn from(row: Row) -> Self {
        Self {
            name: row.get("name"),
            width: row.get("width"),
            height: row.get("height"),
        }
    }
}

impl From<Row> for Stack {
    fn from(row: Row) -> Self {
        Stack::restore(
            row.get("id"),
            row.get("player_id"),
            row.get("unit_id"),
            Cell::new(row.get("x"), row.get("y")),
            row.get("count"),
            row.get("remaining_hp"),
            row.get("has_acted"),
            row.get("deferred"),
            row.get("countered"),
            row.get("morale"),
            row.get("fatigue"),
        )
    }
}

/// The `games` row as stored, before assembly into a [`crate::battle::Battle`].
#[derive(Debug, Clone)]
pub struct GameRow {
    pub id: GameId,
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub field: String,
    pub status: Status,
    pub current: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub round: u32,
    pub seed: u64,
    pub rolls: u32,
    pub version: i32,
}

impl From<Row> for GameRow {
    fn from(row: Row) -> Self {
        Self {
            id: row.get("id"),
            player1: row.get("player1_id"),
            player2: row.get("player2_id"),
            field: row.get("field_name"),
            status: Status::parse(row.get::<_, &str>("status")).expect("status column is valid"),
            current: row.get("current_player"),
            winner: row.get("winner_id"),
            round: row.get::<_, i32>("round") as u32,
            seed: row.get::<_, i64>("seed") as u64,
            rolls: row.get::<_, i32>("rolls") as u32,
            version: row.get("version"),
        }
    }
}

/// One `game_logs` row as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedEvent {
    pub ordinal: Ordinal,
    pub kind: String,
    pub summary: String,
    pub payload: serde_json::Value,
    pub at: String,
}

impl From<Row> for LoggedEvent {
    fn from(row: Row) -> Self {
        Self {
            ordinal: row.get("ordinal"),
            kind: row.get("kind"),
            summary: row.get("summary"),
            payload: row.get("payload"),
            at: row.get("at"),
        }
    }
}

/// A pending challenge as listed for its recipient.
#[derive(Debug, Clone, Serialize)]
pub struct Challenge {
    pub game_id: GameId,
    pub challenger_id: PlayerId,
    pub challenger: String,
    pub field: String,
    pub issued_at: String,
}

impl From<Row> for Challenge {
    fn from(row: Row) -> Self {
        Self {
            game_id: row.get("id"),
            challenger_id: row.get("player1_id"),
            challenger: row.get("challenger"),
            field: row.get("field_name"),
            issued_at: row.get("issued_at"),
        }
    }
}
