use super::*;
use crate::GameId;
use crate::PlayerId;
use crate::battle::Battle;
use crate::battle::Status;
use crate::board::Grid;
use crate::catalog::Catalog;
use crate::error::Refusal;
use const_format::concatcp;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::Client;

/// Atomic persistence of one match.
///
/// `save` commits the match row, every stack row, and the new events in a
/// single transaction, guarded by the optimistic version column; a missed
/// guard surfaces as [`Refusal::Conflict`] and the registry retries with
/// a fresh load.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    async fn load(&self, game: GameId) -> Result<Battle, Refusal>;
    async fn save(&self, battle: &mut Battle) -> Result<(), Refusal>;
}

/// The production gateway.
///
/// Reads go through a shared pipelined connection; writes take a second,
/// mutex-guarded connection so each transaction owns its wire exclusively.
pub struct Postgres {
    reader: Arc<Client>,
    writer: Mutex<Client>,
    catalog: Arc<Catalog>,
}

#[rustfmt::skip]
const SELECT_GAME: &str = concatcp!(
    "SELECT id, player1_id, player2_id, field_name, status, current_player, ",
           "winner_id, round, seed, rolls, version ",
    "FROM   ", GAMES, " ",
    "WHERE  id = $1"
);
#[rustfmt::skip]
const SELECT_STACKS: &str = concatcp!(
    "SELECT id, player_id, unit_id, x, y, count, remaining_hp, ",
           "has_acted, deferred, countered, morale, fatigue ",
    "FROM   ", STACKS, " ",
    "WHERE  game_id = $1 ",
    "ORDER  BY id"
);
#[rustfmt::skip]
const SELECT_OBSTACLES: &str = concatcp!(
    "SELECT x, y FROM ", OBSTACLES, " WHERE game_id = $1"
);
#[rustfmt::skip]
const SELECT_ORDINAL: &str = concatcp!(
    "SELECT COALESCE(MAX(ordinal), 0) + 1 AS next FROM ", LOGS, " WHERE game_id = $1"
);
#[rustfmt::skip]
const GUARDED_UPDATE: &str = concatcp!(
    "UPDATE ", GAMES, " ",
    "SET    status = $2, current_player = $3, winner_id = $4, round = $5, ",
           "rolls = $6, version = version + 1, updated_at = NOW() ",
    "WHERE  id = $1 AND version = $7"
);
#[rustfmt::skip]
const UPDATE_STACK: &str = concatcp!(
    "UPDATE ", STACKS, " ",
    "SET    x = $3, y = $4, count = $5, remaining_hp = $6, ",
           "has_acted = $7, deferred = $8, countered = $9, morale = $10, fatigue = $11 ",
    "WHERE  game_id = $1 AND id = $2"
);
#[rustfmt::skip]
const INSERT_EVENT: &str = concatcp!(
    "INSERT INTO ", LOGS, " (game_id, ordinal, kind, summary, payload) ",
    "VALUES ($1, $2, $3, $4, $5)"
);
#[rustfmt::skip]
const INSERT_STACK: &str = concatcp!(
    "INSERT INTO ", STACKS, " (game_id, id, player_id, unit_id, x, y, count, remaining_hp) ",
    "VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
);
#[rustfmt::skip]
const INSERT_OBSTACLE: &str = concatcp!(
    "INSERT INTO ", OBSTACLES, " (game_id, x, y) VALUES ($1, $2, $3)"
);

impl Postgres {
    pub fn new(reader: Arc<Client>, writer: Client, catalog: Arc<Catalog>) -> Self {
        Self {
            reader,
            writer: Mutex::new(writer),
            catalog,
        }
    }

    /// Roster of registered players for the challenge UI.
    pub async fn players(&self) -> Result<Vec<(PlayerId, String)>, Refusal> {
        const SQL: &str = concatcp!("SELECT id, name FROM ", USERS, " ORDER BY id");
        Ok(self
            .reader
            .query(SQL, &[])
            .await?
            .into_iter()
            .map(|row| (row.get("id"), row.get("name")))
            .collect())
    }

    /// Issue a challenge: a `waiting` match against a named opponent.
    pub async fn create(
        &self,
        challenger: PlayerId,
        opponent: &str,
        field: &str,
    ) -> Result<GameId, Refusal> {
        const FIND: &str = concatcp!("SELECT id FROM ", USERS, " WHERE name = $1");
        const EXISTS: &str = concatcp!("SELECT id FROM ", USERS, " WHERE id = $1");
        const CREATE: &str = concatcp!(
            "INSERT INTO ", GAMES, " (player1_id, player2_id, field_name) ",
            "VALUES ($1, $2, $3) RETURNING id"
        );
        self.catalog.field(field)?;
        self.reader
            .query_opt(EXISTS, &[&challenger])
            .await?
            .ok_or_else(|| Refusal::NotFound(format!("no player {}", challenger)))?;
        let opponent: PlayerId = self
            .reader
            .query_opt(FIND, &[&opponent])
            .await?
            .ok_or_else(|| Refusal::NotFound(format!("no player named {}", opponent)))?
            .get("id");
        if opponent == challenger {
            return Err(Refusal::Illegal("cannot challenge yourself".to_string()));
        }
        let id = self
            .reader
            .query_one(CREATE, &[&challenger, &opponent, &field])
            .await?
            .get("id");
        log::info!("player {} challenged player {} to game {}", challenger, opponent, id);
        Ok(id)
    }

    /// Challenges waiting on a player's answer.
    pub async fn pending(&self, player: PlayerId) -> Result<Vec<Challenge>, Refusal> {
        const SQL: &str = concatcp!(
            "SELECT g.id, g.player1_id, u.name AS challenger, g.field_name, ",
                   "g.created_at::TEXT AS issued_at ",
            "FROM   ", GAMES, " g ",
            "JOIN   ", USERS, " u ON u.id = g.player1_id ",
            "WHERE  g.player2_id = $1 AND g.status = 'waiting' ",
            "ORDER  BY g.id"
        );
        Ok(self
            .reader
            .query(SQL, &[&player])
            .await?
            .into_iter()
            .map(Challenge::from)
            .collect())
    }

    /// Accept a challenge: draft armies, roll obstacles, persist the
    /// activated battle and its `match_started` event atomically.
    pub async fn accept(&self, game: GameId, player: PlayerId) -> Result<Battle, Refusal> {
        const LOCKED: &str = concatcp!(
            "SELECT id, player1_id, player2_id, field_name, status, current_player, ",
                   "winner_id, round, seed, rolls, version ",
            "FROM   ", GAMES, " WHERE id = $1 FOR UPDATE"
        );
        let mut client = self.writer.lock().await;
        let tx = client.transaction().await?;
        let row = tx
            .query_opt(LOCKED, &[&game])
            .await?
            .map(GameRow::from)
            .ok_or_else(|| Refusal::NotFound(format!("no game {}", game)))?;
        if row.status != Status::Waiting {
            return Err(Refusal::Stale("challenge was already answered".to_string()));
        }
        if row.player2 != player {
            return Err(Refusal::Forbidden("this challenge is not for you".to_string()));
        }
        let preset = self.catalog.field(&row.field)?;
        let seed = rand::random::<u64>();
        let mut battle = Battle::activate(
            game,
            [row.player1, row.player2],
            preset,
            seed,
            &self.catalog,
        );
        for stack in battle.stacks() {
            tx.execute(
                INSERT_STACK,
                &[
                    &game,
                    &stack.id(),
                    &stack.owner(),
                    &stack.kind(),
                    &stack.cell().x,
                    &stack.cell().y,
                    &stack.count(),
                    &stack.front_hp(),
                ],
            )
            .await?;
        }
        for cell in battle.grid().obstacles() {
            tx.execute(INSERT_OBSTACLE, &[&game, &cell.x, &cell.y]).await?;
        }
        const ACTIVATE: &str = concatcp!(
            "UPDATE ", GAMES, " ",
            "SET    status = 'in_progress', current_player = $2, seed = $3, rolls = $4, ",
                   "round = 1, version = version + 1, updated_at = NOW() ",
            "WHERE  id = $1"
        );
        tx.execute(
            ACTIVATE,
            &[&game, &battle.current(), &(battle.seed() as i64), &(battle.rolls() as i32)],
        )
        .await?;
        for event in battle.commit() {
            tx.execute(
                INSERT_EVENT,
                &[
                    &game,
                    &event.ordinal,
                    &event.kind(),
                    &event.summary,
                    &serde_json::to_value(&event.payload).expect("payloads serialize"),
                ],
            )
            .await?;
        }
        tx.commit().await?;
        log::info!("game {} activated by player {}", game, player);
        Ok(battle)
    }

    /// Decline a challenge; the match record is deleted outright.
    pub async fn decline(&self, game: GameId, player: PlayerId) -> Result<(), Refusal> {
        const SQL: &str = concatcp!(
            "DELETE FROM ", GAMES, " ",
            "WHERE id = $1 AND player2_id = $2 AND status = 'waiting'"
        );
        match self.reader.execute(SQL, &[&game, &player]).await? {
            0 => Err(Refusal::NotFound(format!(
                "no pending challenge {} for player {}",
                game, player
            ))),
            _ => Ok(()),
        }
    }

    /// Event-log tail after `since`, for incremental client polling.
    pub async fn events_after(
        &self,
        game: GameId,
        since: crate::Ordinal,
    ) -> Result<Vec<LoggedEvent>, Refusal> {
        const SQL: &str = concatcp!(
            "SELECT ordinal, kind, summary, payload, created_at::TEXT AS at ",
            "FROM   ", LOGS, " ",
            "WHERE  game_id = $1 AND ordinal > $2 ",
            "ORDER  BY ordinal"
        );
        Ok(self
            .reader
            .query(SQL, &[&game, &since])
            .await?
            .into_iter()
            .map(LoggedEvent::from)
            .collect())
    }
}

#[async_trait::async_trait]
impl Gateway for Postgres {
    async fn load(&self, game: GameId) -> Result<Battle, Refusal> {
        let row = self
            .reader
            .query_opt(SELECT_GAME, &[&game])
            .await?
            .map(GameRow::from)
            .ok_or_else(|| Refusal::NotFound(format!("no game {}", game)))?;
        let preset = self.catalog.field(&row.field)?;
        let mut grid = Grid::new(preset.width, preset.height);
        for cell in self.reader.query(SELECT_OBSTACLES, &[&game]).await? {
            grid.block(crate::board::Cell::new(cell.get("x"), cell.get("y")));
        }
        let stacks = self
            .reader
            .query(SELECT_STACKS, &[&game])
            .await?
            .into_iter()
            .map(crate::battle::Stack::from)
            .collect();
        let next: i64 = self
            .reader
            .query_one(SELECT_ORDINAL, &[&game])
            .await?
            .get("next");
        Ok(Battle::restore(
            row.id,
            [row.player1, row.player2],
            row.field,
            grid,
            row.status,
            row.round,
            row.current,
            row.winner,
            stacks,
            row.seed,
            row.rolls,
            row.version,
            next,
        ))
    }

    async fn save(&self, battle: &mut Battle) -> Result<(), Refusal> {
        let game = battle.id();
        let mut client = self.writer.lock().await;
        let tx = client.transaction().await?;
        let guarded = tx
            .execute(
                GUARDED_UPDATE,
                &[
                    &game,
                    &battle.status().column(),
                    &battle.current(),
                    &battle.winner(),
                    &(battle.round() as i32),
                    &(battle.rolls() as i32),
                    &battle.version(),
                ],
            )
            .await?;
        if guarded == 0 {
            return Err(Refusal::Conflict);
        }
        for stack in battle.stacks() {
            tx.execute(
                UPDATE_STACK,
                &[
                    &game,
                    &stack.id(),
                    &stack.cell().x,
                    &stack.cell().y,
                    &stack.count(),
                    &stack.front_hp(),
                    &stack.has_acted(),
                    &stack.deferred(),
                    &stack.countered(),
                    &stack.morale(),
                    &stack.fatigue(),
                ],
            )
            .await?;
        }
        for event in battle.events() {
            tx.execute(
                INSERT_EVENT,
                &[
                    &game,
                    &event.ordinal,
                    &event.kind(),
                    &event.summary,
                    &serde_json::to_value(&event.payload).expect("payloads serialize"),
                ],
            )
            .await?;
        }
        tx.commit().await?;
        battle.commit();
        Ok(())
    }
}
