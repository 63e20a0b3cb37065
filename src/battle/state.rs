use super::*;
use crate::GameId;
use crate::OBSTACLE_DENSITY;
use crate::Ordinal;
use crate::PlayerId;
use crate::StackId;
use crate::board::Cell;
use crate::board::Grid;
use crate::catalog::Catalog;
use crate::catalog::FieldPreset;
use crate::error::Refusal;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;

/// Match lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Waiting,
    InProgress,
    Completed,
}

impl Status {
    /// Storage spelling of the status enum.
    pub fn column(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }
    /// Wire spelling expected by clients.
    pub fn wire(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::InProgress => "active",
            Status::Completed => "completed",
        }
    }
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "waiting" => Ok(Status::Waiting),
            "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(anyhow::anyhow!("unknown game status {}", other)),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// In-memory state of one match.
///
/// Assembled from persisted rows on every request, mutated only through
/// the action resolver, and handed back to the gateway together with the
/// events the mutation appended. Never shared across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Battle {
    id: GameId,
    players: [PlayerId; 2],
    field: String,
    grid: Grid,
    status: Status,
    round: u32,
    current: Option<PlayerId>,
    winner: Option<PlayerId>,
    stacks: Vec<Stack>,
    seed: u64,
    rolls: u32,
    version: i32,
    next_ordinal: Ordinal,
    events: Vec<Event>,
}

impl Battle {
    /// Bring a pending match to life: draft both armies, roll obstacles
    /// from the match seed, seat the first actor, and log `match_started`.
    ///
    /// Each player drafts one stack per catalog kind. Player 1 fills the
    /// left edge top-down in initiative order, player 2 the right edge;
    /// rosters longer than the field wrap into the adjacent column.
    pub fn activate(
        id: GameId,
        players: [PlayerId; 2],
        preset: &FieldPreset,
        seed: u64,
        catalog: &Catalog,
    ) -> Self {
        let mut grid = Grid::new(preset.width, preset.height);
        let mut dice = Dice::fresh(seed);
        let mut roster = catalog.roster().collect::<Vec<_>>();
        roster.sort_by_key(|k| (std::cmp::Reverse(k.initiative), k.id));
        let slots = (2 * preset.height) as usize;
        if roster.len() > slots {
            log::warn!("roster of {} exceeds {} spawn slots, truncating", roster.len(), slots);
            roster.truncate(slots);
        }
        let mut stacks = Vec::new();
        for (side, player) in players.into_iter().enumerate() {
            let columns = match side {
                0 => [0, 1],
                _ => [preset.width - 1, preset.width - 2],
            };
            for (slot, kind) in roster.iter().enumerate() {
                let cell = Cell::new(
                    columns[slot / preset.height as usize],
                    (slot % preset.height as usize) as i32,
                );
                stacks.push(Stack::fresh(
                    stacks.len() as StackId + 1,
                    player,
                    kind.id,
                    cell,
                    kind.stack_size,
                    kind.max_hp,
                ));
            }
        }
        let mut candidates = (2..=preset.width - 3)
            .flat_map(|x| (0..preset.height).map(move |y| Cell::new(x, y)))
            .collect::<Vec<_>>();
        for _ in 0..(preset.width * preset.height) as u32 / OBSTACLE_DENSITY {
            if candidates.is_empty() {
                break;
            }
            let pick = (dice.roll() * candidates.len() as f64) as usize;
            grid.block(candidates.swap_remove(pick));
        }
        let mut battle = Self {
            id,
            players,
            field: preset.name.clone(),
            grid,
            status: Status::InProgress,
            round: 1,
            current: None,
            winner: None,
            stacks,
            seed,
            rolls: dice.drawn(),
            version: 0,
            next_ordinal: 1,
            events: Vec::new(),
        };
        let placements = battle
            .stacks
            .iter()
            .map(|s| Placement {
                stack: s.id(),
                player: s.owner(),
                kind: s.kind(),
                cell: s.cell(),
                count: s.count(),
            })
            .collect();
        let mut obstacles = battle.grid.obstacles().collect::<Vec<_>>();
        obstacles.sort_unstable();
        battle.record(
            format!("battle joined on {}", preset.name),
            Payload::MatchStarted {
                players,
                field: preset.name.clone(),
                stacks: placements,
                obstacles,
            },
        );
        let first = battle.cursor(catalog).expect("drafted rosters are non-empty");
        battle.current = Some(battle.stack(first).expect("cursor is a live stack").owner());
        battle
    }

    /// Rebuild a match exactly as persisted.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: GameId,
        players: [PlayerId; 2],
        field: String,
        grid: Grid,
        status: Status,
        round: u32,
        current: Option<PlayerId>,
        winner: Option<PlayerId>,
        stacks: Vec<Stack>,
        seed: u64,
        rolls: u32,
        version: i32,
        next_ordinal: Ordinal,
    ) -> Self {
        Self {
            id,
            players,
            field,
            grid,
            status,
            round,
            current,
            winner,
            stacks,
            seed,
            rolls,
            version,
            next_ordinal,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }
    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }
    pub fn is_player(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }
    pub fn opponent(&self, player: PlayerId) -> PlayerId {
        match player == self.players[0] {
            true => self.players[1],
            false => self.players[0],
        }
    }
    pub fn field(&self) -> &str {
        &self.field
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn round(&self) -> u32 {
        self.round
    }
    pub fn current(&self) -> Option<PlayerId> {
        self.current
    }
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn rolls(&self) -> u32 {
        self.rolls
    }
    pub fn version(&self) -> i32 {
        self.version
    }
    pub fn next_ordinal(&self) -> Ordinal {
        self.next_ordinal
    }
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn stack(&self, id: StackId) -> Result<&Stack, Refusal> {
        self.stacks
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| Refusal::NotFound(format!("no stack #{} in this match", id)))
    }
    pub(crate) fn stack_mut(&mut self, id: StackId) -> Result<&mut Stack, Refusal> {
        self.stacks
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| Refusal::NotFound(format!("no stack #{} in this match", id)))
    }
    pub fn living(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.iter().filter(|s| s.alive())
    }
    pub fn stacks_of(&self, player: PlayerId) -> impl Iterator<Item = &Stack> {
        self.living().filter(move |s| s.owner() == player)
    }
    pub fn opposing(&self, player: PlayerId) -> impl Iterator<Item = &Stack> {
        self.living().filter(move |s| s.owner() != player)
    }
    pub fn stack_at(&self, cell: Cell) -> Option<&Stack> {
        self.living().find(|s| s.cell() == cell)
    }
    pub fn side_alive(&self, player: PlayerId) -> bool {
        self.stacks_of(player).next().is_some()
    }
    /// Cells held by living stacks, minus the one a mover vacates.
    pub fn occupied_except(&self, mover: StackId) -> HashSet<Cell> {
        self.living()
            .filter(|s| s.id() != mover)
            .map(|s| s.cell())
            .collect()
    }
    /// Total remaining hit points of one side, the round-cap tiebreak.
    pub fn side_hp(&self, player: PlayerId, catalog: &Catalog) -> i64 {
        self.stacks_of(player)
            .map(|s| {
                catalog
                    .kind(s.kind())
                    .map(|k| s.total_hp(k.max_hp))
                    .unwrap_or(0)
            })
            .sum()
    }

    pub(crate) fn dice(&self) -> Dice {
        Dice::resume(self.seed, self.rolls)
    }
    pub(crate) fn absorb_dice(&mut self, dice: &Dice) {
        self.rolls = dice.drawn();
    }
    pub(crate) fn set_current(&mut self, player: PlayerId) {
        self.current = Some(player);
    }
    /// Append an event with the next gapless ordinal.
    pub(crate) fn record(&mut self, summary: String, payload: Payload) {
        let event = Event {
            ordinal: self.next_ordinal,
            summary,
            payload,
        };
        log::debug!("[game {}] {}", self.id, event);
        self.next_ordinal += 1;
        self.events.push(event);
    }
    /// Terminate the match and log `match_ended`.
    pub(crate) fn finish(&mut self, winner: Option<PlayerId>, reason: &str) {
        self.status = Status::Completed;
        self.winner = winner;
        self.current = None;
        let summary = match winner {
            Some(p) => format!("player {} wins by {}", p, reason),
            None => format!("draw by {}", reason),
        };
        self.record(
            summary,
            Payload::MatchEnded {
                winner,
                reason: reason.to_string(),
            },
        );
    }
    /// Hand the buffered events to the gateway for persistence.
    pub(crate) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
    /// A successful save: the stored version moved on and the event
    /// buffer belongs to the log now.
    pub(crate) fn commit(&mut self) -> Vec<Event> {
        self.version += 1;
        self.take_events()
    }

    /// Replay support: mutate state without emitting.
    pub(crate) fn apply_ended(&mut self, winner: Option<PlayerId>) {
        self.status = Status::Completed;
        self.winner = winner;
        self.current = None;
    }
    pub(crate) fn apply_round(&mut self, round: u32) {
        self.round = round;
        self.stacks
            .iter_mut()
            .filter(|s| s.alive())
            .for_each(Stack::refresh);
    }
    pub(crate) fn align_ordinal(&mut self, next: Ordinal) {
        self.next_ordinal = next;
    }

    /// Value snapshot for comparison, serialization, and replay checks.
    pub fn snapshot(&self) -> Snapshot {
        let mut obstacles = self.grid.obstacles().collect::<Vec<_>>();
        obstacles.sort_unstable();
        Snapshot {
            id: self.id,
            players: self.players,
            field: self.field.clone(),
            width: self.grid.width(),
            height: self.grid.height(),
            status: self.status,
            round: self.round,
            current: self.current,
            winner: self.winner,
            obstacles,
            stacks: self.stacks.clone(),
        }
    }
}

/// Plain-value image of a match, the unit of client-visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: GameId,
    pub players: [PlayerId; 2],
    pub field: String,
    pub width: i32,
    pub height: i32,
    pub status: Status,
    pub round: u32,
    pub current: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub obstacles: Vec<Cell>,
    pub stacks: Vec<Stack>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitKind;

    fn kind(id: crate::KindId, initiative: i32) -> UnitKind {
        UnitKind {
            id,
            name: format!("kind-{}", id),
            damage: 10,
            defense: 0,
            max_hp: 10,
            speed: 2,
            attack_range: 1,
            initiative,
            is_flying: false,
            is_kamikaze: false,
            dodge_chance: 0.0,
            crit_chance: 0.0,
            luck: 0.0,
            counter_chance: 0.0,
            effective_against: None,
            stack_size: 5,
        }
    }

    fn preset() -> FieldPreset {
        FieldPreset {
            name: "7x7".to_string(),
            width: 7,
            height: 7,
        }
    }

    #[test]
    fn activation_places_both_armies() {
        let catalog = Catalog::new(vec![kind(1, 8), kind(2, 5)], vec![preset()]);
        let battle = Battle::activate(9, [100, 200], &preset(), 42, &catalog);
        assert_eq!(battle.status(), Status::InProgress);
        assert_eq!(battle.round(), 1);
        assert_eq!(battle.stacks().len(), 4);
        assert!(battle.stacks_of(100).all(|s| s.cell().x == 0));
        assert!(battle.stacks_of(200).all(|s| s.cell().x == 6));
        assert_eq!(battle.events().len(), 1);
        assert_eq!(battle.events()[0].kind(), "match_started");
        assert_eq!(battle.current(), Some(100));
    }

    #[test]
    fn activation_is_reproducible_from_seed() {
        let catalog = Catalog::new(vec![kind(1, 8), kind(2, 5)], vec![preset()]);
        let a = Battle::activate(9, [100, 200], &preset(), 42, &catalog);
        let b = Battle::activate(9, [100, 200], &preset(), 42, &catalog);
        let c = Battle::activate(9, [100, 200], &preset(), 43, &catalog);
        assert_eq!(a.snapshot(), b.snapshot());
        assert_ne!(
            a.grid().obstacles().collect::<std::collections::HashSet<_>>(),
            c.grid().obstacles().collect::<std::collections::HashSet<_>>(),
        );
    }

    #[test]
    fn obstacles_never_touch_spawn_columns() {
        let catalog = Catalog::new(vec![kind(1, 8)], vec![preset()]);
        let battle = Battle::activate(9, [100, 200], &preset(), 7, &catalog);
        assert!(battle.grid().obstacles().all(|c| c.x >= 2 && c.x <= 4));
        assert_eq!(battle.grid().obstacles().count(), 4);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let catalog = Catalog::new(vec![kind(1, 8), kind(2, 5)], vec![preset()]);
        let battle = Battle::activate(9, [100, 200], &preset(), 42, &catalog);
        let snapshot = battle.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back = serde_json::from_str::<Snapshot>(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
