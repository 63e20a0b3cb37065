use crate::Count;
use crate::GameId;
use crate::Hp;
use crate::PlayerId;
use crate::StackId;
use crate::battle::Battle;
use crate::battle::Stack;
use crate::battle::Verdict;
use crate::board::Cell;
use crate::catalog::Catalog;
use crate::database::LoggedEvent;
use crate::error::Refusal;
use serde::Deserialize;
use serde::Serialize;

/// Outcome of one action submission.
#[derive(Debug, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    pub turn_switched: bool,
    pub game_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl ActionOutcome {
    pub fn of(battle: &Battle, verdict: Verdict) -> Self {
        Self {
            success: true,
            message: verdict.message,
            turn_switched: verdict.switched,
            game_status: battle.status().wire().to_string(),
            winner_id: battle.winner(),
            current_player_id: battle.current(),
            error: None,
        }
    }
    pub fn refused(refusal: &Refusal) -> Self {
        Self {
            success: false,
            message: refusal.message(),
            turn_switched: false,
            game_status: String::new(),
            winner_id: None,
            current_player_id: None,
            error: Some(refusal.kind()),
        }
    }
}

/// One stack as shown to clients, catalog row embedded.
#[derive(Debug, Serialize, Deserialize)]
pub struct StackView {
    pub id: StackId,
    pub player_id: PlayerId,
    pub x: i32,
    pub y: i32,
    pub count: Count,
    pub hp: Hp,
    pub has_moved: bool,
    pub deferred: bool,
    pub unit_type: crate::catalog::UnitKind,
}

impl StackView {
    fn of(stack: &Stack, catalog: &Catalog) -> Result<Self, Refusal> {
        Ok(Self {
            id: stack.id(),
            player_id: stack.owner(),
            x: stack.cell().x,
            y: stack.cell().y,
            count: stack.count(),
            hp: stack.front_hp(),
            has_moved: stack.has_acted(),
            deferred: stack.deferred(),
            unit_type: catalog.kind(stack.kind())?.clone(),
        })
    }
}

/// Full match snapshot plus the event tail the caller has not seen.
#[derive(Debug, Serialize)]
pub struct GameState {
    pub id: GameId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub field: String,
    pub width: i32,
    pub height: i32,
    pub status: String,
    pub round: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<PlayerId>,
    pub units: Vec<StackView>,
    pub obstacles: Vec<Cell>,
    pub events: Vec<LoggedEvent>,
}

impl GameState {
    pub fn assemble(
        battle: &Battle,
        catalog: &Catalog,
        events: Vec<LoggedEvent>,
    ) -> Result<Self, Refusal> {
        let [player1, player2] = battle.players();
        let mut obstacles = battle.grid().obstacles().collect::<Vec<_>>();
        obstacles.sort_unstable();
        Ok(Self {
            id: battle.id(),
            player1_id: player1,
            player2_id: player2,
            field: battle.field().to_string(),
            width: battle.grid().width(),
            height: battle.grid().height(),
            status: battle.status().wire().to_string(),
            round: battle.round(),
            current_player_id: battle.current(),
            winner_id: battle.winner(),
            units: battle
                .stacks()
                .iter()
                .map(|s| StackView::of(s, catalog))
                .collect::<Result<_, _>>()?,
            obstacles,
            events,
        })
    }
}

/// Cells a stack may move to and enemies it may strike right now.
#[derive(Debug, Serialize, Deserialize)]
pub struct StackOptions {
    pub can_move: Vec<Cell>,
    pub can_attack: Vec<AttackOption>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttackOption {
    pub id: StackId,
    pub x: i32,
    pub y: i32,
}

impl StackOptions {
    pub fn assemble(battle: &Battle, catalog: &Catalog, stack: StackId) -> Result<Self, Refusal> {
        let subject = battle.stack(stack)?;
        let kind = catalog.kind(subject.kind())?;
        let can_move = match subject.alive() {
            true => battle.grid().reach(
                subject.cell(),
                kind.speed,
                kind.is_flying,
                &battle.occupied_except(stack),
            ),
            false => Vec::new(),
        };
        let can_attack = match subject.alive() {
            true => battle
                .opposing(subject.owner())
                .filter(|s| subject.cell().cheb(s.cell()) <= kind.attack_range)
                .map(|s| AttackOption {
                    id: s.id(),
                    x: s.cell().x,
                    y: s.cell().y,
                })
                .collect(),
            false => Vec::new(),
        };
        Ok(Self { can_move, can_attack })
    }
}

/// Roster entry for the challenge UI.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: PlayerId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::Status;
    use crate::board::Grid;
    use crate::catalog::UnitKind;

    fn kind(id: crate::KindId, speed: i32, range: i32) -> UnitKind {
        UnitKind {
            id,
            name: format!("kind-{}", id),
            damage: 10,
            defense: 0,
            max_hp: 10,
            speed,
            attack_range: range,
            initiative: 5,
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

    fn arena(stacks: Vec<Stack>) -> Battle {
        Battle::restore(
            1,
            [100, 200],
            "5x5".to_string(),
            Grid::new(5, 5),
            Status::InProgress,
            1,
            Some(100),
            None,
            stacks,
            42,
            0,
            0,
            1,
        )
    }

    #[test]
    fn immobile_stack_can_still_attack() {
        let catalog = Catalog::new(vec![kind(1, 0, 1), kind(2, 2, 1)], vec![]);
        let battle = arena(vec![
            Stack::fresh(1, 100, 1, Cell::new(1, 1), 5, 10),
            Stack::fresh(2, 200, 2, Cell::new(2, 1), 5, 10),
        ]);
        let options = StackOptions::assemble(&battle, &catalog, 1).unwrap();
        assert!(options.can_move.is_empty());
        assert_eq!(options.can_attack.len(), 1);
        assert_eq!(options.can_attack[0].id, 2);
    }

    #[test]
    fn dead_stack_has_no_options() {
        let catalog = Catalog::new(vec![kind(1, 2, 1), kind(2, 2, 1)], vec![]);
        let battle = arena(vec![
            Stack::fresh(1, 100, 1, Cell::new(1, 1), 0, 0),
            Stack::fresh(2, 200, 2, Cell::new(2, 1), 5, 10),
        ]);
        let options = StackOptions::assemble(&battle, &catalog, 1).unwrap();
        assert!(options.can_move.is_empty());
        assert!(options.can_attack.is_empty());
    }

    #[test]
    fn attack_options_respect_range() {
        let catalog = Catalog::new(vec![kind(1, 2, 3), kind(2, 2, 1)], vec![]);
        let battle = arena(vec![
            Stack::fresh(1, 100, 1, Cell::new(0, 0), 5, 10),
            Stack::fresh(2, 200, 2, Cell::new(3, 0), 5, 10),
            Stack::fresh(3, 200, 2, Cell::new(4, 4), 5, 10),
        ]);
        let options = StackOptions::assemble(&battle, &catalog, 1).unwrap();
        let ids = options.can_attack.iter().map(|a| a.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2]);
    }
}
