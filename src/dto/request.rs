use crate::Ordinal;
use crate::PlayerId;
use crate::StackId;
use crate::battle::Action;
use crate::board::Cell;
use crate::error::Refusal;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGame {
    pub player1_id: PlayerId,
    pub player2_name: String,
    pub field_size: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerChallenge {
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Surrender {
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingQuery {
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateQuery {
    /// Highest event ordinal the caller has already seen.
    #[serde(default)]
    pub since: Option<Ordinal>,
}

/// One action submission against a match.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAction {
    pub player_id: PlayerId,
    pub unit_id: StackId,
    pub action: String,
    #[serde(default)]
    pub target_x: Option<i32>,
    #[serde(default)]
    pub target_y: Option<i32>,
    #[serde(default)]
    pub target_id: Option<StackId>,
}

impl SubmitAction {
    /// Decode the wire verb and its operands into a domain action.
    pub fn action(&self) -> Result<Action, Refusal> {
        let stack = self.unit_id;
        match self.action.as_str() {
            "move" => match (self.target_x, self.target_y) {
                (Some(x), Some(y)) => Ok(Action::Move {
                    stack,
                    to: Cell::new(x, y),
                }),
                _ => Err(Refusal::Illegal(
                    "move requires target_x and target_y".to_string(),
                )),
            },
            "attack" => match self.target_id {
                Some(target) => Ok(Action::Attack { stack, target }),
                None => Err(Refusal::Illegal("attack requires target_id".to_string())),
            },
            "skip" => Ok(Action::Skip { stack }),
            "defer" => Ok(Action::Defer { stack }),
            other => Err(Refusal::Illegal(format!("unknown action {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(action: &str) -> SubmitAction {
        SubmitAction {
            player_id: 1,
            unit_id: 2,
            action: action.to_string(),
            target_x: None,
            target_y: None,
            target_id: None,
        }
    }

    #[test]
    fn decodes_the_four_verbs() {
        assert_eq!(submit("skip").action().unwrap(), Action::Skip { stack: 2 });
        assert_eq!(submit("defer").action().unwrap(), Action::Defer { stack: 2 });
        let mut movement = submit("move");
        movement.target_x = Some(3);
        movement.target_y = Some(4);
        assert_eq!(
            movement.action().unwrap(),
            Action::Move { stack: 2, to: Cell::new(3, 4) }
        );
        let mut attack = submit("attack");
        attack.target_id = Some(9);
        assert_eq!(
            attack.action().unwrap(),
            Action::Attack { stack: 2, target: 9 }
        );
    }

    #[test]
    fn missing_operands_are_illegal() {
        assert!(submit("move").action().is_err());
        assert!(submit("attack").action().is_err());
        assert!(submit("dance").action().is_err());
    }
}
