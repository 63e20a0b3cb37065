use crate::StackId;
use crate::board::Cell;

/// One player request against a match.
///
/// Everything a client can do to an active battle goes through this enum
/// and the resolver; there is no other mutation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Walk (or fly) a stack to an empty cell within reach.
    Move { stack: StackId, to: Cell },
    /// Strike an enemy stack within attack range.
    Attack { stack: StackId, target: StackId },
    /// Spend the activation doing nothing.
    Skip { stack: StackId },
    /// Push the activation to the end of the round, once per round.
    Defer { stack: StackId },
    /// Concede the match to the opponent.
    Surrender,
}

impl Action {
    /// The stack a player is acting with, if the action names one.
    pub fn stack(&self) -> Option<StackId> {
        match self {
            Action::Move { stack, .. } => Some(*stack),
            Action::Attack { stack, .. } => Some(*stack),
            Action::Skip { stack } => Some(*stack),
            Action::Defer { stack } => Some(*stack),
            Action::Surrender => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Move { stack, to } => write!(f, "move #{} to {}", stack, to),
            Action::Attack { stack, target } => write!(f, "attack #{} -> #{}", stack, target),
            Action::Skip { stack } => write!(f, "skip #{}", stack),
            Action::Defer { stack } => write!(f, "defer #{}", stack),
            Action::Surrender => write!(f, "surrender"),
        }
    }
}
