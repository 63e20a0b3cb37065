use crate::Count;
use crate::Damage;
use crate::Hp;
use crate::KindId;
use crate::Ordinal;
use crate::PlayerId;
use crate::StackId;
use crate::board::Cell;
use serde::Deserialize;
use serde::Serialize;

/// One entry of a match's append-only log.
///
/// Ordinals start at 1 and have no gaps. The payload carries everything a
/// replay needs: stochastic outcomes are recorded, never re-rolled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub ordinal: Ordinal,
    pub summary: String,
    pub payload: Payload,
}

impl Event {
    /// Stable wire/storage identifier of the event kind.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} {}", self.ordinal, self.kind(), self.summary)
    }
}

/// Structured body of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    MatchStarted {
        players: [PlayerId; 2],
        field: String,
        stacks: Vec<Placement>,
        obstacles: Vec<Cell>,
    },
    Move {
        stack: StackId,
        from: Cell,
        to: Cell,
    },
    Attack(Box<Clash>),
    Skip {
        stack: StackId,
    },
    Defer {
        stack: StackId,
    },
    TurnAdvanced {
        player: PlayerId,
    },
    RoundAdvanced {
        round: u32,
    },
    MatchEnded {
        winner: Option<PlayerId>,
        reason: String,
    },
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::MatchStarted { .. } => "match_started",
            Payload::Move { .. } => "move",
            Payload::Attack(_) => "attack",
            Payload::Skip { .. } => "skip",
            Payload::Defer { .. } => "defer",
            Payload::TurnAdvanced { .. } => "turn_advanced",
            Payload::RoundAdvanced { .. } => "round_advanced",
            Payload::MatchEnded { .. } => "match_ended",
        }
    }
}

/// Where a stack stood when the match began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub stack: StackId,
    pub player: PlayerId,
    pub kind: KindId,
    pub cell: Cell,
    pub count: Count,
}

/// One damage pass: the forward half of an attack, or a counter-attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    /// Effective damage applied after defense, zero on a dodge.
    pub damage: Damage,
    pub crit: bool,
    pub lucky: bool,
    pub dodge: bool,
    pub killed: Count,
}

/// Full record of one attack action, sufficient to replay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clash {
    pub attacker: StackId,
    pub target: StackId,
    pub damage: Damage,
    pub crit: bool,
    pub lucky: bool,
    pub dodge: bool,
    pub killed: Count,
    /// The reverse pass, when the defender struck back.
    pub counter: Option<Strike>,
    /// Attacker survivors after kamikaze losses and any counter.
    pub attacker_count: Count,
    pub attacker_hp: Hp,
    /// Target survivors after the forward pass.
    pub target_count: Count,
    pub target_hp: Hp,
}
