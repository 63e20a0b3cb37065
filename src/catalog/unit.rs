use crate::Count;
use crate::Damage;
use crate::Hp;
use crate::KindId;
use crate::Probability;
use serde::Deserialize;
use serde::Serialize;

/// Catalog entry describing one kind of creature.
///
/// Unit variety is data, not a type hierarchy: flying, kamikaze, and
/// type-advantage behavior all hang off flags and references in this row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitKind {
    pub id: KindId,
    pub name: String,
    /// Damage dealt per creature before multipliers.
    pub damage: Damage,
    /// Damage soaked per creature in the defending stack.
    pub defense: Damage,
    /// Hit points of a single creature.
    pub max_hp: Hp,
    /// Cells covered per activation.
    pub speed: i32,
    /// 1 is melee; greater reaches over other stacks and obstacles.
    pub attack_range: i32,
    /// Ordering key within a round, higher acts first.
    pub initiative: i32,
    pub is_flying: bool,
    pub is_kamikaze: bool,
    pub dodge_chance: Probability,
    pub crit_chance: Probability,
    pub luck: Probability,
    pub counter_chance: Probability,
    /// Kind that takes boosted damage from this one.
    pub effective_against: Option<KindId>,
    /// Creatures drafted into a stack at match activation.
    pub stack_size: Count,
}

impl UnitKind {
    pub fn melee(&self) -> bool {
        self.attack_range == 1
    }
    pub fn effective_against(&self, other: KindId) -> bool {
        self.effective_against == Some(other)
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}
