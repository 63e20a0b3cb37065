use crate::Count;
use crate::Damage;
use crate::Hp;
use crate::KindId;
use crate::PlayerId;
use crate::StackId;
use crate::board::Cell;
use serde::Deserialize;
use serde::Serialize;

/// A group of creatures of one kind belonging to one player on one cell.
///
/// `front_hp` is the hit points of the lead creature; everyone behind it
/// is at full health. A stack with `count == 0` is a corpse: it stays in
/// the match for audit but is ineligible for anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    id: StackId,
    owner: PlayerId,
    kind: KindId,
    cell: Cell,
    count: Count,
    front_hp: Hp,
    has_acted: bool,
    deferred: bool,
    countered: bool,
    morale: f64,
    fatigue: f64,
}

impl Stack {
    /// A freshly drafted stack at match activation.
    pub fn fresh(id: StackId, owner: PlayerId, kind: KindId, cell: Cell, count: Count, hp: Hp) -> Self {
        Self {
            id,
            owner,
            kind,
            cell,
            count,
            front_hp: hp,
            has_acted: false,
            deferred: false,
            countered: false,
            morale: 0.0,
            fatigue: 0.0,
        }
    }
    /// Rebuild a stack exactly as persisted.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: StackId,
        owner: PlayerId,
        kind: KindId,
        cell: Cell,
        count: Count,
        front_hp: Hp,
        has_acted: bool,
        deferred: bool,
        countered: bool,
        morale: f64,
        fatigue: f64,
    ) -> Self {
        Self {
            id,
            owner,
            kind,
            cell,
            count,
            front_hp,
            has_acted,
            deferred,
            countered,
            morale,
            fatigue,
        }
    }

    pub fn id(&self) -> StackId {
        self.id
    }
    pub fn owner(&self) -> PlayerId {
        self.owner
    }
    pub fn kind(&self) -> KindId {
        self.kind
    }
    pub fn cell(&self) -> Cell {
        self.cell
    }
    pub fn count(&self) -> Count {
        self.count
    }
    pub fn front_hp(&self) -> Hp {
        self.front_hp
    }
    pub fn has_acted(&self) -> bool {
        self.has_acted
    }
    pub fn deferred(&self) -> bool {
        self.deferred
    }
    pub fn countered(&self) -> bool {
        self.countered
    }
    pub fn morale(&self) -> f64 {
        self.morale
    }
    pub fn fatigue(&self) -> f64 {
        self.fatigue
    }
    pub fn alive(&self) -> bool {
        self.count > 0
    }
    /// Sum of hit points across the living creatures.
    pub fn total_hp(&self, max_hp: Hp) -> i64 {
        match self.alive() {
            true => (self.count as i64 - 1) * max_hp as i64 + self.front_hp as i64,
            false => 0,
        }
    }

    pub(crate) fn relocate(&mut self, cell: Cell) {
        self.cell = cell;
    }
    pub(crate) fn mark_acted(&mut self) {
        self.has_acted = true;
    }
    pub(crate) fn mark_deferred(&mut self) {
        self.deferred = true;
    }
    pub(crate) fn mark_countered(&mut self) {
        self.countered = true;
    }
    /// Round boundary: every living stack gets a clean slate.
    pub(crate) fn refresh(&mut self) {
        self.has_acted = false;
        self.deferred = false;
        self.countered = false;
    }
    /// Replay: pin the survivor count and front hit points recorded
    /// in an attack payload.
    pub(crate) fn force(&mut self, count: Count, front_hp: Hp) {
        self.count = count;
        self.front_hp = front_hp;
    }

    /// Soak `damage` hit points: the front creature first, spilling into
    /// full-health creatures behind it. Returns how many died.
    pub(crate) fn absorb(&mut self, max_hp: Hp, damage: Damage) -> Count {
        if damage <= 0 || !self.alive() {
            return 0;
        }
        if damage < self.front_hp {
            self.front_hp -= damage;
            return 0;
        }
        let spill = damage - self.front_hp;
        let killed = (1 + spill / max_hp).min(self.count);
        self.count -= killed;
        self.front_hp = match self.alive() {
            true => max_hp - spill % max_hp,
            false => 0,
        };
        killed
    }
    /// A kamikaze attacker expends one creature from the rear; the front
    /// creature's wounds are unchanged.
    pub(crate) fn perish_one(&mut self) {
        self.count -= 1;
        if !self.alive() {
            self.front_hp = 0;
        }
    }
}

impl std::fmt::Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stack #{} x{} @ {}", self.id, self.count, self.cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(count: Count, front_hp: Hp) -> Stack {
        Stack::fresh(1, 10, 1, Cell::new(0, 0), count, front_hp)
    }

    #[test]
    fn chip_damage_wounds_the_front() {
        let mut s = stack(3, 10);
        assert_eq!(s.absorb(10, 4), 0);
        assert_eq!(s.count(), 3);
        assert_eq!(s.front_hp(), 6);
    }

    #[test]
    fn exact_kill_promotes_a_full_creature() {
        let mut s = stack(3, 6);
        assert_eq!(s.absorb(10, 6), 1);
        assert_eq!(s.count(), 2);
        assert_eq!(s.front_hp(), 10);
    }

    #[test]
    fn spill_kills_several() {
        // 6 front + 10 + 10 = 26 total; 25 damage leaves one creature at 1
        let mut s = stack(3, 6);
        assert_eq!(s.absorb(10, 25), 2);
        assert_eq!(s.count(), 1);
        assert_eq!(s.front_hp(), 1);
    }

    #[test]
    fn overkill_caps_at_count() {
        let mut s = stack(2, 5);
        assert_eq!(s.absorb(5, 1000), 2);
        assert_eq!(s.count(), 0);
        assert_eq!(s.front_hp(), 0);
        assert!(!s.alive());
        assert_eq!(s.total_hp(5), 0);
    }

    #[test]
    fn single_creature_lethal_hit() {
        let mut s = stack(1, 5);
        assert_eq!(s.absorb(5, 5), 1);
        assert!(!s.alive());
    }

    #[test]
    fn zero_damage_is_harmless() {
        let mut s = stack(2, 7);
        assert_eq!(s.absorb(10, 0), 0);
        assert_eq!(s.front_hp(), 7);
    }

    #[test]
    fn kamikaze_expends_the_rear() {
        let mut s = stack(3, 4);
        s.perish_one();
        assert_eq!(s.count(), 2);
        assert_eq!(s.front_hp(), 4);
        let mut last = stack(1, 4);
        last.perish_one();
        assert!(!last.alive());
        assert_eq!(last.front_hp(), 0);
    }

    #[test]
    fn refresh_clears_round_flags() {
        let mut s = stack(1, 1);
        s.mark_acted();
        s.mark_deferred();
        s.mark_countered();
        s.refresh();
        assert!(!s.has_acted() && !s.deferred() && !s.countered());
    }
}
