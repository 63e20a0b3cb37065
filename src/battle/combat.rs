use super::*;
use crate::CRIT_BONUS;
use crate::Count;
use crate::Damage;
use crate::EFFECTIVE_BONUS;
use crate::LUCK_BONUS;
use crate::catalog::UnitKind;

/// One damage pass from a group of `volume` attackers into `target`.
///
/// Draw order is fixed (dodge, crit, luck) so the match's dice stream is
/// reproducible. A dodge consumes only its own draw and ends the pass.
/// The pipeline multiplies in `f64` and truncates once after defense:
///
/// `E = floor(max(0, damage x volume x 1.5? x 2? x 1.25? - defense x count))`
pub fn strike(
    dice: &mut Dice,
    volume: Count,
    attacker: &UnitKind,
    target: &mut Stack,
    defender: &UnitKind,
) -> Strike {
    if dice.roll() < defender.dodge_chance {
        return Strike {
            damage: 0,
            crit: false,
            lucky: false,
            dodge: true,
            killed: 0,
        };
    }
    let mut raw = attacker.damage as f64 * volume as f64;
    if attacker.effective_against(defender.id) {
        raw *= EFFECTIVE_BONUS;
    }
    let crit = dice.roll() < attacker.crit_chance;
    if crit {
        raw *= CRIT_BONUS;
    }
    let lucky = dice.roll() < attacker.luck;
    if lucky {
        raw *= LUCK_BONUS;
    }
    let soak = defender.defense as f64 * target.count() as f64;
    let damage = (raw - soak).max(0.0) as Damage;
    let killed = target.absorb(defender.max_hp, damage);
    Strike {
        damage,
        crit,
        lucky,
        dodge: false,
        killed,
    }
}
