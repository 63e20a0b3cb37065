use super::*;
use crate::PlayerId;
use crate::StackId;
use crate::board::Cell;
use crate::catalog::Catalog;
use crate::error::Refusal;

/// What a successful action tells the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub message: String,
    /// Whether the acting player changed as a result.
    pub switched: bool,
}

/// Validate and apply one action. The only mutation path into a match.
///
/// Refusals leave the battle untouched and log nothing; success appends
/// the action's events (plus any automatic round/turn/ending events) to
/// the battle's buffer for the gateway to persist.
pub fn resolve(
    battle: &mut Battle,
    catalog: &Catalog,
    actor: PlayerId,
    action: Action,
) -> Result<Verdict, Refusal> {
    let before = battle.current();
    if !battle.is_player(actor) {
        return Err(Refusal::Forbidden(format!(
            "player {} is not part of this match",
            actor
        )));
    }
    match battle.status() {
        Status::Waiting => return Err(Refusal::Illegal("match has not started yet".to_string())),
        Status::Completed => return Err(Refusal::Illegal("match is already over".to_string())),
        Status::InProgress => {}
    }
    if let Action::Surrender = action {
        let winner = battle.opponent(actor);
        battle.finish(Some(winner), "surrender");
        return Ok(Verdict {
            message: format!("player {} surrenders", actor),
            switched: battle.current() != before,
        });
    }
    let stack = action.stack().expect("only surrender is stackless");
    vet(battle, actor, stack)?;
    let message = match action {
        Action::Move { stack, to } => relocate(battle, catalog, stack, to)?,
        Action::Attack { stack, target } => assault(battle, catalog, actor, stack, target)?,
        Action::Skip { stack } => hold(battle, stack),
        Action::Defer { stack } => postpone(battle, stack)?,
        Action::Surrender => unreachable!("handled above"),
    };
    let opponent = battle.opponent(actor);
    if !battle.side_alive(opponent) {
        battle.finish(Some(actor), "elimination");
    } else if !battle.side_alive(actor) {
        battle.finish(Some(opponent), "elimination");
    } else {
        battle.rotate(catalog);
    }
    Ok(Verdict {
        message,
        switched: battle.current() != before,
    })
}

/// Preconditions shared by the four stack actions.
fn vet(battle: &Battle, actor: PlayerId, stack: StackId) -> Result<(), Refusal> {
    if battle.current() != Some(actor) {
        return Err(Refusal::Forbidden("it is not your turn".to_string()));
    }
    let stack = battle.stack(stack)?;
    if stack.owner() != actor {
        return Err(Refusal::Forbidden(format!(
            "stack #{} is not yours",
            stack.id()
        )));
    }
    if !stack.alive() {
        return Err(Refusal::Illegal(format!(
            "stack #{} is destroyed",
            stack.id()
        )));
    }
    if stack.has_acted() {
        return Err(Refusal::Stale(format!(
            "stack #{} has already acted this round",
            stack.id()
        )));
    }
    Ok(())
}

fn relocate(
    battle: &mut Battle,
    catalog: &Catalog,
    stack: StackId,
    to: Cell,
) -> Result<String, Refusal> {
    let mover = battle.stack(stack)?;
    let kind = catalog.kind(mover.kind())?;
    let from = mover.cell();
    if !battle.grid().contains(to) {
        return Err(Refusal::Illegal(format!("{} is off the field", to)));
    }
    if battle.stack_at(to).is_some() {
        return Err(Refusal::Illegal(format!("{} is occupied", to)));
    }
    if battle.grid().obstacle(to) {
        return Err(Refusal::Illegal(format!("{} is blocked", to)));
    }
    let occupied = battle.occupied_except(stack);
    if !battle
        .grid()
        .reach(from, kind.speed, kind.is_flying, &occupied)
        .contains(&to)
    {
        return Err(Refusal::Illegal(format!("{} is out of reach", to)));
    }
    let mover = battle.stack_mut(stack)?;
    mover.relocate(to);
    mover.mark_acted();
    battle.record(
        format!("stack #{} moved {} -> {}", stack, from, to),
        Payload::Move { stack, from, to },
    );
    Ok(format!("moved to {}", to))
}

fn assault(
    battle: &mut Battle,
    catalog: &Catalog,
    actor: PlayerId,
    stack: StackId,
    target: StackId,
) -> Result<String, Refusal> {
    let victim = battle.stack(target)?;
    if victim.owner() == actor {
        return Err(Refusal::Illegal(format!(
            "stack #{} is friendly",
            target
        )));
    }
    if !victim.alive() {
        return Err(Refusal::Illegal(format!(
            "stack #{} is already destroyed",
            target
        )));
    }
    let striker = battle.stack(stack)?;
    let attacker_kind = catalog.kind(striker.kind())?;
    let defender_kind = catalog.kind(victim.kind())?;
    let span = striker.cell().cheb(victim.cell());
    if span > attacker_kind.attack_range {
        return Err(Refusal::Illegal(format!(
            "stack #{} is out of range",
            target
        )));
    }
    let melee = span == 1;
    let volume = striker.count();
    let mut dice = battle.dice();

    let mut struck = battle.stack(target)?.clone();
    let forward = strike(&mut dice, volume, attacker_kind, &mut struck, defender_kind);
    *battle.stack_mut(target)? = struck;
    battle.stack_mut(stack)?.mark_acted();
    if attacker_kind.is_kamikaze {
        battle.stack_mut(stack)?.perish_one();
    }

    let mut counter = None;
    let can_counter = melee
        && !forward.dodge
        && battle.stack(target)?.alive()
        && battle.stack(stack)?.alive()
        && !battle.stack(target)?.countered();
    if can_counter && dice.roll() < defender_kind.counter_chance {
        let avengers = battle.stack(target)?.count();
        let mut struck = battle.stack(stack)?.clone();
        let reverse = strike(&mut dice, avengers, defender_kind, &mut struck, attacker_kind);
        *battle.stack_mut(stack)? = struck;
        battle.stack_mut(target)?.mark_countered();
        counter = Some(reverse);
    }
    battle.absorb_dice(&dice);

    let survivor = battle.stack(stack)?;
    let (attacker_count, attacker_hp) = (survivor.count(), survivor.front_hp());
    let survivor = battle.stack(target)?;
    let (target_count, target_hp) = (survivor.count(), survivor.front_hp());
    let summary = match forward.dodge {
        true => format!("stack #{} dodged stack #{}", target, stack),
        false => format!(
            "stack #{} hit stack #{} for {} ({} killed{})",
            stack,
            target,
            forward.damage,
            forward.killed,
            counter
                .map(|c: Strike| format!(", countered for {}", c.damage))
                .unwrap_or_default(),
        ),
    };
    let message = summary.clone();
    battle.record(
        summary,
        Payload::Attack(Box::new(Clash {
            attacker: stack,
            target,
            damage: forward.damage,
            crit: forward.crit,
            lucky: forward.lucky,
            dodge: forward.dodge,
            killed: forward.killed,
            counter,
            attacker_count,
            attacker_hp,
            target_count,
            target_hp,
        })),
    );
    Ok(message)
}

fn hold(battle: &mut Battle, stack: StackId) -> String {
    battle
        .stack_mut(stack)
        .expect("vetted stack exists")
        .mark_acted();
    battle.record(
        format!("stack #{} holds", stack),
        Payload::Skip { stack },
    );
    "skipped".to_string()
}

fn postpone(battle: &mut Battle, stack: StackId) -> Result<String, Refusal> {
    if battle.stack(stack)?.deferred() {
        return Err(Refusal::Illegal(format!(
            "stack #{} has already deferred this round",
            stack
        )));
    }
    battle.stack_mut(stack)?.mark_deferred();
    battle.record(
        format!("stack #{} defers to the end of the round", stack),
        Payload::Defer { stack },
    );
    Ok("deferred".to_string())
}
