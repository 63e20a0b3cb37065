use super::*;

/// Fold a recorded event stream over an activation snapshot.
///
/// The persisted match and stack rows are only a cache of this fold: the
/// log records every stochastic outcome, so replay never touches the
/// dice and lands on exactly the snapshot the live match produced.
pub fn replay(origin: &Battle, events: &[Event]) -> Battle {
    let mut battle = origin.clone();
    for event in events {
        apply(&mut battle, event);
    }
    battle
}

fn apply(battle: &mut Battle, event: &Event) {
    match &event.payload {
        // the origin snapshot already carries placements and obstacles
        Payload::MatchStarted { .. } => {}
        Payload::Move { stack, to, .. } => {
            let stack = battle.stack_mut(*stack).expect("logged stack exists");
            stack.relocate(*to);
            stack.mark_acted();
        }
        Payload::Attack(clash) => {
            let target = battle.stack_mut(clash.target).expect("logged stack exists");
            target.force(clash.target_count, clash.target_hp);
            if clash.counter.is_some() {
                target.mark_countered();
            }
            let attacker = battle.stack_mut(clash.attacker).expect("logged stack exists");
            attacker.force(clash.attacker_count, clash.attacker_hp);
            attacker.mark_acted();
        }
        Payload::Skip { stack } => {
            battle
                .stack_mut(*stack)
                .expect("logged stack exists")
                .mark_acted();
        }
        Payload::Defer { stack } => {
            battle
                .stack_mut(*stack)
                .expect("logged stack exists")
                .mark_deferred();
        }
        Payload::TurnAdvanced { player } => {
            battle.set_current(*player);
        }
        Payload::RoundAdvanced { round } => {
            battle.apply_round(*round);
        }
        Payload::MatchEnded { winner, .. } => {
            battle.apply_ended(*winner);
        }
    }
    battle.align_ordinal(event.ordinal + 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::catalog::Catalog;
    use crate::catalog::FieldPreset;
    use crate::catalog::UnitKind;

    fn kind(id: crate::KindId, initiative: i32, counter: f64) -> UnitKind {
        UnitKind {
            id,
            name: format!("kind-{}", id),
            damage: 6,
            defense: 1,
            max_hp: 14,
            speed: 3,
            attack_range: if id % 2 == 0 { 3 } else { 1 },
            initiative,
            is_flying: false,
            is_kamikaze: false,
            dodge_chance: 0.25,
            crit_chance: 0.25,
            luck: 0.1,
            counter_chance: counter,
            effective_against: None,
            stack_size: 4,
        }
    }

    fn preset() -> FieldPreset {
        FieldPreset {
            name: "7x7".to_string(),
            width: 7,
            height: 7,
        }
    }

    /// Drive a scripted battle with a dumb greedy policy and make sure
    /// folding the log over the activation snapshot reproduces the live
    /// snapshot, whatever the dice did.
    #[test]
    fn replay_matches_live_snapshot() {
        let catalog = Catalog::new(vec![kind(1, 9, 0.6), kind(2, 4, 0.3)], vec![preset()]);
        for seed in [1, 7, 42, 1234, 987654321] {
            let origin = Battle::activate(5, [100, 200], &preset(), seed, &catalog);
            let mut live = origin.clone();
            let mut log = live.take_events();
            let mut turns = 0;
            while live.status() == Status::InProgress && turns < 400 {
                turns += 1;
                let actor = live.current().expect("active match has an actor");
                let stack = live.cursor(&catalog).expect("active match has a cursor");
                let action = policy(&live, &catalog, actor, stack);
                resolve(&mut live, &catalog, actor, action).expect("scripted action is legal");
                log.extend(live.take_events());
                occupancy_holds(&live);
                if let Some(current) = live.current() {
                    assert!(live.side_alive(current));
                }
            }
            let folded = replay(&origin, &log);
            assert_eq!(folded.snapshot(), live.snapshot(), "seed {}", seed);
            assert_eq!(folded.next_ordinal(), log.last().unwrap().ordinal + 1);
            let ordinals = log.iter().map(|e| e.ordinal).collect::<Vec<_>>();
            assert_eq!(ordinals, (1..=log.len() as i64).collect::<Vec<_>>());
        }
    }

    /// No two living stacks share a cell and none stands on an obstacle.
    fn occupancy_holds(battle: &Battle) {
        let cells = battle.living().map(Stack::cell).collect::<Vec<_>>();
        let unique = cells.iter().collect::<std::collections::HashSet<_>>();
        assert_eq!(cells.len(), unique.len());
        assert!(cells.iter().all(|c| !battle.grid().obstacle(*c)));
    }

    /// Greedy: hit anything in range, otherwise walk toward the nearest
    /// enemy, otherwise skip.
    fn policy(battle: &Battle, catalog: &Catalog, actor: crate::PlayerId, stack: crate::StackId) -> Action {
        let mover = battle.stack(stack).unwrap();
        let kind = catalog.kind(mover.kind()).unwrap();
        if let Some(prey) = battle
            .opposing(actor)
            .find(|s| mover.cell().cheb(s.cell()) <= kind.attack_range)
        {
            return Action::Attack { stack, target: prey.id() };
        }
        let near = |c: &Cell| {
            battle
                .opposing(actor)
                .map(|s| s.cell().cheb(*c))
                .min()
                .unwrap_or(i32::MAX)
        };
        battle
            .grid()
            .reach(mover.cell(), kind.speed, kind.is_flying, &battle.occupied_except(stack))
            .into_iter()
            .min_by_key(|c| (near(c), *c))
            .filter(|c| near(c) < near(&mover.cell()))
            .map(|to| Action::Move { stack, to })
            .unwrap_or(Action::Skip { stack })
    }
}
