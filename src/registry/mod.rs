//! Per-match request serialization.
//!
//! Every mutating request funnels through [`Registry::submit`]: acquire
//! the match's exclusive lock (bounded wait), load fresh state, resolve
//! the action against it, write through atomically, release. Requests for
//! different matches run fully in parallel; requests for one match are a
//! strict queue.

use crate::GameId;
use crate::LOCK_TIMEOUT;
use crate::PlayerId;
use crate::READ_TIMEOUT;
use crate::SAVE_RETRIES;
use crate::battle::Action;
use crate::battle::Battle;
use crate::battle::Verdict;
use crate::battle::resolve;
use crate::catalog::Catalog;
use crate::database::Gateway;
use crate::error::Refusal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

pub struct Registry<G> {
    gateway: Arc<G>,
    catalog: Arc<Catalog>,
    locks: RwLock<HashMap<GameId, Arc<Mutex<()>>>>,
}

impl<G> Registry<G>
where
    G: Gateway,
{
    pub fn new(gateway: Arc<G>, catalog: Arc<Catalog>) -> Self {
        Self {
            gateway,
            catalog,
            locks: RwLock::new(HashMap::new()),
        }
    }
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The match's latch, created on first touch and never dropped.
    async fn latch(&self, game: GameId) -> Arc<Mutex<()>> {
        if let Some(latch) = self.locks.read().await.get(&game) {
            return latch.clone();
        }
        self.locks.write().await.entry(game).or_default().clone()
    }

    /// Run one action through the lock-load-resolve-save pipeline.
    ///
    /// Preconditions are rechecked against the freshly loaded state inside
    /// the lock, so a request racing a completed duplicate comes back as
    /// `stale_state`/`forbidden` rather than double-applying. A version
    /// conflict (out-of-band writer) is retried with a fresh load.
    pub async fn submit(
        &self,
        game: GameId,
        actor: PlayerId,
        action: Action,
    ) -> Result<(Battle, Verdict), Refusal> {
        let latch = self.latch(game).await;
        let _guard = tokio::time::timeout(LOCK_TIMEOUT, latch.lock())
            .await
            .map_err(|_| Refusal::Busy)?;
        for attempt in 1..=SAVE_RETRIES {
            let mut battle = self.gateway.load(game).await?;
            let verdict = resolve(&mut battle, &self.catalog, actor, action)?;
            match self.gateway.save(&mut battle).await {
                Ok(()) => {
                    log::info!("[game {}] player {}: {} ({})", game, actor, action, verdict.message);
                    return Ok((battle, verdict));
                }
                Err(Refusal::Conflict) => {
                    log::warn!("[game {}] version conflict, attempt {}", game, attempt);
                }
                Err(refusal) => return Err(refusal),
            }
        }
        Err(Refusal::Conflict)
    }

    /// Read-only snapshot with the soft read timeout.
    pub async fn peek(&self, game: GameId) -> Result<Battle, Refusal> {
        tokio::time::timeout(READ_TIMEOUT, self.gateway.load(game))
            .await
            .map_err(|_| Refusal::Busy)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::Event;
    use crate::battle::Stack;
    use crate::battle::Status;
    use crate::board::Cell;
    use crate::board::Grid;
    use crate::catalog::UnitKind;

    /// Gateway over a mutex-guarded battle, version-checked like the
    /// real one.
    struct Bench {
        stored: Mutex<(Battle, Vec<Event>)>,
    }

    #[async_trait::async_trait]
    impl Gateway for Bench {
        async fn load(&self, game: GameId) -> Result<Battle, Refusal> {
            let stored = self.stored.lock().await;
            match stored.0.id() == game {
                true => Ok(stored.0.clone()),
                false => Err(Refusal::NotFound(format!("no game {}", game))),
            }
        }
        async fn save(&self, battle: &mut Battle) -> Result<(), Refusal> {
            let mut stored = self.stored.lock().await;
            if stored.0.version() != battle.version() {
                return Err(Refusal::Conflict);
            }
            let events = battle.commit();
            stored.1.extend(events);
            stored.0 = battle.clone();
            Ok(())
        }
    }

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

    fn rig() -> Registry<Bench> {
        let catalog = Arc::new(Catalog::new(vec![kind(1, 8), kind(2, 3)], vec![]));
        let battle = Battle::restore(
            1,
            [100, 200],
            "5x5".to_string(),
            Grid::new(5, 5),
            Status::InProgress,
            1,
            Some(100),
            None,
            vec![
                Stack::fresh(1, 100, 1, Cell::new(1, 1), 5, 10),
                Stack::fresh(2, 200, 2, Cell::new(2, 1), 5, 10),
                Stack::fresh(3, 200, 2, Cell::new(4, 4), 5, 10),
            ],
            42,
            0,
            0,
            1,
        );
        let bench = Bench {
            stored: Mutex::new((battle, Vec::new())),
        };
        Registry::new(Arc::new(bench), catalog)
    }

    #[tokio::test]
    async fn submit_persists_state_and_events() {
        let registry = rig();
        let (battle, verdict) = registry
            .submit(1, 100, Action::Skip { stack: 1 })
            .await
            .unwrap();
        assert!(verdict.switched);
        assert_eq!(battle.current(), Some(200));
        let reloaded = registry.peek(1).await.unwrap();
        assert_eq!(reloaded.snapshot(), battle.snapshot());
        assert!(reloaded.stack(1).unwrap().has_acted());
        assert_eq!(reloaded.version(), 1);
    }

    #[tokio::test]
    async fn duplicate_concurrent_submissions_land_once() {
        let registry = Arc::new(rig());
        let action = Action::Attack { stack: 1, target: 2 };
        let (a, b) = tokio::join!(
            registry.submit(1, 100, action),
            registry.submit(1, 100, action),
        );
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let refusal = outcomes
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one refusal");
        assert!(matches!(refusal, Refusal::Stale(_) | Refusal::Forbidden(_)));
        let stored = registry.gateway.stored.lock().await;
        let attacks = stored.1.iter().filter(|e| e.kind() == "attack").count();
        assert_eq!(attacks, 1);
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let registry = rig();
        let missing = registry.submit(9, 100, Action::Skip { stack: 1 }).await;
        assert!(matches!(missing, Err(Refusal::NotFound(_))));
    }
}
