use super::*;
use crate::ROUND_CAP;
use crate::StackId;
use crate::catalog::Catalog;

/// Initiative scheduling.
///
/// The cursor is never persisted: it is re-derived from the per-stack
/// `has_acted`/`deferred` flags and the stable ordering below, so a match
/// reloaded mid-round lands on exactly the stack it left off at.
impl Battle {
    /// Living stacks in activation order for the current round:
    /// initiative descending, then kind id, then stack id.
    pub fn ordering(&self, catalog: &Catalog) -> Vec<StackId> {
        let mut order = self
            .living()
            .map(|s| {
                let initiative = catalog.kind(s.kind()).map(|k| k.initiative).unwrap_or(0);
                (std::cmp::Reverse(initiative), s.kind(), s.id())
            })
            .collect::<Vec<_>>();
        order.sort_unstable();
        order.into_iter().map(|(_, _, id)| id).collect()
    }

    /// The stack whose activation is up, if the round has any left.
    ///
    /// Deferred stacks wait at the back of the queue; once only deferred
    /// stacks remain, the earliest of them in the base ordering acts, so
    /// deferring can never deadlock a round.
    pub fn cursor(&self, catalog: &Catalog) -> Option<StackId> {
        let pending = self
            .ordering(catalog)
            .into_iter()
            .filter(|id| !self.stack(*id).expect("ordering holds live stacks").has_acted())
            .collect::<Vec<_>>();
        pending
            .iter()
            .find(|id| !self.stack(**id).expect("ordering holds live stacks").deferred())
            .or_else(|| pending.first())
            .copied()
    }

    /// Move the cursor after a mutating action, rolling the round over
    /// when every living stack has acted. Returns false when the round
    /// cap fired and the match is over.
    pub(crate) fn rotate(&mut self, catalog: &Catalog) -> bool {
        if self.cursor(catalog).is_none() {
            let next = self.round() + 1;
            if next > ROUND_CAP {
                self.settle_cap(catalog);
                return false;
            }
            self.apply_round(next);
            self.record(
                format!("round {} begins", next),
                Payload::RoundAdvanced { round: next },
            );
        }
        let up = self.cursor(catalog).expect("a fresh round has pending stacks");
        let owner = self.stack(up).expect("cursor is a live stack").owner();
        self.set_current(owner);
        self.record(
            format!("player {} to act with stack #{}", owner, up),
            Payload::TurnAdvanced { player: owner },
        );
        true
    }

    /// Round-cap settlement: the side with more remaining hit points
    /// wins; an exact tie is a draw.
    fn settle_cap(&mut self, catalog: &Catalog) {
        let [one, two] = self.players();
        let hp = (self.side_hp(one, catalog), self.side_hp(two, catalog));
        let winner = match hp.0.cmp(&hp.1) {
            std::cmp::Ordering::Greater => Some(one),
            std::cmp::Ordering::Less => Some(two),
            std::cmp::Ordering::Equal => None,
        };
        log::info!(
            "[game {}] round cap at {} rounds, hp {} vs {}",
            self.id(),
            ROUND_CAP,
            hp.0,
            hp.1
        );
        self.finish(winner, "round cap");
    }
}
