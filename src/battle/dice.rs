use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Deterministic per-match randomness.
///
/// Seeded once at match activation; every Bernoulli draw is a uniform
/// `f64` in `[0,1)` and is counted, so a match reloaded from storage can
/// fast-forward the stream and resume exactly where it left off.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: SmallRng,
    drawn: u32,
}

impl Dice {
    /// A brand-new stream for match activation.
    pub fn fresh(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            drawn: 0,
        }
    }
    /// Resume a persisted stream by discarding the draws already consumed.
    pub fn resume(seed: u64, drawn: u32) -> Self {
        let mut dice = Self::fresh(seed);
        for _ in 0..drawn {
            let _ = dice.roll();
        }
        dice
    }
    /// One uniform draw in `[0,1)`.
    pub fn roll(&mut self) -> f64 {
        self.drawn += 1;
        self.rng.random::<f64>()
    }
    /// Draws consumed over the lifetime of the match.
    pub fn drawn(&self) -> u32 {
        self.drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_continues_the_stream() {
        let mut whole = Dice::fresh(42);
        let head = (0..5).map(|_| whole.roll()).collect::<Vec<_>>();
        let tail = (0..5).map(|_| whole.roll()).collect::<Vec<_>>();
        let mut resumed = Dice::resume(42, 5);
        let replayed = (0..5).map(|_| resumed.roll()).collect::<Vec<_>>();
        assert_eq!(tail, replayed);
        assert_ne!(head, tail);
        assert_eq!(resumed.drawn(), 10);
    }

    #[test]
    fn rolls_are_unit_interval() {
        let mut dice = Dice::fresh(7);
        for _ in 0..1000 {
            let x = dice.roll();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
