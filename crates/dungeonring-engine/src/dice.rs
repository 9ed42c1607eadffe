//! The randomness seam.
//!
//! Every stochastic rule in the engine draws through [`Dice`] instead of
//! touching an RNG directly. Production code passes any `rand::Rng`
//! (rooms own a `StdRng`); tests pass a scripted [`FixedDice`] and get
//! fully deterministic outcomes.

use std::collections::VecDeque;

use rand::Rng;

/// Sources of game randomness: die rolls, uniform picks, and coin flips.
pub trait Dice {
    /// A uniform 1–6 die roll.
    fn roll_die(&mut self) -> i32;

    /// A uniform index into `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;

    /// A Bernoulli trial with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

impl<R: Rng> Dice for R {
    fn roll_die(&mut self) -> i32 {
        self.random_range(1..=6)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.random_bool(p)
    }
}

/// A scripted dice source for tests.
///
/// Each kind of draw consumes from its own queue; an exhausted queue
/// falls back to the lowest outcome (roll 1, pick 0, chance false) so
/// tests only script the draws they care about.
#[derive(Debug, Default)]
pub struct FixedDice {
    rolls: VecDeque<i32>,
    picks: VecDeque<usize>,
    chances: VecDeque<bool>,
}

impl FixedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rolls(mut self, rolls: impl IntoIterator<Item = i32>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    pub fn chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }
}

impl Dice for FixedDice {
    fn roll_die(&mut self) -> i32 {
        self.rolls.pop_front().unwrap_or(1)
    }

    fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.picks.pop_front().unwrap_or(0).min(len - 1)
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }
}
