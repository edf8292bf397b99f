//! Deterministic random number generation.
//!
//! RULE: Nothing in the game may call any platform RNG.
//! All randomness flows through a `RandomSource`. In a live session
//! every component owns a `StreamRng` derived from the single session
//! seed; tests may hand a component a `ScriptedRng` instead.
//!
//! Each component gets its own stream, seeded deterministically
//! from (session_seed XOR slot_index). This means:
//!   - Adding a new component never changes existing streams.
//!   - Each component's stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// The narrow interface every random consumer depends on.
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a u64 in [0, n). `n` must be > 0.
    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        ((self.next_f64() * n as f64) as u64).min(n - 1)
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick a uniformly random index into a slice of length `len`.
    fn pick_index(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }

    /// `len` lowercase base-36 digits, used for synthetic identifiers.
    fn base36(&mut self, len: usize) -> String {
        const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        (0..len)
            .map(|_| DIGITS[self.next_u64_below(36) as usize] as char)
            .collect()
    }
}

/// A named, deterministic RNG for a single component.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream from the session seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(session_seed: u64, slot_index: u64) -> Self {
        let derived_seed = session_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }
}

impl RandomSource for StreamRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.next_u64() % n
    }
}

/// Replays a fixed list of rolls, cycling when exhausted.
/// Lets tests force region targets, spawn composition and clue picks.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(rolls: Vec<f64>) -> Self {
        assert!(!rolls.is_empty(), "scripted rng needs at least one roll");
        Self { rolls, cursor: 0 }
    }

    /// A source that always rolls the same value.
    pub fn constant(roll: f64) -> Self {
        Self::new(vec![roll])
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll
    }
}

/// All component streams for a single session, indexed by stable slot.
pub struct RngBank {
    session_seed: u64,
}

impl RngBank {
    pub fn new(session_seed: u64) -> Self {
        Self { session_seed }
    }

    pub fn for_slot(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.session_seed, slot as u64).with_name(slot.name())
    }

    /// Boxed stream, ready to hand to a component.
    pub fn boxed(&self, slot: StreamSlot) -> Box<dyn RandomSource> {
        Box::new(self.for_slot(slot))
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries. Only append.
/// Reordering changes every component's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Registry = 0,
    Deployment = 1,
    RegionMap = 2,
    Quiz = 3,
    Controller = 4,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Deployment => "deployment",
            Self::RegionMap => "region_map",
            Self::Quiz => "quiz",
            Self::Controller => "controller",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngBank::new(7).for_slot(StreamSlot::Quiz);
        let mut b = RngBank::new(7).for_slot(StreamSlot::Quiz);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn slots_are_independent_streams() {
        let bank = RngBank::new(7);
        let mut quiz = bank.for_slot(StreamSlot::Quiz);
        let mut map = bank.for_slot(StreamSlot::RegionMap);
        let quiz_rolls: Vec<u64> = (0..8).map(|_| quiz.next_u64()).collect();
        let map_rolls: Vec<u64> = (0..8).map(|_| map.next_u64()).collect();
        assert_ne!(quiz_rolls, map_rolls);
    }

    #[test]
    fn f64_rolls_stay_in_unit_interval() {
        let mut rng = RngBank::new(99).for_slot(StreamSlot::Deployment);
        for _ in 0..1000 {
            let roll = rng.next_f64();
            assert!((0.0..1.0).contains(&roll), "roll out of range: {roll}");
        }
    }

    #[test]
    fn base36_uses_only_lowercase_alphanumerics() {
        let mut rng = RngBank::new(3).for_slot(StreamSlot::Registry);
        let id = rng.base36(13);
        assert_eq!(id.len(), 13);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn scripted_rng_cycles_and_maps_to_indices() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.5, 0.99]);
        assert_eq!(rng.pick_index(4), 0);
        assert_eq!(rng.pick_index(4), 2);
        assert_eq!(rng.pick_index(4), 3);
        assert_eq!(rng.pick_index(4), 0);
    }
}
