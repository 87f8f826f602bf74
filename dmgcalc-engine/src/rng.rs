//! Random streams for simulation runs.
//!
//! Every character level draws from its own stream derived from the run
//! seed, so a fixed seed reproduces the same statistics whether levels run
//! one after another or concurrently.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::constants::LEVEL_STREAM_TAG;

/// Where a run takes its seed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationSeed {
    /// Fresh OS entropy for every run.
    #[default]
    Entropy,
    /// Reproducible run.
    Fixed(u64),
}

impl SimulationSeed {
    /// Resolve to a concrete seed, drawing entropy when required.
    #[must_use]
    pub fn resolve(self) -> u64 {
        match self {
            Self::Entropy => rand::random::<u64>(),
            Self::Fixed(seed) => seed,
        }
    }
}

impl From<Option<u64>> for SimulationSeed {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Entropy, Self::Fixed)
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    /// Seed a fast stream for one level.
    #[must_use]
    pub fn from_seed_u64(seed: u64) -> Self {
        Self::wrap(SmallRng::seed_from_u64(seed))
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    #[must_use]
    pub const fn wrap(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Derive the stream seed for the level at `level_index` of a run.
///
/// # Panics
///
/// Never in practice: HMAC accepts keys of any length.
#[must_use]
pub fn derive_level_seed(run_seed: u64, level_index: usize, level_number: u32) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&run_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(LEVEL_STREAM_TAG);
    mac.update(&(level_index as u64).to_le_bytes());
    mac.update(&level_number.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Stream for one level of a run.
#[must_use]
pub fn level_stream(run_seed: u64, level_index: usize, level_number: u32) -> CountingRng<SmallRng> {
    CountingRng::from_seed_u64(derive_level_seed(run_seed, level_index, level_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn level_streams_are_deterministic_and_counted() {
        let mut first = level_stream(42, 0, 5);
        let mut again = level_stream(42, 0, 5);
        assert_eq!(first.next_u64(), again.next_u64());
        assert_eq!(first.next_u32(), again.next_u32());
        assert_eq!(first.draws(), 2);

        let mut expected = SmallRng::seed_from_u64(derive_level_seed(42, 0, 5));
        let mut fresh = level_stream(42, 0, 5);
        assert_eq!(fresh.next_u64(), expected.next_u64());
    }

    #[test]
    fn level_index_and_number_separate_streams() {
        let base = derive_level_seed(7, 0, 1);
        assert_ne!(base, derive_level_seed(7, 1, 1), "index must separate streams");
        assert_ne!(base, derive_level_seed(7, 0, 2), "level must separate streams");
        assert_ne!(base, derive_level_seed(8, 0, 1), "run seed must separate streams");
    }

    #[test]
    fn seed_resolution() {
        assert_eq!(SimulationSeed::Fixed(9).resolve(), 9);
        assert_eq!(SimulationSeed::from(Some(3)), SimulationSeed::Fixed(3));
        assert_eq!(SimulationSeed::from(None), SimulationSeed::Entropy);
    }
}
