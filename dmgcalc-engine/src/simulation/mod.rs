//! Trial engine: repeated adventuring days per level, reduced to statistics.
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::constants::{DEFAULT_ITERATIONS, MAX_ITERATIONS};
use crate::model::{Character, CharacterLevel, EncounterSetting};
use crate::rng::{SimulationSeed, level_stream};
use crate::state::{CombatState, IterationState};
use crate::stats::LevelStats;

pub mod round;
pub mod sequence;
pub use round::simulate_round;
pub use sequence::{AttackOutcome, Pass, PassState, advantage_fractions, simulate_attack_sequence};

/// Errors raised when simulation configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationConfigError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error("deadline must be longer than zero")]
    ZeroDeadline,
}

/// Tunables for one simulation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_iterations")]
    pub iterations: u32,
    #[serde(default)]
    pub seed: SimulationSeed,
    /// Wall-clock budget for the whole call; levels stop early when it lapses.
    #[serde(default)]
    pub deadline: Option<Duration>,
    /// Simulate levels concurrently (requires the `parallel` feature).
    #[serde(default)]
    pub parallel: bool,
}

impl SimulationConfig {
    #[must_use]
    pub const fn default_iterations() -> u32 {
        DEFAULT_ITERATIONS
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = SimulationSeed::Fixed(seed);
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the configuration without altering it.
    ///
    /// # Errors
    ///
    /// Returns an error when the iteration count is outside
    /// `1..=MAX_ITERATIONS` or the deadline is zero.
    pub fn validate(&self) -> Result<(), SimulationConfigError> {
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(SimulationConfigError::RangeViolation {
                field: "iterations",
                min: 1,
                max: u64::from(MAX_ITERATIONS),
                value: u64::from(self.iterations),
            });
        }
        if self.deadline.is_some_and(|deadline| deadline.is_zero()) {
            return Err(SimulationConfigError::ZeroDeadline);
        }
        Ok(())
    }

    /// Clamp the configuration into its valid range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            iterations: self.iterations.clamp(1, MAX_ITERATIONS),
            ..self.clone()
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: SimulationSeed::Entropy,
            deadline: None,
            parallel: false,
        }
    }
}

/// Configured trial engine.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate every level of `character`, one [`LevelStats`] per level in
    /// input order. Without an encounter, one single-round combat is used.
    #[must_use]
    pub fn run(&self, character: &Character, setting: Option<&EncounterSetting>) -> Vec<LevelStats> {
        let fallback = EncounterSetting::single_round();
        let setting = setting.unwrap_or(&fallback);
        let run_seed = self.config.seed.resolve();
        let deadline_at = self.deadline_at();
        info!(
            "simulating {} level(s) of '{}' over {} round(s) per iteration, seed {run_seed}",
            character.levels.len(),
            character.name,
            setting.total_rounds()
        );

        let simulate_indexed = |(index, level): (usize, &CharacterLevel)| {
            let mut rng = level_stream(run_seed, index, level.level_number);
            let stats = self.simulate_level(&mut rng, level, setting, deadline_at);
            debug!(
                "level {} drew {} random values",
                level.level_number,
                rng.draws()
            );
            stats
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if self.config.parallel {
                return character
                    .levels
                    .par_iter()
                    .enumerate()
                    .map(simulate_indexed)
                    .collect();
            }
        }

        character
            .levels
            .iter()
            .enumerate()
            .map(simulate_indexed)
            .collect()
    }

    /// Simulate every level sequentially from one injected generator.
    ///
    /// The configured seed and parallel flag are ignored; reproducibility is
    /// whatever the supplied generator provides.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        character: &Character,
        setting: Option<&EncounterSetting>,
    ) -> Vec<LevelStats> {
        let fallback = EncounterSetting::single_round();
        let setting = setting.unwrap_or(&fallback);
        let deadline_at = self.deadline_at();
        character
            .levels
            .iter()
            .map(|level| self.simulate_level(&mut *rng, level, setting, deadline_at))
            .collect()
    }

    fn deadline_at(&self) -> Option<Instant> {
        self.config
            .deadline
            .and_then(|deadline| Instant::now().checked_add(deadline))
    }

    fn simulate_level<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        level: &CharacterLevel,
        setting: &EncounterSetting,
        deadline_at: Option<Instant>,
    ) -> LevelStats {
        let started = Instant::now();
        let requested = self.config.iterations;
        let capacity = (requested as usize).saturating_mul(setting.total_rounds());
        let mut samples = Vec::with_capacity(capacity);
        let mut completed = 0;

        for iteration in 0..requested {
            if iteration > 0 && deadline_at.is_some_and(|at| Instant::now() >= at) {
                warn!(
                    "deadline reached for level {} after {iteration} of {requested} iterations",
                    level.level_number
                );
                break;
            }
            run_iteration(rng, level, setting, &mut samples);
            completed += 1;
        }

        debug!(
            "level {}: {completed} iterations, {} samples in {:?}",
            level.level_number,
            samples.len(),
            started.elapsed()
        );
        LevelStats::from_samples(level.level_number, completed, &mut samples)
    }
}

/// Run one adventuring day for `level`, pushing one damage sample per round.
pub fn run_iteration<R: Rng + ?Sized>(
    rng: &mut R,
    level: &CharacterLevel,
    setting: &EncounterSetting,
    samples: &mut Vec<f64>,
) {
    let resources = &level.resources;
    let mut iteration = IterationState::new(resources);

    for combat_def in &setting.combats {
        let mut combat = CombatState::new(resources);
        for round in 0..combat_def.effective_rounds() {
            iteration.begin_round(round);
            samples.push(simulate_round(
                rng,
                level,
                round == 0,
                &mut combat,
                &mut iteration,
            ));
            iteration.end_round();
        }
        iteration.end_combat(combat_def, resources);
    }
}

/// Simulate `character` with a fresh entropy seed.
#[must_use]
pub fn simulate(
    character: &Character,
    setting: Option<&EncounterSetting>,
    iterations: u32,
) -> Vec<LevelStats> {
    Simulator::new(SimulationConfig::default().with_iterations(iterations)).run(character, setting)
}
