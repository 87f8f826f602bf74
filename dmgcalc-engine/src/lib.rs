//! Damage Calculator Engine
//!
//! Monte Carlo estimation of damage per combat round for a character across
//! its levels. The engine is pure computation: storage, forms and rendering
//! belong to the surrounding application and reach it through the traits
//! defined here.

pub mod constants;
pub mod model;
pub mod numbers;
pub mod rng;
pub mod simulation;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use model::{
    ActionType, Attack, Character, CharacterLevel, CombatDefinition, DiceGroup, DiceGroups,
    EncounterSetting, LevelResources, ModelError,
};
pub use rng::{CountingRng, SimulationSeed};
pub use simulation::{
    SimulationConfig, SimulationConfigError, Simulator, run_iteration, simulate,
    simulate_attack_sequence, simulate_round,
};
pub use state::{CombatState, IterationState, RoundState};
pub use stats::{LevelStats, SampleSummary, percentile, summarize};

/// Trait for abstracting character storage.
/// Platform-specific implementations should provide this
pub trait CharacterRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a stored character.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn character(&self, id: i64) -> Result<Option<Character>, Self::Error>;

    /// List stored characters as `(id, name)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_characters(&self) -> Result<Vec<(i64, String)>, Self::Error>;
}

/// Trait for abstracting encounter-setting storage.
pub trait EncounterRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a stored encounter setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn encounter(&self, id: i64) -> Result<Option<EncounterSetting>, Self::Error>;

    /// List stored encounter settings as `(id, name)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_encounters(&self) -> Result<Vec<(i64, String)>, Self::Error>;
}

/// Runs simulations for stored characters and encounters.
pub struct DamageCalculator<C, E>
where
    C: CharacterRepository,
    E: EncounterRepository,
{
    characters: C,
    encounters: E,
    simulator: Simulator,
}

impl<C, E> DamageCalculator<C, E>
where
    C: CharacterRepository,
    E: EncounterRepository,
{
    /// Create a calculator over the provided repositories.
    #[must_use]
    pub fn new(characters: C, encounters: E, config: SimulationConfig) -> Self {
        Self {
            characters,
            encounters,
            simulator: Simulator::new(config),
        }
    }

    #[must_use]
    pub const fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Simulate a stored character, optionally against a stored encounter.
    ///
    /// Returns `Ok(None)` when the character does not exist. An unknown
    /// encounter falls back to the default single-round encounter.
    ///
    /// # Errors
    ///
    /// Returns an error if either repository fails.
    pub fn calculate(
        &self,
        character_id: i64,
        encounter_id: Option<i64>,
    ) -> Result<Option<Vec<LevelStats>>, anyhow::Error>
    where
        C::Error: Into<anyhow::Error>,
        E::Error: Into<anyhow::Error>,
    {
        let Some(character) = self.characters.character(character_id).map_err(Into::into)? else {
            return Ok(None);
        };

        let encounter = match encounter_id {
            Some(id) => {
                let found = self.encounters.encounter(id).map_err(Into::into)?;
                if found.is_none() {
                    log::warn!("encounter {id} not found, using the default encounter");
                }
                found
            }
            None => None,
        };

        Ok(Some(self.simulator.run(&character, encounter.as_ref())))
    }
}
