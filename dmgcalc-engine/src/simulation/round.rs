//! One combat round: the regular turn plus at most one action-surge replay.
use log::trace;
use rand::Rng;

use crate::model::CharacterLevel;
use crate::numbers::percent_fraction;
use crate::state::{CombatState, IterationState, RoundState};

use super::sequence::{Pass, PassState, simulate_attack_sequence};

/// Simulate one round and return the total damage dealt in it.
pub fn simulate_round<R: Rng + ?Sized>(
    rng: &mut R,
    level: &CharacterLevel,
    is_first_round: bool,
    combat: &mut CombatState,
    iteration: &mut IterationState,
) -> f64 {
    let mut round = RoundState::new(&level.resources);
    let mut state = PassState {
        iteration,
        combat,
        round: &mut round,
    };

    let mut total = simulate_attack_sequence(rng, level, Pass::Primary, is_first_round, &mut state);

    if level.has_action_attack()
        && let Some(kind) = state.iteration.take_surge()
    {
        trace!("level {}: {kind:?} replays the action attacks", level.level_number);
        total += simulate_attack_sequence(rng, level, Pass::Replay, is_first_round, &mut state);
    }

    total + death_strikes_bonus(rng, level, is_first_round, state.combat, state.round)
}

/// Death Strikes repeats the round's best hit once per combat unless resisted.
fn death_strikes_bonus<R: Rng + ?Sized>(
    rng: &mut R,
    level: &CharacterLevel,
    is_first_round: bool,
    combat: &mut CombatState,
    round: &RoundState,
) -> f64 {
    if !is_first_round || !combat.death_strikes_available {
        return 0.0;
    }
    combat.death_strikes_available = false;
    if round.highest_hit_damage <= 0.0 {
        return 0.0;
    }
    let resisted =
        rng.r#gen::<f64>() < percent_fraction(level.resources.death_strikes_resist_percent);
    if resisted {
        0.0
    } else {
        round.highest_hit_damage
    }
}
