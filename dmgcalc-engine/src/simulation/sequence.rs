//! One ordered pass over a level's attack routine.
use rand::Rng;

use crate::constants::CRIT_DICE_MULTIPLIER;
use crate::model::{Attack, CharacterLevel};
use crate::numbers::percent_fraction;
use crate::state::{CombatState, IterationState, RoundState};

/// Which pass of the round is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// The regular turn: every attack, setup rule enforced.
    Primary,
    /// An action-surge replay: action attacks only, setup already done.
    Replay,
}

impl Pass {
    #[must_use]
    pub const fn is_replay(self) -> bool {
        matches!(self, Self::Replay)
    }
}

/// Result of one attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Crit,
    Hit,
    Miss,
}

impl AttackOutcome {
    #[must_use]
    pub const fn is_hit(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// Everything a pass mutates, grouped by lifetime scope.
#[derive(Debug)]
pub struct PassState<'a> {
    pub iteration: &'a mut IterationState,
    pub combat: &'a mut CombatState,
    pub round: &'a mut RoundState,
}

/// Cumulative hit and crit fractions after advantage.
///
/// Advantage turns the cumulative hit chance `p` into `1 - (1 - p)^2` and
/// scales crits by the same factor, keeping the crit share of hits fixed.
/// With `p == 0` both stay at zero.
#[must_use]
pub fn advantage_fractions(hit: f64, crit: f64) -> (f64, f64) {
    if hit <= 0.0 {
        return (hit, crit);
    }
    let effective = 1.0 - (1.0 - hit) * (1.0 - hit);
    (effective, effective * (crit / hit))
}

/// Resolve one uniform draw against cumulative thresholds.
pub fn roll_outcome<R: Rng + ?Sized>(rng: &mut R, hit: f64, crit: f64) -> AttackOutcome {
    let roll: f64 = rng.r#gen();
    if roll < crit {
        AttackOutcome::Crit
    } else if roll < hit {
        AttackOutcome::Hit
    } else {
        AttackOutcome::Miss
    }
}

/// Roll an attack's damage dice and add its flat modifier (never doubled).
pub fn roll_damage<R: Rng + ?Sized>(rng: &mut R, attack: &Attack, crit: bool) -> f64 {
    let multiplier = if crit { CRIT_DICE_MULTIPLIER } else { 1 };
    let mut total = f64::from(attack.flat_modifier);
    for group in attack.dice_groups.iter().filter(|g| g.die_size > 0) {
        for _ in 0..group.quantity.saturating_mul(multiplier) {
            total += f64::from(rng.gen_range(1..=group.die_size));
        }
    }
    total
}

fn chance<R: Rng + ?Sized>(rng: &mut R, percent: i32) -> bool {
    rng.r#gen::<f64>() < percent_fraction(percent)
}

fn try_topple<R: Rng + ?Sized>(rng: &mut R, percent: i32, round: &mut RoundState) {
    if round.target_prone {
        return;
    }
    if chance(rng, percent) {
        round.target_prone = true;
    }
}

/// Decide advantage for the next attack and consume the sources it used.
fn take_advantage<R: Rng + ?Sized>(
    rng: &mut R,
    level: &CharacterLevel,
    state: &mut PassState<'_>,
) -> bool {
    let vex = state.iteration.vex_advantage_pending;
    let prone = state.round.target_prone;
    let studied = state.iteration.studied_attacks.pending;

    let mut advantage = vex || prone || studied;
    let resources = &level.resources;
    if !advantage
        && resources.has_pure_advantage
        && chance(rng, resources.pure_advantage_percent)
    {
        advantage = true;
    }

    // prone outranks vex, so vex is kept for later when the target is down
    if vex && !prone {
        state.iteration.vex_advantage_pending = false;
    }
    state.iteration.studied_attacks.consume();
    advantage
}

/// Roll to hit, then fall back on Boon of Combat Prowess or Heroic Inspiration.
fn resolve_attack_roll<R: Rng + ?Sized>(
    rng: &mut R,
    attack: &Attack,
    advantage: bool,
    round: &mut RoundState,
) -> AttackOutcome {
    let mut hit = percent_fraction(attack.hit_percent);
    let mut crit = percent_fraction(attack.crit_percent);
    if advantage {
        (hit, crit) = advantage_fractions(hit, crit);
    }

    let outcome = roll_outcome(rng, hit, crit);
    if outcome.is_hit() {
        return outcome;
    }
    if round.boon_available {
        round.boon_available = false;
        return AttackOutcome::Hit;
    }
    if round.heroic_inspiration_available {
        round.heroic_inspiration_available = false;
        return roll_outcome(rng, hit, crit);
    }
    outcome
}

/// Apply every on-hit effect and return the attack's damage.
fn land_hit<R: Rng + ?Sized>(
    rng: &mut R,
    level: &CharacterLevel,
    attack: &Attack,
    crit: bool,
    is_first_round: bool,
    state: &mut PassState<'_>,
) -> f64 {
    let mut damage = roll_damage(rng, attack, crit);
    if is_first_round && state.combat.surprising_strikes_available {
        damage += f64::from(level.level_number);
        state.combat.surprising_strikes_available = false;
    }
    state.round.track_hit(damage);

    let resources = &level.resources;
    if resources.has_shield_master && !state.round.shield_master_used {
        state.round.shield_master_used = true;
        try_topple(rng, resources.shield_master_topple_percent, state.round);
    }
    if attack.mastery_vex {
        state.iteration.vex_advantage_pending = true;
    }
    if attack.mastery_topple {
        try_topple(rng, attack.topple_percent, state.round);
    }
    damage
}

fn miss(level: &CharacterLevel, attack: &Attack, state: &mut PassState<'_>) -> f64 {
    if level.resources.has_studied_attacks {
        state.iteration.studied_attacks.arm();
    }
    if attack.mastery_graze && attack.graze_value > 0 {
        f64::from(attack.graze_value)
    } else {
        0.0
    }
}

/// Run one pass over the level's attacks in order and return the damage dealt.
pub fn simulate_attack_sequence<R: Rng + ?Sized>(
    rng: &mut R,
    level: &CharacterLevel,
    pass: Pass,
    is_first_round: bool,
    state: &mut PassState<'_>,
) -> f64 {
    let mut total = 0.0;

    for attack in &level.attacks {
        if pass.is_replay() && !attack.action_type.is_action() {
            continue;
        }
        if attack.action_type.is_triggered() && !chance(rng, attack.reaction_chance_percent) {
            continue;
        }
        if !pass.is_replay() && is_first_round && attack.requires_setup {
            continue;
        }

        let advantage = take_advantage(rng, level, state);
        total += match resolve_attack_roll(rng, attack, advantage, state.round) {
            AttackOutcome::Crit => land_hit(rng, level, attack, true, is_first_round, state),
            AttackOutcome::Hit => land_hit(rng, level, attack, false, is_first_round, state),
            AttackOutcome::Miss => miss(level, attack, state),
        };
    }

    total
}
