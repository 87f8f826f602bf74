//! Centralized tuning constants for the damage simulation.
//!
//! Form defaults, mechanic constants and the reported percentiles.

// Trial engine -------------------------------------------------------------
pub const DEFAULT_ITERATIONS: u32 = 10_000;
pub const MAX_ITERATIONS: u32 = 1_000_000;

// Encounter defaults -------------------------------------------------------
pub const DEFAULT_ENCOUNTER_NAME: &str = "Default";
pub(crate) const DEFAULT_COMBAT_ROUNDS: u32 = 1;

// Attack defaults ----------------------------------------------------------
pub(crate) const DEFAULT_REACTION_CHANCE_PERCENT: i32 = 100;
pub(crate) const DEFAULT_DIE_QUANTITY: u32 = 1;
pub(crate) const DEFAULT_DIE_SIZE: u32 = 6;

// Mechanics ----------------------------------------------------------------
pub(crate) const STUDIED_ATTACKS_DECAY_ROUNDS: u8 = 2;
pub(crate) const CRIT_DICE_MULTIPLIER: u32 = 2;

// Reported percentiles -----------------------------------------------------
pub(crate) const P25: f64 = 0.25;
pub(crate) const P50: f64 = 0.50;
pub(crate) const P75: f64 = 0.75;
pub(crate) const P90: f64 = 0.90;
pub(crate) const P95: f64 = 0.95;

// RNG stream derivation ----------------------------------------------------
pub(crate) const LEVEL_STREAM_TAG: &[u8] = b"dmgcalc-level";
