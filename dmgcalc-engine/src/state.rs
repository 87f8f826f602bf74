//! Mutable simulation state, split by the scope it lives for.
//!
//! - [`IterationState`] survives every combat of one simulated adventuring day.
//! - [`CombatState`] is reseeded at the start of each combat.
//! - [`RoundState`] is reseeded at the start of each round and shared by the
//!   primary pass and the action-surge replay of that round.
use crate::constants::STUDIED_ATTACKS_DECAY_ROUNDS;
use crate::model::{CombatDefinition, LevelResources};

/// Delayed advantage granted by Studied Attacks after a miss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudiedAttacks {
    pub pending: bool,
    pub rounds_remaining: u8,
}

impl StudiedAttacks {
    /// Arm advantage for the next attack, expiring after the decay budget.
    pub fn arm(&mut self) {
        self.pending = true;
        self.rounds_remaining = STUDIED_ATTACKS_DECAY_ROUNDS;
    }

    /// Consume pending advantage, returning whether it was armed.
    pub fn consume(&mut self) -> bool {
        let was_pending = self.pending;
        if was_pending {
            self.pending = false;
            self.rounds_remaining = 0;
        }
        was_pending
    }

    /// Count down one round; advantage lapses when the budget runs out.
    pub fn decay(&mut self) {
        if self.pending && self.rounds_remaining > 0 {
            self.rounds_remaining -= 1;
            if self.rounds_remaining == 0 {
                self.pending = false;
            }
        }
    }
}

/// State carried across all combats of one iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationState {
    /// Vex advantage waiting for the next attack.
    pub vex_advantage_pending: bool,
    pub action_surge_charges: u8,
    pub extra_action_surge_charges: u8,
    pub studied_attacks: StudiedAttacks,
}

impl IterationState {
    #[must_use]
    pub fn new(resources: &LevelResources) -> Self {
        Self {
            vex_advantage_pending: false,
            action_surge_charges: u8::from(resources.has_action_surge),
            extra_action_surge_charges: u8::from(resources.has_extra_action_surge),
            studied_attacks: StudiedAttacks::default(),
        }
    }

    /// Vex never carries into a new round.
    pub fn begin_round(&mut self, round_index: u32) {
        if round_index > 0 {
            self.vex_advantage_pending = false;
        }
    }

    pub fn end_round(&mut self) {
        self.studied_attacks.decay();
    }

    /// Drop leftover Vex and restore surges when the party short rests.
    pub fn end_combat(&mut self, combat: &CombatDefinition, resources: &LevelResources) {
        self.vex_advantage_pending = false;
        if combat.short_rest_after {
            if resources.has_action_surge {
                self.action_surge_charges = 1;
            }
            if resources.has_extra_action_surge {
                self.extra_action_surge_charges = 1;
            }
        }
    }

    /// Spend one surge charge for a replay pass, Action Surge first.
    pub fn take_surge(&mut self) -> Option<SurgeKind> {
        if self.action_surge_charges > 0 {
            self.action_surge_charges -= 1;
            Some(SurgeKind::ActionSurge)
        } else if self.extra_action_surge_charges > 0 {
            self.extra_action_surge_charges -= 1;
            Some(SurgeKind::ExtraActionSurge)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn has_surge(&self) -> bool {
        self.action_surge_charges > 0 || self.extra_action_surge_charges > 0
    }
}

/// Which charge paid for a replay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurgeKind {
    ActionSurge,
    ExtraActionSurge,
}

/// Once-per-combat bonuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatState {
    pub surprising_strikes_available: bool,
    pub death_strikes_available: bool,
}

impl CombatState {
    #[must_use]
    pub const fn new(resources: &LevelResources) -> Self {
        Self {
            surprising_strikes_available: resources.has_surprising_strikes,
            death_strikes_available: resources.has_death_strikes,
        }
    }
}

/// Per-round transient flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundState {
    pub shield_master_used: bool,
    pub heroic_inspiration_available: bool,
    pub boon_available: bool,
    pub highest_hit_damage: f64,
    pub target_prone: bool,
}

impl RoundState {
    #[must_use]
    pub const fn new(resources: &LevelResources) -> Self {
        Self {
            shield_master_used: false,
            heroic_inspiration_available: resources.has_heroic_inspiration,
            boon_available: resources.has_boon_of_combat_prowess,
            highest_hit_damage: 0.0,
            target_prone: false,
        }
    }

    pub fn track_hit(&mut self, damage: f64) {
        if damage > self.highest_hit_damage {
            self.highest_hit_damage = damage;
        }
    }
}
