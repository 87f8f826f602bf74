//! Character and encounter value types consumed by the simulator.
//!
//! These are produced by the surrounding application (forms, storage) and
//! handed to the engine already validated. The engine never mutates them.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    DEFAULT_COMBAT_ROUNDS, DEFAULT_DIE_QUANTITY, DEFAULT_DIE_SIZE, DEFAULT_ENCOUNTER_NAME,
    DEFAULT_REACTION_CHANCE_PERCENT,
};

/// Dice groups are almost always one or two entries (`2d6 + 1d8`).
pub type DiceGroups = SmallVec<[DiceGroup; 2]>;

/// Errors raised while decoding model payloads.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed {entity} payload: {source}")]
    Malformed {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown action type '{0}'")]
    UnknownActionType(String),
}

/// A homogeneous group of dice, e.g. `2d6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceGroup {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_die_size")]
    pub die_size: u32,
}

impl DiceGroup {
    #[must_use]
    pub const fn new(quantity: u32, die_size: u32) -> Self {
        Self { quantity, die_size }
    }
}

impl Default for DiceGroup {
    fn default() -> Self {
        Self::new(DEFAULT_DIE_QUANTITY, DEFAULT_DIE_SIZE)
    }
}

const fn default_quantity() -> u32 {
    DEFAULT_DIE_QUANTITY
}

const fn default_die_size() -> u32 {
    DEFAULT_DIE_SIZE
}

/// Which part of the action economy an attack consumes.
///
/// Stored as `"action"`, `"bonus_action"` or `"reaction"`; parsing ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionType {
    #[default]
    Action,
    BonusAction,
    Reaction,
}

impl ActionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::BonusAction => "bonus_action",
            Self::Reaction => "reaction",
        }
    }

    /// Attacks replayed by Action Surge.
    #[must_use]
    pub const fn is_action(self) -> bool {
        matches!(self, Self::Action)
    }

    /// Attacks that only happen when their trigger chance succeeds.
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        matches!(self, Self::BonusAction | Self::Reaction)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Action, Self::BonusAction, Self::Reaction]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownActionType(s.to_string()))
    }
}

impl TryFrom<String> for ActionType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionType> for String {
    fn from(value: ActionType) -> Self {
        value.as_str().to_string()
    }
}

/// One attack in a level's ordered attack routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    #[serde(default)]
    pub name: String,
    /// Cumulative chance to hit, crits included.
    #[serde(default)]
    pub hit_percent: i32,
    #[serde(default)]
    pub crit_percent: i32,
    #[serde(default)]
    pub flat_modifier: i32,
    #[serde(default)]
    pub dice_groups: DiceGroups,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default = "default_reaction_chance")]
    pub reaction_chance_percent: i32,
    /// Skipped in the first round of a combat unless replayed by a surge.
    #[serde(default)]
    pub requires_setup: bool,
    #[serde(default)]
    pub mastery_vex: bool,
    #[serde(default)]
    pub mastery_topple: bool,
    #[serde(default)]
    pub topple_percent: i32,
    #[serde(default)]
    pub mastery_graze: bool,
    #[serde(default)]
    pub graze_value: i32,
}

const fn default_reaction_chance() -> i32 {
    DEFAULT_REACTION_CHANCE_PERCENT
}

impl Default for Attack {
    fn default() -> Self {
        Self {
            name: String::new(),
            hit_percent: 0,
            crit_percent: 0,
            flat_modifier: 0,
            dice_groups: DiceGroups::new(),
            action_type: ActionType::Action,
            reaction_chance_percent: DEFAULT_REACTION_CHANCE_PERCENT,
            requires_setup: false,
            mastery_vex: false,
            mastery_topple: false,
            topple_percent: 0,
            mastery_graze: false,
            graze_value: 0,
        }
    }
}

impl Attack {
    /// Convenience constructor used by fixtures and the runner.
    #[must_use]
    pub fn new(name: &str, hit_percent: i32, crit_percent: i32, flat_modifier: i32) -> Self {
        Self {
            name: name.to_string(),
            hit_percent,
            crit_percent,
            flat_modifier,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dice(mut self, quantity: u32, die_size: u32) -> Self {
        self.dice_groups.push(DiceGroup::new(quantity, die_size));
        self
    }

    #[must_use]
    pub fn with_action_type(mut self, action_type: ActionType, chance_percent: i32) -> Self {
        self.action_type = action_type;
        self.reaction_chance_percent = chance_percent;
        self
    }
}

/// Per-level feats, features and class resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelResources {
    pub has_action_surge: bool,
    pub has_extra_action_surge: bool,
    pub has_shield_master: bool,
    pub shield_master_topple_percent: i32,
    pub has_heroic_inspiration: bool,
    pub has_studied_attacks: bool,
    pub has_boon_of_combat_prowess: bool,
    pub has_pure_advantage: bool,
    pub pure_advantage_percent: i32,
    pub has_surprising_strikes: bool,
    pub has_death_strikes: bool,
    pub death_strikes_resist_percent: i32,
}

/// Attack routine and resources available at one character level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterLevel {
    pub level_number: u32,
    #[serde(default)]
    pub attacks: Vec<Attack>,
    #[serde(default)]
    pub resources: LevelResources,
}

impl CharacterLevel {
    #[must_use]
    pub fn new(level_number: u32, attacks: Vec<Attack>) -> Self {
        Self {
            level_number,
            attacks,
            resources: LevelResources::default(),
        }
    }

    #[must_use]
    pub fn with_resources(mut self, resources: LevelResources) -> Self {
        self.resources = resources;
        self
    }

    /// Whether any attack can be replayed by an action surge.
    #[must_use]
    pub fn has_action_attack(&self) -> bool {
        self.attacks.iter().any(|attack| attack.action_type.is_action())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub levels: Vec<CharacterLevel>,
}

impl Character {
    #[must_use]
    pub fn new(name: &str, levels: Vec<CharacterLevel>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            levels,
        }
    }

    /// Decode a character from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid character document.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|source| ModelError::Malformed {
            entity: "character",
            source,
        })
    }
}

/// One fight: a number of rounds, optionally followed by a short rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatDefinition {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default)]
    pub short_rest_after: bool,
}

const fn default_rounds() -> u32 {
    DEFAULT_COMBAT_ROUNDS
}

impl CombatDefinition {
    #[must_use]
    pub const fn new(rounds: u32, short_rest_after: bool) -> Self {
        Self {
            rounds,
            short_rest_after,
        }
    }

    /// Rounds actually simulated; a combat always lasts at least one round.
    #[must_use]
    pub fn effective_rounds(&self) -> u32 {
        self.rounds.max(1)
    }
}

impl Default for CombatDefinition {
    fn default() -> Self {
        Self::new(DEFAULT_COMBAT_ROUNDS, false)
    }
}

/// Adventuring day structure: the ordered list of combats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterSetting {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub combats: Vec<CombatDefinition>,
}

impl EncounterSetting {
    #[must_use]
    pub fn new(name: &str, combats: Vec<CombatDefinition>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            combats,
        }
    }

    /// The encounter used when the caller supplies none: one single-round combat.
    #[must_use]
    pub fn single_round() -> Self {
        Self::new(DEFAULT_ENCOUNTER_NAME, vec![CombatDefinition::default()])
    }

    /// Number of damage samples one iteration produces.
    #[must_use]
    pub fn total_rounds(&self) -> usize {
        self.combats
            .iter()
            .map(|combat| combat.effective_rounds() as usize)
            .sum()
    }

    /// Decode an encounter setting from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid encounter document.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|source| ModelError::Malformed {
            entity: "encounter",
            source,
        })
    }
}
