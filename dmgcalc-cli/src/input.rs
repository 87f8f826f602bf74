use anyhow::{Context, Result};
use std::path::Path;

use dmgcalc_engine::{Character, EncounterSetting};

pub fn load_character(path: &Path) -> Result<Character> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read character file {}", path.display()))?;
    let character = Character::from_json(&json)
        .with_context(|| format!("failed to parse character file {}", path.display()))?;
    if character.levels.is_empty() {
        log::warn!("character '{}' has no levels; nothing to simulate", character.name);
    }
    Ok(character)
}

pub fn load_encounter(path: &Path) -> Result<EncounterSetting> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read encounter file {}", path.display()))?;
    EncounterSetting::from_json(&json)
        .with_context(|| format!("failed to parse encounter file {}", path.display()))
}
