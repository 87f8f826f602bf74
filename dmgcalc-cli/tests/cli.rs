use std::path::PathBuf;
use std::process::Command;

const CHARACTER: &str = r#"{
    "name": "Fighter",
    "levels": [
        { "level_number": 1,
          "attacks": [ { "name": "Longsword", "hit_percent": 100, "flat_modifier": 3,
                         "dice_groups": [ { "quantity": 1, "die_size": 8 } ] } ] },
        { "level_number": 2,
          "attacks": [ { "name": "Longsword", "hit_percent": 100, "flat_modifier": 5 } ],
          "resources": { "has_action_surge": true } }
    ]
}"#;

const ENCOUNTER: &str = r#"{
    "name": "Two fights",
    "combats": [ { "rounds": 1, "short_rest_after": false }, { "rounds": 1 } ]
}"#;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "dmgcalc-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn fixture(label: &str, contents: &str) -> PathBuf {
    let path = temp_path(label);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn cli_writes_json_report_for_fixed_seed() {
    let exe = env!("CARGO_BIN_EXE_dmgcalc");
    let character = fixture("character", CHARACTER);
    let output_path = temp_path("report");
    let status = Command::new(exe)
        .arg("--character")
        .arg(&character)
        .args(["--iterations", "200", "--seed", "9", "--report", "json", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());

    let content = std::fs::read_to_string(&output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["character"], "Fighter");
    assert_eq!(report["iterations"], 200);
    let levels = report["levels"].as_array().expect("levels array");
    assert_eq!(levels.len(), 2);
    assert_eq!(levels[0]["level_number"], 1);
    assert_eq!(levels[1]["average"], 10.0);
}

#[test]
fn cli_encounter_changes_the_day() {
    let exe = env!("CARGO_BIN_EXE_dmgcalc");
    let character = fixture("character-day", CHARACTER);
    let encounter = fixture("encounter-day", ENCOUNTER);
    let output = Command::new(exe)
        .arg("--character")
        .arg(&character)
        .arg("--encounter")
        .arg(&encounter)
        .args(["--iterations", "50", "--seed", "1", "--report", "csv"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let surge_row = stdout
        .lines()
        .find(|line| line.starts_with("2,"))
        .expect("level 2 row");
    // surge in the first fight only: (10 + 5) / 2
    assert!(surge_row.starts_with("2,7.5,"), "{surge_row}");
}

#[test]
fn cli_same_seed_same_report() {
    let exe = env!("CARGO_BIN_EXE_dmgcalc");
    let character = fixture("character-seed", CHARACTER);
    let run = || {
        Command::new(exe)
            .arg("--character")
            .arg(&character)
            .args(["--iterations", "500", "--seed", "77", "--report", "csv"])
            .output()
            .expect("run cli")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn cli_rejects_zero_iterations() {
    let exe = env!("CARGO_BIN_EXE_dmgcalc");
    let character = fixture("character-zero", CHARACTER);
    let output = Command::new(exe)
        .arg("--character")
        .arg(&character)
        .args(["--iterations", "0"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid simulation settings"));
}

#[test]
fn cli_rejects_malformed_character() {
    let exe = env!("CARGO_BIN_EXE_dmgcalc");
    let character = fixture("character-bad", "[1, 2, 3]");
    let output = Command::new(exe)
        .arg("--character")
        .arg(&character)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse character file"));
}

#[test]
fn cli_console_report_lists_levels() {
    let exe = env!("CARGO_BIN_EXE_dmgcalc");
    let character = fixture("character-console", CHARACTER);
    let output = Command::new(exe)
        .env("NO_COLOR", "1")
        .arg("--character")
        .arg(&character)
        .args(["--iterations", "20", "--seed", "3"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Damage Calculator"));
    assert!(stdout.contains("Character: Fighter"));
    assert!(stdout.contains("10.00"));
}
