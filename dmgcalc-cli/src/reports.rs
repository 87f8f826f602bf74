use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use dmgcalc_engine::LevelStats;

pub const CSV_HEADER: &str = "level,average,p25,p50,p75,p90,p95,iterations";

/// Everything a report needs about one run.
#[derive(Debug, Serialize)]
pub struct ReportContext<'a> {
    pub character: &'a str,
    pub encounter: &'a str,
    pub iterations: u32,
    pub seed: Option<u64>,
    pub levels: &'a [LevelStats],
}

impl ReportContext<'_> {
    fn truncated_levels(&self) -> impl Iterator<Item = &LevelStats> {
        self.levels
            .iter()
            .filter(|stats| stats.iterations < self.iterations)
    }
}

pub fn generate_console_report(out: &mut dyn Write, ctx: &ReportContext<'_>) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Damage Per Round".bright_cyan().bold())?;
    writeln!(out, "{}", "===================".cyan())?;
    writeln!(out, "Character: {}", ctx.character.bold())?;
    writeln!(out, "Encounter: {}", ctx.encounter)?;
    writeln!(out, "Iterations per level: {}", ctx.iterations)?;
    match ctx.seed {
        Some(seed) => writeln!(out, "Seed: {seed}")?,
        None => writeln!(out, "Seed: {}", "entropy".dimmed())?,
    }
    writeln!(out)?;

    if ctx.levels.is_empty() {
        writeln!(out, "{}", "No levels to simulate.".yellow())?;
        return Ok(());
    }

    writeln!(
        out,
        "{:>5}  {:>8}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}",
        "Level", "Average", "P25", "P50", "P75", "P90", "P95"
    )?;
    for stats in ctx.levels {
        writeln!(
            out,
            "{:>5}  {}  {:>7.2}  {:>7.2}  {:>7.2}  {:>7.2}  {:>7.2}",
            stats.level_number.to_string().bold(),
            format!("{:>8.2}", stats.average).green(),
            stats.p25,
            stats.p50,
            stats.p75,
            stats.p90,
            stats.p95
        )?;
    }

    for stats in ctx.truncated_levels() {
        writeln!(
            out,
            "{} level {} stopped at {} of {} iterations",
            "⏱".yellow(),
            stats.level_number,
            stats.iterations,
            ctx.iterations
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, ctx: &ReportContext<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, ctx)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, ctx: &ReportContext<'_>) -> Result<()> {
    writeln!(out, "# Damage Per Round: {}\n", ctx.character)?;
    writeln!(out, "- **Encounter**: {}", ctx.encounter)?;
    writeln!(out, "- **Iterations per level**: {}", ctx.iterations)?;
    match ctx.seed {
        Some(seed) => writeln!(out, "- **Seed**: {seed}\n")?,
        None => writeln!(out, "- **Seed**: entropy\n")?,
    }

    if ctx.levels.is_empty() {
        writeln!(out, "_No levels simulated._")?;
        return Ok(());
    }

    writeln!(out, "| Level | Average | P25 | P50 | P75 | P90 | P95 |")?;
    writeln!(out, "|------:|--------:|----:|----:|----:|----:|----:|")?;
    for stats in ctx.levels {
        writeln!(
            out,
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
            stats.level_number,
            stats.average,
            stats.p25,
            stats.p50,
            stats.p75,
            stats.p90,
            stats.p95
        )?;
    }

    let truncated: Vec<_> = ctx.truncated_levels().collect();
    if !truncated.is_empty() {
        writeln!(out, "\n## Deadline\n")?;
        for stats in truncated {
            writeln!(
                out,
                "- Level {} stopped at {} of {} iterations",
                stats.level_number, stats.iterations, ctx.iterations
            )?;
        }
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, ctx: &ReportContext<'_>) -> Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for stats in ctx.levels {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            stats.level_number,
            stats.average,
            stats.p25,
            stats.p50,
            stats.p75,
            stats.p90,
            stats.p95,
            stats.iterations
        )?;
    }
    Ok(())
}
