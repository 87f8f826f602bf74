mod input;
mod reports;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dmgcalc_engine::{
    Character, EncounterSetting, LevelStats, SimulationConfig, SimulationSeed, Simulator,
};

use reports::ReportContext;

#[derive(Debug, Parser)]
#[command(name = "dmgcalc", version)]
#[command(about = "Estimate damage per round for a character across its levels")]
struct Args {
    /// Character JSON document to simulate
    #[arg(long)]
    character: PathBuf,

    /// Encounter setting JSON document (defaults to one single-round combat)
    #[arg(long)]
    encounter: Option<PathBuf>,

    /// Simulated adventuring days per level
    #[arg(long, default_value_t = dmgcalc_engine::constants::DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Fixed seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock budget for the whole run, in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Simulate levels concurrently
    #[arg(long)]
    parallel: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let character = input::load_character(&args.character)?;
    let encounter = args
        .encounter
        .as_deref()
        .map(input::load_encounter)
        .transpose()?;

    let config = build_config(&args)?;
    if config.parallel && !cfg!(feature = "parallel") {
        log::warn!("--parallel ignored: built without the `parallel` feature");
    }

    let start_time = Instant::now();
    let stats = Simulator::new(config).run(&character, encounter.as_ref());
    let elapsed = start_time.elapsed();
    log::info!("simulated {} level(s) in {elapsed:?}", stats.len());

    write_reports(&args, &character, encounter.as_ref(), &stats, elapsed)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let config = SimulationConfig {
        iterations: args.iterations,
        seed: SimulationSeed::from(args.seed),
        deadline: args.deadline_ms.map(Duration::from_millis),
        parallel: args.parallel,
    };
    config.validate().context("invalid simulation settings")?;
    Ok(config)
}

fn write_reports(
    args: &Args,
    character: &Character,
    encounter: Option<&EncounterSetting>,
    stats: &[LevelStats],
    elapsed: Duration,
) -> Result<()> {
    let mut out = open_output(args.output.as_deref())?;

    let context = ReportContext {
        character: &character.name,
        encounter: encounter.map_or(dmgcalc_engine::constants::DEFAULT_ENCOUNTER_NAME, |e| {
            e.name.as_str()
        }),
        iterations: args.iterations,
        seed: args.seed,
        levels: stats,
    };

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut *out, &context)?,
        "markdown" => reports::generate_markdown_report(&mut *out, &context)?,
        "csv" => reports::generate_csv_report(&mut *out, &context)?,
        _ => {
            announce_banner(&mut *out)?;
            reports::generate_console_report(&mut *out, &context)?;
            writeln!(out)?;
            writeln!(out, "🏁 Total time: {elapsed:?}")?;
        }
    }

    out.flush()
        .with_context(|| format!("failed to write {} report", args.report))
}

fn announce_banner(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{}", "🎲 Damage Calculator".bright_cyan().bold())?;
    writeln!(out, "{}", "====================".cyan())
}

/// Buffered report sink: the `--output` file when given, stdout otherwise.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(stdout().lock())));
    };
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    colored::control::set_override(false);
    Ok(Box::new(BufWriter::new(file)))
}
