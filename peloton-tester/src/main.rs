mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use peloton_game::PresetId;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use logic::{BatchOptions, RunResult, resolve_seed_inputs, run_batch};

#[derive(Debug, Parser)]
#[command(name = "peloton-tester", version = "0.1.0")]
#[command(about = "Headless race simulations for the Peloton engine with invariant and determinism checks")]
struct Args {
    /// Presets to race (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    presets: String,

    /// Seeds to run (comma-separated integers or race codes such as CB-PAVE42)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Extra random seeds to append
    #[arg(long, default_value_t = 0)]
    random_seeds: usize,

    /// Entropy for the random seeds; defaults to the clock
    #[arg(long)]
    entropy: Option<u64>,

    /// Abort a race once it passes this many turns
    #[arg(long, default_value_t = logic::simulation::DEFAULT_MAX_TURNS)]
    max_turns: u32,

    /// Run a three-stage tour instead of a single race
    #[arg(long)]
    stage_race: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List the course presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_presets(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let presets = parse_presets(&args.presets)?;
    let seed_tokens = split_csv(&args.seeds);
    let entropy = args.entropy.unwrap_or_else(clock_entropy);
    let seeds = resolve_seed_inputs(&seed_tokens, args.random_seeds, entropy)
        .context("failed to resolve seeds")?;
    let options = BatchOptions {
        max_turns: args.max_turns,
        stage_race: args.stage_race,
        verbose: args.verbose,
    };

    let results = run_batch(&presets, &seeds, &options);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn maybe_list_presets(args: &Args) -> Result<bool> {
    if !args.list_presets {
        return Ok(false);
    }
    let mut out = open_output(args.output.as_deref())?;
    writeln!(out, "Available presets:")?;
    for preset in PresetId::ALL {
        writeln!(
            out,
            "  {:10} - race codes {}-...",
            preset.as_str(),
            preset.code_prefix()
        )?;
    }
    out.flush()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚴 Peloton Race Tester".bright_cyan().bold());
    println!("{}", "======================".cyan());
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_presets(raw: &str) -> Result<Vec<PresetId>> {
    let mut presets = Vec::new();
    for token in split_csv(raw) {
        if token.eq_ignore_ascii_case("all") {
            presets.extend(PresetId::ALL);
            continue;
        }
        match token.parse::<PresetId>() {
            Ok(preset) => presets.push(preset),
            Err(()) => bail!("Unknown preset: {token}"),
        }
    }
    let mut seen = Vec::new();
    presets.retain(|preset| {
        let fresh = !seen.contains(preset);
        seen.push(*preset);
        fresh
    });
    if presets.is_empty() {
        bail!("No presets selected");
    }
    Ok(presets)
}

fn clock_entropy() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn write_reports(args: &Args, results: &[RunResult], start_time: Instant) -> Result<()> {
    let mut out = open_output(args.output.as_deref())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut *out, results)?,
        "markdown" => logic::reports::generate_markdown_report(&mut *out, results)?,
        _ => {
            logic::reports::generate_console_report(&mut *out, results, start_time.elapsed())?;
            writeln!(out)?;
            writeln!(out, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Buffered report sink: the `--output` file when given, stdout otherwise.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(stdout()))),
    }
}
