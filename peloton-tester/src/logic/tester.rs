use colored::Colorize;
use peloton_game::PresetId;
use serde::Serialize;
use std::time::{Duration, Instant};

use super::seeds::SeedInfo;
use super::simulation::{DEFAULT_MAX_TURNS, RaceSummary, SimulationPlan, run_full_game};

/// Knobs shared by every run in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub max_turns: u32,
    pub stage_race: bool,
    pub verbose: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            stage_race: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub preset: PresetId,
    pub seed: u64,
    pub race_code: String,
    pub passed: bool,
    pub deterministic: bool,
    pub summary: Option<RaceSummary>,
    pub failure: Option<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl RunResult {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.preset, self.race_code)
    }
}

/// Run every preset against every applicable seed, twice each for the determinism check.
#[must_use]
pub fn run_batch(presets: &[PresetId], seeds: &[SeedInfo], options: &BatchOptions) -> Vec<RunResult> {
    let mut results = Vec::new();
    for &preset in presets {
        for info in seeds.iter().filter(|info| info.matches_preset(preset)) {
            let mut plan = SimulationPlan::new(preset, info.seed)
                .with_max_turns(options.max_turns)
                .with_race_code(Some(info.race_code_for(preset)));
            if options.stage_race {
                plan = plan.with_stage_race();
            }
            if options.verbose {
                println!("🚴 Racing {}", plan.label().bright_white());
            }
            let result = run_plan(&plan);
            if options.verbose {
                report_progress(&result);
            }
            results.push(result);
        }
    }
    results
}

fn run_plan(plan: &SimulationPlan) -> RunResult {
    let start = Instant::now();
    let first = run_full_game(plan);
    let duration = start.elapsed();
    let race_code = plan
        .race_code
        .clone()
        .unwrap_or_else(|| plan.seed.to_string());

    match first {
        Ok(summary) => {
            let replay = run_full_game(plan).map(|again| again.digest);
            let deterministic = matches!(replay, Ok(digest) if digest == summary.digest);
            let failure = (!deterministic).then(|| match replay {
                Ok(digest) => format!("replay digest {digest:016x} != {:016x}", summary.digest),
                Err(err) => format!("replay failed: {err}"),
            });
            RunResult {
                preset: plan.preset,
                seed: plan.seed,
                race_code,
                passed: deterministic,
                deterministic,
                summary: Some(summary),
                failure,
                duration,
            }
        }
        Err(err) => RunResult {
            preset: plan.preset,
            seed: plan.seed,
            race_code,
            passed: false,
            deterministic: false,
            summary: None,
            failure: Some(err.to_string()),
            duration,
        },
    }
}

fn report_progress(result: &RunResult) {
    match (&result.summary, &result.failure) {
        (Some(summary), None) => println!(
            "  ✅ {} turns, {} steps, winner {} ({:?})",
            summary.turns,
            summary.steps,
            summary.winner.as_deref().unwrap_or("-"),
            result.duration
        ),
        (_, Some(failure)) => println!("  ❌ {}", failure.red()),
        (None, None) => {}
    }
}

mod duration_serde {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_cover_matching_seeds_only() {
        let seeds = vec![
            SeedInfo::from_numeric(8),
            SeedInfo::from_race_code(21, PresetId::Cobbles, "CB-PAVE42".into()),
        ];
        let results = run_batch(&[PresetId::Flat, PresetId::Cobbles], &seeds, &BatchOptions::default());
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|result| result.passed && result.deterministic));
        assert!(results.iter().any(|result| result.race_code == "CB-PAVE42"));
        assert!(results.iter().all(|result| result.summary.is_some()));
    }

    #[test]
    fn failures_carry_the_reason() {
        let options = BatchOptions {
            max_turns: 1,
            ..BatchOptions::default()
        };
        let results = run_batch(&[PresetId::Mountain], &[SeedInfo::from_numeric(3)], &options);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert!(results[0].failure.as_deref().unwrap().contains("turn budget"));
    }

    #[test]
    fn results_serialize_with_millisecond_durations() {
        let results = run_batch(&[PresetId::Flat], &[SeedInfo::from_numeric(5)], &BatchOptions::default());
        let json = serde_json::to_value(&results[0]).unwrap();
        assert!(json["duration"].is_u64());
        assert_eq!(json["preset"], "flat");
    }
}
