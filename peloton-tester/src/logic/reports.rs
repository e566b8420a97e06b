use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::RunResult;

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[RunResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Race Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==========================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total races: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(passed, total))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{status} {}", result.label().bold())?;
        if let Some(summary) = &result.summary {
            writeln!(
                out,
                "   Turns: {} | Steps: {} | Finishers: {}/{}",
                summary.turns, summary.steps, summary.finishers, summary.riders
            )?;
            writeln!(
                out,
                "   Winner: {} ({})",
                summary.winner.as_deref().unwrap_or("-"),
                summary.winning_team.as_deref().unwrap_or("-")
            )?;
            if let Some(jerseys) = &summary.jerseys {
                writeln!(
                    out,
                    "   Jerseys: general {} | sprint {} | mountain {}",
                    jerseys.general.as_deref().unwrap_or("-"),
                    jerseys.sprint.as_deref().unwrap_or("-"),
                    jerseys.mountain.as_deref().unwrap_or("-")
                )?;
            }
            writeln!(
                out,
                "   Draws: dice {} events {} weather {} ai {}",
                summary.draws.dice, summary.draws.events, summary.draws.weather, summary.draws.ai
            )?;
        }
        if let Some(failure) = &result.failure {
            writeln!(out, "   • {}", failure.red())?;
        }
        writeln!(out, "   Time: {:?}", result.duration)?;
    }

    if let (Some(fastest), Some(slowest)) = (
        results.iter().min_by_key(|r| r.duration),
        results.iter().max_by_key(|r| r.duration),
    ) {
        writeln!(out)?;
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(out, "Fastest: {} ({:?})", fastest.label().green(), fastest.duration)?;
        writeln!(out, "Slowest: {} ({:?})", slowest.label().yellow(), slowest.duration)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[RunResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[RunResult]) -> Result<()> {
    writeln!(out, "# Peloton Race Simulation Results\n")?;
    if results.is_empty() {
        writeln!(out, "_No races executed._")?;
        return Ok(());
    }

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total races**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(passed, total))?;

    writeln!(out, "## Races\n")?;
    writeln!(out, "| Status | Preset | Code | Turns | Winner | Digest |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        let (turns, winner, digest) = result.summary.as_ref().map_or_else(
            || ("-".to_string(), "-".to_string(), "-".to_string()),
            |summary| {
                (
                    summary.turns.to_string(),
                    summary.winner.clone().unwrap_or_else(|| "-".to_string()),
                    format!("{:016x}", summary.digest),
                )
            },
        );
        writeln!(
            out,
            "| {status} | {} | {} | {turns} | {winner} | {digest} |",
            result.preset, result.race_code
        )?;
    }

    let failures: Vec<&RunResult> = results.iter().filter(|r| !r.passed).collect();
    if !failures.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failures {
            writeln!(
                out,
                "- **{}**: {}",
                result.label(),
                result.failure.as_deref().unwrap_or("unknown")
            )?;
        }
    }
    Ok(())
}

fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / total as f64) * 100.0;
    rate
}
