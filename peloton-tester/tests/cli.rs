use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "peloton-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_presets_writes_output() {
    let exe = env!("CARGO_BIN_EXE_peloton-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-presets", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available presets"));
    assert!(content.contains("CB-"));
}

#[test]
fn cli_runs_a_race_code_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_peloton-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--presets",
            "cobbles,flat",
            "--seeds",
            "CB-PAVE42,9",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let results: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let races = results.as_array().expect("array");
    // The race code only applies to cobbles; seed 9 runs on both presets.
    assert_eq!(races.len(), 3);
    assert!(races.iter().all(|race| race["passed"] == true));
    assert!(races.iter().any(|race| race["race_code"] == "CB-PAVE42"));
}

#[test]
fn cli_stage_race_reports_jerseys() {
    let exe = env!("CARGO_BIN_EXE_peloton-tester");
    let output_path = temp_path("tour");
    let output = Command::new(exe)
        .args([
            "--presets",
            "hilly",
            "--seeds",
            "5",
            "--stage-race",
            "--report",
            "markdown",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("| ✅ | hilly |"));
}

#[test]
fn cli_fails_on_turn_budget_and_unknown_presets() {
    let exe = env!("CARGO_BIN_EXE_peloton-tester");
    let output = Command::new(exe)
        .args(["--presets", "mountain", "--seeds", "1", "--max-turns", "1", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());

    let output = Command::new(exe)
        .args(["--presets", "gravel"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown preset"));
}
