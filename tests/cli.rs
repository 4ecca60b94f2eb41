use std::fs;

use tempfile::tempdir;

fn flusim() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("flusim")
}

#[test]
fn headless_run_writes_report_and_figure() {
    let dir = tempdir().unwrap();
    let output = flusim()
        .args(["--headless", "--random-seed", "7", "--max-ticks", "40"])
        .arg("--output-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Running Scenario A: Flu (No Vaccine)..."));
    assert!(stdout.contains("Running Scenario B: Flu (50% Vaccinated)..."));
    assert!(stdout.contains("Scenario A finished after 40 ticks"));

    let report = fs::read_to_string(dir.path().join("sir_counts.csv")).unwrap();
    let mut lines = report.lines();
    assert_eq!(
        lines.next(),
        Some("scenario,tick,susceptible,infected,recovered")
    );
    assert_eq!(lines.next(), Some("A,0,149,1,0"));
    assert_eq!(report.lines().count(), 1 + 40 + 40);
    assert!(dir.path().join("epidemic_curves.svg").exists());
}

#[test]
fn same_seed_same_report() {
    let run = |seed: &str| {
        let dir = tempdir().unwrap();
        flusim()
            .args(["--headless", "--no-plot", "--max-ticks", "120", "-r", seed])
            .arg("-o")
            .arg(dir.path())
            .assert()
            .success();
        fs::read_to_string(dir.path().join("sir_counts.csv")).unwrap()
    };
    assert_eq!(run("11"), run("11"));
}

#[test]
fn config_file_sets_parameters() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{
            "parameters": { "population": 30, "transmission_probability": 0.0 },
            "scenarios": [
                { "label": "Q", "name": "Quiet", "vaccination_fraction": 0.5 }
            ]
        }"#,
    )
    .unwrap();
    flusim()
        .arg("--headless")
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success();

    let report = fs::read_to_string(dir.path().join("sir_counts.csv")).unwrap();
    let rows: Vec<&str> = report.lines().skip(1).collect();
    // Without transmission, patient zero recovers on tick 181 and the run ends.
    assert_eq!(rows.len(), 181);
    assert_eq!(rows[0], "Q,0,14,1,15");
    assert_eq!(rows[180], "Q,180,14,0,16");
}

#[test]
fn invalid_config_fails_fast() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{ "scenarios": [ { "label": "A", "name": "Bad", "vaccination_fraction": 1.5 } ] }"#,
    )
    .unwrap();
    let output = flusim()
        .arg("--headless")
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("vaccination_fraction"));
    assert!(!dir.path().join("sir_counts.csv").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn missing_display_is_fatal() {
    let dir = tempdir().unwrap();
    let output = flusim()
        .env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("WAYLAND_SOCKET")
        .arg("--output-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("could not open display"));
    assert!(!dir.path().join("sir_counts.csv").exists());
}
