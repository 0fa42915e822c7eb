use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

fn survival_model() -> Command {
    Command::cargo_bin("survival-model").unwrap()
}

#[test]
fn prints_mean_survival_time() {
    let output = survival_model()
        .args(["--pop-size", "2000", "--mortality-prob", "0.1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mean: f64 = stdout
        .trim()
        .strip_prefix("Mean survival time: ")
        .expect("unexpected output")
        .parse()
        .unwrap();
    assert!(mean > 1.0 && mean < 100.0);
}

#[test]
fn prints_undefined_without_deaths() {
    survival_model()
        .args(["--pop-size", "5", "--mortality-prob", "0"])
        .assert()
        .success()
        .stdout("Mean survival time: undefined\n");
}

#[test]
fn same_seed_gives_same_output() {
    let run = |seed: &str| {
        survival_model()
            .args(["--pop-size", "500", "--random-seed", seed])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run("7"), run("7"));
}

#[test]
fn loads_parameters_file() {
    survival_model()
        .args(["--config", "tests/data/parameters.json"])
        .assert()
        .success()
        .stdout(
            "Loading parameters from: tests/data/parameters.json\n\
             Mean survival time: undefined\n",
        );
}

#[test]
fn rejects_invalid_mortality_probability() {
    survival_model()
        .args(["--mortality-prob", "1.5"])
        .assert()
        .failure()
        .stderr("Error: mortality probability must be in [0, 1], got 1.5\n");
}

#[test]
fn rejects_zero_time_steps() {
    survival_model()
        .args(["--time-steps", "0"])
        .assert()
        .failure();
}

#[test]
fn writes_reports_to_output_dir() {
    let temp_dir = tempdir().unwrap();
    survival_model()
        .args(["--pop-size", "3", "--mortality-prob", "1", "--time-steps", "4"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout("Mean survival time: 1\n");

    let living_count = fs::read_to_string(temp_dir.path().join("living_count.csv")).unwrap();
    assert_eq!(living_count, "time,alive\n0,3\n1,0\n2,0\n3,0\n4,0\n");
    let survival_times = fs::read_to_string(temp_dir.path().join("survival_times.csv")).unwrap();
    assert_eq!(survival_times, "death,survival_time\n0,1\n1,1\n2,1\n");
}

#[test]
fn verbosity_enables_logging() {
    let output = survival_model()
        .args(["--pop-size", "10", "-v"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Logging enabled at level INFO"));
    assert!(stdout.contains("simulated cohort 1 (10 patients"));
    assert!(!stdout.contains("DEBUG"));
}

#[test]
fn module_log_filters() {
    let output = survival_model()
        .args(["--pop-size", "10", "--mortality-prob", "1"])
        .args(["--log-level", "survival_model::patient=trace"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Logging enabled for survival_model::patient at level TRACE"));
    assert!(stdout.contains("patient 10 died in period 1"));
    assert!(!stdout.contains("simulated cohort"));
}

#[test]
fn log_level_off_prints_no_logging_message() {
    survival_model()
        .args(["--pop-size", "5", "--mortality-prob", "0", "-l", "off"])
        .assert()
        .success()
        .stdout("Mean survival time: undefined\n");
}

#[test]
fn unseeded_conflicts_with_random_seed() {
    survival_model()
        .args(["--unseeded", "--random-seed", "3"])
        .assert()
        .failure();
}
