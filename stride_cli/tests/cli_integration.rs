use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Defaults spelled out, with a fast publish cadence so short runs print snapshots
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[sensor]
sample_rate_hz = 50
read_timeout_ms = 100

[gravity]
alpha = 0.88

[detector]
max_total_accel = 3.5
min_step_interval_ms = 2500
window = 8

[history]
interval_ms = 5000
capacity = 720

[publisher]
interval_ms = 100
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_trace(dir: &tempfile::TempDir, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.path().join("trace.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "{header}").unwrap();
    for r in rows {
        writeln!(f, "{r}").unwrap();
    }
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["run", "--duration-ms", "300"], 0, "run complete", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["run", "--cadence-hz", "fast"], 2, "invalid value", "stderr")]
#[case(&["run", "--duration-ms", "50", "--cadence-hz", "0"], 3, "cadence", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("stride").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn runs_without_config_file() {
    Command::cargo_bin("stride")
        .unwrap()
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 steps"));
}

#[rstest]
#[case("[gravity]\nalpha = 1.5\n", "gravity.alpha")]
#[case("[detector]\nwindow = 0\n", "detector.window")]
#[case("[history]\ncapacity = 0\n", "history.capacity")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
#[case("[sensor\nsample_rate_hz = 50\n", "parse")]
fn invalid_config_exits_3(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();

    Command::cargo_bin("stride")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid configuration"))
        .stderr(predicate::str::contains(needle));
}

#[test]
fn missing_config_file_exits_3() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("stride")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check")
        .assert()
        .code(3);
}

#[test]
fn cli_reports_bad_trace_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_trace(&dir, "time,x,y,z", &["0,0,0,1", "20,0,0,1"]);

    Command::cargo_bin("stride")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
#[case(&["0,0,0,1", "40,0,0,1", "20,0,0,1"], "non-decreasing")]
#[case(&["0,0,0,1", "20,zero,0,1"], "row 3")]
fn cli_reports_bad_trace_rows(#[case] rows: &[&str], #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let trace = write_trace(&dir, "t_ms,ax,ay,az", rows);

    Command::cargo_bin("stride")
        .unwrap()
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .code(4)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn missing_trace_exits_4() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("stride")
        .unwrap()
        .arg("replay")
        .arg("--trace")
        .arg(dir.path().join("absent.csv"))
        .assert()
        .code(4);
}

#[test]
fn replay_prints_text_summary() {
    let dir = tempdir().unwrap();
    let rows: Vec<String> = (0..300).map(|i| format!("{},0,0,1", i * 20)).collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let trace = write_trace(&dir, "t_ms,ax,ay,az", &refs);

    Command::cargo_bin("stride")
        .unwrap()
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("t=5000ms steps=0"))
        .stdout(predicate::str::contains("replay complete: steps=0"));
}

#[test]
fn replay_with_huge_timestamps_finishes() {
    let dir = tempdir().unwrap();
    let trace = write_trace(
        &dir,
        "t_ms,ax,ay,az",
        &["0,0,0,1", "1000000000000000,0,0,1", "18446744073709551615,0,0,1"],
    );

    assert_cmd::Command::cargo_bin("stride")
        .unwrap()
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stdout(predicate::str::contains("t=1000000000000000ms steps=0"))
        .stdout(predicate::str::contains("t=18446744073709551615ms steps=0"))
        .stdout(predicate::str::contains("snapshots=2"));
}

#[test]
fn live_run_summary_reports_sample_counts() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    Command::cargo_bin("stride")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--duration-ms")
        .arg("1000")
        .assert()
        .success()
        .stdout(predicate::str::contains("run complete"))
        .stdout(predicate::str::is_match(r"samples=[1-9]\d* rejected\(non-finite=0, over-limit=0\)").unwrap());
}
