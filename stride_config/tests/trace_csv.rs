use std::fs;
use std::io::Write;

use rstest::rstest;
use stride_config::{TraceRow, load_trace_csv};
use tempfile::tempdir;

fn write_csv(lines: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    let mut f = fs::File::create(&path).unwrap();
    for l in lines {
        writeln!(f, "{l}").unwrap();
    }
    (dir, path)
}

#[test]
fn loads_valid_trace() {
    let (_dir, path) = write_csv(&["t_ms,ax,ay,az", "0,0.0,0.0,1.0", "20,0.5,-0.1,1.02"]);
    let rows = load_trace_csv(&path).expect("valid trace");
    assert_eq!(
        rows,
        vec![
            TraceRow {
                t_ms: 0,
                ax: 0.0,
                ay: 0.0,
                az: 1.0
            },
            TraceRow {
                t_ms: 20,
                ax: 0.5,
                ay: -0.1,
                az: 1.02
            },
        ]
    );
}

#[test]
fn tolerates_whitespace_around_fields() {
    let (_dir, path) = write_csv(&["t_ms, ax, ay, az", "0, 0.1, 0.2, 0.9"]);
    let rows = load_trace_csv(&path).expect("trimmed trace");
    assert_eq!(rows.len(), 1);
    assert!((rows[0].ay - 0.2).abs() < 1e-12);
}

#[test]
fn non_finite_values_pass_through() {
    let (_dir, path) = write_csv(&["t_ms,ax,ay,az", "0,NaN,0.0,1.0"]);
    let rows = load_trace_csv(&path).expect("NaN parses");
    assert!(rows[0].ax.is_nan());
}

#[rstest]
#[case(&["time,ax,ay,az", "0,0,0,1"], "must have headers")]
#[case(&["t_ms,ax,ay", "0,0,0"], "must have headers")]
#[case(&["t_ms,ax,ay,az", "0,0,0,1", "abc,0,0,1"], "invalid CSV row 3")]
#[case(&["t_ms,ax,ay,az", "40,0,0,1", "20,0,0,1"], "non-decreasing")]
#[case(&["t_ms,ax,ay,az"], "contains no samples")]
fn rejects_bad_traces(#[case] lines: &[&str], #[case] needle: &str) {
    let (_dir, path) = write_csv(lines);
    let err = load_trace_csv(&path).expect_err("should reject");
    assert!(
        err.to_string().contains(needle),
        "error {err} does not mention {needle:?}"
    );
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = load_trace_csv(&dir.path().join("nope.csv")).expect_err("missing");
    assert!(err.to_string().contains("open trace CSV"));
}
