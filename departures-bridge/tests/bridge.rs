//! End-to-end scenarios against the real binary: stdout carries
//! exactly one JSON line, usage errors exit with 2, and failures from
//! resolution or the fetcher itself surface on stderr with a non-zero
//! exit.

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("departures-bridge").unwrap()
}

/// A temp directory holding a single fetcher module.
fn fetcher_dir(contents: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vasttrafik.lua"), contents).unwrap();
    dir
}

#[test]
fn one_departure_with_timestamp() {
    let dir = fetcher_dir(
        "function fetch_departures(stop)\n  return { { line = '16', time = datetime(2024, 1, 1, 8, 0, 0) } }\nend",
    );

    cmd()
        .args(["--source-dir", dir.path().to_str().unwrap(), "Korsvägen"])
        .assert()
        .success()
        .stdout("[{\"line\": \"16\", \"time\": \"2024-01-01T08:00:00\"}]\n");
}

#[test]
fn stop_name_is_emitted_as_literal_utf8() {
    let dir = fetcher_dir("function fetch_departures(stop)\n  return { stop = stop }\nend");

    cmd()
        .args(["--source-dir", dir.path().to_str().unwrap(), "Korsvägen"])
        .assert()
        .success()
        .stdout("{\"stop\": \"Korsvägen\"}\n");
}

#[test]
fn scalar_results_are_valid_json_lines() {
    let dir = fetcher_dir("function fetch_departures(stop)\n  return 3\nend");

    cmd()
        .args(["--source-dir", dir.path().to_str().unwrap(), "X"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn empty_source_dir_fails_mentioning_the_contract() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["--source-dir", dir.path().to_str().unwrap(), "Korsvägen"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("fetch_departures"));
}

#[test]
fn missing_source_dir_is_reported() {
    cmd()
        .args(["--source-dir", "/nonexistent/fetchers", "Korsvägen"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("not found"));
}

#[test]
fn no_arguments_is_a_usage_error() {
    cmd()
        .assert()
        .code(2)
        .stdout("")
        .stderr(contains("Usage:"));
}

#[test]
fn extra_arguments_are_a_usage_error() {
    cmd()
        .args(["Korsvägen", "Brunnsparken"])
        .assert()
        .code(2)
        .stdout("")
        .stderr(contains("Usage:"));
}

#[test]
fn fetcher_failure_propagates() {
    let dir = fetcher_dir("function fetch_departures(stop)\n  error('provider down')\nend");

    cmd()
        .args(["--source-dir", dir.path().to_str().unwrap(), "X"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("provider down"));
}

#[test]
fn first_candidate_in_filename_order_wins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("b.lua"),
        "function fetch_departures(stop) return 'b' end",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("a.lua"),
        "function fetch_departures(stop) return 'a' end",
    )
    .unwrap();

    cmd()
        .args(["--source-dir", dir.path().to_str().unwrap(), "X"])
        .assert()
        .success()
        .stdout("\"a\"\n");
}

#[test]
fn broken_candidate_does_not_abort_resolution() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a_broken.lua"), "this is not lua (").unwrap();
    std::fs::write(
        dir.path().join("b.lua"),
        "function fetch_departures(stop) return { ok = true } end",
    )
    .unwrap();

    cmd()
        .args(["--source-dir", dir.path().to_str().unwrap(), "X"])
        .assert()
        .success()
        .stdout("{\"ok\": true}\n");
}
