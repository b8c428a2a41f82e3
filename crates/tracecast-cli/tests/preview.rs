//! Offline preview renders the same HTML the live message would show.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const RUN_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/run.jsonl");

#[test]
fn test_preview_renders_fixture_run() {
    let home = TempDir::new().unwrap();

    cargo_bin_cmd!("tracecast")
        .env("TRACECAST_HOME", home.path())
        .args(["preview", "--input", RUN_FIXTURE])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<blockquote>"))
        .stdout(predicate::str::contains(
            "<i>Thought:</i> Checking the forecast &lt;now&gt;.",
        ))
        .stdout(predicate::str::contains(
            r#"<code>weather({"city":"Lisbon"})</code>"#,
        ))
        .stdout(predicate::str::contains("<b>Result:</b> sunny, 21°C"))
        .stdout(predicate::str::contains("</blockquote>\n\nIt is sunny &amp; 21°C."))
        .stdout(predicate::str::contains("It is It is").not())
        .stderr(predicate::str::contains("skipping malformed event"));
}

#[test]
fn test_preview_reads_stdin() {
    let home = TempDir::new().unwrap();

    cargo_bin_cmd!("tracecast")
        .env("TRACECAST_HOME", home.path())
        .arg("preview")
        .write_stdin("{\"status\":\"thinking\",\"content\":\"hm\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("<i>Thinking...</i> hm"));
}

#[test]
fn test_preview_of_empty_stream_prints_placeholder() {
    let home = TempDir::new().unwrap();

    cargo_bin_cmd!("tracecast")
        .env("TRACECAST_HOME", home.path())
        .arg("preview")
        .write_stdin("")
        .assert()
        .success()
        .stdout("...\n");
}

#[test]
fn test_preview_honors_config_limits() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.toml"),
        "[display]\nresult_preview_chars = 5\n",
    )
    .unwrap();

    cargo_bin_cmd!("tracecast")
        .env("TRACECAST_HOME", home.path())
        .arg("preview")
        .write_stdin("{\"status\":\"observation\",\"result\":\"abcdefghij\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("<b>Result:</b> abcde...\n"));
}

#[test]
fn test_config_path_and_init() {
    let home = TempDir::new().unwrap();
    let expected = home.path().join("config.toml");

    cargo_bin_cmd!("tracecast")
        .env("TRACECAST_HOME", home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_str().unwrap()));

    cargo_bin_cmd!("tracecast")
        .env("TRACECAST_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(expected.exists());

    cargo_bin_cmd!("tracecast")
        .env("TRACECAST_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
