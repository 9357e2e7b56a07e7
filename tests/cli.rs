use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

const SAMPLE: &str = "\
Country Name,Country Code,2018,2019,2020,2021
Germany,DEU,1.1,1.1,-3.8,2.6
France,FRA,1.8,1.9,-7.9,6.8
";

fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("growth.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(SAMPLE.as_bytes()).unwrap();
    path
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("wbtab").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("wbtab"));
}

#[test]
fn report_prints_per_entity_stats() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);

    let mut cmd = Command::cargo_bin("wbtab").unwrap();
    cmd.args([
        "report",
        "--input",
        input.to_str().unwrap(),
        "--drop",
        "Country Code",
        "--stats",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Germany"))
        .stdout(predicate::str::contains("mean="))
        .stdout(predicate::str::contains("skew="));
}

#[test]
fn report_pooled_stats_describe_the_whole_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);

    let mut cmd = Command::cargo_bin("wbtab").unwrap();
    cmd.args([
        "report",
        "--input",
        input.to_str().unwrap(),
        "--years-only",
        "--stats",
        "--pooled",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("all values"))
        .stdout(predicate::str::contains("count=8"));
}

#[test]
fn report_saves_reshaped_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);
    let out = dir.path().join("table.csv");

    let mut cmd = Command::cargo_bin("wbtab").unwrap();
    cmd.args([
        "report",
        "--input",
        input.to_str().unwrap(),
        "--drop",
        "Country Code",
        "--orient",
        "period",
        "--out",
        out.to_str().unwrap(),
    ]);
    cmd.assert().success();

    let txt = std::fs::read_to_string(&out).unwrap();
    assert!(txt.starts_with("Year,Germany,France"));
    assert_eq!(txt.lines().count(), 5);
}

#[test]
fn report_fails_on_missing_input() {
    let mut cmd = Command::cargo_bin("wbtab").unwrap();
    cmd.args(["report", "--input", "no/such/file.csv", "--stats"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot open"));
}

#[test]
fn report_fails_on_unknown_id_column() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);

    let mut cmd = Command::cargo_bin("wbtab").unwrap();
    cmd.args([
        "report",
        "--input",
        input.to_str().unwrap(),
        "--id-column",
        "Region",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Region"));
}
