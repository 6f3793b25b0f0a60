#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;

fn sample_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write!(file, "{contents}").expect("write temp file");
    file
}

#[test]
fn cli_fails_without_a_subcommand() {
    let mut cmd = cargo_bin_cmd!("cgt-tool");
    cmd.assert().failure();
}

#[test]
fn report_fails_without_a_file() {
    let mut cmd = cargo_bin_cmd!("cgt-tool");
    cmd.arg("report").assert().failure();
}

#[test]
fn parse_emits_json_for_a_simple_buy() {
    let file = sample_file("2018-08-28 BUY AAPL id=b1 qty=10 price=150.00\n");
    let mut cmd = cargo_bin_cmd!("cgt-tool");
    cmd.arg("parse")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"symbol\": \"AAPL\""));
}

#[test]
fn parse_schema_flag_emits_a_json_schema() {
    let mut cmd = cargo_bin_cmd!("cgt-tool");
    cmd.arg("parse")
        .arg("--schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\""));
}

#[test]
fn validate_flags_an_acquisition_with_no_price() {
    let file = sample_file("2018-08-28 BUY AAPL id=b1 qty=10\n");
    let mut cmd = cargo_bin_cmd!("cgt-tool");
    cmd.arg("validate")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("INCOMPLETE_ACQUISITION"));
}

#[test]
fn report_produces_a_plain_text_same_day_disposal() {
    let file = sample_file(
        "2018-08-28 BUY AAPL id=b1 qty=10 price=150.00\n\
         2018-08-28 SELL AAPL id=s1 qty=10 price=180.00\n",
    );
    let mut cmd = cargo_bin_cmd!("cgt-tool");
    cmd.arg("report")
        .arg("--format")
        .arg("plain")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Same Day"))
        .stdout(predicate::str::contains("2018/19"));
}

#[test]
fn report_json_round_trips_through_serde() {
    let file = sample_file(
        "2018-08-28 BUY AAPL id=b1 qty=10 price=150.00\n\
         2018-08-28 SELL AAPL id=s1 qty=10 price=180.00\n",
    );
    let mut cmd = cargo_bin_cmd!("cgt-tool");
    cmd.arg("report")
        .arg("--format")
        .arg("json")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"disposals\""));
}
