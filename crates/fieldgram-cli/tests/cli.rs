use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn fieldgram() -> Command {
    Command::cargo_bin("fieldgram").unwrap()
}

#[test]
fn classify_rejects_future_dates() {
    fieldgram()
        .args(["classify", "Invoice date: 2021-09-01", "--today", "2021-08-01", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"detected\": false"));

    fieldgram()
        .args(["classify", "Invoice date: 2021-09-01", "--today", "2021-09-02", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"09-01-2021\""));
}

#[test]
fn classify_amount_replace() {
    fieldgram()
        .args([
            "classify",
            "Total:  1,234.5  USD",
            "--tag",
            "amount",
            "--replace",
            "<amount>",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"normalized\": \"1234.50\""))
        .stdout(predicate::str::contains("\"replaced\": \"Total: <amount> USD\""));
}

#[test]
fn extract_words_file_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let words = dir.path().join("page.json");
    fs::write(
        &words,
        r#"{"words": [
            {"text": "Issued", "left": 100, "top": 100, "right": 180, "bottom": 130},
            {"text": "2021-09-01", "left": 190, "top": 100, "right": 340, "bottom": 130},
            {"text": "Total", "left": 100, "top": 400, "right": 180, "bottom": 430},
            {"text": "99.9", "left": 190, "top": 400, "right": 260, "bottom": 430}
        ], "width": 1700, "height": 2200}"#,
    )
    .unwrap();

    fieldgram()
        .args(["extract", "--format", "csv", "--candidates-only", "--today", "2021-09-02"])
        .arg(&words)
        .assert()
        .success()
        .stdout(predicate::str::contains("1,2021-09-01,date,09-01-2021,190,100,340,130"))
        .stdout(predicate::str::contains("1,Total 99.9,amount,99.90,100,400,260,430"));
}

#[test]
fn extract_skips_blank_page() {
    let dir = tempfile::tempdir().unwrap();
    let words = dir.path().join("scan.json");
    fs::write(
        &words,
        r#"[
            {"words": [
                {"text": "Total", "left": 100, "top": 400, "right": 180, "bottom": 430},
                {"text": "99.9", "left": 190, "top": 400, "right": 260, "bottom": 430}
            ], "width": 1700, "height": 2200},
            {"words": [], "width": 1700, "height": 2200}
        ]"#,
    )
    .unwrap();

    fieldgram()
        .args(["extract", "--format", "csv", "--candidates-only", "--today", "2021-09-02"])
        .arg(&words)
        .assert()
        .success()
        .stdout(predicate::str::contains("1,Total 99.9,amount,99.90,100,400,260,430"))
        .stderr(predicate::str::contains("Skipped page 2"));
}

#[test]
fn unknown_engine_fails() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("page.png");
    fs::write(&image, b"not really a png").unwrap();

    fieldgram()
        .args(["extract", "--engine", "abbyy"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported word source engine"));
}

#[test]
fn config_init_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    fieldgram()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();

    fieldgram()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "word_source.engine", "pdfminer"])
        .assert()
        .success();

    fieldgram()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "word_source.engine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pdf_text_layer"));
}
