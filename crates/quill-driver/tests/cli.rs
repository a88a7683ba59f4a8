use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn check_reports_the_inferred_type_of_the_sample_program() {
    Command::cargo_bin("quillc")
        .unwrap()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("pow: i32"));
}

#[test]
fn check_reads_an_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("quill.toml");
    std::fs::write(&config_path, "[analysis]\nverbose = true\n").unwrap();

    Command::cargo_bin("quillc")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("check")
        .assert()
        .success();
}

#[test]
fn missing_config_file_is_a_clean_error() {
    Command::cargo_bin("quillc")
        .unwrap()
        .arg("--config")
        .arg("/nonexistent/quill.toml")
        .arg("check")
        .assert()
        .failure();
}
