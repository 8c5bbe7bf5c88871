//! Integration tests for the DDIFF CLI tool.
//!
//! These tests verify the complete end-to-end behavior of the CLI,
//! including argument parsing, file processing, and output formatting.

use assert_cmd::Command;
use ddiff_rs::{apply, parse_file, DiffConfig, TextFormat};
use predicates::prelude::*;
use std::path::Path;

/// Helper to create a Command for the ddiff-rs binary
fn ddiff() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ddiff-rs"))
}

#[test]
fn test_identical_files_exit_0() {
    ddiff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/identical_2.json")
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_different_files_exit_1() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("age"));
}

#[test]
fn test_file_not_found_exit_2() {
    ddiff()
        .arg("tests/fixtures/nonexistent.json")
        .arg("tests/fixtures/identical_1.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("Failed to parse first file"));
}

#[test]
fn test_modified_field() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("• .age: 30 → 31"))
        .stdout(predicate::str::contains("Summary: 1 edited"));
}

#[test]
fn test_added_fields() {
    ddiff()
        .arg("tests/fixtures/added_old.json")
        .arg("tests/fixtures/added_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("+ .age: 25"))
        .stdout(predicate::str::contains("+ .email"))
        .stdout(predicate::str::contains("2 added"));
}

#[test]
fn test_removed_field() {
    ddiff()
        .arg("tests/fixtures/removed_old.json")
        .arg("tests/fixtures/removed_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("- .deprecated"))
        .stdout(predicate::str::contains("1 removed"));
}

#[test]
fn test_nested_changes() {
    ddiff()
        .arg("tests/fixtures/nested_old.json")
        .arg("tests/fixtures/nested_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(".user.profile.theme"))
        .stdout(predicate::str::contains(".user.updated_at"));
}

#[test]
fn test_pointer_scheme() {
    ddiff()
        .arg("tests/fixtures/nested_old.json")
        .arg("tests/fixtures/nested_new.json")
        .args(["--format=plain", "--scheme=pointer"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("#/user/profile/theme"));
}

#[test]
fn test_array_changes() {
    ddiff()
        .arg("tests/fixtures/array_old.json")
        .arg("tests/fixtures/array_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(".items.["));
}

#[test]
fn test_ignore_order_flag() {
    ddiff()
        .arg("tests/fixtures/unordered_old.json")
        .arg("tests/fixtures/unordered_new.json")
        .assert()
        .code(1);

    ddiff()
        .arg("tests/fixtures/unordered_old.json")
        .arg("tests/fixtures/unordered_new.json")
        .arg("--ignore-order")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_ignore_whitespace_flag() {
    ddiff()
        .arg("tests/fixtures/whitespace_old.json")
        .arg("tests/fixtures/whitespace_new.json")
        .assert()
        .code(1);

    ddiff()
        .arg("tests/fixtures/whitespace_old.json")
        .arg("tests/fixtures/whitespace_new.json")
        .arg("--ignore-whitespace")
        .assert()
        .code(0);
}

#[test]
fn test_ignore_pattern_flag() {
    ddiff()
        .arg("tests/fixtures/nested_old.json")
        .arg("tests/fixtures/nested_new.json")
        .args(["--format=plain", "--ignore", "**.updated_at"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("theme"))
        .stdout(predicate::str::contains("updated_at").not());
}

#[test]
fn test_ignore_property_flag() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .args(["--ignore-property", "age"])
        .assert()
        .code(0);
}

#[test]
fn test_only_flag() {
    ddiff()
        .arg("tests/fixtures/nested_old.json")
        .arg("tests/fixtures/nested_new.json")
        .args(["--format=plain", "--only", "user.profile"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("theme"))
        .stdout(predicate::str::contains("updated_at").not());
}

#[test]
fn test_identity_key_reports_moves() {
    ddiff()
        .arg("tests/fixtures/moved_old.json")
        .arg("tests/fixtures/moved_new.json")
        .args(["--format=plain", "--identity-key", "id"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("↷"))
        .stdout(predicate::str::contains("(from 0)"))
        .stdout(predicate::str::contains("1 moved"));
}

#[test]
fn test_json_output_format() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--format=json")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"changes\""))
        .stdout(predicate::str::contains("\"stats\""))
        .stdout(predicate::str::contains("\"edited\": 1"))
        .stdout(predicate::str::contains("\"kind\": \"E\""))
        .stdout(predicate::str::contains("\"pointer\": \".age\""));
}

#[test]
fn test_json_output_audit() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .args(["--format=json", "--audit"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"subject\": 30"));
}

#[test]
fn test_patch_output_format() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .args(["--format=patch", "--scheme=pointer", "--audit"])
        .assert()
        .code(1)
        .stdout("E #/age 2 30 => 2 31\n");
}

#[test]
fn test_patch_output_applies() {
    let output = ddiff()
        .arg("tests/fixtures/array_old.json")
        .arg("tests/fixtures/array_new.json")
        .args(["--format=patch", "--scheme=pointer", "--audit"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let records = TextFormat::new()
        .audit(true)
        .decode(&String::from_utf8(output.stdout).unwrap())
        .unwrap();
    let target = parse_file(Path::new("tests/fixtures/array_old.json")).unwrap();
    let expected = parse_file(Path::new("tests/fixtures/array_new.json")).unwrap();
    let patched = apply(&target, &records, &DiffConfig::default()).unwrap();
    assert_eq!(patched, expected);
}

#[test]
fn test_plain_output_format() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_verbose_flag() {
    ddiff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/identical_2.json")
        .arg("--verbose")
        .env_remove("RUST_LOG")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Parsing"))
        .stderr(predicate::str::contains("Computing diff"));
}

#[test]
fn test_quiet_flag() {
    ddiff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn test_help_flag() {
    ddiff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deep structural diff"))
        .stdout(predicate::str::contains("FILE1"))
        .stdout(predicate::str::contains("FILE2"));
}

#[test]
fn test_version_flag() {
    ddiff()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ddiff"));
}

#[test]
fn test_max_value_length() {
    ddiff()
        .arg("tests/fixtures/added_old.json")
        .arg("tests/fixtures/added_new.json")
        .args(["--format=plain", "--max-value-length=8"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"bob@...").and(predicate::str::contains("example.com").not()));
}

#[test]
fn test_mixed_json_yaml() {
    ddiff()
        .arg("tests/fixtures/mixed.json")
        .arg("tests/fixtures/mixed.yaml")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_toml_files() {
    ddiff()
        .arg("tests/fixtures/config_old.toml")
        .arg("tests/fixtures/config_new.toml")
        .arg("--format=plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(".server.port: 8080 → 9090"));
}

#[test]
fn test_invalid_file_format() {
    ddiff()
        .arg("tests/fixtures/invalid.txt")
        .arg("tests/fixtures/identical_1.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_unknown_format_argument() {
    ddiff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/identical_2.json")
        .arg("--format=xml")
        .assert()
        .failure()
        .code(2);
}
