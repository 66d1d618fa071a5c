// Regression tests for the command-line surface.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn milagold() -> Command {
    Command::cargo_bin("milagold").unwrap()
}

#[test]
fn lone_word_runs_test_mode_without_memcheck() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("program")).unwrap();

    milagold()
        .args(["fibonacci", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(contains("testing"))
        .stdout(contains("memcheck enabled").not());
}

#[test]
fn two_words_are_rejected_with_usage() {
    milagold()
        .args(["a", "b"])
        .assert()
        .failure()
        .stderr(contains("Usage").or(contains("usage")));
}

#[test]
fn gen_without_target_is_rejected() {
    milagold().arg("--gen").assert().failure();
}

#[test]
fn gen_all_without_compiler_reports_and_completes() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("program")).unwrap();
    fs::write(root.path().join("program").join("hello.mila"), "begin end.\n").unwrap();

    milagold()
        .args(["--gen", "--all", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(contains("generating golden data"))
        .stdout(contains("processing program/hello.mila"))
        .stdout(contains("mila compiler not found"));

    assert!(root.path().join("golden").is_dir());
    assert!(!root.path().join("golden").join("hello.txt").exists());
}

#[test]
fn missing_program_directory_is_fatal() {
    let root = tempfile::tempdir().unwrap();

    milagold()
        .arg("--root")
        .arg(root.path())
        .assert()
        .failure()
        .stdout(contains("testing"))
        .stderr(contains("milagold::discovery"));
}

#[test]
fn unknown_program_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("program")).unwrap();

    milagold()
        .args(["--gen", "ghost", "--root"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(contains("ghost"));
}

#[test]
fn mem_flag_is_announced() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("program")).unwrap();

    milagold()
        .args(["--mem", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(contains("memcheck enabled"))
        .stdout(contains("testing"));
}
