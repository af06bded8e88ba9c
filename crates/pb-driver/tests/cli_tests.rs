//! CLI-level end-to-end tests: invoke the `phonebasic` binary against
//! temporary `.pb` source files and check its exit code and output,
//! per spec.md §6's CLI contract ("exit code 0 on clean HALT, non-zero
//! on any lex/parse/translate/VM error with a human-readable
//! diagnostic").

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn phonebasic() -> Command {
    Command::cargo_bin("phonebasic").unwrap()
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn clean_halt_exits_zero_and_prints_output() {
    let src = source_file("LET A BE 1\nPRINT A\nEND\n");

    phonebasic()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn missing_source_file_exits_non_zero() {
    phonebasic()
        .arg("/nonexistent/path/to/program.pb")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn parse_error_exits_non_zero_with_diagnostic() {
    let src = source_file("LET a BE 2 + ( 1 - 5\n");

    phonebasic()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatched parentheses"));
}

#[test]
fn translator_error_exits_non_zero() {
    let src = source_file("top:\nEND\ntop:\nEND\n");

    phonebasic()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("label already exists"));
}

#[test]
fn vm_error_renders_a_disassembly_window() {
    // RETRV of a never-stored variable is a VM error; the driver should
    // print both the error and a window of surrounding instructions.
    let src = source_file("PRINT missing\nEND\n");

    phonebasic()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("undefined variable"))
        .stderr(predicate::str::contains("RETRV"));
}

#[test]
fn debug_flag_is_accepted() {
    let src = source_file("LET A BE 1\nEND\n");

    phonebasic().arg("--debug").arg(src.path()).assert().success();
}

#[test]
fn subroutine_program_computes_expected_result() {
    let src = source_file(
        "COMPUTE C AS Plus2 4\nPRINT C\nEND\nPlus2:\n ACCEPT Var\n RETURN Var + 2\n",
    );

    phonebasic()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("6"));
}
