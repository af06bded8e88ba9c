//! End-to-end pipeline tests: source text through `pb-parse` and
//! `pb-codegen` into a running [`Vm`]. These exercise the six concrete
//! scenarios and boundary behaviors the language core is specified
//! against, not just individual opcodes in isolation.

use pb_codegen::lower_program;
use pb_parse::Parser;

use crate::io::TestIo;
use crate::vm::{RunState, Vm};

fn run(src: &str) -> Vm<TestIo> {
    run_with_input(src, std::iter::empty::<&str>())
}

fn run_with_input(src: &str, lines: impl IntoIterator<Item = impl Into<String>>) -> Vm<TestIo> {
    let ast = Parser::parse_program(src).unwrap();
    let out = lower_program(&ast).unwrap();
    let mut vm = Vm::new(TestIo::with_input(lines));
    vm.load(out.code, out.strings);
    vm.run().unwrap();
    vm
}

#[test]
fn scenario_let_print_end() {
    let vm = run("LET A BE 1\nPRINT A\nEND\n");
    assert_eq!(vm.io().output, "1 \n ");
    assert_eq!(vm.state(), RunState::Halted);
}

#[test]
fn scenario_arithmetic_precedence_and_integer_division() {
    // 3 + 4 * 2 / (1 - 5) == 3 + 8 / -4 == 3 + -2 == 1
    let vm = run("LET a BE 3 + 4 * 2 / ( 1 - 5 )\nPRINT a\nEND\n");
    assert_eq!(vm.io().output, "1 \n ");
}

#[test]
fn scenario_compute_accept_return_subroutine() {
    let vm = run("COMPUTE C AS Plus2 4\nEND\nPlus2:\n ACCEPT Var\n RETURN Var + 2\n");
    assert_eq!(vm.vars().get("C").unwrap().to_string(), "6");
}

#[test]
fn scenario_goto_loop_counts_up_and_halts() {
    let vm = run("LET B BE 0\ntop:\n PRINT B\n LET B BE B + 1\n IF B < 3 THEN GOTO top\nEND\n");
    assert_eq!(vm.io().output, "0 \n 1 \n 2 \n ");
    assert_eq!(vm.state(), RunState::Halted);
}

#[test]
fn empty_program_halts_immediately() {
    let vm = run("");
    assert_eq!(vm.state(), RunState::Halted);
    assert_eq!(vm.io().output, "");
}

#[test]
fn call_statement_runs_a_subroutine_for_side_effects_only() {
    let vm = run("CALL Greet\nEND\nGreet:\n PRINT \"hi\"\n RETURN\n");
    assert_eq!(vm.io().output, "hi \n ");
}

#[test]
fn input_statement_reads_a_line_from_the_external_console() {
    let vm = run_with_input("INPUT name\nPRINT name\nEND\n", ["Ada"]);
    assert_eq!(vm.io().output, "Ada \n ");
}

#[test]
fn is_keyword_parses_and_runs_as_equality() {
    let vm = run("LET B BE 0\nIF B IS 0 THEN PRINT \"zero\"\nEND\n");
    assert_eq!(vm.io().output, "zero \n ");
}

#[test]
fn fat_arrow_spelling_of_gte_runs_like_standard_spelling() {
    let vm = run("LET B BE 5\nIF B => 5 THEN PRINT \"ok\"\nEND\n");
    assert_eq!(vm.io().output, "ok \n ");
}

#[test]
fn nested_call_depth_eight_parens_evaluates_correctly() {
    let vm = run("LET a BE ((((((((3))))))))\nPRINT a\nEND\n");
    assert_eq!(vm.io().output, "3 \n ");
}
