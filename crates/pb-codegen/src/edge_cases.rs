use pb_parse::Parser;

use crate::codegen::lower_program;
use crate::opcode;

fn lower(src: &str) -> crate::CodegenOutput {
    let ast = Parser::parse_program(src).unwrap();
    lower_program(&ast).unwrap()
}

#[test]
fn forward_reference_to_a_label_defined_later_resolves() {
    // Compute appears before the label it targets is bound.
    let out = lower("COMPUTE C AS Later 1\nEND\nLater:\nACCEPT X\nRETURN X\n");
    assert!(out.code.contains(&opcode::GOSUB));
}

#[test]
fn bare_return_emits_no_expression_opcodes_before_popscope() {
    let out = lower("Sub:\nRETURN\n");
    let i = out
        .code
        .iter()
        .position(|&b| b == opcode::POPSCOPE)
        .unwrap();
    assert_eq!(out.code[i + 1], opcode::RETURN);
}

#[test]
fn call_statement_lowers_to_pushscope_gosub_without_storenum() {
    let out = lower("top:\nCALL top\nEND\n");
    assert!(out.code.contains(&opcode::PUSHSCOPE));
    assert!(out.code.contains(&opcode::GOSUB));
    // unlike Compute, Call never stores a return value.
    assert!(!out.code.contains(&opcode::STORENUM));
}

#[test]
fn deeply_nested_parens_still_lower_to_flat_rpn_ops() {
    let out = lower("LET a BE ((((((((1))))))))\nEND\n");
    assert_eq!(out.code[4], opcode::LITERAL2);
}

#[test]
fn if_without_a_matching_then_stmt_still_patches_branch_around() {
    let out = lower("LET B BE 0\ntop:\nPRINT B\nIF B < 3 THEN GOTO top\nEND\n");
    assert!(out.code.contains(&opcode::JUMPIF0));
    assert!(out.code.contains(&opcode::LT));
}
