use crate::ast::{ExprTok, Stmt, StrOrExpr};
use crate::error::ParseError;
use crate::parser::Parser;

#[test]
fn empty_program_parses_to_no_statements() {
    assert_eq!(Parser::parse_program("").unwrap(), vec![]);
}

#[test]
fn blank_lines_between_statements_are_ignored() {
    let ast = Parser::parse_program("\n\nEND\n\n").unwrap();
    assert_eq!(ast, vec![Stmt::End]);
}

#[test]
fn deeply_nested_parens_parse_and_flatten_correctly() {
    // ((((((((1)))))))) at depth 8
    let src = "LET a BE ((((((((1))))))))\n";
    let ast = Parser::parse_program(src).unwrap();
    match &ast[0] {
        Stmt::Let { rhs: StrOrExpr::Expr(e), .. } => {
            assert_eq!(e, &vec![ExprTok::Number("1".into())]);
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn unexpected_token_at_statement_position_is_an_error() {
    let err = Parser::parse_program("123\n").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn label_not_followed_by_colon_newline_is_an_error() {
    let err = Parser::parse_program("top PRINT 1\n").unwrap_err();
    assert!(matches!(err, ParseError::ExpectedKind { .. }));
}

#[test]
fn print_with_trailing_comma_list_mixes_strings_and_expressions() {
    let ast = Parser::parse_program("PRINT \"x=\", 1 + 2\n").unwrap();
    match &ast[0] {
        Stmt::Print { items } => {
            // the two source items plus the parser's appended trailing newline
            assert_eq!(items.len(), 3);
            assert_eq!(items[0], StrOrExpr::Str("x=".into()));
            assert_eq!(items[2], StrOrExpr::Str("\n".into()));
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn input_accepts_multiple_comma_separated_names() {
    let ast = Parser::parse_program("INPUT a, b, c\n").unwrap();
    assert_eq!(
        ast[0],
        Stmt::Input {
            vars: vec!["a".into(), "b".into(), "c".into()]
        }
    );
}

#[test]
fn truncated_source_mid_statement_is_unexpected_eof() {
    let err = Parser::parse_program("LET a BE").unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEof);
}
