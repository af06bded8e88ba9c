//! Boundary cases that a line-oriented tokenizer is prone to getting
//! subtly wrong: empty input, missing trailing newline, runs of
//! whitespace, and numbers that look like they could be something else.

use crate::lexer::Lexer;
use crate::token::TokenKind;

fn kinds(src: &str) -> Vec<TokenKind> {
    Lexer::new(src).map(|t| t.unwrap().kind).collect()
}

#[test]
fn empty_source_yields_no_tokens() {
    assert_eq!(kinds(""), vec![]);
}

#[test]
fn missing_trailing_newline_still_lexes_last_token() {
    assert_eq!(kinds("END"), vec![TokenKind::End]);
}

#[test]
fn blank_lines_each_produce_a_newline_token() {
    assert_eq!(
        kinds("\n\n\n"),
        vec![TokenKind::Newline, TokenKind::Newline, TokenKind::Newline]
    );
}

#[test]
fn bare_dot_after_digits_is_a_trailing_decimal_point() {
    // regex `\d+(\.\d*)?` allows a dot with zero fractional digits.
    assert_eq!(kinds("5."), vec![TokenKind::Number]);
}

#[test]
fn identifier_may_contain_digits_and_underscores_but_not_start_with_one() {
    assert_eq!(kinds("count_2"), vec![TokenKind::Id]);
}

#[test]
fn label_shape_is_id_colon_newline() {
    assert_eq!(
        kinds("top:\n"),
        vec![TokenKind::Id, TokenKind::Colon, TokenKind::Newline]
    );
}

#[test]
fn parens_and_comma_are_distinct_tokens() {
    assert_eq!(
        kinds("(1, 2)"),
        vec![
            TokenKind::LParen,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::RParen
        ]
    );
}

#[test]
fn not_equal_requires_both_characters() {
    assert_eq!(kinds("a != b"), vec![TokenKind::Id, TokenKind::CompOp, TokenKind::Id]);
}

#[test]
fn lone_bang_is_unrecognized() {
    let mut lex = Lexer::new("!");
    assert!(lex.next().unwrap().is_err());
}

#[test]
fn comment_with_no_trailing_newline_is_last_token() {
    assert_eq!(kinds("// trailing"), vec![TokenKind::Comment]);
}
