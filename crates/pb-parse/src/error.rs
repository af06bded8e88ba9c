use pb_lex::{LexError, Token, TokenKind};
use pb_util::SourceLoc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{loc}: unexpected token {found:?}")]
    UnexpectedToken { found: TokenKind, loc: SourceLoc },

    #[error("{loc}: expected {expected:?}, found {found:?}")]
    ExpectedKind {
        expected: TokenKind,
        found: TokenKind,
        loc: SourceLoc,
    },

    #[error("mismatched parentheses, expected ')'")]
    MismatchedParenExpectedClose,

    #[error("mismatched parentheses, expected '('")]
    MismatchedParenExpectedOpen,

    #[error("source ended in the middle of a statement")]
    UnexpectedEof,
}

impl ParseError {
    pub fn unexpected(tok: &Token) -> Self {
        ParseError::UnexpectedToken {
            found: tok.kind,
            loc: tok.loc,
        }
    }

    pub fn expected(expected: TokenKind, found: &Token) -> Self {
        ParseError::ExpectedKind {
            expected,
            found: found.kind,
            loc: found.loc,
        }
    }
}
