//! Property-style fuzzing of the lexer against spec.md §8's "lex
//! totality" law: for every accepted input, every byte is either inside
//! a token or consumed as whitespace -- no byte is silently dropped, and
//! well-formed input never produces an error.

use proptest::prelude::*;

use crate::lexer::Lexer;

/// A single lexical "piece" drawn from the grammar's atomic shapes,
/// excluding comments and strings (whose embedded text could otherwise
/// accidentally spell a keyword or another piece and desync the oracle
/// below).
fn piece() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u16..9999).prop_map(|n| n.to_string()),
        "[A-Za-z][A-Za-z0-9_]{0,8}",
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("BE".to_string()),
        Just("<".to_string()),
        Just("<=".to_string()),
        Just("=".to_string()),
        Just("!=".to_string()),
        Just(">=".to_string()),
        Just(">".to_string()),
        Just(":".to_string()),
        Just(",".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
    ]
}

proptest! {
    /// Joining any sequence of well-formed pieces with single spaces and
    /// a trailing newline must lex to completion with no error -- every
    /// byte lands inside some token or the single-space/newline
    /// whitespace between them.
    #[test]
    fn well_formed_token_stream_always_lexes_without_error(pieces in proptest::collection::vec(piece(), 0..24)) {
        let src = format!("{}\n", pieces.join(" "));
        for tok in Lexer::new(&src) {
            prop_assert!(tok.is_ok());
        }
    }

    /// The token count always matches the piece count plus the trailing
    /// newline: no piece is ever merged with or split from its
    /// neighbours by the single-space separator.
    #[test]
    fn token_count_matches_piece_count(pieces in proptest::collection::vec(piece(), 0..24)) {
        let src = format!("{}\n", pieces.join(" "));
        let count = Lexer::new(&src).map(|t| t.unwrap()).count();
        prop_assert_eq!(count, pieces.len() + 1);
    }

    /// `column` always measures a 0-based offset from the start of the
    /// current line: the token right after a `NEWLINE` always starts at
    /// column 0, regardless of how far into the previous line its
    /// predecessor ran.
    #[test]
    fn token_after_a_newline_starts_at_column_zero(pieces in proptest::collection::vec(piece(), 1..12)) {
        let src = format!("{}\nEND\n", pieces.join(" "));
        let tokens: Vec<_> = Lexer::new(&src).map(|t| t.unwrap()).collect();
        for pair in tokens.windows(2) {
            if pair[0].kind == crate::token::TokenKind::Newline {
                prop_assert_eq!(pair[1].loc.column, 0);
            }
        }
    }
}
