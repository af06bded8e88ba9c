//! Longest-match tokenizer.
//!
//! `Lexer` is an `Iterator<Item = Result<Token, LexError>>`: there is no
//! end-of-file token, exhaustion of the iterator *is* end-of-file, and a
//! single bad byte ends the stream with an error rather than poisoning
//! every token after it.
//!
//! Two spellings are folded in here rather than left for the parser to
//! untangle:
//!   - `=>` is accepted next to `>=` as a second spelling of the `GTE`
//!     comparison (both produce a `CompOp` token with value `">="`).
//!   - `IS` is promoted from a would-be identifier to a `CompOp` token
//!     with value `"="`, so `IF B IS 0 THEN ...` parses as equality.

use pb_util::SourceLoc;

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{keyword_kind, Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            done: false,
        }
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.cursor.line(), self.cursor.column())
    }

    fn lex_number(&mut self, loc: SourceLoc) -> Token {
        let mut lexeme = self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.') {
            lexeme.push('.');
            self.cursor.bump();
            lexeme.push_str(&self.cursor.eat_while(|c| c.is_ascii_digit()));
        }
        Token::new(TokenKind::Number, lexeme, loc)
    }

    fn lex_string(&mut self, loc: SourceLoc) -> Result<Token, LexError> {
        self.cursor.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                Some('"') => {
                    self.cursor.bump();
                    return Ok(Token::new(TokenKind::String, value, loc));
                }
                Some('\n') | None => return Err(LexError::UnterminatedString { loc }),
                Some(c) => {
                    value.push(c);
                    self.cursor.bump();
                }
            }
        }
    }

    fn lex_word(&mut self, loc: SourceLoc) -> Token {
        let word = self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if word == "BE" {
            return Token::new(TokenKind::Assign, word, loc);
        }
        if word == "IS" {
            return Token::new(TokenKind::CompOp, "=".to_string(), loc);
        }
        match keyword_kind(&word) {
            Some(kind) => Token::new(kind, word, loc),
            None => Token::new(TokenKind::Id, word, loc),
        }
    }

    fn lex_comment(&mut self, loc: SourceLoc) -> Token {
        self.cursor.bump(); // first '/'
        self.cursor.bump(); // second '/'
        let rest = self.cursor.eat_while(|c| c != '\n');
        Token::new(TokenKind::Comment, format!("//{rest}"), loc)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.cursor.eat_while(|c| c == ' ' || c == '\t');

        let loc = self.loc();
        let c = match self.cursor.peek() {
            Some(c) => c,
            None => {
                self.done = true;
                return None;
            }
        };

        let result = match c {
            '0'..='9' => Ok(self.lex_number(loc)),
            '"' => self.lex_string(loc),
            c if c.is_ascii_alphabetic() => Ok(self.lex_word(loc)),
            '\n' => {
                self.cursor.bump();
                Ok(Token::new(TokenKind::Newline, "\n", loc))
            }
            '/' if self.cursor.peek_second() == Some('/') => Ok(self.lex_comment(loc)),
            '+' | '-' | '*' | '/' => {
                self.cursor.bump();
                Ok(Token::new(TokenKind::ArithOp, c.to_string(), loc))
            }
            '<' => {
                self.cursor.bump();
                if self.cursor.peek() == Some('=') {
                    self.cursor.bump();
                    Ok(Token::new(TokenKind::CompOp, "<=", loc))
                } else {
                    Ok(Token::new(TokenKind::CompOp, "<", loc))
                }
            }
            '>' => {
                self.cursor.bump();
                if self.cursor.peek() == Some('=') {
                    self.cursor.bump();
                    Ok(Token::new(TokenKind::CompOp, ">=", loc))
                } else {
                    Ok(Token::new(TokenKind::CompOp, ">", loc))
                }
            }
            '=' => {
                self.cursor.bump();
                if self.cursor.peek() == Some('>') {
                    self.cursor.bump();
                    Ok(Token::new(TokenKind::CompOp, ">=", loc))
                } else {
                    Ok(Token::new(TokenKind::CompOp, "=", loc))
                }
            }
            '!' if self.cursor.peek_second() == Some('=') => {
                self.cursor.bump();
                self.cursor.bump();
                Ok(Token::new(TokenKind::CompOp, "!=", loc))
            }
            ':' => {
                self.cursor.bump();
                Ok(Token::new(TokenKind::Colon, ":", loc))
            }
            ',' => {
                self.cursor.bump();
                Ok(Token::new(TokenKind::Comma, ",", loc))
            }
            '(' => {
                self.cursor.bump();
                Ok(Token::new(TokenKind::LParen, "(", loc))
            }
            ')' => {
                self.cursor.bump();
                Ok(Token::new(TokenKind::RParen, ")", loc))
            }
            other => {
                self.cursor.bump();
                Err(LexError::UnrecognizedChar { ch: other, loc })
            }
        };

        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(|t| t.unwrap().kind).collect()
    }

    fn values(src: &str) -> Vec<String> {
        Lexer::new(src).map(|t| t.unwrap().value).collect()
    }

    #[test]
    fn lexes_let_statement() {
        use TokenKind::*;
        assert_eq!(
            kinds("LET A BE 1\n"),
            vec![Let, Id, Assign, Number, Newline]
        );
    }

    #[test]
    fn number_has_no_leading_sign() {
        // unary minus is the expression parser's job, not the lexer's.
        assert_eq!(kinds("- 1"), vec![TokenKind::ArithOp, TokenKind::Number]);
    }

    #[test]
    fn float_literal_keeps_fractional_digits() {
        assert_eq!(values("3.25"), vec!["3.25"]);
    }

    #[test]
    fn string_strips_quotes() {
        assert_eq!(values(r#""hello""#), vec!["hello"]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lex = Lexer::new("\"unterminated\n");
        assert!(matches!(
            lex.next(),
            Some(Err(LexError::UnterminatedString { .. }))
        ));
        assert!(lex.next().is_none());
    }

    #[test]
    fn gte_accepts_both_spellings() {
        assert_eq!(values("a >= b"), vec!["a".into(), ">=".into(), "b".into()]);
        assert_eq!(values("a => b"), vec!["a".into(), ">=".into(), "b".into()]);
    }

    #[test]
    fn is_becomes_equality_compop() {
        let toks: Vec<Token> = Lexer::new("IF B IS 0 THEN END")
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(toks[2].kind, TokenKind::CompOp);
        assert_eq!(toks[2].value, "=");
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        assert_eq!(values("// note\nEND"), vec!["// note".into(), "\n".into(), "END".into()]);
    }

    #[test]
    fn keywords_upgrade_from_id() {
        assert_eq!(
            kinds("COMPUTE C AS Plus2 4"),
            vec![
                TokenKind::Compute,
                TokenKind::Id,
                TokenKind::As,
                TokenKind::Id,
                TokenKind::Number
            ]
        );
    }

    #[test]
    fn unrecognized_byte_errors_with_location() {
        let mut lex = Lexer::new("LET A BE 1 # bad");
        for _ in 0..4 {
            lex.next().unwrap().unwrap();
        }
        let err = lex.next().unwrap().unwrap_err();
        assert!(matches!(err, LexError::UnrecognizedChar { ch: '#', .. }));
        assert!(lex.next().is_none());
    }
}
