//! pb-lex - PhoneBasic tokenizer
//!
//! Turns source text into a lazy stream of [`Token`]s. See the [`lexer`]
//! module for the two spelling quirks (`=>` and `IS`) this tokenizer
//! resolves that the reference implementation left as parse failures.

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod token;

#[cfg(test)]
mod edge_cases;
#[cfg(test)]
mod proptests;

pub use error::LexError;
pub use lexer::Lexer;
pub use token::{keyword_kind, Token, TokenKind};
