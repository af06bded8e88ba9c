use pb_util::SourceLoc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("{loc}: unrecognized character {ch:?}")]
    UnrecognizedChar { ch: char, loc: SourceLoc },

    #[error("{loc}: unterminated string literal")]
    UnterminatedString { loc: SourceLoc },
}

impl LexError {
    pub fn loc(&self) -> SourceLoc {
        match self {
            LexError::UnrecognizedChar { loc, .. } => *loc,
            LexError::UnterminatedString { loc, .. } => *loc,
        }
    }
}
