use pb_util::CodeAddr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("{loc}: unknown opcode {opcode}")]
    UnknownOpcode { opcode: u8, loc: CodeAddr },

    #[error("{loc}: stack underflow")]
    StackUnderflow { loc: CodeAddr },

    #[error("{loc}: operand stack exceeded its configured limit")]
    StackOverflow { loc: CodeAddr },

    #[error("{loc}: undefined variable {name:?}")]
    UndefinedVariable { name: String, loc: CodeAddr },

    #[error("{loc}: name register read before it was set")]
    NameRegisterUnset { loc: CodeAddr },

    #[error("{loc}: expected both operands to be numeric")]
    TypeMismatch { loc: CodeAddr },

    #[error("{loc}: division by zero")]
    DivisionByZero { loc: CodeAddr },

    #[error("{loc}: string table index {idx} out of bounds")]
    StringIndexOutOfBounds { idx: u8, loc: CodeAddr },

    #[error("{loc}: return from an empty call stack")]
    EmptyReturnStack { loc: CodeAddr },

    #[error("{loc}: scope popped with no matching PUSHSCOPE")]
    UnmatchedPopScope { loc: CodeAddr },

    #[error("{loc}: jump/call target {value} is not a valid code address")]
    InvalidAddress { value: f64, loc: CodeAddr },

    #[error("failed to read a line from input: {0}")]
    Io(String),
}

impl VmError {
    pub fn loc(&self) -> Option<CodeAddr> {
        match self {
            VmError::UnknownOpcode { loc, .. }
            | VmError::StackUnderflow { loc }
            | VmError::StackOverflow { loc }
            | VmError::UndefinedVariable { loc, .. }
            | VmError::NameRegisterUnset { loc }
            | VmError::TypeMismatch { loc }
            | VmError::DivisionByZero { loc }
            | VmError::StringIndexOutOfBounds { loc, .. }
            | VmError::EmptyReturnStack { loc }
            | VmError::UnmatchedPopScope { loc }
            | VmError::InvalidAddress { loc, .. } => Some(*loc),
            VmError::Io(_) => None,
        }
    }
}
