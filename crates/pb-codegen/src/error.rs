use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("label already exists: {0}")]
    DuplicateLabel(String),

    #[error("undefined label: {0}")]
    UndefinedLabel(String),

    #[error("numeric literal {0:?} out of range for a 16-bit integer")]
    IntegerLiteralOutOfRange(String),

    #[error("string pool exceeded 256 distinct entries")]
    StringPoolFull,

    #[error(
        "COMPUTE of {label} passed {compute_args} argument(s) but its ACCEPT expects {accept_args}"
    )]
    ArityMismatch {
        label: String,
        compute_args: usize,
        accept_args: usize,
    },
}
