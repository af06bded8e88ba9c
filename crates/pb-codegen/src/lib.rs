//! pb-codegen - AST to bytecode translator
//!
//! A single top-down walk lowers a parsed program straight to the byte
//! stream the VM executes, tracking a label fix-up list and a
//! deduplicated string pool along the way. See [`disasm`] for the
//! companion disassembler the driver uses to render error context.

pub mod codegen;
pub mod disasm;
pub mod error;
pub mod opcode;

#[cfg(test)]
mod edge_cases;

pub use codegen::{lower_program, CodegenOutput};
pub use disasm::{disassemble, disassemble_window, DisasmLine};
pub use error::CodegenError;
