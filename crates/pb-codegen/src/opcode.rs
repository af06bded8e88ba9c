//! Opcode constants and their fixed in-stream operand sizes.
//!
//! `NEQUAL`/`GT`/`GTE` get codes distinct from `EQUAL`/`LT`/`LTE` here —
//! the reference VM reused 50/51/52 for both triples, which made the
//! second three unreachable.

pub const NOOP: u8 = 0;
pub const CLEAR: u8 = 1;
pub const PRINT: u8 = 2;
pub const PRINTNUMLIT: u8 = 3;
pub const PRINTSTRLIT: u8 = 4;

pub const JUMP: u8 = 10;
pub const JUMPIF0: u8 = 11;

pub const LITERAL1: u8 = 20;
pub const LITERAL2: u8 = 21;
pub const FLOAT4: u8 = 25;

pub const NAME: u8 = 30;
pub const STORENUM: u8 = 31;
pub const DELETENUM: u8 = 32;
pub const STORESTR: u8 = 33;
pub const RETRV: u8 = 34;
pub const INPUT: u8 = 35;

pub const ADD: u8 = 40;
pub const SUBTRACT: u8 = 41;
pub const MULTIPLY: u8 = 42;
pub const DIVIDE: u8 = 43;

pub const EQUAL: u8 = 50;
pub const LT: u8 = 51;
pub const LTE: u8 = 52;
pub const NEQUAL: u8 = 60;
pub const GT: u8 = 61;
pub const GTE: u8 = 62;

pub const EOM_HALT: u8 = 254;
pub const HALT: u8 = 255;

/// The four-byte header every code artefact starts with.
pub const MAGIC: [u8; 4] = *b"PB01";

/// Number of operand bytes an opcode consumes from the code stream
/// itself (not counting stack operands). `NAME`'s length is data-
/// dependent, so callers that need to skip it must read the length
/// byte first; this table reports 0 for it as a sentinel.
pub fn fixed_operand_len(op: u8) -> Option<usize> {
    match op {
        NOOP | CLEAR | PRINT | PRINTNUMLIT | PRINTSTRLIT | JUMP | JUMPIF0 | DELETENUM | STORENUM
        | STORESTR | RETRV | INPUT | ADD | SUBTRACT | MULTIPLY | DIVIDE | EQUAL | LT | LTE
        | NEQUAL | GT | GTE | EOM_HALT | HALT | PUSHSCOPE | GOSUB | RETURN | POPSCOPE => Some(0),
        LITERAL1 => Some(1),
        LITERAL2 => Some(2),
        FLOAT4 => Some(4),
        NAME => None,
        _ => None,
    }
}

pub fn name(op: u8) -> &'static str {
    match op {
        NOOP => "NOOP",
        CLEAR => "CLEAR",
        PRINT => "PRINT",
        PRINTNUMLIT => "PRINTNUMLIT",
        PRINTSTRLIT => "PRINTSTRLIT",
        JUMP => "JUMP",
        JUMPIF0 => "JUMPIF0",
        LITERAL1 => "LITERAL1",
        LITERAL2 => "LITERAL2",
        FLOAT4 => "FLOAT4",
        NAME => "NAME",
        STORENUM => "STORENUM",
        DELETENUM => "DELETENUM",
        STORESTR => "STORESTR",
        RETRV => "RETRV",
        INPUT => "INPUT",
        ADD => "ADD",
        SUBTRACT => "SUBTRACT",
        MULTIPLY => "MULTIPLY",
        DIVIDE => "DIVIDE",
        EQUAL => "EQUAL",
        LT => "LT",
        LTE => "LTE",
        NEQUAL => "NEQUAL",
        GT => "GT",
        GTE => "GTE",
        EOM_HALT => "EOM_HALT",
        HALT => "HALT",
        PUSHSCOPE => "PUSHSCOPE",
        GOSUB => "GOSUB",
        RETURN => "RETURN",
        POPSCOPE => "POPSCOPE",
        _ => "UNKNOWN",
    }
}

// Subroutine-scope opcodes. Not part of the reference VM's table (it
// has no subroutine support at all); these codes live in the gap
// between the compare opcodes and EOM_HALT/HALT.
pub const PUSHSCOPE: u8 = 70;
pub const GOSUB: u8 = 71;
pub const RETURN: u8 = 72;
pub const POPSCOPE: u8 = 73;
