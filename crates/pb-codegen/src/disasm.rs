//! A small disassembler, used by the driver to render a window of
//! instructions around a VM error.

use crate::opcode;

#[derive(Clone, Debug)]
pub struct DisasmLine {
    pub addr: usize,
    pub text: String,
}

/// Disassembles `code` starting just past the 4-byte magic header.
pub fn disassemble(code: &[u8]) -> Vec<DisasmLine> {
    let mut lines = Vec::new();
    let mut i = 4usize.min(code.len());
    while i < code.len() {
        let op = code[i];
        let (text, consumed) = match op {
            opcode::LITERAL1 => {
                let b = code.get(i + 1).copied().unwrap_or(0);
                (format!("LITERAL1 {b} / {b:#04x}"), 1)
            }
            opcode::LITERAL2 => {
                let hi = code.get(i + 1).copied().unwrap_or(0);
                let lo = code.get(i + 2).copied().unwrap_or(0);
                let val = i16::from_be_bytes([hi, lo]);
                (format!("LITERAL2 {val} / {val:#06x}"), 2)
            }
            opcode::FLOAT4 => {
                let mut bytes = [0u8; 4];
                for (k, b) in bytes.iter_mut().enumerate() {
                    *b = code.get(i + 1 + k).copied().unwrap_or(0);
                }
                let val = f32::from_be_bytes(bytes);
                (format!("FLOAT4 {val}"), 4)
            }
            opcode::NAME => {
                let len = code.get(i + 1).copied().unwrap_or(0) as usize;
                let bytes: Vec<u8> = code
                    .get(i + 2..i + 2 + len)
                    .map(|s| s.to_vec())
                    .unwrap_or_default();
                let name = String::from_utf8_lossy(&bytes);
                (format!("NAME '{name}'"), 1 + len)
            }
            other => (
                opcode::name(other).to_string(),
                opcode::fixed_operand_len(other).unwrap_or(0),
            ),
        };
        lines.push(DisasmLine {
            addr: i,
            text,
        });
        i += 1 + consumed;
    }
    lines
}

/// Renders a window of `radius` instructions on either side of `around`,
/// addresses included, one per line.
pub fn disassemble_window(code: &[u8], around: usize, radius: usize) -> String {
    let lines = disassemble(code);
    let center = lines
        .iter()
        .position(|l| l.addr >= around)
        .unwrap_or(lines.len().saturating_sub(1));
    let start = center.saturating_sub(radius);
    let end = (center + radius + 1).min(lines.len());
    lines[start..end]
        .iter()
        .map(|l| format!("{:#06x}  {}", l.addr, l.text))
        .collect::<Vec<_>>()
        .join("\n")
}
