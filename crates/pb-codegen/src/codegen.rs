//! Single top-down walk from AST to `(code, string_table)`.
//!
//! Label references are never resolved inline: every `Goto`, `Call`,
//! or `Compute` target emits a placeholder `LITERAL2` and a `(label,
//! slot_addr)` fix-up, patched once the whole AST has been walked. An
//! `If`'s own branch-around target is the one exception — its address
//! is always known by the time its guarded statement finishes lowering
//! in the same call, so it's patched immediately instead of queued.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use pb_parse::{CompOp, Expr, ExprTok, Stmt};

use crate::error::CodegenError;
use crate::opcode;

pub struct CodegenOutput {
    pub code: Vec<u8>,
    pub strings: Vec<String>,
}

pub fn lower_program(ast: &[Stmt]) -> Result<CodegenOutput, CodegenError> {
    let mut cg = Codegen::new();
    for stmt in ast {
        cg.lower_top_level(stmt)?;
    }
    cg.apply_fixups()?;
    cg.check_arity()?;
    Ok(CodegenOutput {
        code: cg.code,
        strings: cg.strings.into_iter().collect(),
    })
}

struct Codegen {
    code: Vec<u8>,
    strings: IndexSet<String>,
    label_table: FxHashMap<String, usize>,
    fixups: Vec<(String, usize)>,
    current_label: Option<String>,
    compute_records: Vec<(String, usize)>,
    accept_records: FxHashMap<String, usize>,
}

impl Codegen {
    fn new() -> Self {
        Self {
            code: opcode::MAGIC.to_vec(),
            strings: IndexSet::new(),
            label_table: FxHashMap::default(),
            fixups: Vec::new(),
            current_label: None,
            compute_records: Vec::new(),
            accept_records: FxHashMap::default(),
        }
    }

    fn lower_top_level(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        if let Stmt::Label(id) = stmt {
            self.bind_label(id)?;
            self.current_label = Some(id.clone());
            return Ok(());
        }
        self.lower_stmt(stmt)
    }

    fn bind_label(&mut self, id: &str) -> Result<(), CodegenError> {
        if self.label_table.contains_key(id) {
            return Err(CodegenError::DuplicateLabel(id.to_string()));
        }
        self.label_table.insert(id.to_string(), self.code.len());
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Label(id) => self.bind_label(id),
            Stmt::Clear => {
                self.code.push(opcode::CLEAR);
                Ok(())
            }
            Stmt::End => {
                self.code.push(opcode::HALT);
                Ok(())
            }
            Stmt::Noop => {
                self.code.push(opcode::NOOP);
                Ok(())
            }
            Stmt::Goto(label) => {
                self.emit_label_ref(label);
                self.code.push(opcode::JUMP);
                Ok(())
            }
            Stmt::Let { id, rhs } => {
                match rhs {
                    pb_parse::StrOrExpr::Expr(e) => {
                        self.lower_expr(e)?;
                        self.emit_name(id);
                        self.code.push(opcode::STORENUM);
                    }
                    pb_parse::StrOrExpr::Str(s) => {
                        self.emit_str_literal(s)?;
                        self.emit_name(id);
                        self.code.push(opcode::STORESTR);
                    }
                }
                Ok(())
            }
            Stmt::Print { items } => {
                for item in items {
                    match item {
                        pb_parse::StrOrExpr::Str(s) => {
                            self.emit_str_literal(s)?;
                            self.code.push(opcode::PRINTSTRLIT);
                        }
                        pb_parse::StrOrExpr::Expr(e) => {
                            self.lower_expr(e)?;
                            self.code.push(opcode::PRINT);
                        }
                    }
                }
                Ok(())
            }
            Stmt::Input { vars } => {
                for v in vars {
                    self.emit_name(v);
                    self.code.push(opcode::INPUT);
                }
                Ok(())
            }
            Stmt::If { lhs, op, rhs, then } => self.lower_if(lhs, op, rhs, then),
            Stmt::Call(label) => {
                self.code.push(opcode::PUSHSCOPE);
                self.emit_label_ref(label);
                self.code.push(opcode::GOSUB);
                Ok(())
            }
            Stmt::Compute {
                target,
                label,
                args,
            } => {
                for arg in args.iter().rev() {
                    self.lower_expr(arg)?;
                }
                self.compute_records.push((label.clone(), args.len()));
                self.code.push(opcode::PUSHSCOPE);
                self.emit_label_ref(label);
                self.code.push(opcode::GOSUB);
                self.emit_name(target);
                self.code.push(opcode::STORENUM);
                Ok(())
            }
            Stmt::Accept { vars } => {
                if let Some(label) = self.current_label.clone() {
                    self.accept_records.insert(label, vars.len());
                }
                for v in vars {
                    self.emit_name(v);
                    self.code.push(opcode::STORENUM);
                }
                Ok(())
            }
            Stmt::Return(expr) => {
                if let Some(e) = expr {
                    self.lower_expr(e)?;
                }
                self.code.push(opcode::POPSCOPE);
                self.code.push(opcode::RETURN);
                Ok(())
            }
        }
    }

    fn lower_if(
        &mut self,
        lhs: &Expr,
        op: &CompOp,
        rhs: &Expr,
        then: &Stmt,
    ) -> Result<(), CodegenError> {
        self.lower_expr(rhs)?;
        self.lower_expr(lhs)?;
        self.code.push(match op {
            CompOp::Eq => opcode::EQUAL,
            CompOp::Neq => opcode::NEQUAL,
            CompOp::Lt => opcode::LT,
            CompOp::Lte => opcode::LTE,
            CompOp::Gt => opcode::GT,
            CompOp::Gte => opcode::GTE,
        });
        let slot_addr = self.code.len() + 1;
        self.emit_literal2_placeholder();
        self.code.push(opcode::JUMPIF0);
        self.lower_stmt(then)?;
        let end_addr = self.code.len();
        self.patch_literal2(slot_addr, end_addr as i16);
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        for tok in expr {
            match tok {
                ExprTok::Number(lex) => {
                    if lex.contains('.') {
                        let value: f32 = lex.parse().unwrap_or(0.0);
                        self.code.push(opcode::FLOAT4);
                        self.code.extend_from_slice(&value.to_be_bytes());
                    } else {
                        let value: i16 = lex
                            .parse()
                            .map_err(|_| CodegenError::IntegerLiteralOutOfRange(lex.clone()))?;
                        self.code.push(opcode::LITERAL2);
                        self.code.extend_from_slice(&value.to_be_bytes());
                    }
                }
                ExprTok::Var(id) => {
                    self.emit_name(id);
                    self.code.push(opcode::RETRV);
                }
                ExprTok::Arith(op) => {
                    self.code.push(match op {
                        '+' => opcode::ADD,
                        '-' => opcode::SUBTRACT,
                        '*' => opcode::MULTIPLY,
                        '/' => opcode::DIVIDE,
                        _ => unreachable!("parser only ever produces + - * /"),
                    });
                }
            }
        }
        Ok(())
    }

    fn emit_name(&mut self, name: &str) {
        self.code.push(opcode::NAME);
        self.code.push(name.len() as u8);
        self.code.extend_from_slice(name.as_bytes());
    }

    fn emit_str_literal(&mut self, s: &str) -> Result<(), CodegenError> {
        let idx = match self.strings.get_index_of(s) {
            Some(idx) => idx,
            None => {
                if self.strings.len() >= 256 {
                    return Err(CodegenError::StringPoolFull);
                }
                self.strings.insert(s.to_string());
                self.strings.len() - 1
            }
        };
        self.code.push(opcode::LITERAL1);
        self.code.push(idx as u8);
        Ok(())
    }

    fn emit_literal2_placeholder(&mut self) {
        self.code.push(opcode::LITERAL2);
        self.code.extend_from_slice(&0i16.to_be_bytes());
    }

    fn emit_label_ref(&mut self, label: &str) {
        // +1 to skip past the LITERAL2 opcode byte itself.
        self.fixups.push((label.to_string(), self.code.len() + 1));
        self.emit_literal2_placeholder();
    }

    fn patch_literal2(&mut self, slot_addr: usize, value: i16) {
        let bytes = value.to_be_bytes();
        self.code[slot_addr] = bytes[0];
        self.code[slot_addr + 1] = bytes[1];
    }

    fn apply_fixups(&mut self) -> Result<(), CodegenError> {
        for (label, slot_addr) in std::mem::take(&mut self.fixups) {
            let addr = *self
                .label_table
                .get(&label)
                .ok_or_else(|| CodegenError::UndefinedLabel(label.clone()))?;
            self.patch_literal2(slot_addr, addr as i16);
        }
        Ok(())
    }

    fn check_arity(&self) -> Result<(), CodegenError> {
        for (label, compute_args) in &self.compute_records {
            let accept_args = self.accept_records.get(label).copied().unwrap_or(0);
            if *compute_args != accept_args {
                return Err(CodegenError::ArityMismatch {
                    label: label.clone(),
                    compute_args: *compute_args,
                    accept_args,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_parse::Parser;

    fn lower(src: &str) -> Result<CodegenOutput, CodegenError> {
        let ast = Parser::parse_program(src).unwrap();
        lower_program(&ast)
    }

    #[test]
    fn header_is_always_pb01() {
        let out = lower("").unwrap();
        assert_eq!(&out.code[0..4], b"PB01");
    }

    #[test]
    fn empty_program_has_no_code_past_the_header() {
        let out = lower("").unwrap();
        assert_eq!(out.code.len(), 4);
    }

    #[test]
    fn let_print_end_emits_expected_opcodes() {
        let out = lower("LET A BE 1\nPRINT A\nEND\n").unwrap();
        // LITERAL2 1 / NAME "A" / STORENUM / NAME "A" / RETRV / PRINT / HALT
        assert_eq!(out.code[4], opcode::LITERAL2);
        assert_eq!(&out.code[5..7], &1i16.to_be_bytes());
        assert_eq!(out.code[7], opcode::NAME);
        assert_eq!(out.code[8], 1); // name length
        assert_eq!(out.code[9], b'A');
        assert_eq!(out.code[10], opcode::STORENUM);
        assert_eq!(*out.code.last().unwrap(), opcode::HALT);
    }

    #[test]
    fn string_pool_deduplicates_identical_literals() {
        let out = lower("PRINT \"hi\"\nPRINT \"hi\"\nEND\n").unwrap();
        // each PRINT also lowers a trailing newline literal, itself deduped.
        assert_eq!(out.strings, vec!["hi".to_string(), "\n".to_string()]);
    }

    #[test]
    fn duplicate_label_is_a_codegen_error() {
        let err = lower("top:\nEND\ntop:\nEND\n").unwrap_err();
        assert_eq!(err, CodegenError::DuplicateLabel("top".to_string()));
    }

    #[test]
    fn goto_self_is_a_tight_loop_with_no_crash() {
        let out = lower("top:\nGOTO top\n").unwrap();
        // label address is the header length; the fixup must resolve
        // the JUMP's operand to exactly that.
        let label_addr = 4i16;
        assert_eq!(out.code[5..7], label_addr.to_be_bytes());
    }

    #[test]
    fn compute_lowers_args_in_reverse_source_order() {
        let ast = Parser::parse_program("COMPUTE C AS Plus2 4\nEND\nPlus2:\nACCEPT Var\nRETURN Var + 2\n").unwrap();
        let out = lower_program(&ast).unwrap();
        // first bytes after header: LITERAL2 4 (only arg, so order is moot
        // with one arg -- verified properly with two args below).
        assert_eq!(out.code[4], opcode::LITERAL2);
        assert_eq!(&out.code[5..7], &4i16.to_be_bytes());
    }

    #[test]
    fn compute_with_two_args_reverses_push_order() {
        let ast = Parser::parse_program(
            "COMPUTE C AS Sub 1, 2\nEND\nSub:\nACCEPT A, B\nRETURN A\n",
        )
        .unwrap();
        let out = lower_program(&ast).unwrap();
        // args pushed in reverse: 2 first, then 1, so Accept pops A=1, B=2.
        assert_eq!(out.code[4], opcode::LITERAL2);
        assert_eq!(&out.code[5..7], &2i16.to_be_bytes());
        assert_eq!(out.code[7], opcode::LITERAL2);
        assert_eq!(&out.code[8..10], &1i16.to_be_bytes());
    }

    #[test]
    fn arity_mismatch_between_compute_and_accept_is_an_error() {
        let err = lower("COMPUTE C AS Plus2 4, 5\nEND\nPlus2:\nACCEPT Var\nRETURN Var\n")
            .unwrap_err();
        assert_eq!(
            err,
            CodegenError::ArityMismatch {
                label: "Plus2".to_string(),
                compute_args: 2,
                accept_args: 1,
            }
        );
    }

    #[test]
    fn gte_spellings_lower_to_the_same_opcode() {
        let arrow = lower("IF B => 0 THEN END\n").unwrap();
        let std = lower("IF B >= 0 THEN END\n").unwrap();
        assert!(arrow.code.contains(&opcode::GTE));
        assert!(std.code.contains(&opcode::GTE));
    }

    #[test]
    fn nequal_gt_gte_have_distinct_codes_from_equal_lt_lte() {
        assert_ne!(opcode::NEQUAL, opcode::EQUAL);
        assert_ne!(opcode::GT, opcode::LT);
        assert_ne!(opcode::GTE, opcode::LTE);
    }

    #[test]
    fn float_literal_lowers_to_float4() {
        let out = lower("LET a BE 3.25\nEND\n").unwrap();
        assert!(out.code.contains(&opcode::FLOAT4));
    }

    #[test]
    fn undefined_goto_target_is_an_error() {
        let err = lower("GOTO nowhere\nEND\n").unwrap_err();
        assert_eq!(err, CodegenError::UndefinedLabel("nowhere".to_string()));
    }
}
