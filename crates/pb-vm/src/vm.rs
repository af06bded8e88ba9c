//! Direct-threaded bytecode interpreter.
//!
//! `Step` fetches one opcode, dispatches, and advances `IP`. Control-
//! transfer opcodes (`JUMP`, `JUMPIF0`, `GOSUB`, `RETURN`) set `IP`
//! directly and skip the generic "advance past my operands" epilogue;
//! everything else falls through to it.

use rustc_hash::FxHashMap;

use pb_codegen::opcode;
use pb_util::CodeAddr;

use crate::error::VmError;
use crate::io::VmIo;
use crate::var::{Number, Var};

#[derive(Clone, Copy, Debug)]
pub struct VmLimits {
    pub max_stack: usize,
    pub max_call_depth: usize,
}

impl Default for VmLimits {
    fn default() -> Self {
        Self {
            max_stack: 4096,
            max_call_depth: 256,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Halted,
    Errored,
}

pub struct Vm<IO: VmIo> {
    code: Vec<u8>,
    strings: Vec<String>,
    ip: usize,
    stack: Vec<Var>,
    name_reg: Option<String>,
    vars: FxHashMap<String, Var>,
    scope_stack: Vec<FxHashMap<String, Var>>,
    call_stack: Vec<usize>,
    halted: bool,
    state: RunState,
    limits: VmLimits,
    io: IO,
}

impl<IO: VmIo> Vm<IO> {
    pub fn new(io: IO) -> Self {
        Self::with_limits(io, VmLimits::default())
    }

    pub fn with_limits(io: IO, limits: VmLimits) -> Self {
        Self {
            code: Vec::new(),
            strings: Vec::new(),
            ip: 4,
            stack: Vec::new(),
            name_reg: None,
            vars: FxHashMap::default(),
            scope_stack: Vec::new(),
            call_stack: Vec::new(),
            halted: false,
            state: RunState::Ready,
            limits,
            io,
        }
    }

    pub fn load(&mut self, code: Vec<u8>, strings: Vec<String>) {
        self.code = code;
        self.strings = strings;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.ip = 4;
        self.stack.clear();
        self.name_reg = None;
        self.vars.clear();
        self.scope_stack.clear();
        self.call_stack.clear();
        self.halted = false;
        self.state = RunState::Ready;
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn vars(&self) -> &FxHashMap<String, Var> {
        &self.vars
    }

    /// The operand stack, most-recently-pushed last. Exposed for the
    /// driver's `--debug` step tracer; not used by the interpreter loop
    /// itself outside of `pop`/`push`.
    pub fn stack(&self) -> &[Var] {
        &self.stack
    }

    pub fn name_register(&self) -> Option<&str> {
        self.name_reg.as_deref()
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn run(&mut self) -> Result<(), VmError> {
        self.state = RunState::Running;
        while !self.halted {
            if let Err(e) = self.step() {
                self.state = RunState::Errored;
                return Err(e);
            }
        }
        self.state = RunState::Halted;
        Ok(())
    }

    fn loc(&self) -> CodeAddr {
        CodeAddr(self.ip)
    }

    fn fetch(&self, offset: usize) -> u8 {
        self.code.get(self.ip + offset).copied().unwrap_or(0)
    }

    fn pop(&mut self) -> Result<Var, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow { loc: self.loc() })
    }

    fn push(&mut self, v: Var) -> Result<(), VmError> {
        if self.stack.len() >= self.limits.max_stack {
            return Err(VmError::StackOverflow { loc: self.loc() });
        }
        self.stack.push(v);
        Ok(())
    }

    fn pop_number(&mut self) -> Result<Number, VmError> {
        let loc = self.loc();
        self.pop()?.as_number().ok_or(VmError::TypeMismatch { loc })
    }

    fn name_reg(&self) -> Result<&str, VmError> {
        self.name_reg
            .as_deref()
            .ok_or(VmError::NameRegisterUnset { loc: self.loc() })
    }

    /// Executes one instruction, advancing `IP`.
    pub fn step(&mut self) -> Result<(), VmError> {
        let op = if self.ip >= self.code.len() {
            opcode::EOM_HALT
        } else {
            self.fetch(0)
        };

        match op {
            opcode::NOOP => self.advance(0),

            opcode::CLEAR => {
                self.io.clear_screen();
                self.advance(0);
            }

            opcode::PRINT | opcode::PRINTNUMLIT => {
                let val = self.pop()?;
                self.io.print(&format!("{val} "));
                self.advance(0);
            }

            opcode::PRINTSTRLIT => {
                let idx = self.pop_number()?;
                let idx = number_as_index(idx, self.loc())?;
                let s = self
                    .strings
                    .get(idx as usize)
                    .ok_or(VmError::StringIndexOutOfBounds { idx, loc: self.loc() })?
                    .clone();
                self.io.print(&format!("{s} "));
                self.advance(0);
            }

            opcode::JUMP => {
                let addr = self.pop_number()?;
                self.ip = number_as_addr(addr, self.loc())?;
                return Ok(());
            }

            opcode::JUMPIF0 => {
                let addr = self.pop_number()?;
                let test = self.pop_number()?;
                if test.as_f64() == 0.0 {
                    self.ip = number_as_addr(addr, self.loc())?;
                    return Ok(());
                }
                self.advance(0);
            }

            opcode::LITERAL1 => {
                let b = self.fetch(1);
                self.push(Var::Numeric(Number::Int(b as i32)))?;
                self.advance(1);
            }

            opcode::LITERAL2 => {
                let val = i16::from_be_bytes([self.fetch(1), self.fetch(2)]);
                self.push(Var::Numeric(Number::Int(val as i32)))?;
                self.advance(2);
            }

            opcode::FLOAT4 => {
                let bytes = [self.fetch(1), self.fetch(2), self.fetch(3), self.fetch(4)];
                self.push(Var::Numeric(Number::Float(f32::from_be_bytes(bytes))))?;
                self.advance(4);
            }

            opcode::NAME => {
                let len = self.fetch(1) as usize;
                let bytes: Vec<u8> = (0..len).map(|i| self.fetch(2 + i)).collect();
                self.name_reg = Some(String::from_utf8_lossy(&bytes).into_owned());
                self.advance(1 + len);
            }

            opcode::STORENUM => {
                let val = self.pop()?;
                let name = self.name_reg()?.to_string();
                self.vars.insert(name, val);
                self.advance(0);
            }

            opcode::DELETENUM => {
                let name = self.name_reg()?.to_string();
                self.vars.remove(&name);
                self.advance(0);
            }

            opcode::STORESTR => {
                let idx = self.pop_number()?;
                let idx = number_as_index(idx, self.loc())?;
                let s = self
                    .strings
                    .get(idx as usize)
                    .ok_or(VmError::StringIndexOutOfBounds { idx, loc: self.loc() })?
                    .clone();
                let name = self.name_reg()?.to_string();
                self.vars.insert(name, Var::Str(s));
                self.advance(0);
            }

            opcode::RETRV => {
                let name = self.name_reg()?.to_string();
                let val = self
                    .vars
                    .get(&name)
                    .cloned()
                    .ok_or(VmError::UndefinedVariable { name, loc: self.loc() })?;
                self.push(val)?;
                self.advance(0);
            }

            opcode::INPUT => {
                let line = self.io.read_line().map_err(|e| VmError::Io(e.to_string()))?;
                let name = self.name_reg()?.to_string();
                self.vars.insert(name, Var::Str(line));
                self.advance(0);
            }

            opcode::ADD | opcode::SUBTRACT | opcode::MULTIPLY | opcode::DIVIDE => {
                let b = self.pop_number()?;
                let a = self.pop_number()?;
                let result = arith(op, a, b, self.loc())?;
                self.push(Var::Numeric(result))?;
                self.advance(0);
            }

            opcode::EQUAL | opcode::NEQUAL => {
                let a = self.pop()?;
                let b = self.pop()?;
                let eq = a.vm_eq(&b);
                let hit = if op == opcode::EQUAL { eq } else { !eq };
                self.push(bool_var(hit))?;
                self.advance(0);
            }

            opcode::LT | opcode::LTE | opcode::GT | opcode::GTE => {
                let a = self.pop_number()?;
                let b = self.pop_number()?;
                let hit = match op {
                    opcode::LT => a.as_f64() < b.as_f64(),
                    opcode::LTE => a.as_f64() <= b.as_f64(),
                    opcode::GT => a.as_f64() > b.as_f64(),
                    opcode::GTE => a.as_f64() >= b.as_f64(),
                    _ => unreachable!(),
                };
                self.push(bool_var(hit))?;
                self.advance(0);
            }

            opcode::PUSHSCOPE => {
                let saved = std::mem::take(&mut self.vars);
                self.scope_stack.push(saved);
                self.advance(0);
            }

            opcode::GOSUB => {
                let addr = self.pop_number()?;
                if self.call_stack.len() >= self.limits.max_call_depth {
                    return Err(VmError::StackOverflow { loc: self.loc() });
                }
                self.call_stack.push(self.ip + 1);
                self.ip = number_as_addr(addr, self.loc())?;
                return Ok(());
            }

            opcode::RETURN => {
                let ret = self
                    .call_stack
                    .pop()
                    .ok_or(VmError::EmptyReturnStack { loc: self.loc() })?;
                self.ip = ret;
                return Ok(());
            }

            opcode::POPSCOPE => {
                let saved = self
                    .scope_stack
                    .pop()
                    .ok_or(VmError::UnmatchedPopScope { loc: self.loc() })?;
                self.vars = saved;
                self.advance(0);
            }

            opcode::HALT | opcode::EOM_HALT => {
                self.halted = true;
                self.advance(0);
            }

            other => return Err(VmError::UnknownOpcode { opcode: other, loc: self.loc() }),
        }

        Ok(())
    }

    fn advance(&mut self, operand_bytes: usize) {
        self.ip += 1 + operand_bytes;
    }
}

fn bool_var(hit: bool) -> Var {
    Var::Numeric(Number::Int(if hit { 1 } else { 0 }))
}

fn number_as_index(n: Number, loc: CodeAddr) -> Result<u8, VmError> {
    let v = n.as_f64();
    if v < 0.0 || v > u8::MAX as f64 {
        return Err(VmError::StringIndexOutOfBounds { idx: 0, loc });
    }
    Ok(v as u8)
}

/// Converts a popped `Number` into a code address. Jump/call targets
/// are emitted as signed 16-bit big-endian values (see pb-codegen's
/// fix-up slots), so small negative noise never occurs in practice,
/// but a corrupt or hand-written code stream could still produce one.
fn number_as_addr(n: Number, loc: CodeAddr) -> Result<usize, VmError> {
    let v = n.as_f64();
    if v < 0.0 || v.fract() != 0.0 {
        return Err(VmError::InvalidAddress { value: v, loc });
    }
    Ok(v as usize)
}

fn arith(op: u8, a: Number, b: Number, loc: CodeAddr) -> Result<Number, VmError> {
    use Number::{Float, Int};
    Ok(match (op, a, b) {
        (opcode::ADD, Int(x), Int(y)) => Int(x.wrapping_add(y)),
        (opcode::SUBTRACT, Int(x), Int(y)) => Int(x.wrapping_sub(y)),
        (opcode::MULTIPLY, Int(x), Int(y)) => Int(x.wrapping_mul(y)),
        (opcode::DIVIDE, Int(x), Int(y)) => {
            if y == 0 {
                return Err(VmError::DivisionByZero { loc });
            }
            Int(x.wrapping_div(y))
        }
        (opcode::ADD, _, _) => Float(a.as_f64() as f32 + b.as_f64() as f32),
        (opcode::SUBTRACT, _, _) => Float(a.as_f64() as f32 - b.as_f64() as f32),
        (opcode::MULTIPLY, _, _) => Float(a.as_f64() as f32 * b.as_f64() as f32),
        (opcode::DIVIDE, _, _) => {
            if b.as_f64() == 0.0 {
                return Err(VmError::DivisionByZero { loc });
            }
            Float(a.as_f64() as f32 / b.as_f64() as f32)
        }
        _ => unreachable!("arith() only ever called with ADD/SUBTRACT/MULTIPLY/DIVIDE"),
    })
}
