//! One-token-lookahead recursive-descent parser, plus the Shunting-Yard
//! expression sub-parser.
//!
//! The whole token stream is collected up front rather than pulled
//! lazily from the lexer: `ParseError` already has to wrap `LexError`
//! for the one bad-byte case, and a `Vec<Token>` plus a cursor index is
//! simpler to backtrack-free-recurse over than a `Peekable<Lexer>`
//! whose `Result` items complicate every `peek()`. `COMMENT` tokens are
//! dropped at this boundary: the lexer still produces them (so no byte
//! of source is silently unaccounted for), but nothing in the grammar
//! below ever needs to see one.

use pb_lex::{Lexer, Token, TokenKind};

use crate::ast::{CompOp, Expr, ExprTok, Stmt, StrOrExpr};
use crate::error::ParseError;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn arith_precedence(op: char) -> u8 {
    match op {
        '*' | '/' => 3,
        '+' | '-' => 2,
        _ => unreachable!("not an arithmetic operator"),
    }
}

/// Binds tighter than `*`/`/` and right-associates, so `- - 5` and
/// `-2 * 3` each stack/flush in the order a reader would expect.
const UNARY_PRECEDENCE: u8 = 4;

/// An operator-stack entry for the Shunting-Yard loop below. `Op.unary`
/// distinguishes a synthesized unary minus from an ordinary binary
/// operator of the same `ch` so the precedence/associativity check can
/// treat them differently without widening `ExprTok` or `Token`.
enum OpEntry {
    LParen,
    Op { ch: char, unary: bool },
}

impl OpEntry {
    fn precedence(&self) -> u8 {
        match self {
            OpEntry::LParen => 0,
            OpEntry::Op { ch, unary: true } => {
                debug_assert_eq!(*ch, '-');
                UNARY_PRECEDENCE
            }
            OpEntry::Op { ch, unary: false } => arith_precedence(*ch),
        }
    }
}

/// Pops operators off `op_stack` into `output` while the entry on top
/// binds at least as tightly as the operator about to be pushed (per
/// standard Shunting-Yard precedence-climbing), stopping at `(` or an
/// empty stack.
fn pop_while_tighter(output: &mut Expr, op_stack: &mut Vec<OpEntry>, new_prec: u8, new_left_assoc: bool) {
    while let Some(top) = op_stack.last() {
        let prec = top.precedence();
        let should_pop = prec > new_prec || (prec == new_prec && new_left_assoc);
        if !should_pop {
            break;
        }
        match op_stack.pop().unwrap() {
            OpEntry::Op { ch, .. } => output.push(ExprTok::Arith(ch)),
            OpEntry::LParen => unreachable!("precedence() gives LParen the lowest value, never >= new_prec"),
        }
    }
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut tokens = Vec::new();
        for tok in Lexer::new(source) {
            let tok = tok?;
            if tok.kind != TokenKind::Comment {
                tokens.push(tok);
            }
        }
        Ok(Self { tokens, pos: 0 })
    }

    fn current(&self) -> Result<&Token, ParseError> {
        self.tokens.get(self.pos).ok_or(ParseError::UnexpectedEof)
    }

    fn kind(&self) -> Result<TokenKind, ParseError> {
        Ok(self.current()?.kind)
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let tok = self.current()?.clone();
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        let tok = self.current()?.clone();
        if tok.kind == expected {
            self.pos += 1;
            Ok(tok)
        } else {
            Err(ParseError::expected(expected, &tok))
        }
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Parses the whole program: a flat sequence of labels and statements.
    pub fn parse_program(source: &str) -> Result<Vec<Stmt>, ParseError> {
        let mut parser = Parser::new(source)?;
        let mut ast = Vec::new();
        while !parser.at_eof() {
            if parser.kind()? == TokenKind::Newline {
                parser.advance()?;
                continue;
            }
            if parser.kind()? == TokenKind::Id {
                ast.push(parser.parse_label()?);
                continue;
            }
            ast.push(parser.parse_stmt()?);
        }
        Ok(ast)
    }

    fn parse_label(&mut self) -> Result<Stmt, ParseError> {
        let id = self.advance()?;
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::Newline)?;
        Ok(Stmt::Label(id.value))
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.kind()? {
            TokenKind::Let => self.parse_let(),
            TokenKind::Print => self.parse_print(),
            TokenKind::If => self.parse_if(),
            TokenKind::Goto => self.parse_goto(),
            TokenKind::Input => self.parse_input(),
            TokenKind::Clear => {
                self.advance()?;
                Ok(Stmt::Clear)
            }
            TokenKind::Call => self.parse_call(),
            TokenKind::Compute => self.parse_compute(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Accept => self.parse_accept(),
            TokenKind::End => {
                self.advance()?;
                Ok(Stmt::End)
            }
            _ => Err(ParseError::unexpected(self.current()?)),
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // LET
        let id = self.expect(TokenKind::Id)?;
        self.expect(TokenKind::Assign)?;
        let rhs = self.parse_str_or_expr()?;
        Ok(Stmt::Let {
            id: id.value,
            rhs,
        })
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // PRINT
        let mut items = Vec::new();
        loop {
            match self.kind()? {
                TokenKind::Comma => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Newline => break,
                _ => {
                    items.push(self.parse_str_or_expr()?);
                }
            }
        }
        items.push(StrOrExpr::Str("\n".to_string()));
        Ok(Stmt::Print { items })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // IF
        let lhs = self.parse_expr()?;
        let op = self.parse_compop()?;
        let rhs = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let then = self.parse_stmt()?;
        Ok(Stmt::If {
            lhs,
            op,
            rhs,
            then: Box::new(then),
        })
    }

    fn parse_compop(&mut self) -> Result<CompOp, ParseError> {
        let tok = self.expect(TokenKind::CompOp)?;
        Ok(match tok.value.as_str() {
            "=" => CompOp::Eq,
            "!=" => CompOp::Neq,
            "<" => CompOp::Lt,
            "<=" => CompOp::Lte,
            ">" => CompOp::Gt,
            ">=" => CompOp::Gte,
            _ => unreachable!("lexer only ever produces these six spellings"),
        })
    }

    fn parse_goto(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // GOTO
        let id = self.expect(TokenKind::Id)?;
        Ok(Stmt::Goto(id.value))
    }

    fn parse_input(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // INPUT
        Ok(Stmt::Input {
            vars: self.parse_id_list()?,
        })
    }

    fn parse_accept(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // ACCEPT
        Ok(Stmt::Accept {
            vars: self.parse_id_list()?,
        })
    }

    /// `ID (, ID)*` terminated by `NEWLINE`, used by both `INPUT` and `ACCEPT`.
    fn parse_id_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut vars = Vec::new();
        loop {
            match self.kind()? {
                TokenKind::Id => vars.push(self.advance()?.value),
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::Newline => break,
                _ => return Err(ParseError::unexpected(self.current()?)),
            }
        }
        Ok(vars)
    }

    fn parse_call(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // CALL
        let label = self.expect(TokenKind::Id)?;
        Ok(Stmt::Call(label.value))
    }

    fn parse_compute(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // COMPUTE
        let target = self.expect(TokenKind::Id)?;
        self.expect(TokenKind::As)?;
        let label = self.expect(TokenKind::Id)?;
        let args = self.parse_arglist()?;
        Ok(Stmt::Compute {
            target: target.value,
            label: label.value,
            args,
        })
    }

    /// A comma-separated list of expressions up to `NEWLINE`.
    fn parse_arglist(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        while self.kind()? != TokenKind::Newline {
            if self.kind()? == TokenKind::Comma {
                self.advance()?;
                continue;
            }
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.advance()?; // RETURN
        if self.kind()? == TokenKind::Newline {
            Ok(Stmt::Return(None))
        } else {
            Ok(Stmt::Return(Some(self.parse_expr()?)))
        }
    }

    fn parse_str_or_expr(&mut self) -> Result<StrOrExpr, ParseError> {
        if self.kind()? == TokenKind::String {
            Ok(StrOrExpr::Str(self.advance()?.value))
        } else {
            Ok(StrOrExpr::Expr(self.parse_expr()?))
        }
    }

    /// Shunting-Yard over `NUMBER, ID, ARITHOP, LPAREN, RPAREN`; stops
    /// at the first token of any other kind without consuming it.
    ///
    /// Unary minus (spec.md §9: "parse unary minus in the expression
    /// layer and make `NUMBER` unsigned") is folded into the same loop
    /// via `expect_operand`, which tracks whether the next token sits in
    /// operand position -- the expression's start, right after another
    /// `ARITHOP`, or right after `(`. A `-` seen there pushes a `0` to
    /// the output ahead of its operand and is itself pushed as a
    /// higher-precedence, right-associative operator, so whenever it
    /// later gets popped the matching `-` lands right after its operand
    /// and the RPN evaluates `0 - operand`.
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut output = Vec::new();
        let mut op_stack: Vec<OpEntry> = Vec::new();
        let mut expect_operand = true;

        loop {
            let kind = if self.at_eof() {
                break;
            } else {
                self.kind()?
            };

            match kind {
                TokenKind::Number => {
                    output.push(ExprTok::Number(self.advance()?.value));
                    expect_operand = false;
                }
                TokenKind::Id => {
                    output.push(ExprTok::Var(self.advance()?.value));
                    expect_operand = false;
                }
                TokenKind::ArithOp if expect_operand && self.current()?.value == "-" => {
                    self.advance()?;
                    output.push(ExprTok::Number("0".to_string()));
                    pop_while_tighter(&mut output, &mut op_stack, UNARY_PRECEDENCE, false);
                    op_stack.push(OpEntry::Op { ch: '-', unary: true });
                    // Still in operand position: the unary operand comes next.
                }
                TokenKind::ArithOp => {
                    let o1 = self.advance()?;
                    let o1_op = o1.value.chars().next().unwrap();
                    pop_while_tighter(&mut output, &mut op_stack, arith_precedence(o1_op), true);
                    op_stack.push(OpEntry::Op { ch: o1_op, unary: false });
                    expect_operand = true;
                }
                TokenKind::LParen => {
                    self.advance()?;
                    op_stack.push(OpEntry::LParen);
                    expect_operand = true;
                }
                TokenKind::RParen => {
                    self.advance()?;
                    loop {
                        match op_stack.pop() {
                            Some(OpEntry::LParen) => break,
                            Some(OpEntry::Op { ch, .. }) => output.push(ExprTok::Arith(ch)),
                            None => return Err(ParseError::MismatchedParenExpectedOpen),
                        }
                    }
                    expect_operand = false;
                }
                _ => break,
            }
        }

        while let Some(top) = op_stack.pop() {
            match top {
                OpEntry::LParen => return Err(ParseError::MismatchedParenExpectedClose),
                OpEntry::Op { ch, .. } => output.push(ExprTok::Arith(ch)),
            }
        }

        Ok(output)
    }
}
