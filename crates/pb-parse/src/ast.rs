//! AST node shapes. Statements are a flat `Vec<Stmt>`; the only nesting
//! is `If`'s single guarded statement and `Expr`'s RPN token list.

/// One token of an expression already reduced to Reverse Polish
/// Notation by the Shunting-Yard parser. The VM never sees an
/// expression tree — only this flat sequence.
#[derive(Clone, PartialEq, Debug)]
pub enum ExprTok {
    Number(String),
    Var(String),
    Arith(char),
}

/// An expression is just its RPN token sequence.
pub type Expr = Vec<ExprTok>;

/// Either side of a `Let`/`Print`/`Compute` argument: a string literal
/// or an arithmetic expression.
#[derive(Clone, PartialEq, Debug)]
pub enum StrOrExpr {
    Str(String),
    Expr(Expr),
}

#[derive(Clone, PartialEq, Debug)]
pub enum CompOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Stmt {
    Label(String),
    Clear,
    End,
    Noop,
    Let { id: String, rhs: StrOrExpr },
    Print { items: Vec<StrOrExpr> },
    Input { vars: Vec<String> },
    If {
        lhs: Expr,
        op: CompOp,
        rhs: Expr,
        then: Box<Stmt>,
    },
    Goto(String),
    Call(String),
    Compute {
        target: String,
        label: String,
        args: Vec<Expr>,
    },
    Accept { vars: Vec<String> },
    Return(Option<Expr>),
}
