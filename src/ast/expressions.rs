use std::fmt::Display;

use super::{
    ast::{ModulePath, TokenId},
    statements::If,
    types::Type,
};

/// Operators that can appear in a postfix expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Neg,
    Not,
    Inv,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Lsh,
    Rsh,
    Lt,
    Gt,
    Leq,
    Geq,
    Eq,
    Neq,
    BAnd,
    Xor,
    BOr,
    And,
    Or,
}

impl Op {
    /// Number of operands popped from the value stack.
    pub fn arity(&self) -> usize {
        match self {
            Op::Neg | Op::Not | Op::Inv => 1,
            _ => 2,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Op::And | Op::Or)
    }

    pub fn result_type(&self) -> Type {
        match self {
            Op::Neg | Op::Inv | Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod => Type::Number,
            Op::BAnd | Op::BOr | Op::Xor | Op::Lsh | Op::Rsh => Type::Number,
            Op::Not | Op::And | Op::Or | Op::Eq | Op::Neq => Type::Bool,
            Op::Gt | Op::Lt | Op::Geq | Op::Leq => Type::Bool,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Op::Neg => "neg",
            Op::Not => "not",
            Op::Inv => "inv",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Mod => "mod",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Lsh => "lsh",
            Op::Rsh => "rsh",
            Op::Lt => "lt",
            Op::Gt => "gt",
            Op::Leq => "leq",
            Op::Geq => "geq",
            Op::Eq => "eq",
            Op::Neq => "neq",
            Op::BAnd => "band",
            Op::Xor => "xor",
            Op::BOr => "bor",
            Op::And => "and",
            Op::Or => "or",
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalRef {
    pub module: ModulePath,
    pub name: String,
}

impl GlobalRef {
    pub fn unique_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}

/// One overload a call may bind to. Looked up through the registry by
/// module path, name and arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    pub module: ModulePath,
    pub name: String,
    pub arity: usize,
    pub index: usize,
}

impl FunctionRef {
    pub fn unique_name(&self) -> String {
        format!("{}.{}.{}.{}", self.module, self.name, self.arity, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Local(LocalId),
    Global(GlobalRef),
}

/// A node of a postfix expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Int { token: TokenId, value: u64, ty: Type },
    Float { token: TokenId, value: f64, ty: Type },
    Bool { token: TokenId, value: bool },
    Var { token: TokenId, path: Vec<String>, binding: Option<Binding> },
    Op { token: TokenId, op: Op, ty: Type },
    Call { token: TokenId, path: Vec<String>, arity: usize, candidates: Vec<FunctionRef> },
    /// Conditional in expression position. Removed by the control-flow normalizer.
    If { token: TokenId, statement: Box<If> },
}

/// Postfix sequence: evaluating left to right with a value stack rebuilds the
/// expression tree exactly once.
pub type Expr = Vec<Tok>;

impl Tok {
    pub fn op(token: TokenId, op: Op) -> Tok {
        Tok::Op { token, op, ty: op.result_type() }
    }

    pub fn var(token: TokenId, path: Vec<String>) -> Tok {
        Tok::Var { token, path, binding: None }
    }

    pub fn token(&self) -> TokenId {
        match self {
            Tok::Int { token, .. }
            | Tok::Float { token, .. }
            | Tok::Bool { token, .. }
            | Tok::Var { token, .. }
            | Tok::Op { token, .. }
            | Tok::Call { token, .. }
            | Tok::If { token, .. } => *token,
        }
    }

    /// Number of completed operands this node consumes.
    pub fn operands(&self) -> usize {
        match self {
            Tok::Op { op, .. } => op.arity(),
            Tok::Call { arity, .. } => *arity,
            _ => 0,
        }
    }

    /// Calls and conditionals may have observable effects; nothing else does
    /// on its own.
    pub fn has_side_effect(&self) -> bool {
        matches!(self, Tok::Call { .. } | Tok::If { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Tok::Int { .. } | Tok::Float { .. } | Tok::Bool { .. })
    }
}

impl Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Int { value, .. } => write!(f, "{}", value),
            Tok::Float { value, .. } => write!(f, "{:?}", value),
            Tok::Bool { value, .. } => write!(f, "{}", value),
            Tok::Var { path, .. } => write!(f, "{}", path.join(".")),
            Tok::Op { op, .. } => write!(f, "{}", op),
            Tok::Call { path, arity, .. } => write!(f, "{}/{}", path.join("."), arity),
            Tok::If { .. } => write!(f, "if"),
        }
    }
}

/// Renders each node of a postfix sequence, mostly for diagnostics and tests.
pub fn render(expr: &[Tok]) -> Vec<String> {
    expr.iter().map(|tok| tok.to_string()).collect()
}

/// Whether any node of the sequence is an expression-position conditional.
pub fn contains_conditional(expr: &[Tok]) -> bool {
    expr.iter().any(|tok| matches!(tok, Tok::If { .. }))
}
