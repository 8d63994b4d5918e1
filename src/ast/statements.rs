use super::{
    ast::TokenId,
    expressions::{Binding, Expr, LocalId},
    types::Type,
};

/// Ordered statements forming one lexical scope.
pub type Block = Vec<Statement>;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    Assignment(Assignment),
    Expr(ExprStmt),
    Return(Return),
    If(If),
    While(While),
    Break(Break),
    Continue(Continue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub token: TokenId,
    pub name: String,
    /// Declared type, `None` when left to inference.
    pub ty: Option<Type>,
    pub value: Option<Expr>,
    pub local: Option<LocalId>,
}

/// Place written by an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub token: TokenId,
    pub path: Vec<String>,
    pub binding: Option<Binding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub token: TokenId,
    pub target: Target,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub token: TokenId,
    pub expr: Expr,
}

/// `value` is empty for a bare `return`.
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub token: TokenId,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub token: TokenId,
    pub condition: Expr,
    pub true_block: Block,
    pub else_block: Block,
    pub true_returns: bool,
    pub else_returns: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub token: TokenId,
    pub condition: Expr,
    pub block: Block,
}

/// Leaves `amount` enclosing loops.
#[derive(Debug, Clone, PartialEq)]
pub struct Break {
    pub token: TokenId,
    pub amount: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Continue {
    pub token: TokenId,
}

impl If {
    pub fn new(token: TokenId, condition: Expr) -> Self {
        If {
            token,
            condition,
            true_block: Vec::new(),
            else_block: Vec::new(),
            true_returns: false,
            else_returns: false,
        }
    }
}

impl Statement {
    pub fn token(&self) -> TokenId {
        match self {
            Statement::Declaration(Declaration { token, .. })
            | Statement::Assignment(Assignment { token, .. })
            | Statement::Expr(ExprStmt { token, .. })
            | Statement::Return(Return { token, .. })
            | Statement::If(If { token, .. })
            | Statement::While(While { token, .. })
            | Statement::Break(Break { token, .. })
            | Statement::Continue(Continue { token }) => *token,
        }
    }

    /// The expression evaluated by this statement itself, not counting nested blocks.
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Statement::Declaration(declaration) => declaration.value.as_ref(),
            Statement::Assignment(assignment) => Some(&assignment.value),
            Statement::Expr(statement) => Some(&statement.expr),
            Statement::Return(statement) => Some(&statement.value),
            Statement::If(statement) => Some(&statement.condition),
            Statement::While(statement) => Some(&statement.condition),
            Statement::Break(_) | Statement::Continue(_) => None,
        }
    }

    pub fn expr_mut(&mut self) -> Option<&mut Expr> {
        match self {
            Statement::Declaration(declaration) => declaration.value.as_mut(),
            Statement::Assignment(assignment) => Some(&mut assignment.value),
            Statement::Expr(statement) => Some(&mut statement.expr),
            Statement::Return(statement) => Some(&mut statement.value),
            Statement::If(statement) => Some(&mut statement.condition),
            Statement::While(statement) => Some(&mut statement.condition),
            Statement::Break(_) | Statement::Continue(_) => None,
        }
    }

    /// Nested child blocks, each its own lexical scope.
    pub fn blocks(&self) -> Vec<&Block> {
        match self {
            Statement::If(statement) => vec![&statement.true_block, &statement.else_block],
            Statement::While(statement) => vec![&statement.block],
            _ => Vec::new(),
        }
    }

    pub fn blocks_mut(&mut self) -> Vec<&mut Block> {
        match self {
            Statement::If(statement) => vec![&mut statement.true_block, &mut statement.else_block],
            Statement::While(statement) => vec![&mut statement.block],
            _ => Vec::new(),
        }
    }
}
