use tracing::debug;

use crate::{
    ast::{
        ast::{Function, Module, TokenId},
        expressions::{contains_conditional, Expr, Op, Tok},
        statements::{
            Assignment, Block, Break, Declaration, ExprStmt, If, Return, Statement, Target, While,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::Token,
};

/// Prefix of compiler-generated temporaries. Never a valid identifier start.
pub const TEMP_PREFIX: char = '$';

/// Flattens expression-position conditionals into statements and checks the
/// control flow of every function in a module.
pub struct Normalizer<'a> {
    tokens: &'a [Token],
    temps: usize,
    loop_depth: usize,
}

pub fn normalize_module(module: &mut Module, tokens: &[Token]) -> Result<(), Error> {
    let mut normalizer = Normalizer::new(tokens);
    for function in module.functions_mut() {
        normalizer.normalize_function(function)?;
    }
    debug!(module = %module.path, temporaries = normalizer.temps, "normalized control flow");
    Ok(())
}

fn is_temp(tok: &Tok) -> bool {
    match tok {
        Tok::Var { path, .. } => path.len() == 1 && path[0].starts_with(TEMP_PREFIX),
        _ => false,
    }
}

/// Turns a trailing value into a `return` of that value, following `if`
/// tails into both branches.
fn insert_implicit_return(block: &mut Block) {
    if matches!(block.last(), Some(Statement::Expr(_))) {
        if let Some(Statement::Expr(statement)) = block.pop() {
            block.push(Statement::Return(Return {
                token: statement.token,
                value: statement.expr,
            }));
        }
        return;
    }
    if let Some(Statement::If(statement)) = block.last_mut() {
        insert_implicit_return(&mut statement.true_block);
        insert_implicit_return(&mut statement.else_block);
    }
}

/// Records on every `if` whether each branch returns unconditionally, and
/// reports whether the block itself does.
pub fn mark_returns(block: &mut Block) -> bool {
    let mut returns = false;
    for statement in block.iter_mut() {
        match statement {
            Statement::Return(_) => returns = true,
            Statement::If(statement) => {
                statement.true_returns = mark_returns(&mut statement.true_block);
                statement.else_returns = mark_returns(&mut statement.else_block);
                returns |= statement.true_returns && statement.else_returns;
            }
            Statement::While(statement) => {
                mark_returns(&mut statement.block);
            }
            _ => {}
        }
    }
    returns
}

impl<'a> Normalizer<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Normalizer {
            tokens,
            temps: 0,
            loop_depth: 0,
        }
    }

    fn error_at(&self, token: TokenId, error: ErrorImpl) -> Error {
        let position = self.tokens[token.index()].span.start.clone();
        Error::new(error, position)
    }

    fn new_temp(&mut self) -> String {
        let name = format!("{}{}", TEMP_PREFIX, self.temps);
        self.temps += 1;
        name
    }

    pub fn normalize_function(&mut self, function: &mut Function) -> Result<(), Error> {
        let needs_value = !function.return_type.is_void();
        if needs_value {
            insert_implicit_return(&mut function.block);
        }

        self.loop_depth = 0;
        let block = std::mem::take(&mut function.block);
        function.block = self.normalize_block(block)?;

        let returns = mark_returns(&mut function.block);
        if needs_value && !returns {
            return Err(self.error_at(
                function.token,
                ErrorImpl::MissingReturn {
                    function: function.name.clone(),
                },
            ));
        }
        Ok(())
    }

    pub fn normalize_block(&mut self, block: Block) -> Result<Block, Error> {
        let mut out = Vec::with_capacity(block.len());
        for statement in block {
            self.normalize_statement(statement, &mut out)?;
        }
        Ok(out)
    }

    fn normalize_statement(&mut self, statement: Statement, out: &mut Block) -> Result<(), Error> {
        match statement {
            Statement::Declaration(mut declaration) => {
                if let Some(value) = declaration.value.take() {
                    declaration.value = Some(self.hoist(value, out)?);
                }
                out.push(Statement::Declaration(declaration));
            }
            Statement::Assignment(mut assignment) => {
                assignment.value = self.hoist(assignment.value, out)?;
                out.push(Statement::Assignment(assignment));
            }
            Statement::Expr(mut statement) => {
                // A bare conditional used as a statement needs no value
                if statement.expr.len() == 1 && matches!(statement.expr[0], Tok::If { .. }) {
                    if let Some(Tok::If { statement, .. }) = statement.expr.pop() {
                        return self.normalize_if(*statement, out);
                    }
                }
                statement.expr = self.hoist(statement.expr, out)?;
                out.push(Statement::Expr(statement));
            }
            Statement::Return(mut statement) => {
                statement.value = self.hoist(statement.value, out)?;
                out.push(Statement::Return(statement));
            }
            Statement::If(statement) => self.normalize_if(statement, out)?,
            Statement::While(statement) => self.normalize_while(statement, out)?,
            Statement::Break(statement) => {
                if statement.amount == 0 || statement.amount > self.loop_depth {
                    return Err(self.error_at(
                        statement.token,
                        ErrorImpl::InvalidBreak {
                            amount: statement.amount,
                            depth: self.loop_depth,
                        },
                    ));
                }
                out.push(Statement::Break(statement));
            }
            Statement::Continue(statement) => {
                if self.loop_depth == 0 {
                    return Err(self.error_at(statement.token, ErrorImpl::ContinueOutsideLoop));
                }
                out.push(Statement::Continue(statement));
            }
        }
        Ok(())
    }

    fn normalize_if(&mut self, mut statement: If, out: &mut Block) -> Result<(), Error> {
        statement.condition = self.hoist(statement.condition, out)?;
        statement.true_block = self.normalize_block(statement.true_block)?;
        statement.else_block = self.normalize_block(statement.else_block)?;
        out.push(Statement::If(statement));
        Ok(())
    }

    fn normalize_while(&mut self, statement: While, out: &mut Block) -> Result<(), Error> {
        self.loop_depth += 1;
        let result = self.lower_while(statement);
        self.loop_depth -= 1;

        out.push(Statement::While(result?));
        Ok(())
    }

    /// A condition holding a conditional is evaluated inside the loop:
    /// `while true { <hoisted>; if !cond { break }; body }`.
    fn lower_while(&mut self, mut statement: While) -> Result<While, Error> {
        let block = self.normalize_block(std::mem::take(&mut statement.block))?;
        if !contains_conditional(&statement.condition) {
            statement.block = block;
            return Ok(statement);
        }

        let token = statement.token;
        let mut body = Vec::new();
        let mut condition = self.hoist(statement.condition, &mut body)?;
        condition.push(Tok::op(token, Op::Not));

        let mut exit = If::new(token, condition);
        exit.true_block = vec![Statement::Break(Break { token, amount: 1 })];
        body.push(Statement::If(exit));
        body.extend(block);

        Ok(While {
            token,
            condition: vec![Tok::Bool { token, value: true }],
            block: body,
        })
    }

    /// Replaces every conditional of `expr` by a temporary assigned in
    /// statement form. Statements needed before the expression are appended
    /// to `out`.
    pub fn hoist(&mut self, expr: Expr, out: &mut Block) -> Result<Expr, Error> {
        if !contains_conditional(&expr) {
            return Ok(expr);
        }

        let mut result: Expr = Vec::with_capacity(expr.len());
        // Ranges of the completed operands still waiting on the value stack.
        // Together they always cover `result` exactly.
        let mut operands: Vec<(usize, usize)> = Vec::new();

        for tok in expr {
            match tok {
                Tok::If { token, statement } => {
                    self.spill(&mut result, &mut operands, token, out);
                    let temp = self.conditional_value(token, *statement, out)?;
                    let start = result.len();
                    result.push(Tok::var(token, vec![temp]));
                    operands.push((start, start + 1));
                }
                tok => {
                    let count = tok.operands().min(operands.len());
                    let consumed = operands.split_off(operands.len() - count);
                    let start = consumed.first().map_or(result.len(), |range| range.0);
                    result.push(tok);
                    operands.push((start, result.len()));
                }
            }
        }

        Ok(result)
    }

    /// Moves operands evaluated before a conditional into temporaries so the
    /// conditional's statements cannot reorder them.
    fn spill(
        &mut self,
        result: &mut Expr,
        operands: &mut Vec<(usize, usize)>,
        token: TokenId,
        out: &mut Block,
    ) {
        let pending = std::mem::take(result);
        let mut ranges = Vec::with_capacity(operands.len());

        for &(start, end) in operands.iter() {
            let value = &pending[start..end];
            let position = result.len();
            if value.len() == 1 && (value[0].is_literal() || is_temp(&value[0])) {
                result.push(value[0].clone());
            } else {
                let name = self.new_temp();
                out.push(Statement::Declaration(Declaration {
                    token,
                    name: name.clone(),
                    ty: None,
                    value: Some(value.to_vec()),
                    local: None,
                }));
                result.push(Tok::var(token, vec![name]));
            }
            ranges.push((position, position + 1));
        }

        *operands = ranges;
    }

    /// Emits `$N` and an `if` assigning each branch's value to it.
    fn conditional_value(
        &mut self,
        token: TokenId,
        mut statement: If,
        out: &mut Block,
    ) -> Result<String, Error> {
        let temp = self.new_temp();
        out.push(Statement::Declaration(Declaration {
            token,
            name: temp.clone(),
            ty: None,
            value: None,
            local: None,
        }));

        if statement.else_block.is_empty() {
            return Err(self.error_at(token, ErrorImpl::MissingBranchValue));
        }
        statement.true_block = self.assign_tail(statement.true_block, &temp, token)?;
        statement.else_block = self.assign_tail(statement.else_block, &temp, token)?;

        self.normalize_if(statement, out)?;
        Ok(temp)
    }

    fn assign_tail(&self, mut block: Block, temp: &str, token: TokenId) -> Result<Block, Error> {
        match block.pop() {
            Some(Statement::Expr(ExprStmt { token, expr })) => {
                block.push(Statement::Assignment(Assignment {
                    token,
                    target: Target {
                        token,
                        path: vec![temp.to_string()],
                        binding: None,
                    },
                    value: expr,
                }));
            }
            Some(Statement::If(mut inner)) if !inner.else_block.is_empty() => {
                inner.true_block = self.assign_tail(inner.true_block, temp, inner.token)?;
                inner.else_block = self.assign_tail(inner.else_block, temp, inner.token)?;
                block.push(Statement::If(inner));
            }
            Some(
                diverging @ (Statement::Return(_) | Statement::Break(_) | Statement::Continue(_)),
            ) => block.push(diverging),
            _ => return Err(self.error_at(token, ErrorImpl::MissingBranchValue)),
        }
        Ok(block)
    }
}
