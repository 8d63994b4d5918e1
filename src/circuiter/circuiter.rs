use tracing::{debug, trace};

use crate::ast::{
    ast::Module,
    expressions::{Expr, Op, Tok},
    statements::{Block, ExprStmt, If, Statement},
};

/// A completed subexpression seen during a scan: the `[start, end)` range it
/// occupies in the sequence and whether evaluating it may have an effect.
#[derive(Debug, Clone, Copy)]
struct Operand {
    start: usize,
    end: usize,
    effect: bool,
}

/// Lowers every effectful `&&`/`||` of a module. Returns the number of
/// rewrites performed.
pub fn lower_module(module: &mut Module) -> usize {
    let mut rewrites = 0;
    for function in module.functions_mut() {
        rewrites += lower_block(&mut function.block);
    }
    debug!(module = %module.path, rewrites, "lowered short circuits");
    rewrites
}

pub fn lower_block(block: &mut Block) -> usize {
    let mut rewrites = 0;
    for statement in block.iter_mut() {
        if let Some(expr) = statement.expr_mut() {
            rewrites += lower_expr(expr);
        }
        for child in statement.blocks_mut() {
            rewrites += lower_block(child);
        }
    }
    rewrites
}

fn lower_if(statement: &mut If) -> usize {
    lower_expr(&mut statement.condition)
        + lower_block(&mut statement.true_block)
        + lower_block(&mut statement.else_block)
}

/// Lowers one expression to a fixed point. Conditionals already nested in the
/// expression are lowered first.
pub fn lower_expr(expr: &mut Expr) -> usize {
    let mut rewrites = 0;
    for tok in expr.iter_mut() {
        if let Tok::If { statement, .. } = tok {
            rewrites += lower_if(statement);
        }
    }

    while let Some(lowered) = rewrite_once(expr) {
        *expr = lowered;
        rewrites += 1;
    }
    rewrites
}

/// Scans the sequence left to right and rewrites the first logical operator
/// whose right operand has an effect. Returns the new sequence, or `None`
/// once nothing is left to rewrite.
pub fn rewrite_once(expr: &[Tok]) -> Option<Expr> {
    let mut operands: Vec<Operand> = Vec::new();

    for (index, tok) in expr.iter().enumerate() {
        let count = tok.operands();
        if count > operands.len() {
            return None;
        }
        let consumed = operands.split_off(operands.len() - count);

        if let Tok::Op { token, op, .. } = tok {
            if op.is_logical() && consumed.len() == 2 && consumed[1].effect {
                let (left, right) = (consumed[0], consumed[1]);
                trace!(op = %op, start = left.start, end = index + 1, "lowering short circuit");

                let mut condition = expr[left.start..left.end].to_vec();
                let short_value = *op == Op::Or;
                if *op == Op::And {
                    condition.push(Tok::op(*token, Op::Not));
                }

                let mut statement = If::new(*token, condition);
                statement.true_block = vec![Statement::Expr(ExprStmt {
                    token: *token,
                    expr: vec![Tok::Bool {
                        token: *token,
                        value: short_value,
                    }],
                })];
                statement.else_block = vec![Statement::Expr(ExprStmt {
                    token: *token,
                    expr: expr[right.start..right.end].to_vec(),
                })];

                let mut lowered = Vec::with_capacity(expr.len());
                lowered.extend_from_slice(&expr[..left.start]);
                lowered.push(Tok::If {
                    token: *token,
                    statement: Box::new(statement),
                });
                lowered.extend_from_slice(&expr[index + 1..]);
                return Some(lowered);
            }
        }

        let start = consumed.first().map_or(index, |operand| operand.start);
        let effect = tok.has_side_effect() || consumed.iter().any(|operand| operand.effect);
        operands.push(Operand {
            start,
            end: index + 1,
            effect,
        });
    }

    None
}
