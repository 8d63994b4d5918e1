use crate::{
    ast::{
        ast::TokenId,
        expressions::{Expr, Op, Tok},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::{flushes, OPERATOR_LOOKUP},
    parser::Parser,
    stmt::parse_if,
};

/// Entry of the pending-operator stack. Parens and call markers sit below
/// every real operator, so flushing stops at them.
#[derive(Debug)]
enum Pending {
    Op(Op, TokenId),
    Paren(TokenId),
    Call(TokenId, Vec<String>),
}

struct ExprState {
    output: Expr,
    pending: Vec<Pending>,
    /// One argument counter per open call.
    arg_counts: Vec<usize>,
    /// Set right after a call's `(` or a `,`: the next token starts an argument.
    param_ready: bool,
    prev_was_op: bool,
    call_just_opened: bool,
}

impl ExprState {
    fn new() -> Self {
        ExprState {
            output: Vec::new(),
            pending: Vec::new(),
            arg_counts: Vec::new(),
            param_ready: false,
            prev_was_op: true,
            call_just_opened: false,
        }
    }

    fn in_progress(&self) -> bool {
        !self.output.is_empty() || !self.pending.is_empty()
    }

    /// Pops operators into the output until a paren marker is on top.
    fn flush_to_paren(&mut self) -> bool {
        while let Some(top) = self.pending.last() {
            match top {
                Pending::Op(op, token) => {
                    self.output.push(Tok::op(*token, *op));
                    self.pending.pop();
                }
                Pending::Paren(_) => return true,
                Pending::Call(..) => return false,
            }
        }
        false
    }

    fn paren_belongs_to_call(&self) -> bool {
        let len = self.pending.len();
        len >= 2 && matches!(self.pending[len - 2], Pending::Call(..))
    }
}

fn missing_operand(parser: &Parser) -> Error {
    parser.unexpected_detailed("expected an operand")
}

fn missing_operator(parser: &Parser) -> Error {
    parser.unexpected_detailed("expected an operator")
}

/// Parses an expression into postfix order.
///
/// Stops at a statement terminator (consumed), a `}` or EOF (left in place),
/// or at `terminator` (consumed). Returns an empty sequence when the
/// expression is empty; callers that need a value use `parse_value_expr`.
pub fn parse_expr(parser: &mut Parser, terminator: Option<TokenKind>) -> Result<Expr, Error> {
    let mut state = ExprState::new();

    loop {
        let kind = parser.current_token_kind();

        // A line break after an operator, `(` or `,` continues the expression
        if kind == TokenKind::End && state.prev_was_op && state.in_progress() {
            parser.advance();
            continue;
        }

        if matches!(kind, TokenKind::End | TokenKind::CloseCurly | TokenKind::EOF)
            || Some(kind) == terminator
        {
            if state.prev_was_op && state.in_progress() {
                return Err(missing_operand(parser));
            }
            while let Some(pending) = state.pending.pop() {
                match pending {
                    Pending::Op(op, token) => state.output.push(Tok::op(token, op)),
                    Pending::Paren(token) | Pending::Call(token, _) => {
                        return Err(parser.error_at(token, ErrorImpl::UnclosedParenthesis));
                    }
                }
            }
            if let Some(terminator) = terminator {
                if kind != terminator {
                    let message = format!("expected {}", terminator);
                    return Err(parser.unexpected_detailed(&message));
                }
            }
            if kind == TokenKind::End || Some(kind) == terminator {
                parser.advance();
            }
            return Ok(state.output);
        }

        if state.param_ready && kind != TokenKind::CloseParen {
            if let Some(count) = state.arg_counts.last_mut() {
                *count += 1;
            }
            state.param_ready = false;
        }

        let id = parser.current_id();
        let prev_was_op = state.prev_was_op;
        let call_just_opened = state.call_just_opened;
        state.call_just_opened = false;

        match kind {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Identifier
            | TokenKind::If
            | TokenKind::OpenParen
                if !prev_was_op =>
            {
                return Err(missing_operator(parser));
            }
            TokenKind::Integer => {
                let token = parser.current_token();
                let value = token.int().ok_or_else(|| {
                    parser.error_here(ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    })
                })?;
                let ty = Type::from_suffix(token.suffix, false);
                state.output.push(Tok::Int { token: id, value, ty });
                state.prev_was_op = false;
                parser.advance();
            }
            TokenKind::Float => {
                let token = parser.current_token();
                let value = token.float().ok_or_else(|| {
                    parser.error_here(ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    })
                })?;
                let ty = Type::from_suffix(token.suffix, true);
                state.output.push(Tok::Float { token: id, value, ty });
                state.prev_was_op = false;
                parser.advance();
            }
            TokenKind::True | TokenKind::False => {
                state.output.push(Tok::Bool {
                    token: id,
                    value: kind == TokenKind::True,
                });
                state.prev_was_op = false;
                parser.advance();
            }
            TokenKind::Identifier => {
                let path = parser.current_token().path.clone();
                parser.advance();
                if parser.current_token_kind() == TokenKind::OpenParen {
                    let paren = parser.advance();
                    state.pending.push(Pending::Call(id, path));
                    state.pending.push(Pending::Paren(paren));
                    state.arg_counts.push(0);
                    state.param_ready = true;
                    state.call_just_opened = true;
                    state.prev_was_op = true;
                } else {
                    state.output.push(Tok::var(id, path));
                    state.prev_was_op = false;
                }
            }
            TokenKind::If => {
                parser.advance();
                let statement = parse_if(parser, id)?;
                state.output.push(Tok::If {
                    token: id,
                    statement: Box::new(statement),
                });
                state.prev_was_op = false;
            }
            TokenKind::OpenParen => {
                state.pending.push(Pending::Paren(id));
                state.prev_was_op = true;
                parser.advance();
            }
            TokenKind::Comma => {
                if prev_was_op {
                    return Err(missing_operand(parser));
                }
                if !state.flush_to_paren() || !state.paren_belongs_to_call() {
                    return Err(parser.error_here(ErrorImpl::MismatchedParenthesis));
                }
                state.param_ready = true;
                state.prev_was_op = true;
                parser.advance();
            }
            TokenKind::CloseParen => {
                if prev_was_op && !call_just_opened {
                    return Err(missing_operand(parser));
                }
                if !state.flush_to_paren() {
                    return Err(parser.error_here(ErrorImpl::MismatchedParenthesis));
                }
                state.pending.pop();
                if matches!(state.pending.last(), Some(Pending::Call(..))) {
                    if let Some(Pending::Call(token, path)) = state.pending.pop() {
                        let arity = state.arg_counts.pop().unwrap_or(0);
                        state.output.push(Tok::Call {
                            token,
                            path,
                            arity,
                            candidates: Vec::new(),
                        });
                    }
                }
                state.param_ready = false;
                state.prev_was_op = false;
                parser.advance();
            }
            _ => {
                let Some(&op) = OPERATOR_LOOKUP.get(&kind) else {
                    return Err(parser.unexpected());
                };
                let op = match (op, prev_was_op) {
                    (Op::Sub, true) => Op::Neg,
                    (Op::Div, true) => Op::Inv,
                    (Op::Not, true) => Op::Not,
                    (Op::Not, false) => return Err(missing_operator(parser)),
                    (_, true) => return Err(missing_operand(parser)),
                    (op, false) => op,
                };

                while let Some(Pending::Op(pending, token)) = state.pending.last() {
                    if !flushes(op, *pending) {
                        break;
                    }
                    state.output.push(Tok::op(*token, *pending));
                    state.pending.pop();
                }

                state.pending.push(Pending::Op(op, id));
                state.prev_was_op = true;
                parser.advance();
            }
        }
    }
}

/// Parses an expression that must produce a value.
pub fn parse_value_expr(parser: &mut Parser, terminator: Option<TokenKind>) -> Result<Expr, Error> {
    let start = parser.current_id();
    let expr = parse_expr(parser, terminator)?;
    if expr.is_empty() {
        let token = parser.token(start);
        if token.kind == TokenKind::EOF {
            return Err(parser.error_at(start, ErrorImpl::UnterminatedBlock));
        }
        return Err(parser.error_at(
            start,
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: String::from("expected an expression"),
            },
        ));
    }
    Ok(expr)
}
