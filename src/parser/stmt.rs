use crate::{
    ast::{
        ast::{Function, Global, Import, Item, ModulePath, Param, SubModule, TokenId},
        expressions::{Op, Tok},
        statements::{
            Assignment, Block, Break, Continue, Declaration, ExprStmt, If, Return, Statement,
            Target, While,
        },
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::{parse_expr, parse_value_expr},
    lookups::COMPOUND_LOOKUP,
    parser::Parser,
    types::parse_type,
};

const MAX_PARAMETERS: usize = 255;

/// Ends an item or statement: a terminator is consumed, `}` and EOF are left
/// for the enclosing block.
fn end_statement(parser: &mut Parser) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::End => {
            parser.advance();
            Ok(())
        }
        TokenKind::CloseCurly | TokenKind::EOF => Ok(()),
        _ => Err(parser.unexpected()),
    }
}

pub fn parse_item(parser: &mut Parser) -> Result<Item, Error> {
    let mut public = false;
    if parser.current_token_kind() == TokenKind::Pub {
        parser.advance();
        public = true;
    }

    match parser.current_token_kind() {
        TokenKind::Fn => {
            parser.advance();
            Ok(Item::Function(parse_fn_decl(parser, public)?))
        }
        TokenKind::Global => {
            parser.advance();
            Ok(Item::Global(parse_global(parser, true, public)?))
        }
        TokenKind::Const => {
            parser.advance();
            Ok(Item::Global(parse_global(parser, false, public)?))
        }
        TokenKind::Import if !public => Ok(Item::Import(parse_import(parser)?)),
        TokenKind::Mod if !public => {
            let token = parser.advance();
            let (_, name) = parser.expect_simple_identifier()?;
            end_statement(parser)?;
            Ok(Item::SubModule(SubModule { token, name }))
        }
        _ => Err(parser.unexpected_detailed("expected an item")),
    }
}

fn parse_fn_decl(parser: &mut Parser, public: bool) -> Result<Function, Error> {
    let (token, name) = parser.expect_simple_identifier()?;
    parser.expect(TokenKind::OpenParen)?;
    parser.skip_ends();

    let mut params = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let (param_token, param_name) = parser.expect_simple_identifier()?;
        parser.expect(TokenKind::Colon)?;
        let ty = parse_type(parser)?;
        params.push(Param {
            token: param_token,
            name: param_name,
            ty,
        });

        parser.skip_ends();
        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
                parser.skip_ends();
            }
            TokenKind::CloseParen => {}
            _ => return Err(parser.unexpected_detailed("expected `,` or `)`")),
        }
    }
    parser.advance();

    if params.len() > MAX_PARAMETERS {
        return Err(parser.error_at(
            token,
            ErrorImpl::TooManyParameters {
                count: params.len(),
            },
        ));
    }

    let return_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        parse_type(parser)?
    } else {
        Type::Void
    };

    parser.skip_ends();
    if parser.current_token_kind() != TokenKind::OpenCurly {
        return Err(parser.unexpected_detailed("expected `:` or `{`"));
    }
    parser.advance();
    let block = parse_block(parser)?;

    Ok(Function {
        token,
        name,
        public,
        params,
        return_type,
        index: 0,
        unique_name: None,
        locals: Vec::new(),
        block,
    })
}

fn parse_global(parser: &mut Parser, mutable: bool, public: bool) -> Result<Global, Error> {
    let (token, name) = parser.expect_simple_identifier()?;
    parser.expect(TokenKind::Colon)?;
    let ty = parse_type(parser)?;
    end_statement(parser)?;

    Ok(Global {
        token,
        name,
        ty,
        mutable,
        public,
        unique_name: None,
    })
}

fn parse_import(parser: &mut Parser) -> Result<Import, Error> {
    let token = parser.advance();

    if parser.current_token_kind() != TokenKind::Identifier {
        return Err(parser.unexpected_detailed("expected a module path"));
    }
    let target = ModulePath::new(parser.current_token().path.clone());
    parser.advance();

    let mut selected = Vec::new();
    if parser.current_token_kind() == TokenKind::Dot {
        parser.advance();
        parser.expect(TokenKind::OpenBracket)?;
        loop {
            parser.skip_ends();
            selected.push(parser.expect_simple_identifier()?);
            parser.skip_ends();
            match parser.current_token_kind() {
                TokenKind::Comma => {
                    parser.advance();
                }
                TokenKind::CloseBracket => {
                    parser.advance();
                    break;
                }
                _ => return Err(parser.unexpected_detailed("expected `,` or `]`")),
            }
        }
    }

    end_statement(parser)?;
    Ok(Import {
        token,
        target,
        selected,
    })
}

/// Parses statements up to and including the closing `}`. The opening `{`
/// has already been consumed.
pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let mut block = Vec::new();
    loop {
        parser.skip_ends();
        match parser.current_token_kind() {
            TokenKind::CloseCurly => {
                parser.advance();
                return Ok(block);
            }
            TokenKind::EOF => return Err(parser.error_here(ErrorImpl::UnterminatedBlock)),
            _ => block.push(parse_stmt(parser)?),
        }
    }
}

/// Parses a conditional whose `if` keyword has already been consumed,
/// including any `else` or `else if` chain.
pub fn parse_if(parser: &mut Parser, token: TokenId) -> Result<If, Error> {
    let condition = parse_value_expr(parser, Some(TokenKind::OpenCurly))?;
    let mut statement = If::new(token, condition);
    statement.true_block = parse_block(parser)?;

    if parser.peek_past_ends() == TokenKind::Else {
        parser.skip_ends();
        parser.advance();
        match parser.current_token_kind() {
            TokenKind::If => {
                let else_if = parser.advance();
                statement.else_block = vec![Statement::If(parse_if(parser, else_if)?)];
            }
            TokenKind::OpenCurly => {
                parser.advance();
                statement.else_block = parse_block(parser)?;
            }
            _ => return Err(parser.unexpected_detailed("expected `if` or `{`")),
        }
    }

    Ok(statement)
}

pub fn parse_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let token = parser.current_id();

    match parser.current_token_kind() {
        TokenKind::Identifier => match parser.peek_kind(1) {
            TokenKind::Colon => parse_declaration(parser),
            TokenKind::Assignment => parse_assignment(parser, None),
            kind if COMPOUND_LOOKUP.contains_key(&kind) => {
                parse_assignment(parser, COMPOUND_LOOKUP.get(&kind).copied())
            }
            _ => parse_expr_stmt(parser),
        },
        TokenKind::Return => {
            parser.advance();
            let value = parse_expr(parser, None)?;
            Ok(Statement::Return(Return { token, value }))
        }
        TokenKind::If => {
            let mut expr = parse_value_expr(parser, None)?;
            if expr.len() == 1 && matches!(expr[0], Tok::If { .. }) {
                if let Some(Tok::If { statement, .. }) = expr.pop() {
                    return Ok(Statement::If(*statement));
                }
            }
            Ok(Statement::Expr(ExprStmt { token, expr }))
        }
        TokenKind::While => parse_while(parser),
        TokenKind::Break => parse_break(parser),
        TokenKind::Continue => {
            parser.advance();
            end_statement(parser)?;
            Ok(Statement::Continue(Continue { token }))
        }
        _ => parse_expr_stmt(parser),
    }
}

fn parse_expr_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let token = parser.current_id();
    let expr = parse_value_expr(parser, None)?;
    Ok(Statement::Expr(ExprStmt { token, expr }))
}

/// `name := value`, `name: type` or `name: type = value`.
fn parse_declaration(parser: &mut Parser) -> Result<Statement, Error> {
    let (token, name) = parser.expect_simple_identifier()?;
    parser.expect(TokenKind::Colon)?;

    let mut ty = None;
    let mut value = None;

    match parser.current_token_kind() {
        TokenKind::Assignment => {
            parser.advance();
            value = Some(parse_value_expr(parser, None)?);
        }
        TokenKind::Identifier => {
            ty = Some(parse_type(parser)?);
            if parser.current_token_kind() == TokenKind::Assignment {
                parser.advance();
                value = Some(parse_value_expr(parser, None)?);
            } else {
                end_statement(parser)?;
            }
        }
        TokenKind::End | TokenKind::CloseCurly | TokenKind::EOF => end_statement(parser)?,
        _ => return Err(parser.unexpected_detailed("expected `=` or a type")),
    }

    Ok(Statement::Declaration(Declaration {
        token,
        name,
        ty,
        value,
        local: None,
    }))
}

/// Plain or compound assignment. `x += e` becomes `x = x e add`.
fn parse_assignment(parser: &mut Parser, compound: Option<Op>) -> Result<Statement, Error> {
    let token = parser.current_id();
    let path = parser.current_token().path.clone();
    parser.advance();
    let op_token = parser.advance();

    let value = match compound {
        Some(op) => {
            let mut value = vec![Tok::var(token, path.clone())];
            value.extend(parse_value_expr(parser, None)?);
            value.push(Tok::op(op_token, op));
            value
        }
        None => parse_value_expr(parser, None)?,
    };

    Ok(Statement::Assignment(Assignment {
        token,
        target: Target {
            token,
            path,
            binding: None,
        },
        value,
    }))
}

/// `while cond { .. }`, or `while { .. }` for an infinite loop.
fn parse_while(parser: &mut Parser) -> Result<Statement, Error> {
    let token = parser.advance();

    let condition = if parser.current_token_kind() == TokenKind::OpenCurly {
        parser.advance();
        vec![Tok::Bool { token, value: true }]
    } else {
        parse_value_expr(parser, Some(TokenKind::OpenCurly))?
    };
    let block = parse_block(parser)?;

    Ok(Statement::While(While {
        token,
        condition,
        block,
    }))
}

/// `break`, or `break *N` to leave N enclosing loops.
fn parse_break(parser: &mut Parser) -> Result<Statement, Error> {
    let token = parser.advance();

    let mut amount = 1;
    if parser.current_token_kind() == TokenKind::Star {
        parser.advance();
        amount = match parser.current_token().int() {
            Some(value) if parser.current_token_kind() == TokenKind::Integer => value as usize,
            _ => return Err(parser.unexpected_detailed("expected a loop count")),
        };
        parser.advance();
    }
    end_statement(parser)?;

    Ok(Statement::Break(Break { token, amount }))
}
