//! Parser implementation for building the module tree.
//!
//! This module contains the main Parser struct, its token cursor and the
//! `parse` entry point. Items and statements are parsed by recursive descent
//! in `stmt`, expressions by the operator-precedence routine in `expr`.

use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::ast::{Module, ModulePath, TokenId},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

use super::stmt::parse_item;

/// The main parser structure that maintains parsing state.
///
/// Holds a shared handle to the file's token buffer. Tree nodes refer back
/// into the buffer by `TokenId`, so the buffer outlives every parsed node.
pub struct Parser {
    /// The list of tokens to parse, always terminated by an EOF token
    tokens: Rc<Vec<Token>>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
}

impl Parser {
    pub fn new(tokens: Rc<Vec<Token>>) -> Self {
        let file = tokens
            .first()
            .map(|token| Rc::clone(&token.span.start.1))
            .unwrap_or_else(|| Position::null().1);

        Parser { tokens, pos: 0, file }
    }

    /// Returns the current token without advancing.
    ///
    /// Past the end of the buffer the final token (EOF) is returned.
    pub fn current_token(&self) -> &Token {
        self.peek_token(0)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    pub fn current_id(&self) -> TokenId {
        TokenId(self.pos.min(self.tokens.len().saturating_sub(1)) as u32)
    }

    pub fn peek_token(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.peek_token(offset).kind
    }

    /// Kind of the first token at or after the cursor that is not a terminator.
    pub fn peek_past_ends(&self) -> TokenKind {
        let mut offset = 0;
        while self.peek_kind(offset) == TokenKind::End {
            offset += 1;
        }
        self.peek_kind(offset)
    }

    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    /// Advances to the next token and returns the id of the consumed one.
    pub fn advance(&mut self) -> TokenId {
        let id = self.current_id();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        id
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<TokenId, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(error.unwrap_or_else(|| self.unexpected()));
        }
        Ok(self.advance())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<TokenId, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects a single segment identifier and returns its id and name.
    pub fn expect_simple_identifier(&mut self) -> Result<(TokenId, String), Error> {
        let token = self.current_token();
        if token.kind != TokenKind::Identifier {
            return Err(self.unexpected_detailed("expected identifier"));
        }
        if !token.is_simple_identifier() {
            return Err(Error::new(
                ErrorImpl::ExpectedSimpleIdentifier {
                    identifier: token.value.clone(),
                },
                token.span.start.clone(),
            ));
        }
        let name = token.value.clone();
        Ok((self.advance(), name))
    }

    /// Skips statement terminators.
    pub fn skip_ends(&mut self) {
        while self.current_token_kind() == TokenKind::End {
            self.advance();
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.pos < self.tokens.len() && self.current_token_kind() != TokenKind::EOF
    }

    pub fn error_at(&self, id: TokenId, error: ErrorImpl) -> Error {
        Error::new(error, self.token(id).span.start.clone())
    }

    pub fn error_here(&self, error: ErrorImpl) -> Error {
        Error::new(error, self.current_token().span.start.clone())
    }

    pub fn unexpected(&self) -> Error {
        let token = self.current_token();
        if token.kind == TokenKind::EOF {
            return self.error_here(ErrorImpl::UnterminatedBlock);
        }
        self.error_here(ErrorImpl::UnexpectedToken {
            token: token.value.clone(),
        })
    }

    pub fn unexpected_detailed(&self, message: &str) -> Error {
        let token = self.current_token();
        if token.kind == TokenKind::EOF {
            return self.error_here(ErrorImpl::UnterminatedBlock);
        }
        self.error_here(ErrorImpl::UnexpectedTokenDetailed {
            token: token.value.clone(),
            message: message.to_string(),
        })
    }

    /// Returns the current position in the source file.
    pub fn get_position(&self) -> Position {
        Position(self.current_token().span.start.0, Rc::clone(&self.file))
    }
}

/// Parses a file's token buffer into a module of top-level items.
///
/// This is the main entry point for parsing. Items are parsed until EOF;
/// the first grammar violation aborts with a syntax error.
pub fn parse(tokens: Rc<Vec<Token>>, path: ModulePath) -> Result<Module, Error> {
    let mut items = Vec::new();
    if tokens.is_empty() {
        return Ok(Module::new(path, items));
    }

    let mut parser = Parser::new(tokens);

    loop {
        parser.skip_ends();
        if !parser.has_tokens() {
            break;
        }
        items.push(parse_item(&mut parser)?);
    }

    debug!(module = %path, items = items.len(), "parsed module");
    Ok(Module::new(path, items))
}
