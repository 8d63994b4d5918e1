use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Parses a type annotation. Only named primitive types exist.
pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    if parser.current_token_kind() != TokenKind::Identifier {
        return Err(parser.unexpected_detailed("expected a type name"));
    }

    let name = parser.current_token().value.clone();
    match Type::parse(&name) {
        Some(ty) => {
            parser.advance();
            Ok(ty)
        }
        None => Err(parser.error_here(ErrorImpl::UnknownType { type_: name })),
    }
}
