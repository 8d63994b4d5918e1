//! Token source for the front end.
//!
//! Converts source text into the classified token stream the parser
//! consumes:
//!
//! - Regex driven tokenization of identifiers, numbers and symbols
//! - Dotted identifiers kept as one token with their path segments
//! - Numeric values and suffixes parsed up front
//! - `;` and line breaks collapsed into statement terminators
//! - Comments and whitespace skipped

pub mod lexer;
pub mod tokens;
