//! Parser module for building the module tree.
//!
//! This module transforms a file's token buffer into a `Module` of items.
//! Statements and items use recursive descent; expressions use a single
//! pass operator-precedence routine that emits postfix order directly and
//! handles:
//!
//! - Precedence and associativity, including prefix `-`, `!` and `/`
//! - Calls with their arity counted at parse time
//! - Conditionals in expression position
//! - Compound assignment desugaring

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
