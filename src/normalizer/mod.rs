//! Control-flow normalization.
//!
//! Runs between short-circuit lowering and symbol resolution:
//!
//! - Conditionals in expression position become `if` statements assigning a
//!   temporary, so later passes only see flat postfix expressions
//! - `break *N` and `continue` are checked against the loop depth
//! - Return completeness is derived for every `if` and checked per function

pub mod normalizer;

#[cfg(test)]
mod tests;
