//! Symbol resolution.
//!
//! Declares each module's globals and function overloads, compiles imported
//! modules on demand and binds every identifier of the function bodies to a
//! local slot, a global or a list of candidate overloads.

pub mod resolver;
pub mod state;

#[cfg(test)]
mod tests;
