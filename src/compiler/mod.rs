//! Compilation driver.
//!
//! Owns the registry of files and runs each one through the front end:
//!
//! - Tokenizing and parsing into a module
//! - Short-circuit lowering and control-flow normalization
//! - Resolution, compiling imported files on demand
//!
//! Files reach each other only by module path through the registry.

pub mod compiler;
pub mod registry;
