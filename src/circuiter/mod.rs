//! Short-circuit lowering.
//!
//! Rewrites `a || b` into `if a { true } else { b }` and `a && b` into
//! `if !a { false } else { b }` whenever `b` contains a call or a nested
//! conditional. Side-effect free logical operators are left untouched.
//!
//! Each scan performs at most one rewrite and builds a new sequence; scans
//! repeat until nothing changes.

pub mod circuiter;
