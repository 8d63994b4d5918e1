//! Error types and error handling for the front end.
//!
//! Every stage (token source, parser, lowering passes, resolver and the file
//! registry) reports failures through the same [`errors::Error`] type, which
//! carries the source position of the offending token. Errors are fatal: the
//! first one aborts compilation of the top-level invocation.

pub mod errors;
