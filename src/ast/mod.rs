/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the tree the front end builds
///
/// Submodules:
/// - ast: Items, modules and their symbol tables
/// - expressions: Postfix expression nodes and resolved bindings
/// - statements: Statement variants and block traversal
/// - types: Static types attached to declarations and literals
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
