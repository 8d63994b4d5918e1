use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Error, Debug, Clone)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// Broad classification of an error, used by callers that only care which
/// stage of the front end rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Declaration,
    Resolution,
    CircularDependency,
    ControlFlow,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } | ErrorImpl::NumberParseError { .. } => {
                ErrorKind::Lexical
            }
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::UnterminatedBlock
            | ErrorImpl::MismatchedParenthesis
            | ErrorImpl::UnclosedParenthesis
            | ErrorImpl::ExpectedSimpleIdentifier { .. }
            | ErrorImpl::TooManyParameters { .. }
            | ErrorImpl::UnknownType { .. } => ErrorKind::Syntax,
            ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::GlobalAlreadyDeclared { .. }
            | ErrorImpl::VariableAlreadyDeclared { .. } => ErrorKind::Declaration,
            ErrorImpl::UnresolvedIdentifier { .. }
            | ErrorImpl::ModuleNotFound { .. }
            | ErrorImpl::InvalidModuleName { .. } => ErrorKind::Resolution,
            ErrorImpl::CircularDependency { .. } => ErrorKind::CircularDependency,
            ErrorImpl::MissingBranchValue
            | ErrorImpl::MissingReturn { .. }
            | ErrorImpl::InvalidBreak { .. }
            | ErrorImpl::ContinueOutsideLoop => ErrorKind::ControlFlow,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::UnterminatedBlock => "UnterminatedBlock",
            ErrorImpl::MismatchedParenthesis => "MismatchedParenthesis",
            ErrorImpl::UnclosedParenthesis => "UnclosedParenthesis",
            ErrorImpl::ExpectedSimpleIdentifier { .. } => "ExpectedSimpleIdentifier",
            ErrorImpl::TooManyParameters { .. } => "TooManyParameters",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::GlobalAlreadyDeclared { .. } => "GlobalAlreadyDeclared",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::UnresolvedIdentifier { .. } => "UnresolvedIdentifier",
            ErrorImpl::ModuleNotFound { .. } => "ModuleNotFound",
            ErrorImpl::InvalidModuleName { .. } => "InvalidModuleName",
            ErrorImpl::CircularDependency { .. } => "CircularDependency",
            ErrorImpl::MissingBranchValue => "MissingBranchValue",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::InvalidBreak { .. } => "InvalidBreak",
            ErrorImpl::ContinueOutsideLoop => "ContinueOutsideLoop",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::UnterminatedBlock => {
                ErrorTip::Suggestion(String::from("Reached end of file, is a `}` missing?"))
            }
            ErrorImpl::MismatchedParenthesis => {
                ErrorTip::Suggestion(String::from("Found `)` or `,` without a matching `(`"))
            }
            ErrorImpl::UnclosedParenthesis => {
                ErrorTip::Suggestion(String::from("Expression ended before `(` was closed"))
            }
            ErrorImpl::ExpectedSimpleIdentifier { identifier } => ErrorTip::Suggestion(format!(
                "`{}` cannot be bound here, use a name without `.`",
                identifier
            )),
            ErrorImpl::TooManyParameters { count } => ErrorTip::Suggestion(format!(
                "Functions take at most 255 parameters, found {}",
                count
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::FunctionAlreadyDeclared { function, arity } => ErrorTip::Suggestion(
                format!("Function `{}` taking {} arguments already declared", function, arity),
            ),
            ErrorImpl::GlobalAlreadyDeclared { global } => {
                ErrorTip::Suggestion(format!("Global `{}` already declared", global))
            }
            ErrorImpl::VariableAlreadyDeclared { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` already declared in this scope",
                variable
            )),
            ErrorImpl::UnresolvedIdentifier { identifier } => {
                ErrorTip::Suggestion(format!("Couldn't resolve `{}`", identifier))
            }
            ErrorImpl::ModuleNotFound { module } => {
                ErrorTip::Suggestion(format!("Module `{}` could not be found", module))
            }
            ErrorImpl::InvalidModuleName { name } => {
                ErrorTip::Suggestion(format!("`{}` is not a proper identifier", name))
            }
            ErrorImpl::CircularDependency { module } => ErrorTip::Suggestion(format!(
                "Module `{}` is still being compiled, imports form a cycle",
                module
            )),
            ErrorImpl::MissingBranchValue => ErrorTip::Suggestion(String::from(
                "Conditional used as a value needs an `else` and a value in every branch",
            )),
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Function `{}` does not return a value on every path",
                function
            )),
            ErrorImpl::InvalidBreak { amount, depth } => ErrorTip::Suggestion(format!(
                "Cannot break out of {} loops, only {} enclosing",
                amount, depth
            )),
            ErrorImpl::ContinueOutsideLoop => {
                ErrorTip::Suggestion(String::from("`continue` used outside of a loop"))
            }
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("unterminated block")]
    UnterminatedBlock,
    #[error("mismatched parenthesis")]
    MismatchedParenthesis,
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,
    #[error("expected simple identifier, found {identifier:?}")]
    ExpectedSimpleIdentifier { identifier: String },
    #[error("too many parameters: {count}")]
    TooManyParameters { count: usize },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("function {function:?} with {arity} parameters already declared")]
    FunctionAlreadyDeclared { function: String, arity: usize },
    #[error("global {global:?} already declared")]
    GlobalAlreadyDeclared { global: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("couldn't resolve identifier {identifier:?}")]
    UnresolvedIdentifier { identifier: String },
    #[error("module {module:?} could not be found")]
    ModuleNotFound { module: String },
    #[error("{name:?} is not a proper module name")]
    InvalidModuleName { name: String },
    #[error("circular dependency on module {module:?}")]
    CircularDependency { module: String },
    #[error("conditional expression branch has no value")]
    MissingBranchValue,
    #[error("function {function:?} does not return on all paths")]
    MissingReturn { function: String },
    #[error("cannot break {amount} loops from depth {depth}")]
    InvalidBreak { amount: usize, depth: usize },
    #[error("continue outside of a loop")]
    ContinueOutsideLoop,
}
