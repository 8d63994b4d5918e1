use std::rc::Rc;

use crate::{
    ast::{
        ast::{Module, ModulePath},
        expressions::{render, Tok},
        statements::{Block, Statement},
    },
    circuiter::circuiter::lower_module,
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

use super::normalizer::normalize_module;

fn normalize_source(source: &str) -> Result<Module, Error> {
    let tokens = Rc::new(tokenize(source, Some("test.eb".to_string()))?);
    let mut module = parse(Rc::clone(&tokens), ModulePath::single("test"))?;
    lower_module(&mut module);
    normalize_module(&mut module, &tokens)?;
    Ok(module)
}

fn normalized_body(body: &str) -> Block {
    let module = normalize_source(&format!("fn test() {{\n{}\n}}", body)).unwrap();
    module.function("test", 0).unwrap().block.clone()
}

fn body_error(body: &str) -> Error {
    normalize_source(&format!("fn test() {{\n{}\n}}", body)).unwrap_err()
}

fn declared(statement: &Statement) -> (&str, Option<Vec<String>>) {
    match statement {
        Statement::Declaration(declaration) => (
            declaration.name.as_str(),
            declaration.value.as_ref().map(|value| render(value)),
        ),
        other => panic!("expected a declaration, got {:?}", other),
    }
}

fn assigned(block: &Block) -> (String, Vec<String>) {
    match block.last() {
        Some(Statement::Assignment(assignment)) => {
            (assignment.target.path.join("."), render(&assignment.value))
        }
        other => panic!("expected an assignment, got {:?}", other),
    }
}

#[test]
fn test_hoist_conditional_expression() {
    let block = normalized_body("x := 1 + if a { 2 } else { 3 }");
    assert_eq!(block.len(), 3);

    assert_eq!(declared(&block[0]), ("$0", None));
    let Statement::If(statement) = &block[1] else {
        panic!("expected an if statement");
    };
    assert_eq!(render(&statement.condition), vec!["a"]);
    assert_eq!(assigned(&statement.true_block), ("$0".to_string(), vec!["2".to_string()]));
    assert_eq!(assigned(&statement.else_block), ("$0".to_string(), vec!["3".to_string()]));

    assert_eq!(
        declared(&block[2]),
        ("x", Some(vec!["1".to_string(), "$0".to_string(), "add".to_string()]))
    );
}

#[test]
fn test_hoist_spills_earlier_operands() {
    let block = normalized_body("x := f() + if a { 1 } else { 2 }");

    assert_eq!(declared(&block[0]), ("$0", Some(vec!["f/0".to_string()])));
    assert_eq!(declared(&block[1]), ("$1", None));
    assert!(matches!(block[2], Statement::If(_)));
    assert_eq!(
        declared(&block[3]),
        ("x", Some(vec!["$0".to_string(), "$1".to_string(), "add".to_string()]))
    );
}

#[test]
fn test_hoist_else_if_chain() {
    let block = normalized_body("x := if a { 1 } else if b { 2 } else { 3 }");

    let Statement::If(outer) = &block[1] else {
        panic!("expected an if statement");
    };
    let Some(Statement::If(inner)) = outer.else_block.last() else {
        panic!("expected a nested if");
    };
    assert_eq!(assigned(&inner.true_block).1, vec!["2"]);
    assert_eq!(assigned(&inner.else_block).1, vec!["3"]);
}

#[test]
fn test_short_circuit_statement_drops_value() {
    let block = normalized_body("a || f()");
    assert_eq!(block.len(), 1);

    let Statement::If(statement) = &block[0] else {
        panic!("expected an if statement");
    };
    assert!(matches!(statement.else_block[0], Statement::Expr(_)));
}

#[test]
fn test_while_condition_reevaluated_each_iteration() {
    let block = normalized_body("while a || f() {\ng()\n}");

    let Statement::While(looped) = &block[0] else {
        panic!("expected a loop");
    };
    assert!(matches!(looped.condition.as_slice(), [Tok::Bool { value: true, .. }]));
    assert_eq!(declared(&looped.block[0]), ("$0", None));
    assert!(matches!(looped.block[1], Statement::If(_)));

    let Statement::If(exit) = &looped.block[2] else {
        panic!("expected the loop exit");
    };
    assert_eq!(render(&exit.condition), vec!["$0", "not"]);
    assert!(matches!(exit.true_block.as_slice(), [Statement::Break(b)] if b.amount == 1));
    assert!(matches!(looped.block[3], Statement::Expr(_)));
}

#[test]
fn test_missing_branch_value() {
    assert_eq!(body_error("x := if a { 1 }").get_impl(), &ErrorImpl::MissingBranchValue);
    assert_eq!(
        body_error("x := if a { y := 1 } else { 2 }").get_impl(),
        &ErrorImpl::MissingBranchValue
    );
    assert_eq!(body_error("x := if a { 1 } else {}").kind(), ErrorKind::ControlFlow);
}

#[test]
fn test_diverging_branch_needs_no_value() {
    let block = normalized_body("x := if a { 1 } else { return }");
    let Statement::If(statement) = &block[1] else {
        panic!("expected an if statement");
    };
    assert!(matches!(statement.else_block.as_slice(), [Statement::Return(_)]));
    assert!(statement.else_returns);
    assert!(!statement.true_returns);
}

#[test]
fn test_break_and_continue_checks() {
    assert!(normalize_source("fn f() {\nwhile {\nwhile { break *2 }\n}\n}").is_ok());
    assert_eq!(
        body_error("while { break *2 }").get_impl(),
        &ErrorImpl::InvalidBreak {
            amount: 2,
            depth: 1
        }
    );
    assert_eq!(
        body_error("break").get_impl(),
        &ErrorImpl::InvalidBreak {
            amount: 1,
            depth: 0
        }
    );
    assert_eq!(
        body_error("while { break *0 }").get_impl(),
        &ErrorImpl::InvalidBreak {
            amount: 0,
            depth: 1
        }
    );
    assert_eq!(body_error("continue").get_impl(), &ErrorImpl::ContinueOutsideLoop);
}

#[test]
fn test_implicit_return() {
    let module = normalize_source("fn f(): i32 {\n1\n}").unwrap();
    let block = &module.function("f", 0).unwrap().block;
    assert!(matches!(block.as_slice(), [Statement::Return(r)] if render(&r.value) == vec!["1"]));
}

#[test]
fn test_implicit_return_through_if_tail() {
    let module = normalize_source("fn f(a: bool): i32 {\nif a { 1 } else { 2 }\n}").unwrap();
    let Statement::If(statement) = &module.function("f", 1).unwrap().block[0] else {
        panic!("expected an if statement");
    };
    assert!(statement.true_returns && statement.else_returns);
}

#[test]
fn test_implicit_return_of_conditional_value() {
    let module = normalize_source("fn f(a: bool): i32 {\n1 + if a { 2 } else { 3 }\n}").unwrap();
    let block = &module.function("f", 1).unwrap().block;

    assert_eq!(block.len(), 3);
    let Statement::Return(statement) = &block[2] else {
        panic!("expected a return");
    };
    assert_eq!(render(&statement.value), vec!["1", "$0", "add"]);
}

#[test]
fn test_missing_return() {
    let error = normalize_source("fn f(a: bool): i32 {\nif a { return 1 }\n}").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::MissingReturn {
            function: "f".to_string()
        }
    );

    assert!(normalize_source("fn g() {\nx := 1\n}").is_ok());
}
