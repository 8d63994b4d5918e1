//! Unit tests for the parser module.
//!
//! Covers postfix expression layout, call arity, statements, items and the
//! syntax errors the parser reports.

use std::rc::Rc;

use crate::{
    ast::{
        ast::{Item, Module, ModulePath},
        expressions::{render, Expr, Op, Tok},
        statements::{Block, Statement},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> Result<Module, Error> {
    let tokens = tokenize(source, Some("test.eb".to_string()))?;
    parse(Rc::new(tokens), ModulePath::single("test"))
}

fn parse_body(body: &str) -> Block {
    let module = parse_source(&format!("fn test() {{\n{}\n}}", body)).unwrap();
    match module.items.into_iter().next() {
        Some(Item::Function(function)) => function.block,
        other => panic!("expected a function, got {:?}", other),
    }
}

fn parse_expression(source: &str) -> Expr {
    match parse_body(source).remove(0) {
        Statement::Expr(statement) => statement.expr,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn body_error(body: &str) -> Error {
    parse_source(&format!("fn test() {{\n{}\n}}", body)).unwrap_err()
}

/// Stack machine over the postfix sequence, booleans as 0 and 1.
fn evaluate(expr: &[Tok]) -> i64 {
    let mut stack: Vec<i64> = Vec::new();
    for tok in expr {
        match tok {
            Tok::Int { value, .. } => stack.push(*value as i64),
            Tok::Bool { value, .. } => stack.push(*value as i64),
            Tok::Op { op, .. } if op.arity() == 1 => {
                let a = stack.pop().unwrap();
                stack.push(match op {
                    Op::Neg => -a,
                    Op::Not => (a == 0) as i64,
                    other => panic!("unsupported {}", other),
                });
            }
            Tok::Op { op, .. } => {
                let b = stack.pop().unwrap();
                let a = stack.pop().unwrap();
                stack.push(match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div => a / b,
                    Op::Mod => a % b,
                    Op::Lsh => a << b,
                    Op::Rsh => a >> b,
                    Op::BAnd => a & b,
                    Op::BOr => a | b,
                    Op::Xor => a ^ b,
                    Op::Lt => (a < b) as i64,
                    Op::Gt => (a > b) as i64,
                    Op::Leq => (a <= b) as i64,
                    Op::Geq => (a >= b) as i64,
                    Op::Eq => (a == b) as i64,
                    Op::Neq => (a != b) as i64,
                    Op::And => (a != 0 && b != 0) as i64,
                    Op::Or => (a != 0 || b != 0) as i64,
                    other => panic!("unsupported {}", other),
                });
            }
            other => panic!("unexpected node {:?}", other),
        }
    }
    assert_eq!(stack.len(), 1, "postfix sequence must leave exactly one value");
    stack[0]
}

#[test]
fn test_parse_precedence() {
    assert_eq!(render(&parse_expression("1 + 2 * 3")), vec!["1", "2", "3", "mul", "add"]);
}

#[test]
fn test_parse_parentheses() {
    assert_eq!(render(&parse_expression("(1 + 2) * 3")), vec!["1", "2", "add", "3", "mul"]);
}

#[test]
fn test_parse_unary_disambiguation() {
    assert_eq!(
        render(&parse_expression("-1 - -2")),
        vec!["1", "neg", "2", "neg", "sub"]
    );
    assert_eq!(render(&parse_expression("/x")), vec!["x", "inv"]);
    assert_eq!(render(&parse_expression("a / b")), vec!["a", "b", "div"]);
}

#[test]
fn test_parse_logical_precedence() {
    assert_eq!(
        render(&parse_expression("a || b && c")),
        vec!["a", "b", "c", "and", "or"]
    );
    assert_eq!(render(&parse_expression("!a && b")), vec!["a", "not", "b", "and"]);
}

#[test]
fn test_parse_matches_reference_evaluation() {
    let cases: Vec<(&str, i64)> = vec![
        ("1 + 2 * 3", 1 + 2 * 3),
        ("(1 + 2) * 3", (1 + 2) * 3),
        ("10 - 4 - 3", (10 - 4) - 3),
        ("100 / 10 / 5", (100 / 10) / 5),
        ("2 * 3 % 4", (2 * 3) % 4),
        ("-2 * 3 + 1", (-2 * 3) + 1),
        ("- -3 - 1", 3 - 1),
        ("1 << 2 + 1", 1 << (2 + 1)),
        ("7 & 3 ^ 1 | 8", ((7 & 3) ^ 1) | 8),
        ("6 & 3 == 2", 6 & ((3 == 2) as i64)),
        ("1 + 2 < 4 == 2 > 1", ((1 + 2 < 4) == (2 > 1)) as i64),
        ("!(1 > 2) && 3 > 2 || 0 > 1", ((!(1 > 2) && 3 > 2) || 0 > 1) as i64),
        ("(((4))) - (2 - (1 - 3))", 4 - (2 - (1 - 3))),
    ];

    for (source, expected) in cases {
        assert_eq!(evaluate(&parse_expression(source)), expected, "{}", source);
    }
}

#[test]
fn test_parse_operator_keeps_own_token() {
    let tokens = Rc::new(tokenize("fn t() {\n1 - 2 * 3\n}", None).unwrap());
    let module = parse(Rc::clone(&tokens), ModulePath::single("t")).unwrap();
    let Some(Item::Function(function)) = module.items.first() else {
        panic!("expected a function");
    };
    let Statement::Expr(statement) = &function.block[0] else {
        panic!("expected an expression statement");
    };

    let sub = statement.expr.last().unwrap();
    assert_eq!(tokens[sub.token().index()].value, "-");
    let mul = &statement.expr[3];
    assert_eq!(tokens[mul.token().index()].value, "*");
}

#[test]
fn test_parse_call_arity() {
    let expr = parse_expression("f()");
    assert!(matches!(&expr[0], Tok::Call { arity: 0, .. }));

    let expr = parse_expression("f(1, 2, 3)");
    assert!(matches!(expr.last(), Some(Tok::Call { arity: 3, .. })));
    assert_eq!(render(&expr), vec!["1", "2", "3", "f/3"]);
}

#[test]
fn test_parse_nested_call_arity() {
    assert_eq!(
        render(&parse_expression("f(g(1, 2), h(), 3)")),
        vec!["1", "2", "g/2", "h/0", "3", "f/3"]
    );
    assert_eq!(
        render(&parse_expression("f(1 + 2, (3))")),
        vec!["1", "2", "add", "3", "f/2"]
    );
}

#[test]
fn test_parse_dotted_call_and_variable() {
    let expr = parse_expression("math.sqrt(2) + math.pi");
    assert_eq!(render(&expr), vec!["2", "math.sqrt/1", "math.pi", "add"]);
    match &expr[1] {
        Tok::Call { path, .. } => assert_eq!(path, &vec!["math".to_string(), "sqrt".to_string()]),
        other => panic!("expected a call, got {:?}", other),
    }
}

#[test]
fn test_parse_line_continuation() {
    assert_eq!(render(&parse_expression("1 +\n2")), vec!["1", "2", "add"]);
    assert_eq!(render(&parse_expression("f(\n1,\n2)")), vec!["1", "2", "f/2"]);
}

#[test]
fn test_parse_literal_types() {
    let expr = parse_expression("1u8 + 2.5 + true");
    assert!(matches!(expr[0], Tok::Int { value: 1, ty: Type::U8, .. }));
    assert!(matches!(expr[1], Tok::Float { ty: Type::Float, .. }));
    assert!(matches!(expr[3], Tok::Bool { value: true, .. }));
    assert!(matches!(expr[2], Tok::Op { op: Op::Add, ty: Type::Number, .. }));

    let expr = parse_expression("1 < 2");
    assert!(matches!(expr[2], Tok::Op { op: Op::Lt, ty: Type::Bool, .. }));
}

#[test]
fn test_parse_declarations() {
    let block = parse_body("x := 1\ny: i32 = 2\nz: bool");

    let Statement::Declaration(x) = &block[0] else { panic!() };
    assert_eq!(x.name, "x");
    assert_eq!(x.ty, None);
    assert_eq!(render(x.value.as_ref().unwrap()), vec!["1"]);

    let Statement::Declaration(y) = &block[1] else { panic!() };
    assert_eq!(y.ty, Some(Type::I32));

    let Statement::Declaration(z) = &block[2] else { panic!() };
    assert_eq!(z.ty, Some(Type::Bool));
    assert!(z.value.is_none());
}

#[test]
fn test_parse_compound_assignment() {
    let block = parse_body("x += 1 * 2\ny = 3");

    let Statement::Assignment(x) = &block[0] else { panic!() };
    assert_eq!(x.target.path, vec!["x".to_string()]);
    assert_eq!(render(&x.value), vec!["x", "1", "2", "mul", "add"]);

    let Statement::Assignment(y) = &block[1] else { panic!() };
    assert_eq!(render(&y.value), vec!["3"]);
}

#[test]
fn test_parse_if_statement_chain() {
    let block = parse_body("if a { f() }\nelse if b { g() } else { h() }");
    assert_eq!(block.len(), 1);

    let Statement::If(statement) = &block[0] else { panic!() };
    assert_eq!(render(&statement.condition), vec!["a"]);
    assert_eq!(statement.true_block.len(), 1);

    let Statement::If(else_if) = &statement.else_block[0] else { panic!() };
    assert_eq!(render(&else_if.condition), vec!["b"]);
    assert_eq!(else_if.else_block.len(), 1);
}

#[test]
fn test_parse_if_in_expression_position() {
    let block = parse_body("x := 1 + if a { 2 } else { 3 }");

    let Statement::Declaration(declaration) = &block[0] else { panic!() };
    let value = declaration.value.as_ref().unwrap();
    assert_eq!(render(value), vec!["1", "if", "add"]);
    assert!(matches!(&value[1], Tok::If { statement, .. } if statement.else_block.len() == 1));
}

#[test]
fn test_parse_loops() {
    let block = parse_body("while { break *2 }\nwhile i < 3 { continue }");

    let Statement::While(forever) = &block[0] else { panic!() };
    assert!(matches!(forever.condition.as_slice(), [Tok::Bool { value: true, .. }]));
    assert!(matches!(forever.block[0], Statement::Break(ref b) if b.amount == 2));

    let Statement::While(counted) = &block[1] else { panic!() };
    assert_eq!(render(&counted.condition), vec!["i", "3", "lt"]);
    assert!(matches!(counted.block[0], Statement::Continue(_)));
}

#[test]
fn test_parse_return() {
    let block = parse_body("return\nreturn 1 + 2");

    let Statement::Return(bare) = &block[0] else { panic!() };
    assert!(bare.value.is_empty());
    let Statement::Return(value) = &block[1] else { panic!() };
    assert_eq!(render(&value.value), vec!["1", "2", "add"]);
}

#[test]
fn test_parse_items() {
    let module = parse_source(
        "import std.io\nimport std.math.[sin, cos]\nmod util\n\
         pub global counter: i64\nconst limit: u32\n\
         pub fn add(a: i32, b: i32): i32 {\nreturn a + b\n}\nfn main() {}",
    )
    .unwrap();

    assert_eq!(module.items.len(), 7);

    let Item::Import(plain) = &module.items[0] else { panic!() };
    assert_eq!(plain.target, ModulePath::from("std.io"));
    assert!(plain.selected.is_empty());

    let Item::Import(selective) = &module.items[1] else { panic!() };
    assert_eq!(selective.target, ModulePath::from("std.math"));
    let names: Vec<&str> = selective.selected.iter().map(|(_, n)| n.as_str()).collect();
    assert_eq!(names, vec!["sin", "cos"]);

    assert!(matches!(&module.items[2], Item::SubModule(s) if s.name == "util"));

    let Item::Global(counter) = &module.items[3] else { panic!() };
    assert!(counter.public && counter.mutable);
    assert_eq!(counter.ty, Type::I64);
    let Item::Global(limit) = &module.items[4] else { panic!() };
    assert!(!limit.public && !limit.mutable);

    let add = module.function("add", 2).unwrap();
    assert!(add.public);
    assert_eq!(add.return_type, Type::I32);
    assert_eq!(add.params[1].name, "b");

    let main = module.function("main", 0).unwrap();
    assert_eq!(main.return_type, Type::Void);
    assert!(main.block.is_empty());
}

#[test]
fn test_parse_error_value_after_value() {
    let error = body_error("1 2");
    assert_eq!(error.kind(), ErrorKind::Syntax);
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { message, .. } if message == "expected an operator"
    ));
}

#[test]
fn test_parse_error_missing_operand() {
    let error = body_error("1 +");
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { message, .. } if message == "expected an operand"
    ));
    assert_eq!(body_error("* 2").get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(body_error("f(1, )").get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_error_parentheses() {
    assert_eq!(body_error("(1 + 2").get_impl(), &ErrorImpl::UnclosedParenthesis);
    assert_eq!(body_error("1 + 2)").get_impl(), &ErrorImpl::MismatchedParenthesis);
    assert_eq!(body_error("a, b").get_impl(), &ErrorImpl::MismatchedParenthesis);
    assert_eq!(body_error("(a, b)").get_impl(), &ErrorImpl::MismatchedParenthesis);
}

#[test]
fn test_parse_error_binding_identifier() {
    let error = parse_source("fn a.b() {}").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::ExpectedSimpleIdentifier {
            identifier: "a.b".to_string()
        }
    );
    assert_eq!(body_error("a.b := 1").get_error_name(), "ExpectedSimpleIdentifier");
}

#[test]
fn test_parse_error_unknown_type() {
    let error = parse_source("fn f(a: i33) {}").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnknownType {
            type_: "i33".to_string()
        }
    );
}

#[test]
fn test_parse_error_unterminated_block() {
    let error = parse_source("fn f() {\nx := 1\n").unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::UnterminatedBlock);
}

#[test]
fn test_parse_error_too_many_parameters() {
    let params: Vec<String> = (0..256).map(|i| format!("p{}: i32", i)).collect();
    let error = parse_source(&format!("fn f({}) {{}}", params.join(", "))).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::TooManyParameters { count: 256 });

    let params: Vec<String> = (0..255).map(|i| format!("p{}: i32", i)).collect();
    assert!(parse_source(&format!("fn f({}) {{}}", params.join(", "))).is_ok());
}

#[test]
fn test_parse_error_unexpected_item() {
    let error = parse_source("x := 1").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.get_position().0, 0);
}
