use crate::{
    ast::{
        ast::{Function, ModulePath},
        expressions::{Binding, GlobalRef, LocalId, Tok},
        statements::Statement,
        types::Type,
    },
    compiler::{compiler::Compiler, registry::MemoryLoader},
    errors::errors::{Error, ErrorImpl, ErrorKind},
};

use super::state::State;

fn compile(source: &str) -> Result<Compiler, Error> {
    let mut compiler = Compiler::new(Box::new(MemoryLoader::new().with("test", source)));
    compiler.compile_entry(&ModulePath::single("test"))?;
    Ok(compiler)
}

fn function<'a>(compiler: &'a Compiler, name: &str, arity: usize) -> &'a Function {
    compiler
        .module(&ModulePath::single("test"))
        .and_then(|module| module.function(name, arity))
        .unwrap()
}

fn binding(tok: &Tok) -> &Binding {
    match tok {
        Tok::Var {
            binding: Some(binding),
            ..
        } => binding,
        other => panic!("expected a resolved variable, got {:?}", other),
    }
}

fn unresolved(identifier: &str) -> ErrorImpl {
    ErrorImpl::UnresolvedIdentifier {
        identifier: identifier.to_string(),
    }
}

#[test]
fn test_state_scopes() {
    let mut state = State::new();
    state.begin_function();
    let outer = state.declare("x", Some(Type::I32), true).unwrap();
    assert!(state.declare("x", None, false).is_none());

    state.descend();
    let inner = state.declare("x", None, false).unwrap();
    assert_eq!(state.get_var("x"), Some(inner));
    assert_eq!(state.depth(), 2);
    state.ascend();

    assert_eq!(state.get_var("x"), Some(outer));
    assert!(state.local(outer).unwrap().is_param);
    assert_eq!(state.finish_function().len(), 2);
    assert_eq!(state.get_var("x"), None);
}

#[test]
fn test_locals_and_shadowing() {
    let compiler = compile(
        "fn f(a: i32): i32 {\n\
         x := a\n\
         if a > 0 {\n\
         x := 2\n\
         }\n\
         return x\n\
         }",
    )
    .unwrap();
    let function = function(&compiler, "f", 1);

    let names: Vec<_> = function.locals.iter().map(|local| local.name.as_str()).collect();
    assert_eq!(names, vec!["a", "x", "x"]);
    assert!(function.locals[0].is_param);
    assert_eq!(function.locals[0].ty, Some(Type::I32));

    let Statement::Declaration(declaration) = &function.block[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(declaration.local, Some(LocalId(1)));
    assert_eq!(
        binding(&declaration.value.as_ref().unwrap()[0]),
        &Binding::Local(LocalId(0))
    );

    let Statement::If(statement) = &function.block[1] else {
        panic!("expected an if statement");
    };
    let Statement::Declaration(inner) = &statement.true_block[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(inner.local, Some(LocalId(2)));

    let Statement::Return(statement) = &function.block[2] else {
        panic!("expected a return");
    };
    assert_eq!(binding(&statement.value[0]), &Binding::Local(LocalId(1)));
}

#[test]
fn test_redeclare_in_same_scope() {
    let error = compile("fn f() {\nx := 1\nx := 2\n}").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::VariableAlreadyDeclared {
            variable: "x".to_string()
        }
    );
    assert_eq!(error.kind(), ErrorKind::Declaration);

    assert!(compile("fn f(a: i32) {\na := 1\n}").is_err());
    assert!(compile("fn f(a: i32, a: i64) {}").is_err());
}

#[test]
fn test_initializer_resolved_before_declaration() {
    let error = compile("fn f() {\nx := x\n}").unwrap_err();
    assert_eq!(error.get_impl(), &unresolved("x"));

    let compiler = compile("global x: i32\nfn f() {\nx := x\n}").unwrap();
    let Statement::Declaration(declaration) = &function(&compiler, "f", 0).block[0] else {
        panic!("expected a declaration");
    };
    assert!(matches!(
        binding(&declaration.value.as_ref().unwrap()[0]),
        Binding::Global(_)
    ));
}

#[test]
fn test_globals() {
    let compiler = compile("global count: i32\nfn f() {\ncount = 1\n}").unwrap();
    let module = compiler.module(&ModulePath::single("test")).unwrap();

    let global = module.globals().next().unwrap();
    assert_eq!(global.unique_name.as_deref(), Some("test.count"));

    let Statement::Assignment(assignment) = &function(&compiler, "f", 0).block[0] else {
        panic!("expected an assignment");
    };
    assert_eq!(
        assignment.target.binding,
        Some(Binding::Global(GlobalRef {
            module: ModulePath::single("test"),
            name: "count".to_string()
        }))
    );

    let error = compile("global count: i32\nconst count: i64").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::GlobalAlreadyDeclared {
            global: "count".to_string()
        }
    );
}

#[test]
fn test_overloads_and_mangled_names() {
    let compiler = compile(
        "fn foo(a: i32) {}\n\
         fn foo(a: i32, b: i32) {}\n\
         fn foo() {}\n\
         fn main() {\n\
         foo(1, 2)\n\
         }",
    )
    .unwrap();

    assert_eq!(function(&compiler, "foo", 1).unique_name.as_deref(), Some("test.foo.1.0"));
    assert_eq!(function(&compiler, "foo", 2).unique_name.as_deref(), Some("test.foo.2.1"));
    assert_eq!(function(&compiler, "foo", 0).unique_name.as_deref(), Some("test.foo.0.2"));
    assert_eq!(function(&compiler, "foo", 0).index, 2);

    let Statement::Expr(statement) = &function(&compiler, "main", 0).block[0] else {
        panic!("expected an expression statement");
    };
    let Some(Tok::Call { candidates, .. }) = statement.expr.last() else {
        panic!("expected a call");
    };
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].unique_name(), "test.foo.2.1");
}

#[test]
fn test_duplicate_function() {
    let error = compile("fn foo(a: i32) {}\nfn foo(b: i64) {}").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::FunctionAlreadyDeclared {
            function: "foo".to_string(),
            arity: 1
        }
    );
    assert_eq!(error.kind(), ErrorKind::Declaration);
}

#[test]
fn test_calls_see_later_declarations() {
    assert!(compile("fn a() {\nb()\n}\nfn b() {}").is_ok());
}

#[test]
fn test_unresolved_calls() {
    assert_eq!(compile("fn f() {\ng()\n}").unwrap_err().get_impl(), &unresolved("g"));

    let error = compile("fn f() {\nf(1)\n}").unwrap_err();
    assert_eq!(error.get_impl(), &unresolved("f"));
    assert_eq!(error.kind(), ErrorKind::Resolution);
}

#[test]
fn test_own_path_reaches_private_items() {
    let compiler = compile("global g: i32\nfn h() {}\nfn f() {\nx := test.g\ntest.h()\n}").unwrap();
    let module = compiler.module(&ModulePath::single("test")).unwrap();
    assert!(module.symbols.external_globals().is_empty());

    let Statement::Declaration(declaration) = &function(&compiler, "f", 0).block[0] else {
        panic!("expected a declaration");
    };
    assert!(matches!(
        binding(&declaration.value.as_ref().unwrap()[0]),
        Binding::Global(GlobalRef { name, .. }) if name == "g"
    ));
}

#[test]
fn test_hoisted_temporaries_resolve() {
    let compiler = compile("fn f(a: bool): i32 {\nreturn 1 + if a { 2 } else { 3 }\n}").unwrap();
    let function = function(&compiler, "f", 1);
    assert_eq!(function.locals[1].name, "$0");

    let Statement::If(statement) = &function.block[1] else {
        panic!("expected an if statement");
    };
    let Some(Statement::Assignment(assignment)) = statement.true_block.last() else {
        panic!("expected an assignment");
    };
    assert_eq!(assignment.target.binding, Some(Binding::Local(LocalId(1))));
}
