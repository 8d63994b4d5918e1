use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Function, Global, Import, Item, Module, ModulePath, SubModule, Symbols, TokenId},
        expressions::{Binding, Expr, FunctionRef, Tok},
        statements::{Block, Statement},
    },
    compiler::compiler::Compiler,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::Token,
    Position,
};

use super::state::State;

/// Binds every identifier of one module. The module is owned by the caller
/// while it is being resolved; every other module is reached through the
/// compiler's registry.
pub struct Resolver<'a> {
    compiler: &'a mut Compiler,
    module: &'a mut Module,
    tokens: &'a [Token],
    state: State,
}

/// Declares the items of `module`, compiles what it imports and resolves the
/// bodies of its functions.
pub fn resolve_module(
    compiler: &mut Compiler,
    module: &mut Module,
    tokens: &[Token],
) -> Result<(), Error> {
    let mut items = std::mem::take(&mut module.items);
    let mut resolver = Resolver {
        compiler,
        module,
        tokens,
        state: State::new(),
    };

    let result = resolver
        .declare_items(&mut items)
        .and_then(|_| resolver.resolve_functions(&mut items));
    resolver.module.items = items;
    result?;

    debug!(
        module = %resolver.module.path,
        functions = resolver.module.symbols.function_count(),
        external_globals = resolver.module.symbols.external_globals().len(),
        "resolved symbols"
    );
    Ok(())
}

impl<'a> Resolver<'a> {
    fn position(&self, token: TokenId) -> Position {
        self.tokens[token.index()].span.start.clone()
    }

    fn error_at(&self, token: TokenId, error: ErrorImpl) -> Error {
        Error::new(error, self.position(token))
    }

    fn unresolved(&self, token: TokenId, path: &[String]) -> Error {
        self.error_at(
            token,
            ErrorImpl::UnresolvedIdentifier {
                identifier: path.join("."),
            },
        )
    }

    /// Imports, submodules and declarations. Runs before any body so calls
    /// may name functions declared further down the file.
    fn declare_items(&mut self, items: &mut [Item]) -> Result<(), Error> {
        let own = self.module.path.clone();
        self.module.symbols.add_import(own.clone(), own);

        for item in items.iter_mut() {
            match item {
                Item::Import(import) => self.declare_import(import)?,
                Item::SubModule(submodule) => self.declare_submodule(submodule)?,
                Item::Global(global) => self.declare_global(global)?,
                Item::Function(function) => self.declare_function(function)?,
            }
        }
        Ok(())
    }

    fn declare_import(&mut self, import: &Import) -> Result<(), Error> {
        self.import(&import.target, import.target.clone(), import.token)?;

        for (token, name) in &import.selected {
            let exported = self.compiler.module(&import.target).is_some_and(|module| {
                module
                    .symbols
                    .get_global(name)
                    .is_some_and(|global| global.public)
                    || module.symbols.has_function_named(name, true)
            });
            if !exported {
                let mut path = import.target.segments().to_vec();
                path.push(name.clone());
                return Err(self.unresolved(*token, &path));
            }
        }
        Ok(())
    }

    fn declare_submodule(&mut self, submodule: &SubModule) -> Result<(), Error> {
        let target = self.module.path.child(&submodule.name);
        self.import(&target, ModulePath::single(&submodule.name), submodule.token)
    }

    fn declare_global(&mut self, global: &mut Global) -> Result<(), Error> {
        let reference = self.module.symbols.declare_global(
            &self.module.path,
            &global.name,
            global.ty.clone(),
            global.mutable,
            global.public,
        );
        let Some(reference) = reference else {
            return Err(self.error_at(
                global.token,
                ErrorImpl::GlobalAlreadyDeclared {
                    global: global.name.clone(),
                },
            ));
        };

        global.unique_name = Some(reference.unique_name());
        Ok(())
    }

    fn declare_function(&mut self, function: &mut Function) -> Result<(), Error> {
        let reference = self.module.symbols.declare_function(
            &self.module.path,
            &function.name,
            function.arity(),
            function.public,
        );
        let Some(reference) = reference else {
            return Err(self.error_at(
                function.token,
                ErrorImpl::FunctionAlreadyDeclared {
                    function: function.name.clone(),
                    arity: function.arity(),
                },
            ));
        };

        function.index = reference.index;
        function.unique_name = Some(reference.unique_name());
        Ok(())
    }

    /// Compiles `target` if needed and makes it reachable under `alias`.
    fn import(&mut self, target: &ModulePath, alias: ModulePath, token: TokenId) -> Result<(), Error> {
        debug!(from = %self.module.path, to = %target, "import");
        let position = self.position(token);
        self.compiler.require(target, position)?;
        self.module.symbols.add_import(alias, target.clone());
        Ok(())
    }

    fn resolve_functions(&mut self, items: &mut [Item]) -> Result<(), Error> {
        for item in items.iter_mut() {
            if let Item::Function(function) = item {
                self.resolve_function(function)?;
            }
        }
        Ok(())
    }

    fn resolve_function(&mut self, function: &mut Function) -> Result<(), Error> {
        self.state.begin_function();
        for param in &function.params {
            if self
                .state
                .declare(&param.name, Some(param.ty.clone()), true)
                .is_none()
            {
                return Err(self.error_at(
                    param.token,
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: param.name.clone(),
                    },
                ));
            }
        }

        self.resolve_statements(&mut function.block)?;
        function.locals = self.state.finish_function();
        Ok(())
    }

    /// Resolves a block in the current scope. Child blocks get their own.
    fn resolve_statements(&mut self, block: &mut Block) -> Result<(), Error> {
        for statement in block.iter_mut() {
            self.resolve_statement(statement)?;
        }
        Ok(())
    }

    fn resolve_statement(&mut self, statement: &mut Statement) -> Result<(), Error> {
        if let Some(expr) = statement.expr_mut() {
            self.resolve_expr(expr)?;
        }

        match statement {
            Statement::Declaration(declaration) => {
                let Some(id) = self
                    .state
                    .declare(&declaration.name, declaration.ty.clone(), false)
                else {
                    return Err(self.error_at(
                        declaration.token,
                        ErrorImpl::VariableAlreadyDeclared {
                            variable: declaration.name.clone(),
                        },
                    ));
                };
                declaration.local = Some(id);
            }
            Statement::Assignment(assignment) => {
                let binding = self.resolve_variable(assignment.target.token, &assignment.target.path)?;
                assignment.target.binding = Some(binding);
            }
            _ => {}
        }

        for block in statement.blocks_mut() {
            self.state.descend();
            let result = self.resolve_statements(block);
            self.state.ascend();
            result?;
        }
        Ok(())
    }

    fn resolve_expr(&mut self, expr: &mut Expr) -> Result<(), Error> {
        for tok in expr.iter_mut() {
            match tok {
                Tok::Var {
                    token,
                    path,
                    binding,
                } => {
                    *binding = Some(self.resolve_variable(*token, path)?);
                }
                Tok::Call {
                    token,
                    path,
                    arity,
                    candidates,
                } => {
                    *candidates = self.resolve_call(*token, path, *arity)?;
                    trace!(call = %path.join("."), candidates = candidates.len(), "resolved call");
                }
                Tok::If { statement, .. } => {
                    // Normally hoisted away before resolution
                    let statement = statement.as_mut();
                    self.resolve_expr(&mut statement.condition)?;
                    for block in [&mut statement.true_block, &mut statement.else_block] {
                        self.state.descend();
                        let result = self.resolve_statements(block);
                        self.state.ascend();
                        result?;
                    }
                }
                Tok::Int { .. } | Tok::Float { .. } | Tok::Bool { .. } | Tok::Op { .. } => {}
            }
        }
        Ok(())
    }

    /// A single segment is a local or one of this module's globals. More
    /// segments name a global of another module.
    fn resolve_variable(&mut self, token: TokenId, path: &[String]) -> Result<Binding, Error> {
        let Some((name, prefix)) = path.split_last() else {
            return Err(self.unresolved(token, path));
        };

        if prefix.is_empty() {
            if let Some(id) = self.state.get_var(name) {
                return Ok(Binding::Local(id));
            }
            return match self.module.symbols.get_global(name) {
                Some(global) => Ok(Binding::Global(global.reference.clone())),
                None => Err(self.unresolved(token, path)),
            };
        }

        let target = self.target_module(prefix, token)?;
        let is_own = target == self.module.path;
        let reference = self
            .symbols_of(&target)
            .and_then(|symbols| symbols.get_global(name))
            .filter(|global| is_own || global.public)
            .map(|global| global.reference.clone());

        match reference {
            Some(reference) => {
                if !is_own {
                    self.module.symbols.add_external_global(reference.clone());
                }
                Ok(Binding::Global(reference))
            }
            None => Err(self.unresolved(token, path)),
        }
    }

    /// Candidate overloads for a call. Picking one is left to type checking.
    fn resolve_call(
        &mut self,
        token: TokenId,
        path: &[String],
        arity: usize,
    ) -> Result<Vec<FunctionRef>, Error> {
        let Some((name, prefix)) = path.split_last() else {
            return Err(self.unresolved(token, path));
        };

        let candidates: Vec<FunctionRef> = if prefix.is_empty() {
            self.module
                .symbols
                .get_functions(name, arity)
                .iter()
                .map(|symbol| symbol.reference.clone())
                .collect()
        } else {
            let target = self.target_module(prefix, token)?;
            let is_own = target == self.module.path;
            self.symbols_of(&target)
                .map(|symbols| {
                    symbols
                        .get_functions(name, arity)
                        .iter()
                        .filter(|symbol| is_own || symbol.public)
                        .map(|symbol| symbol.reference.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        if candidates.is_empty() {
            return Err(self.unresolved(token, path));
        }
        Ok(candidates)
    }

    /// Module named by the leading segments of a dotted identifier, imported
    /// on demand when it isn't in the import table yet.
    fn target_module(&mut self, prefix: &[String], token: TokenId) -> Result<ModulePath, Error> {
        let alias = ModulePath::new(prefix.to_vec());
        if let Some(target) = self.module.symbols.search(&alias) {
            return Ok(target.clone());
        }

        self.import(&alias, alias.clone(), token)?;
        Ok(alias)
    }

    fn symbols_of(&self, path: &ModulePath) -> Option<&Symbols> {
        if *path == self.module.path {
            return Some(&self.module.symbols);
        }
        self.compiler.module(path).map(|module| &module.symbols)
    }
}
