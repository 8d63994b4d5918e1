use rustc_hash::FxHashMap;

use crate::ast::{ast::Variable, expressions::LocalId, types::Type};

/// Names visible in one block.
#[derive(Debug, Default)]
pub struct Scope {
    variables: FxHashMap<String, LocalId>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<LocalId> {
        self.variables.get(name).copied()
    }
}

/// Lexical scope stack of the function being resolved, along with every
/// local it has declared so far.
#[derive(Debug, Default)]
pub struct State {
    scopes: Vec<Scope>,
    locals: Vec<Variable>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    /// Starts a new function with one open scope holding its parameters and
    /// the top level of its body.
    pub fn begin_function(&mut self) {
        self.scopes.clear();
        self.locals.clear();
        self.descend();
    }

    /// Hands out the locals table and closes every scope.
    pub fn finish_function(&mut self) -> Vec<Variable> {
        self.scopes.clear();
        std::mem::take(&mut self.locals)
    }

    pub fn descend(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn ascend(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares a local in the innermost scope. Returns `None` when that
    /// scope already holds the name; outer scopes may be shadowed.
    pub fn declare(&mut self, name: &str, ty: Option<Type>, is_param: bool) -> Option<LocalId> {
        let scope = self.scopes.last_mut()?;
        if scope.variables.contains_key(name) {
            return None;
        }

        let id = LocalId(self.locals.len());
        self.locals.push(Variable {
            name: name.to_string(),
            ty,
            is_param,
        });
        scope.variables.insert(name.to_string(), id);
        Some(id)
    }

    /// Innermost local named `name`.
    pub fn get_var(&self, name: &str) -> Option<LocalId> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn local(&self, id: LocalId) -> Option<&Variable> {
        self.locals.get(id.0)
    }
}
