use std::fmt::Display;

use rustc_hash::FxHashMap;

use super::{
    expressions::{FunctionRef, GlobalRef},
    statements::Block,
    types::Type,
};

/// Index of a token in its file's token buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(pub u32);

impl TokenId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dotted module path, `a.b.c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ModulePath(pub Vec<String>);

impl ModulePath {
    pub fn new(segments: Vec<String>) -> Self {
        ModulePath(segments)
    }

    pub fn single(name: &str) -> Self {
        ModulePath(vec![name.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        ModulePath(segments)
    }
}

impl From<&str> for ModulePath {
    fn from(value: &str) -> Self {
        ModulePath(value.split('.').map(String::from).collect())
    }
}

impl Display for ModulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub token: TokenId,
    pub name: String,
    pub ty: Type,
}

/// Local slot of a function: parameters first, then every declaration in
/// source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Option<Type>,
    pub is_param: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub token: TokenId,
    pub name: String,
    pub public: bool,
    pub params: Vec<Param>,
    pub return_type: Type,
    /// Ordinal among the module's functions sharing this name. Set by the resolver.
    pub index: usize,
    pub unique_name: Option<String>,
    pub locals: Vec<Variable>,
    pub block: Block,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub token: TokenId,
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub public: bool,
    pub unique_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub token: TokenId,
    pub target: ModulePath,
    /// Names listed in `import a.b.[x, y]`, empty for a plain import.
    pub selected: Vec<(TokenId, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubModule {
    pub token: TokenId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(Function),
    Global(Global),
    Import(Import),
    SubModule(SubModule),
}

impl Item {
    pub fn token(&self) -> TokenId {
        match self {
            Item::Function(Function { token, .. })
            | Item::Global(Global { token, .. })
            | Item::Import(Import { token, .. })
            | Item::SubModule(SubModule { token, .. }) => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub reference: FunctionRef,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSymbol {
    pub reference: GlobalRef,
    pub ty: Type,
    pub mutable: bool,
    pub public: bool,
}

/// Per-module symbol tables, filled by the resolver.
#[derive(Debug, Clone, Default)]
pub struct Symbols {
    functions: FxHashMap<(String, usize), Vec<FunctionSymbol>>,
    name_counts: FxHashMap<String, usize>,
    globals: FxHashMap<String, GlobalSymbol>,
    imports: FxHashMap<ModulePath, ModulePath>,
    external_globals: Vec<GlobalRef>,
}

impl Symbols {
    /// Declares a function overload. Returns `None` when the module already
    /// holds a function with this name and arity.
    pub fn declare_function(
        &mut self,
        module: &ModulePath,
        name: &str,
        arity: usize,
        public: bool,
    ) -> Option<FunctionRef> {
        let key = (name.to_string(), arity);
        if self.functions.get(&key).is_some_and(|list| !list.is_empty()) {
            return None;
        }

        let count = self.name_counts.entry(name.to_string()).or_insert(0);
        let reference = FunctionRef {
            module: module.clone(),
            name: name.to_string(),
            arity,
            index: *count,
        };
        *count += 1;

        self.functions.entry(key).or_default().push(FunctionSymbol {
            reference: reference.clone(),
            public,
        });
        Some(reference)
    }

    pub fn get_functions(&self, name: &str, arity: usize) -> &[FunctionSymbol] {
        self.functions
            .get(&(name.to_string(), arity))
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any overload of `name` exists, optionally restricted to public ones.
    pub fn has_function_named(&self, name: &str, public_only: bool) -> bool {
        self.functions
            .iter()
            .filter(|((fn_name, _), _)| fn_name == name)
            .flat_map(|(_, list)| list.iter())
            .any(|symbol| symbol.public || !public_only)
    }

    pub fn function_count(&self) -> usize {
        self.functions.values().map(|list| list.len()).sum()
    }

    /// Declares a global. Returns `None` when the name is taken.
    pub fn declare_global(
        &mut self,
        module: &ModulePath,
        name: &str,
        ty: Type,
        mutable: bool,
        public: bool,
    ) -> Option<GlobalRef> {
        if self.globals.contains_key(name) {
            return None;
        }

        let reference = GlobalRef {
            module: module.clone(),
            name: name.to_string(),
        };
        self.globals.insert(
            name.to_string(),
            GlobalSymbol {
                reference: reference.clone(),
                ty,
                mutable,
                public,
            },
        );
        Some(reference)
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalSymbol> {
        self.globals.get(name)
    }

    pub fn add_import(&mut self, alias: ModulePath, target: ModulePath) {
        self.imports.insert(alias, target);
    }

    /// Target module of an import alias.
    pub fn search(&self, alias: &ModulePath) -> Option<&ModulePath> {
        self.imports.get(alias)
    }

    pub fn add_external_global(&mut self, reference: GlobalRef) {
        if !self.external_globals.contains(&reference) {
            self.external_globals.push(reference);
        }
    }

    pub fn external_globals(&self) -> &[GlobalRef] {
        &self.external_globals
    }
}

/// Parsed items of one file together with the symbols declared from them.
#[derive(Debug, Clone)]
pub struct Module {
    pub path: ModulePath,
    pub items: Vec<Item>,
    pub symbols: Symbols,
}

impl Module {
    pub fn new(path: ModulePath, items: Vec<Item>) -> Self {
        Module {
            path,
            items,
            symbols: Symbols::default(),
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut Function> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn globals(&self) -> impl Iterator<Item = &Global> {
        self.items.iter().filter_map(|item| match item {
            Item::Global(global) => Some(global),
            _ => None,
        })
    }

    /// First function with this name and arity, in source order.
    pub fn function(&self, name: &str, arity: usize) -> Option<&Function> {
        self.functions()
            .find(|function| function.name == name && function.arity() == arity)
    }
}
