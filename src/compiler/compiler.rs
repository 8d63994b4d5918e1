//! Per-file pipeline driver.
//!
//! This module contains the `Compiler` structure, which owns the file
//! registry and runs every file through tokenizing, parsing, short-circuit
//! lowering, control-flow normalization and symbol resolution. Imports
//! re-enter the pipeline for the imported file before the importer goes on,
//! so files are compiled in depth-first order of the import graph.

use std::{rc::Rc, time::Instant};

use tracing::{debug, info};

use crate::{
    ast::ast::{Module, ModulePath},
    circuiter::circuiter::lower_module,
    config::CompilerConfig,
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    normalizer::normalizer::normalize_module,
    parser::parser::parse,
    resolver::resolver::resolve_module,
    Position,
};

use super::registry::{File, FileState, FsLoader, Registry, SourceLoader};

/// Holds the state of one compilation.
///
/// All modules reachable from the entry end up in the registry. A module is
/// only visible through [`Compiler::module`] once its file is `Finished`.
#[derive(Debug)]
pub struct Compiler {
    /// Every file seen so far, keyed by module path
    pub registry: Registry,
    /// Source of modules not registered yet
    loader: Box<dyn SourceLoader>,
}

impl Compiler {
    /// Creates a compiler reading unknown modules from `loader`.
    ///
    /// # Arguments
    ///
    /// * `loader` - Source of modules that have not been registered
    pub fn new(loader: Box<dyn SourceLoader>) -> Self {
        Compiler {
            registry: Registry::new(),
            loader,
        }
    }

    /// Creates a compiler reading modules from the filesystem.
    pub fn from_config(config: CompilerConfig) -> Self {
        Compiler::new(Box::new(FsLoader::new(config)))
    }

    /// Compiles the entry module and everything it imports.
    ///
    /// # Arguments
    ///
    /// * `path` - Module path of the entry file
    ///
    /// # Returns
    ///
    /// The first error met, if any. Compilation stops there.
    pub fn compile_entry(&mut self, path: &ModulePath) -> Result<(), Error> {
        let start = Instant::now();
        self.require(path, Position::null())?;
        info!(
            entry = %path,
            modules = self.registry.len(),
            "Compiled in {:?}",
            start.elapsed()
        );
        Ok(())
    }

    /// Makes sure `path` is compiled, compiling it now if it isn't.
    ///
    /// # Arguments
    ///
    /// * `path` - Module to compile
    /// * `position` - Where the module was asked for, used for errors
    ///
    /// # Returns
    ///
    /// `CircularDependency` if the module is still on the current import
    /// chain, `ModuleNotFound` if neither the registry nor the loader know it.
    pub fn require(&mut self, path: &ModulePath, position: Position) -> Result<(), Error> {
        let state = self.registry.search(path).map(|file| file.state);
        match state {
            Some(FileState::Finished) => Ok(()),
            Some(FileState::InProgress) => Err(Error::new(
                ErrorImpl::CircularDependency {
                    module: path.to_string(),
                },
                position,
            )),
            Some(FileState::Ready) => self.compile(path),
            None => {
                let Some(source) = self.loader.load(path) else {
                    return Err(Error::new(
                        ErrorImpl::ModuleNotFound {
                            module: path.to_string(),
                        },
                        position,
                    ));
                };
                self.registry.register(path.clone(), source);
                self.compile(path)
            }
        }
    }

    fn compile(&mut self, path: &ModulePath) -> Result<(), Error> {
        let (name, source) = match self.registry.search_mut(path) {
            Some(file) => {
                file.state = FileState::InProgress;
                (Rc::clone(&file.name), Rc::clone(&file.source))
            }
            None => {
                return Err(Error::new(
                    ErrorImpl::ModuleNotFound {
                        module: path.to_string(),
                    },
                    Position::null(),
                ))
            }
        };
        info!(module = %path, file = %name, "compiling");

        let start = Instant::now();
        let tokens = Rc::new(tokenize(&source, Some(name.to_string()))?);
        debug!(module = %path, tokens = tokens.len(), "Tokenized in {:?}", start.elapsed());

        let parse_start = Instant::now();
        let mut module = parse(Rc::clone(&tokens), path.clone())?;
        debug!(module = %path, items = module.items.len(), "Parsed in {:?}", parse_start.elapsed());

        lower_module(&mut module);
        normalize_module(&mut module, &tokens)?;

        let resolve_start = Instant::now();
        resolve_module(self, &mut module, &tokens)?;
        debug!(module = %path, "Resolved in {:?}", resolve_start.elapsed());

        if let Some(file) = self.registry.search_mut(path) {
            file.tokens = Some(tokens);
            file.module = Some(module);
            file.state = FileState::Finished;
        }
        info!(module = %path, "Finished in {:?}", start.elapsed());
        Ok(())
    }

    /// A finished module.
    pub fn module(&self, path: &ModulePath) -> Option<&Module> {
        self.registry
            .search(path)
            .and_then(|file| file.module.as_ref())
    }

    /// Finished modules in the order their files were registered.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.registry
            .files()
            .iter()
            .filter_map(|file| file.module.as_ref())
    }

    pub fn file(&self, path: &ModulePath) -> Option<&File> {
        self.registry.search(path)
    }

    /// Source text of the file an error points into.
    pub fn source_of(&self, error: &Error) -> Option<&str> {
        self.registry
            .find_by_name(&error.get_position().1)
            .map(|file| file.source.as_str())
    }
}
