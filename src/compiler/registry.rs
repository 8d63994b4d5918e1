use std::{fmt::Debug, fs::read_to_string, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{
    ast::ast::{Module, ModulePath},
    config::CompilerConfig,
    lexer::tokens::Token,
};

/// Compile marker of a file. `InProgress` means the file is on the current
/// import chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Ready,
    InProgress,
    Finished,
}

/// Text of a module together with the name diagnostics show for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub text: String,
}

/// One compilation unit.
#[derive(Debug)]
pub struct File {
    pub path: ModulePath,
    pub name: Rc<String>,
    pub source: Rc<String>,
    /// Set once the file has been tokenized.
    pub tokens: Option<Rc<Vec<Token>>>,
    /// Set once the file has finished compiling.
    pub module: Option<Module>,
    pub state: FileState,
}

/// Owns every file of a compilation, keyed by module path, in the order they
/// were registered.
#[derive(Debug, Default)]
pub struct Registry {
    files: Vec<File>,
    lookup: FxHashMap<ModulePath, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Adds a file in the `Ready` state. A path registered twice keeps its
    /// first source.
    pub fn register(&mut self, path: ModulePath, source: Source) -> &mut File {
        let index = match self.lookup.get(&path) {
            Some(&index) => index,
            None => {
                let index = self.files.len();
                self.lookup.insert(path.clone(), index);
                self.files.push(File {
                    path,
                    name: Rc::new(source.name),
                    source: Rc::new(source.text),
                    tokens: None,
                    module: None,
                    state: FileState::Ready,
                });
                index
            }
        };
        &mut self.files[index]
    }

    pub fn search(&self, path: &ModulePath) -> Option<&File> {
        self.lookup.get(path).map(|&index| &self.files[index])
    }

    pub fn search_mut(&mut self, path: &ModulePath) -> Option<&mut File> {
        self.lookup.get(path).map(|&index| &mut self.files[index])
    }

    /// File whose diagnostics carry `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|file| file.name.as_str() == name)
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Supplies source text for modules the registry doesn't hold yet.
pub trait SourceLoader: Debug {
    fn load(&self, path: &ModulePath) -> Option<Source>;
}

/// Reads `<root>/a/b/c.<extension>` for module `a.b.c`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    config: CompilerConfig,
}

impl FsLoader {
    pub fn new(config: CompilerConfig) -> Self {
        FsLoader { config }
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, path: &ModulePath) -> Option<Source> {
        let file = self.config.module_file(path);
        let text = read_to_string(&file).ok()?;
        Some(Source {
            name: file.display().to_string(),
            text,
        })
    }
}

/// Serves sources added up front. Used when embedding the front end and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: FxHashMap<ModulePath, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn add(&mut self, path: &str, source: &str) {
        self.sources.insert(ModulePath::from(path), source.to_string());
    }

    pub fn with(mut self, path: &str, source: &str) -> Self {
        self.add(path, source);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &ModulePath) -> Option<Source> {
        self.sources.get(path).map(|text| Source {
            name: format!("{}.eb", path.segments().join("/")),
            text: text.clone(),
        })
    }
}
