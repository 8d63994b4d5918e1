use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    ast::ast::ModulePath,
    errors::errors::{Error, ErrorImpl},
    Position,
};

pub const DEFAULT_EXTENSION: &str = "eb";

lazy_static! {
    static ref MODULE_NAME: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// Where module sources live. Module `a.b.c` is read from
/// `<root>/a/b/c.<extension>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    pub root: PathBuf,
    pub extension: String,
    pub entry: ModulePath,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            root: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            entry: ModulePath::single("main"),
        }
    }
}

pub fn is_module_name(name: &str) -> bool {
    MODULE_NAME.is_match(name)
}

impl CompilerConfig {
    /// Config rooted at the entry file's directory, with the file's stem as
    /// the entry module.
    pub fn for_entry(path: &Path) -> Result<Self, Error> {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !is_module_name(&stem) {
            return Err(Error::new(
                ErrorImpl::InvalidModuleName { name: stem },
                Position(0, Rc::new(path.display().to_string())),
            ));
        }

        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        Ok(CompilerConfig {
            root,
            extension,
            entry: ModulePath::single(&stem),
        })
    }

    pub fn module_file(&self, module: &ModulePath) -> PathBuf {
        let mut path = self.root.clone();
        for segment in module.segments() {
            path.push(segment);
        }
        path.set_extension(&self.extension);
        path
    }
}
