use std::path::{Component, Path, PathBuf};

use crate::errors::ConfigError;

pub const ROOT_PATH_VAR: &str = "PRINT_FILE_PATH";
pub const PRINTER_PATH_VAR: &str = "PRINTER_PATH";

/// Paths resolved once at startup. Read-only for the rest of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    root_path: PathBuf,
    printer_path: PathBuf,
}

impl Config {
    pub fn new(root_path: impl Into<PathBuf>, printer_path: impl Into<PathBuf>) -> Self {
        Config {
            root_path: root_path.into(),
            printer_path: printer_path.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. `from_env` passes the process
    /// environment; tests pass a closure so they never mutate global state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root_path = required(&lookup, ROOT_PATH_VAR)?;
        let printer_path = required(&lookup, PRINTER_PATH_VAR)?;

        Ok(Config::new(root_path, printer_path))
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn printer_path(&self) -> &Path {
        &self.printer_path
    }

    /// Resolves a caller-supplied relative path against the source root.
    /// `None` when the path would leave the root.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        confine(&self.root_path, relative)
    }
}

/// Joins `relative` onto `root` only if the result stays under `root`.
///
/// Absolute paths, drive prefixes and `..` components are refused; `Path::join` would
/// otherwise discard `root` or climb out of it.
pub fn confine(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let inside = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    inside.then(|| root.join(relative))
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Err(ConfigError::MissingVar { name }),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyVar { name }),
        Some(value) => Ok(value),
    }
}
