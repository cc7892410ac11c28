//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = ".qasync.yaml";

/// A project containing test sources and a QA document
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory all configured paths are relative to
    root: PathBuf,
}

impl Project {
    /// Use an explicit directory as the project root
    pub fn at(root: &Path) -> Result<Self, ProjectError> {
        let root = root
            .canonicalize()
            .map_err(|e| ProjectError::IoError(format!("{}: {}", root.display(), e)))?;
        if !root.is_dir() {
            return Err(ProjectError::NotADirectory(root));
        }
        Ok(Self { root })
    }

    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    ///
    /// The nearest ancestor holding `.qasync.yaml` wins, then the nearest
    /// holding `.git`; without either the start directory is the root.
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let start = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(format!("{}: {}", start.display(), e)))?;

        if let Some(root) = Self::find_ancestor(&start, |dir| dir.join(CONFIG_FILE).is_file()) {
            return Ok(Self { root });
        }
        if let Some(root) = Self::find_ancestor(&start, |dir| dir.join(".git").exists()) {
            return Ok(Self { root });
        }
        Ok(Self { root: start })
    }

    fn find_ancestor(start: &Path, pred: impl Fn(&Path) -> bool) -> Option<PathBuf> {
        start.ancestors().find(|dir| pred(dir)).map(Path::to_path_buf)
    }

    /// Write a default `.qasync.yaml` into `path`
    pub fn init(path: &Path, force: bool) -> Result<Self, ProjectError> {
        let project = Self::at(path)?;
        let config_path = project.config_path();
        if config_path.exists() && !force {
            return Err(ProjectError::AlreadyExists(config_path));
        }

        let contents = Config::default_yaml().map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(&config_path, contents)
            .map_err(|e| ProjectError::IoError(format!("{}: {}", config_path.display(), e)))?;

        Ok(project)
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the project configuration file
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Path relative to the project root for display, falling back to the full path
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("configuration already exists at {0:?}. Use --force to overwrite it.")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
