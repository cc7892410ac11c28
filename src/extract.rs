//! Test-case id extraction from test sources
//!
//! A declaration is a configured call name followed by `(`, one or more
//! quote characters and the id, e.g. `test('TC-4.1.1-001: concurrent pay', ...)`.
//! Extraction is purely pattern based; nothing is validated against the document.

use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::tcid::{Tcid, TCID_PATTERN};

/// Pulls test-case ids out of test-source text
#[derive(Debug, Clone)]
pub struct Extractor {
    declaration: Regex,
}

impl Extractor {
    /// Build an extractor recognizing calls to any of `functions`
    pub fn new<S: AsRef<str>>(functions: &[S]) -> Result<Self, ExtractError> {
        let names = functions
            .iter()
            .map(|f| regex::escape(f.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r#"(?:^|[^\w$.])(?:{})\(['"`]+({})"#, names, TCID_PATTERN);
        let declaration = Regex::new(&pattern).map_err(|e| ExtractError::Pattern(e.to_string()))?;
        Ok(Self { declaration })
    }

    /// Ids declared in a single source text, in order of appearance
    pub fn ids_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Tcid> + 'a {
        self.declaration
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse().ok()))
    }

    /// Collect the unique ids declared in every file matching `patterns` under `root`
    pub fn scan(&self, root: &Path, patterns: &[String]) -> Result<Extraction, ExtractError> {
        let files = matching_files(root, patterns)?;
        let mut ids = BTreeSet::new();

        for path in &files {
            let content = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
                path: path.clone(),
                source,
            })?;
            let before = ids.len();
            ids.extend(self.ids_in(&content));
            debug!(file = %path.display(), new_ids = ids.len() - before, "scanned source");
        }

        Ok(Extraction { files, ids })
    }
}

/// Result of scanning the test sources
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Files that matched a source pattern, sorted
    pub files: Vec<PathBuf>,
    /// Unique ids across all files
    pub ids: BTreeSet<Tcid>,
}

/// Files under `root` whose root-relative path matches any glob in `patterns`
///
/// `**` crosses directory boundaries; `*` does not. Symlinked directories are
/// followed. Paths that cannot be read while matching are skipped with a warning.
pub fn matching_files(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, ExtractError> {
    let options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let root_str = root
        .to_str()
        .ok_or_else(|| ExtractError::Root(root.to_path_buf()))?;
    let prefix = glob::Pattern::escape(root_str);

    let mut files = BTreeSet::new();
    for pattern in patterns {
        let full = format!("{}/{}", prefix.trim_end_matches('/'), pattern);
        debug!(%full, "matching source pattern");
        let paths = glob::glob_with(&full, options)
            .map_err(|e| ExtractError::Glob(pattern.clone(), e.to_string()))?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    files.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable path"),
            }
        }
    }
    Ok(files.into_iter().collect())
}

/// Errors from scanning test sources
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid glob pattern '{0}': {1}")]
    Glob(String, String),

    #[error("invalid test declaration pattern: {0}")]
    Pattern(String),

    #[error("project root {0:?} is not valid UTF-8")]
    Root(PathBuf),

    #[error("failed to read source {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
