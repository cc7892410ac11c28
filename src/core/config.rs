//! Configuration management with layered hierarchy

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::project::Project;
use crate::core::tcid::Tcid;
use crate::yaml::YamlSyntaxError;

#[derive(Embed)]
#[folder = "defaults/"]
struct EmbeddedDefaults;

const DEFAULTS_FILE: &str = "qasync.yaml";

/// Environment variable overriding the document path
pub const DOCUMENT_ENV: &str = "QASYNC_DOCUMENT";

/// Text of the `> **<label>**: <tool> (...)` header summary line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderTemplate {
    pub label: String,
    pub tool: String,
}

/// A source-side id whose document row is written with a different id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemapEntry {
    pub from: Tcid,
    pub to: Tcid,
}

/// Fully resolved configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// QA document path, relative to the project root
    pub document: PathBuf,

    /// Recursive glob patterns locating test sources
    pub sources: Vec<String>,

    /// Call names that declare a test
    pub test_functions: Vec<String>,

    /// Header summary line template
    pub header: HeaderTemplate,

    /// First cell of the totals row
    pub totals_label: String,

    /// Components kept in a section key
    pub section_depth: usize,

    /// Section key to summary-table display name
    pub sections: BTreeMap<String, String>,

    /// Source id to document id pairs
    pub remap: Vec<RemapEntry>,
}

/// One configuration layer; absent keys leave lower layers untouched
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    document: Option<PathBuf>,
    sources: Option<Vec<String>>,
    test_functions: Option<Vec<String>>,
    header: Option<HeaderTemplate>,
    totals_label: Option<String>,
    section_depth: Option<usize>,
    sections: Option<BTreeMap<String, String>>,
    remap: Option<Vec<RemapEntry>>,
}

impl Config {
    /// Built-in defaults compiled into the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        let text = Self::default_yaml()?;
        serde_yml::from_str(&text)
            .map_err(|e| ConfigError::Builtin(e.to_string()))
    }

    /// Raw text of the built-in configuration
    pub fn default_yaml() -> Result<String, ConfigError> {
        let file = EmbeddedDefaults::get(DEFAULTS_FILE)
            .ok_or_else(|| ConfigError::Builtin(format!("missing embedded {}", DEFAULTS_FILE)))?;
        String::from_utf8(file.data.into_owned()).map_err(|e| ConfigError::Builtin(e.to_string()))
    }

    /// Load configuration from all sources, merging in priority order
    ///
    /// An explicit file replaces the global and project layers.
    pub fn load(project: &Project, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. Built-in defaults
        let mut config = Self::builtin()?;

        if let Some(path) = explicit {
            // 2+3. Explicit file instead of global and project config
            let path = project.resolve(path);
            config.merge(read_layer(&path)?);
        } else {
            // 2. Global user config (~/.config/qasync/config.yaml)
            if let Some(global_path) = Self::global_config_path() {
                if global_path.is_file() {
                    match read_layer(&global_path) {
                        Ok(layer) => config.merge(layer),
                        Err(e) => warn!(path = %global_path.display(), error = %e, "ignoring global config"),
                    }
                }
            }

            // 3. Project config (.qasync.yaml)
            let project_path = project.config_path();
            if project_path.is_file() {
                config.merge(read_layer(&project_path)?);
            }
        }

        // 4. Environment variables
        if let Ok(document) = std::env::var(DOCUMENT_ENV) {
            if !document.is_empty() {
                debug!(%document, "document path from environment");
                config.document = PathBuf::from(document);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a single YAML document layered on top of the built-in defaults
    pub fn from_yaml_str(source: &str, filename: &str) -> Result<Self, ConfigError> {
        let mut config = Self::builtin()?;
        config.merge(parse_layer(source, filename)?);
        config.validate()?;
        Ok(config)
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qasync")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge a layer into this config (layer takes precedence)
    fn merge(&mut self, other: ConfigLayer) {
        if let Some(document) = other.document {
            self.document = document;
        }
        if let Some(sources) = other.sources {
            self.sources = sources;
        }
        if let Some(test_functions) = other.test_functions {
            self.test_functions = test_functions;
        }
        if let Some(header) = other.header {
            self.header = header;
        }
        if let Some(totals_label) = other.totals_label {
            self.totals_label = totals_label;
        }
        if let Some(depth) = other.section_depth {
            self.section_depth = depth;
        }
        if let Some(sections) = other.sections {
            self.sections.extend(sections);
        }
        if let Some(remap) = other.remap {
            self.remap = remap;
        }
    }

    /// Check values that deserialization alone cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3).contains(&self.section_depth) {
            return Err(ConfigError::Invalid(format!(
                "section_depth must be between 1 and 3, got {}",
                self.section_depth
            )));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("sources must list at least one glob pattern".into()));
        }
        for pattern in &self.sources {
            glob::Pattern::new(pattern)
                .map_err(|e| ConfigError::Invalid(format!("bad source pattern '{}': {}", pattern, e)))?;
        }
        if self.test_functions.is_empty() {
            return Err(ConfigError::Invalid("test_functions must not be empty".into()));
        }
        for name in &self.test_functions {
            let valid = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.');
            if !valid {
                return Err(ConfigError::Invalid(format!("bad test function name '{}'", name)));
            }
        }
        if self.header.label.is_empty() || self.totals_label.is_empty() {
            return Err(ConfigError::Invalid("header.label and totals_label must not be empty".into()));
        }
        Ok(())
    }

    /// Document-side ids that `id` is remapped to
    pub fn remap_targets<'a>(&'a self, id: &'a Tcid) -> impl Iterator<Item = &'a Tcid> + 'a {
        self.remap.iter().filter(move |e| &e.from == id).map(|e| &e.to)
    }

    /// Display name for a section key
    pub fn section_name(&self, key: &str) -> Option<&str> {
        self.sections.get(key).map(String::as_str)
    }
}

fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layer(&contents, &path.display().to_string())
}

fn parse_layer(source: &str, filename: &str) -> Result<ConfigLayer, ConfigError> {
    if source.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yml::from_str(source)
        .map_err(|e| ConfigError::Syntax(YamlSyntaxError::from_serde_error(&e, source, filename)))
}

/// Errors from loading configuration
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("built-in configuration is broken: {0}")]
    Builtin(String),
}
