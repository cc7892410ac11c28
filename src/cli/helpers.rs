//! Shared helper functions for CLI commands

use console::style;
use miette::Result;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::project::Project;
use crate::progress::{Progress, Tally};

/// Project root plus resolved configuration for one command
#[derive(Debug)]
pub struct Workspace {
    pub project: Project,
    pub config: Config,
}

impl Workspace {
    /// Discover the project and load its configuration, applying global flags
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(root) => Project::at(root),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;
        debug!(root = %project.root().display(), "project root");

        let mut config = Config::load(&project, global.config.as_deref())?;
        if let Some(document) = &global.document {
            config.document = document.clone();
        }

        Ok(Self { project, config })
    }

    /// Absolute path of the QA document
    pub fn document_path(&self) -> PathBuf {
        self.project.resolve(&self.config.document)
    }

    /// Document path as shown to the user
    pub fn document_display(&self) -> String {
        self.project.display_path(&self.document_path())
    }
}

/// `done/total = pct%` as used in console output
pub fn format_tally(tally: &Tally) -> String {
    format!("{}/{} = {}%", tally.done, tally.total, tally.percent())
}

/// Warn about counted sections that have no summary-table name
pub fn warn_unnamed_sections(progress: &Progress, config: &Config, quiet: bool) {
    let unnamed: Vec<String> = progress
        .unnamed_sections(config)
        .map(|key| key.to_string())
        .collect();
    if unnamed.is_empty() {
        return;
    }
    tracing::warn!(sections = %unnamed.join(", "), "sections counted without a summary row name");
    if !quiet {
        println!(
            "{} Counted in totals but missing from the section name table: {}",
            style("!").yellow(),
            style(unnamed.join(", ")).yellow()
        );
    }
}
