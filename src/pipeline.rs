//! The sync pipeline: extract, update, aggregate, write

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::core::config::Config;
use crate::core::project::Project;
use crate::document::{apply_updates, DocumentError, QaDocument, UpdateOutcome};
use crate::extract::{ExtractError, Extractor};
use crate::progress::{apply_summary, Progress, SummaryChanges, SummaryError};

/// What to do with the result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the document
    #[default]
    Write,
    /// Compute everything, write nothing
    DryRun,
}

/// Everything one sync run found and changed
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub document: PathBuf,
    pub source_files: usize,
    pub extracted: usize,
    pub outcome: UpdateOutcome,
    pub progress: Progress,
    pub summary: SummaryChanges,
    /// Whether the new text differs from the file on disk
    pub changed: bool,
    pub written: bool,
}

/// Run the full pipeline for `project` with `config`
///
/// The document is read in full before anything is mutated; a read failure
/// aborts before any write.
pub fn sync(project: &Project, config: &Config, mode: WriteMode) -> Result<SyncReport, SyncError> {
    let extractor = Extractor::new(&config.test_functions)?;
    let extraction = extractor.scan(project.root(), &config.sources)?;
    info!(
        files = extraction.files.len(),
        ids = extraction.ids.len(),
        "extracted test ids"
    );

    let document = project.resolve(&config.document);
    let mut doc = QaDocument::read(&document)?;
    let original = doc.to_string();

    let outcome = apply_updates(&mut doc, &extraction.ids, &config.remap);
    let progress = Progress::compute(&doc, config.section_depth);
    let summary = apply_summary(&mut doc, &progress, config)?;

    let updated = doc.to_string();
    let changed = updated != original;
    let written = mode == WriteMode::Write;
    if written {
        doc.write(&document)?;
        info!(document = %document.display(), changed, "document written");
    }

    Ok(SyncReport {
        document,
        source_files: extraction.files.len(),
        extracted: extraction.ids.len(),
        outcome,
        progress,
        summary,
        changed,
        written,
    })
}

/// Errors aborting a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}
