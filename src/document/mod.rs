//! QA status document model
//!
//! The markdown document is split into data rows (lines starting with
//! `| TC-... |`) and everything else. Rows keep their raw text, so writing
//! the document back reproduces every byte that was not deliberately changed.
//! A row may wrap over several lines; it ends at its first status cell, at a
//! blank line, or at the next line that starts with `|`.

pub mod update;

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::status::Status;
use crate::core::tcid::{Tcid, TCID_PATTERN};

pub use update::{apply_updates, Transition, UpdateOutcome};

static ROW_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\|[ \t]*({})[ \t]*\|", TCID_PATTERN)).expect("row regex is valid")
});

static STATUS_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|[ \t]*(🔴|🟢)[ \t]*\|").expect("status regex is valid"));

/// Location of the status glyph inside a row's raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StatusCell {
    status: Status,
    start: usize,
    len: usize,
}

/// A data row of the QA document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: Tcid,
    raw: String,
    status: Option<StatusCell>,
}

impl Row {
    pub fn id(&self) -> &Tcid {
        &self.id
    }

    /// Status of the row, `None` when it has no status cell
    pub fn status(&self) -> Option<Status> {
        self.status.map(|cell| cell.status)
    }

    pub fn is_done(&self) -> bool {
        self.status().is_some_and(|s| s.is_done())
    }

    /// Raw text of the row including its line endings
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Rewrite the status glyph; rows without a status cell are left alone
    ///
    /// Returns whether the row changed.
    pub fn set_status(&mut self, status: Status) -> bool {
        let Some(cell) = self.status else {
            return false;
        };
        if cell.status == status {
            return false;
        }
        let glyph = status.glyph();
        self.raw.replace_range(cell.start..cell.start + cell.len, glyph);
        self.status = Some(StatusCell {
            status,
            start: cell.start,
            len: glyph.len(),
        });
        true
    }

    /// Look for the first status cell at or after `from`
    fn scan_status(&mut self, from: usize) {
        if let Some(caps) = STATUS_CELL.captures(&self.raw[from..]) {
            if let Some(glyph) = caps.get(1) {
                if let Some(status) = Status::from_glyph(glyph.as_str()) {
                    self.status = Some(StatusCell {
                        status,
                        start: from + glyph.start(),
                        len: glyph.len(),
                    });
                }
            }
        }
    }
}

/// A piece of the document
#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    /// Text that is not a data row
    Text(String),
    /// A data row
    Row(Row),
}

/// Parsed QA document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QaDocument {
    blocks: Vec<Block>,
}

impl QaDocument {
    /// Parse document text; never fails, unrecognized text is kept verbatim
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        let mut open: Option<Row> = None;

        for line in text.split_inclusive('\n') {
            if let Some(row) = open.take() {
                if ends_row(line) {
                    doc.blocks.push(Block::Row(row));
                } else {
                    let mut row = row;
                    let from = row.raw.len();
                    row.raw.push_str(line);
                    row.scan_status(from);
                    doc.push_row_or_keep_open(row, &mut open);
                    continue;
                }
            }

            if let Some(caps) = ROW_START.captures(line) {
                let parsed = caps.get(1).and_then(|m| m.as_str().parse::<Tcid>().ok());
                if let Some(id) = parsed {
                    let id_cell_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                    // The id cell's closing pipe opens the next cell
                    let from = id_cell_end.saturating_sub(1);
                    let mut row = Row {
                        id,
                        raw: line.to_string(),
                        status: None,
                    };
                    row.scan_status(from);
                    doc.push_row_or_keep_open(row, &mut open);
                    continue;
                }
            }

            doc.push_text(line);
        }

        if let Some(row) = open {
            doc.blocks.push(Block::Row(row));
        }
        doc
    }

    fn push_row_or_keep_open(&mut self, row: Row, open: &mut Option<Row>) {
        if row.status.is_some() {
            self.blocks.push(Block::Row(row));
        } else {
            *open = Some(row);
        }
    }

    fn push_text(&mut self, line: &str) {
        if let Some(Block::Text(text)) = self.blocks.last_mut() {
            text.push_str(line);
        } else {
            self.blocks.push(Block::Text(line.to_string()));
        }
    }

    /// Read and parse a document from disk
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Overwrite `path` with the serialized document
    pub fn write(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_string()).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All data rows in document order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Row(row) => Some(row),
            Block::Text(_) => None,
        })
    }

    fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Row(row) => Some(row),
            Block::Text(_) => None,
        })
    }

    /// Whether any row carries `id`
    pub fn contains(&self, id: &Tcid) -> bool {
        self.rows().any(|row| row.id() == id)
    }

    /// Whether a row carrying `id` has the given status
    pub fn has_status(&self, id: &Tcid, status: Status) -> bool {
        self.rows().any(|row| row.id() == id && row.status() == Some(status))
    }

    /// Flip every pending row of `id` to done, returning how many flipped
    pub fn mark_done(&mut self, id: &Tcid) -> usize {
        self.rows_mut()
            .filter(|row| row.id() == id && row.status() == Some(Status::Pending))
            .map(|row| row.set_status(Status::Done))
            .filter(|changed| *changed)
            .count()
    }

    /// Rewrite lines outside data rows
    ///
    /// `f` receives each line without its line ending and returns a
    /// replacement, or `None` to keep the line. Returns the number of lines
    /// that actually changed.
    pub fn rewrite_text_lines<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut changed = 0;
        for block in &mut self.blocks {
            let Block::Text(text) = block else {
                continue;
            };
            let mut out = String::with_capacity(text.len());
            for line in text.split_inclusive('\n') {
                let body = line.trim_end_matches(['\n', '\r']);
                let ending = &line[body.len()..];
                match f(body) {
                    Some(new) if new != body => {
                        out.push_str(&new);
                        changed += 1;
                    }
                    _ => out.push_str(body),
                }
                out.push_str(ending);
            }
            *text = out;
        }
        changed
    }
}

/// Whether `line` ends a still-open row instead of continuing it
///
/// Continuation lines carry description text only; any table line closes the row.
fn ends_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('|')
}

impl fmt::Display for QaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            match block {
                Block::Text(text) => f.write_str(text)?,
                Block::Row(row) => f.write_str(&row.raw)?,
            }
        }
        Ok(())
    }
}

/// Errors reading or writing the document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read QA document {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write QA document {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
