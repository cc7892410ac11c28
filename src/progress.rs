//! Progress roll-up per section and overall
//!
//! Figures are recomputed from the row statuses currently in the document,
//! never from what an update pass just changed, so running the aggregation
//! twice yields the same text.

use regex::{NoExpand, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::core::config::Config;
use crate::core::tcid::Tcid;
use crate::document::QaDocument;

/// Integer percentage `done * 100 / total`, 0 for an empty total
pub fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        done * 100 / total
    }
}

/// Format with comma thousands separators, e.g. `1,234`
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Total and done row counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub done: usize,
}

impl Tally {
    pub fn percent(&self) -> usize {
        percent(self.done, self.total)
    }

    fn add(&mut self, done: bool) {
        self.total += 1;
        if done {
            self.done += 1;
        }
    }
}

/// Numeric section key such as `4.1`, ordered component by component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionKey(Vec<u32>);

impl SectionKey {
    /// Key of `id` truncated to `depth` components
    pub fn of(id: &Tcid, depth: usize) -> Self {
        let parts = id.components();
        let depth = depth.clamp(1, parts.len());
        Self(parts[..depth].to_vec())
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl Serialize for SectionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Section and overall figures of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub sections: BTreeMap<SectionKey, Tally>,
    pub overall: Tally,
}

impl Progress {
    /// Count every row of `doc`, grouping by section key at `depth`
    pub fn compute(doc: &QaDocument, depth: usize) -> Self {
        let mut progress = Self::default();
        for row in doc.rows() {
            progress
                .sections
                .entry(SectionKey::of(row.id(), depth))
                .or_default()
                .add(row.is_done());
        }
        progress.overall = progress.sections.values().fold(Tally::default(), |acc, t| Tally {
            total: acc.total + t.total,
            done: acc.done + t.done,
        });
        progress
    }

    /// Counted sections that have no display name, so no summary row
    pub fn unnamed_sections<'a>(&'a self, config: &'a Config) -> impl Iterator<Item = &'a SectionKey> + 'a {
        self.sections
            .keys()
            .filter(move |key| config.section_name(&key.to_string()).is_none())
    }
}

/// Lines rewritten by [`apply_summary`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryChanges {
    pub header: usize,
    pub totals: usize,
    pub sections: usize,
}

impl SummaryChanges {
    pub fn total(&self) -> usize {
        self.header + self.totals + self.sections
    }
}

/// Rewrite the header line, totals row and named section rows with `progress`
///
/// Sections without a display name are counted in the totals but their rows,
/// if any, are left as they are.
pub fn apply_summary(
    doc: &mut QaDocument,
    progress: &Progress,
    config: &Config,
) -> Result<SummaryChanges, SummaryError> {
    let overall = progress.overall;
    let mut changes = SummaryChanges::default();

    let header = compile(&format!(
        r"> \*\*{}\*\*: {} \(\d+/[\d,]+ = \d+%\)",
        regex::escape(&config.header.label),
        regex::escape(&config.header.tool)
    ))?;
    let header_text = format!(
        "> **{}**: {} ({}/{} = {}%)",
        config.header.label,
        config.header.tool,
        overall.done,
        group_thousands(overall.total),
        overall.percent()
    );
    changes.header = rewrite(doc, &header, &header_text);

    let totals = compile(&format!(
        r"\| \*\*{}\*\* \| \*\*\d+\*\* \| \*\*\d+\*\* \| \*\*\d+%\*\* \|",
        regex::escape(&config.totals_label)
    ))?;
    let totals_text = format!(
        "| **{}** | **{}** | **{}** | **{}%** |",
        config.totals_label,
        overall.total,
        overall.done,
        overall.percent()
    );
    changes.totals = rewrite(doc, &totals, &totals_text);

    for (key, tally) in &progress.sections {
        let Some(name) = config.section_name(&key.to_string()) else {
            continue;
        };
        let row = compile(&format!(r"\| {} \| \d+ \| \d+ \| \d+% \|", regex::escape(name)))?;
        let row_text = format!("| {} | {} | {} | {}% |", name, tally.total, tally.done, tally.percent());
        changes.sections += rewrite(doc, &row, &row_text);
    }

    Ok(changes)
}

fn compile(pattern: &str) -> Result<Regex, SummaryError> {
    Regex::new(pattern).map_err(|e| SummaryError::Pattern(e.to_string()))
}

fn rewrite(doc: &mut QaDocument, pattern: &Regex, replacement: &str) -> usize {
    doc.rewrite_text_lines(|line| {
        if pattern.is_match(line) {
            Some(pattern.replace_all(line, NoExpand(replacement)).into_owned())
        } else {
            None
        }
    })
}

/// Errors building the summary patterns
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("invalid summary pattern: {0}")]
    Pattern(String),
}
