//! Pending-to-done updates driven by extracted test ids

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::core::config::RemapEntry;
use crate::core::status::Status;
use crate::core::tcid::Tcid;

use super::QaDocument;

/// One id whose document row flipped from pending to done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Id found in the test sources
    pub source: Tcid,
    /// Id of the document row that changed
    pub row: Tcid,
    /// Physical rows flipped (more than one only for duplicated rows)
    pub rows: usize,
}

/// Counts from one update pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Pending-to-done transitions, direct and remapped
    pub updated: usize,
    /// Ids whose row was already done
    pub already: usize,
    pub transitions: Vec<Transition>,
}

/// Mark the rows of every extracted id as done
///
/// First each id flips its own pending rows; an id with no pending row but a
/// done row counts as `already`. Then every remap entry whose source id was
/// extracted flips the pending rows of its document id. The passes are
/// independent, so one source id may flip both its own row and a remapped one.
pub fn apply_updates(doc: &mut QaDocument, ids: &BTreeSet<Tcid>, remap: &[RemapEntry]) -> UpdateOutcome {
    let mut outcome = UpdateOutcome::default();

    for id in ids {
        let flipped = doc.mark_done(id);
        if flipped > 0 {
            debug!(id = %id, rows = flipped, "marked done");
            outcome.updated += 1;
            outcome.transitions.push(Transition {
                source: id.clone(),
                row: id.clone(),
                rows: flipped,
            });
        } else if doc.has_status(id, Status::Done) {
            outcome.already += 1;
        }
    }

    for entry in remap.iter().filter(|e| ids.contains(&e.from)) {
        let flipped = doc.mark_done(&entry.to);
        if flipped > 0 {
            debug!(from = %entry.from, to = %entry.to, rows = flipped, "marked done via remap");
            outcome.updated += 1;
            outcome.transitions.push(Transition {
                source: entry.from.clone(),
                row: entry.to.clone(),
                rows: flipped,
            });
        }
    }

    outcome
}
