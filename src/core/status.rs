//! Row status markers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a test case row in the QA document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not yet automated
    Pending,
    /// Covered by an automated test
    Done,
}

impl Status {
    /// Glyph written in the document's status cell
    pub fn glyph(&self) -> &'static str {
        match self {
            Status::Pending => "🔴",
            Status::Done => "🟢",
        }
    }

    /// Map a status cell's trimmed content back to a status
    pub fn from_glyph(s: &str) -> Option<Self> {
        match s {
            "🔴" => Some(Status::Pending),
            "🟢" => Some(Status::Done),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Status::Done)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Done => write!(f, "done"),
        }
    }
}
