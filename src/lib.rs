//! QA Sync
//!
//! Keeps a markdown QA test-case document in step with the automated tests:
//! test ids declared in the test sources flip their document rows from
//! pending to done, and the progress summary is recomputed from the rows.

pub mod cli;
pub mod core;
pub mod document;
pub mod extract;
pub mod pipeline;
pub mod progress;
pub mod yaml;
