//! CLI command implementations

pub mod completions;
pub mod ids;
pub mod init;
pub mod status;
pub mod sync;
