//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, ids::IdsArgs, init::InitArgs, status::StatusArgs,
    sync::SyncArgs,
};

#[derive(Parser)]
#[command(name = "qasync")]
#[command(author, version, about = "QA document sync")]
#[command(
    long_about = "Marks QA test-case rows as automated (🔴 → 🟢) for every test id declared in the test sources, then recomputes the progress summary of the QA document."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Defaults to `sync` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .qasync.yaml or .git)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Configuration file to use instead of the global and project files
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// QA document path, overriding configuration
    #[arg(long, short = 'd', global = true)]
    pub document: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mark automated test cases done and refresh the progress summary
    Sync(SyncArgs),

    /// Show progress per section without changing the document
    Status(StatusArgs),

    /// List test ids declared in the test sources
    Ids(IdsArgs),

    /// Write a default .qasync.yaml
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable table
    #[default]
    Auto,
    /// Markdown table
    Md,
    /// JSON (for programming)
    Json,
    /// CSV (for spreadsheets)
    Csv,
}
