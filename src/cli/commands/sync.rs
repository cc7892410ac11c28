//! `qasync sync` command - Update the QA document from test sources

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_tally, warn_unnamed_sections, Workspace};
use crate::cli::GlobalOpts;
use crate::pipeline::{self, WriteMode};

#[derive(clap::Args, Debug, Default)]
pub struct SyncArgs {
    /// Compute the changes without writing the document
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Fail if the document is not up to date (implies --dry-run)
    #[arg(long)]
    pub check: bool,

    /// List every row that changed
    #[arg(long, short = 'l')]
    pub list: bool,
}

pub fn run(args: SyncArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::load(global)?;
    let mode = if args.dry_run || args.check {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let report = pipeline::sync(&ws.project, &ws.config, mode).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Extracted {} test id(s) from {} source file(s)",
            style("→").blue(),
            style(report.extracted).cyan(),
            report.source_files
        );
        println!(
            "{} 🔴→🟢 updated: {}",
            style("✓").green(),
            style(report.outcome.updated).green()
        );
        println!("  already 🟢: {}", report.outcome.already);

        if args.list {
            for t in &report.outcome.transitions {
                if t.source == t.row {
                    println!("    {}", style(&t.row).cyan());
                } else {
                    println!("    {} ← {}", style(&t.row).cyan(), t.source);
                }
            }
        }

        println!(
            "  progress: {} across {} section(s)",
            format_tally(&report.progress.overall),
            report.progress.sections.len()
        );
    }

    warn_unnamed_sections(&report.progress, &ws.config, global.quiet);

    if args.check {
        if report.changed {
            return Err(miette::miette!(
                help = "run `qasync sync` to update it",
                "QA document {} is out of date",
                ws.document_display()
            ));
        }
        if !global.quiet {
            println!("{} QA document is up to date", style("✓").green());
        }
        return Ok(());
    }

    if !global.quiet {
        if report.written {
            println!(
                "{} QA document updated: {}",
                style("✓").green(),
                style(ws.document_display()).cyan()
            );
        } else {
            println!(
                "{} Dry run: {} not written ({})",
                style("!").yellow(),
                style(ws.document_display()).cyan(),
                if report.changed { "would change" } else { "no changes" }
            );
        }
    }

    Ok(())
}
