//! `qasync ids` command - List test ids found in the test sources

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::status::Status;
use crate::core::tcid::Tcid;
use crate::document::QaDocument;
use crate::extract::Extractor;

#[derive(clap::Args, Debug)]
pub struct IdsArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "auto")]
    pub format: OutputFormat,

    /// Only show ids with no row in the document
    #[arg(long)]
    pub missing: bool,
}

/// A document row an extracted id resolves to
#[derive(Serialize)]
struct ResolvedRow {
    id: Tcid,
    /// Reached through the remap table rather than by the id itself
    remapped: bool,
    status: Option<Status>,
}

#[derive(Serialize)]
struct IdLine {
    id: Tcid,
    /// Every row `sync` would touch for this id, direct row first
    rows: Vec<ResolvedRow>,
}

/// Pending while any row of `id` is still pending
fn row_status(doc: &QaDocument, id: &Tcid) -> Option<Status> {
    if doc.has_status(id, Status::Pending) {
        Some(Status::Pending)
    } else if doc.has_status(id, Status::Done) {
        Some(Status::Done)
    } else {
        None
    }
}

fn resolve(doc: &QaDocument, config: &Config, id: &Tcid) -> Vec<ResolvedRow> {
    let direct = doc.contains(id).then_some((id, false));
    let remapped = config
        .remap_targets(id)
        .filter(|t| *t != id && doc.contains(t))
        .map(|t| (t, true));

    direct
        .into_iter()
        .chain(remapped)
        .map(|(row, remapped)| ResolvedRow {
            id: row.clone(),
            remapped,
            status: row_status(doc, row),
        })
        .collect()
}

pub fn run(args: IdsArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::load(global)?;
    let extractor = Extractor::new(&ws.config.test_functions).into_diagnostic()?;
    let extraction = extractor
        .scan(ws.project.root(), &ws.config.sources)
        .into_diagnostic()?;
    let doc = QaDocument::read(&ws.document_path()).into_diagnostic()?;

    let lines: Vec<IdLine> = extraction
        .ids
        .iter()
        .map(|id| IdLine {
            id: id.clone(),
            rows: resolve(&doc, &ws.config, id),
        })
        .filter(|line| !args.missing || line.rows.is_empty())
        .collect();

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&lines).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["id", "row", "remapped", "status"])
                .into_diagnostic()?;
            for line in &lines {
                if line.rows.is_empty() {
                    wtr.write_record([line.id.to_string(), String::new(), String::new(), String::new()])
                        .into_diagnostic()?;
                }
                for row in &line.rows {
                    wtr.write_record([
                        line.id.to_string(),
                        row.id.to_string(),
                        row.remapped.to_string(),
                        row.status.map(|s| s.to_string()).unwrap_or_default(),
                    ])
                    .into_diagnostic()?;
                }
            }
            wtr.flush().into_diagnostic()?;
        }
        OutputFormat::Auto | OutputFormat::Md => {
            let mut table = Builder::default();
            table.push_record(["ID", "Row", "Status"]);
            for line in &lines {
                if line.rows.is_empty() {
                    table.push_record([line.id.to_string(), "missing".to_string(), "-".to_string()]);
                }
                for row in &line.rows {
                    let target = if row.remapped {
                        row.id.to_string()
                    } else {
                        "direct".to_string()
                    };
                    let status = row.status.map(|s| s.glyph()).unwrap_or("-");
                    table.push_record([line.id.to_string(), target, status.to_string()]);
                }
            }
            let rendered = if args.format == OutputFormat::Md {
                table.build().with(Style::markdown()).to_string()
            } else {
                table.build().with(Style::rounded()).to_string()
            };
            println!("{}", rendered);

            if !global.quiet {
                let missing = lines.iter().filter(|l| l.rows.is_empty()).count();
                println!(
                    "\n{} {} id(s) from {} file(s), {} without a document row",
                    style("→").blue(),
                    lines.len(),
                    extraction.files.len(),
                    missing
                );
            }
        }
    }

    Ok(())
}
