//! `qasync status` command - Progress per section

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_tally, warn_unnamed_sections, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::document::QaDocument;
use crate::progress::Progress;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "auto")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct SectionLine {
    section: String,
    name: Option<String>,
    total: usize,
    done: usize,
    percent: usize,
}

#[derive(Serialize)]
struct StatusReport {
    document: String,
    total: usize,
    done: usize,
    percent: usize,
    sections: Vec<SectionLine>,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::load(global)?;
    let doc = QaDocument::read(&ws.document_path()).into_diagnostic()?;
    let progress = Progress::compute(&doc, ws.config.section_depth);

    let report = StatusReport {
        document: ws.document_display(),
        total: progress.overall.total,
        done: progress.overall.done,
        percent: progress.overall.percent(),
        sections: progress
            .sections
            .iter()
            .map(|(key, tally)| SectionLine {
                section: key.to_string(),
                name: ws.config.section_name(&key.to_string()).map(String::from),
                total: tally.total,
                done: tally.done,
                percent: tally.percent(),
            })
            .collect(),
    };

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["section", "name", "total", "done", "percent"])
                .into_diagnostic()?;
            for line in &report.sections {
                wtr.write_record([
                    line.section.clone(),
                    line.name.clone().unwrap_or_default(),
                    line.total.to_string(),
                    line.done.to_string(),
                    line.percent.to_string(),
                ])
                .into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        OutputFormat::Auto | OutputFormat::Md => {
            let mut table = Builder::default();
            table.push_record(["Section", "Name", "Total", "Done", "Progress"]);
            for line in &report.sections {
                table.push_record([
                    line.section.clone(),
                    line.name.clone().unwrap_or_else(|| "-".to_string()),
                    line.total.to_string(),
                    line.done.to_string(),
                    format!("{}%", line.percent),
                ]);
            }
            let rendered = if args.format == OutputFormat::Md {
                table.build().with(Style::markdown()).to_string()
            } else {
                table.build().with(Style::rounded()).to_string()
            };
            println!("{}", rendered);
            println!(
                "\n{} {}: {}",
                style("→").blue(),
                style(&report.document).cyan(),
                format_tally(&progress.overall)
            );
            warn_unnamed_sections(&progress, &ws.config, global.quiet);
        }
    }

    Ok(())
}
