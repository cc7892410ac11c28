//! `qasync init` command - Write a default configuration file

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError, CONFIG_FILE};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Overwrite an existing .qasync.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    match Project::init(&path, args.force) {
        Ok(project) => {
            println!(
                "{} Wrote {}",
                style("✓").green(),
                style(project.config_path().display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Point 'document' and 'sources' at your QA document and specs",
                style(CONFIG_FILE).yellow()
            );
            println!(
                "  {} Check which test ids have a document row",
                style("qasync ids").yellow()
            );
            println!(
                "  {} Update the QA document",
                style("qasync sync").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Configuration already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to overwrite it",
                style("qasync init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
