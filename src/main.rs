use clap::Parser;
use miette::Result;
use qasync::cli::commands::sync::SyncArgs;
use qasync::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays pipeable
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head` causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    setup_logging(global.verbose);

    match cli.command {
        None => qasync::cli::commands::sync::run(SyncArgs::default(), &global),
        Some(Commands::Sync(args)) => qasync::cli::commands::sync::run(args, &global),
        Some(Commands::Status(args)) => qasync::cli::commands::status::run(args, &global),
        Some(Commands::Ids(args)) => qasync::cli::commands::ids::run(args, &global),
        Some(Commands::Init(args)) => qasync::cli::commands::init::run(args),
        Some(Commands::Completions(args)) => qasync::cli::commands::completions::run(args),
    }
}
