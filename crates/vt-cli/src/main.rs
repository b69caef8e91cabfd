use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vt_cli::commands::{layout, validate};
use vt_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Layout(args)) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            tracing::debug!(?config, "loaded configuration");

            let stdout = std::io::stdout();
            let failed = layout::run(&mut stdout.lock(), args, &config)?;
            if failed > 0 {
                bail!("{failed} owner(s) could not be laid out");
            }
        }
        Some(Commands::Validate(args)) => {
            let stdout = std::io::stdout();
            let invalid = validate::run(&mut stdout.lock(), args)?;
            if invalid > 0 {
                bail!("{invalid} invalid record(s)");
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
