mod cli;
mod config;
mod download;
mod error;
mod github;
mod matcher;
mod outcome;
mod paths;
mod pattern;
mod pipeline;
mod types;
mod unpack;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::{Ambient, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;
    tracing::debug!("ghasset {}", cli::get_version());

    let config = match Config::resolve(&cli, &Ambient::from_env()) {
        Ok(config) => config,
        Err(e) => {
            outcome::report_failure(&e, cli.annotate);
            std::process::exit(1);
        }
    };

    match pipeline::run(&config, !cli.quiet).await {
        Ok(result) => {
            if let Err(e) = result.emit(cli.output_file.as_deref()) {
                tracing::error!("{:#}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            outcome::report_failure(&e, cli.annotate);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "info"
    } else if cli.verbose == 1 {
        "debug"
    } else {
        "trace"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for outputs
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
