// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, load config, set up logging and
//   hand over to `cli::execute`.
// - Failures are printed on stderr and turned into an exit code.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use envios_cli::cli::{execute, Cli};
use envios_cli::config::Config;
use envios_cli::error::ClientError;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<ClientError>()
            .map(ClientError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_env()?;
    setup_logging(cli.verbose, config.log_filter.as_deref())?;
    execute(cli, &config)?;
    Ok(())
}

/// Log to stderr so stdout only carries command output. An explicit
/// filter directive wins over the `-v` count.
fn setup_logging(verbosity: u8, directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(d) => EnvFilter::try_new(d).with_context(|| format!("invalid ENVIOS_LOG '{d}'"))?,
        None => EnvFilter::new(match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("initializing logging")?;

    tracing::debug!(verbosity, "logging ready");
    Ok(())
}
