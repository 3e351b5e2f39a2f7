//! snipwatch - command host for the snippet engine
//!
//! Runs the editor-bound snippet actions and the code-assistant commands
//! from a terminal. See `snipwatch help` for the command list.

use snipwatch::Config;
use snipwatch::cli;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snipwatch=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::load()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    cli::execute_cli(&args, &config)?;

    Ok(())
}
