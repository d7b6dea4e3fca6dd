//! sqlforward, statement translation and redirection.

use clap::Parser;
use sqlforward::cli::{self, Cli, Commands};
use sqlforward::{config, logger};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    if let Commands::Configcheck = args.command {
        cli::config_check(&args.config)?;
        println!("\"{}\" is valid", args.config.display());
        return Ok(());
    }

    let loaded = config::load(&args.config)?;
    logger::init(loaded.config.general.log_format);
    info!(
        "sqlforward v{} [config: \"{}\"]",
        env!("CARGO_PKG_VERSION"),
        loaded.config_path.display()
    );

    match args.command {
        Commands::Route { url } => cli::route(&url)?,
        Commands::Translate { url, query, path } => cli::translate(&url, query, path)?,
        Commands::Fingerprint { query, path } => cli::fingerprint(query, path)?,
        Commands::Record { probe, path } => cli::record(&probe, path).await?,
        Commands::Compile { input, output } => cli::compile(&input, &output)?,
        Commands::Configcheck => (),
    }

    Ok(())
}
