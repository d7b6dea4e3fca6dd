use std::fs::{read_to_string, write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlforward_config::{Config, MappingFormat, RouteConfig};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::config;
use crate::fingerprint::Fingerprint;
use crate::translator::{Store, Translator};
use crate::warehouse::Warehouse;

/// sqlforward translates and redirects statements written
/// for one database to another.
#[derive(Parser, Debug)]
#[command(name = "", version = concat!("sqlforward v", env!("CARGO_PKG_VERSION")))]
pub struct Cli {
    /// Path to the configuration file. Default: "sqlforward.toml"
    #[arg(short, long, default_value = "sqlforward.toml")]
    pub config: PathBuf,
    /// Subcommand.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Parse a connect string and print the route.
    Route {
        /// Connect string.
        #[arg(short, long)]
        url: String,
    },

    /// Translate statements using the mapping from a connect string.
    Translate {
        /// Connect string.
        #[arg(short, long)]
        url: String,
        /// Statement.
        #[arg(short, long)]
        query: Option<String>,
        /// File with statements separated by ";".
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Fingerprint statements.
    Fingerprint {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Record statements to a probe file.
    Record {
        /// Probe file.
        #[arg(long)]
        probe: PathBuf,
        /// File with statements separated by ";".
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Convert a table mapping into the binary map format.
    Compile {
        /// Table mapping (YAML).
        #[arg(short, long)]
        input: PathBuf,
        /// Map file to write.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check the configuration file for errors.
    Configcheck,
}

/// Statements from a file, separated by ";".
fn statements(query: Option<String>, path: Option<PathBuf>) -> Result<Vec<String>, std::io::Error> {
    if let Some(query) = query {
        return Ok(vec![query]);
    }

    let Some(path) = path else {
        return Ok(vec![]);
    };

    Ok(read_to_string(path)?
        .split(';')
        .map(|statement| statement.trim())
        .filter(|statement| !statement.is_empty())
        .map(|statement| statement.to_owned())
        .collect())
}

pub fn route(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let route = RouteConfig::parse_with(url, &config().config.general)?;
    println!("{}", serde_json::to_string_pretty(&route)?);
    Ok(())
}

pub fn translate(
    url: &str,
    query: Option<String>,
    path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let route = RouteConfig::parse_with(url, &config().config.general)?;
    let translator = Translator::load(&route.mapping, route.mapping_format)?;

    for statement in statements(query, path)? {
        let binds = translator.translate_and_bind(&statement);
        println!("{}", serde_json::to_string_pretty(&binds)?);
    }

    let stats = translator.stats();
    info!(
        "translated {} statements, {} passed through",
        stats.hits(),
        stats.misses()
    );

    Ok(())
}

pub fn fingerprint(
    query: Option<String>,
    path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    for statement in statements(query, path)? {
        debug!("{}", statement);
        let fingerprint = Fingerprint::new(&statement);
        println!("{} [{}]", fingerprint, fingerprint.value());
    }

    Ok(())
}

/// Replay statements through the warehouse, one task per statement,
/// the same way concurrent connections would.
pub async fn record(probe: &Path, path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let general = config().config.general.clone();
    let warehouse = Arc::new(Warehouse::open(probe, general.warehouse_queue)?);

    let tasks = statements(None, Some(path))?
        .into_iter()
        .map(|statement| {
            let warehouse = warehouse.clone();
            tokio::spawn(async move {
                warehouse.record(&statement);
            })
        })
        .collect::<Vec<_>>();

    for task in tasks {
        task.await?;
    }

    let timeout = general.shutdown_timeout();
    let stopped = {
        let warehouse = warehouse.clone();
        tokio::task::spawn_blocking(move || warehouse.shutdown(timeout)).await?
    };

    println!("{}", serde_json::to_string_pretty(&warehouse.stats())?);

    if !stopped {
        return Err(format!("probe file \"{}\" may be incomplete", probe.display()).into());
    }

    Ok(())
}

pub fn compile(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::load(input, MappingFormat::Table)?;
    write(output, store.to_map()?)?;
    info!(
        "compiled {} statements into \"{}\"",
        store.keys().count(),
        output.display()
    );
    Ok(())
}

#[derive(Debug, Error)]
pub enum ConfigCheckError {
    #[error("I/O error on `{0}`: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("TOML parse error in `{0}`: {1}")]
    Parse(PathBuf, #[source] sqlforward_config::Error),
}

pub fn config_check(config_path: &Path) -> Result<(), ConfigCheckError> {
    let source = read_to_string(config_path)
        .map_err(|err| ConfigCheckError::Io(config_path.to_owned(), err))?;
    Config::from_toml(&source)
        .map_err(|err| ConfigCheckError::Parse(config_path.to_owned(), err))?;
    Ok(())
}
