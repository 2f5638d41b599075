mod config;
mod session;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use skindex_api::CatalogClient;
use skindex_store::JsonStore;

use crate::config::Config;
use crate::session::{HistoryKind, Session};
use crate::terminal::StdTerminal;

#[derive(Parser)]
#[command(
    name = "skindex",
    version,
    about = "Search the Fortnite item catalog and browse your search history"
)]
struct Cli {
    /// Directory holding the history collections
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for items by keyword
    Search {
        /// The keyword to search for
        keyword: String,
    },

    /// View search or selection history
    History {
        /// The type of history to view
        #[arg(value_name = "TYPE")]
        kind: CliHistoryKind,
    },

    /// Launch the interactive menu
    Menu,

    /// Show current configuration
    Config,
}

#[derive(Clone, ValueEnum)]
enum CliHistoryKind {
    Keywords,
    Selections,
}

impl From<CliHistoryKind> for HistoryKind {
    fn from(val: CliHistoryKind) -> Self {
        match val {
            CliHistoryKind::Keywords => HistoryKind::Keywords,
            CliHistoryKind::Selections => HistoryKind::Selections,
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "skindex", "skindex")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("skindex-data"))
}

fn resolve_data_dir(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.store.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_data_dir)
}

fn open_store(dir: &Path) -> Result<JsonStore> {
    JsonStore::open(dir).context("failed to open history store")
}

fn open_catalog(config: &Config) -> Result<CatalogClient> {
    CatalogClient::new(config.api.to_api_config()).context("failed to create catalog client")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config()?;
    let data_dir = resolve_data_dir(cli.data_dir, &config);

    if let Commands::Config = cli.command {
        return cmd_config(&config, &data_dir);
    }

    let store = open_store(&data_dir)?;
    let catalog = open_catalog(&config)?;
    let mut term = StdTerminal::stdio();
    let mut session = Session::new(&store, &catalog, &mut term);

    match cli.command {
        Commands::Search { keyword } => session.search(&keyword).map(drop),
        Commands::History { kind } => session.history(kind.into()).map(drop),
        Commands::Menu => session.run(),
        Commands::Config => Ok(()),
    }
}

fn cmd_config(cfg: &Config, data_dir: &Path) -> Result<()> {
    println!("Config:    {}", config::show_config_path());
    println!("Data dir:  {}", data_dir.display());
    println!("API URL:   {}", cfg.api.base_url);
    println!(
        "API key:   {}",
        cfg.api
            .api_key
            .as_deref()
            .map(config::mask_key)
            .unwrap_or_else(|| "(not set)".into())
    );
    println!("Language:  {}", cfg.api.lang.as_deref().unwrap_or("(default)"));
    println!("Timeout:   {}s", cfg.api.timeout_secs);
    Ok(())
}
