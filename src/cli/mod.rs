use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::{App, Route};
use crate::config::{ConfigLoader, CONFIG_ENV, DATA_ENV};
use crate::favorites::Favorites;
use crate::notion::EnvConnector;
use crate::service::PoetryService;
use crate::storage;
use crate::store::PoemStore;

pub mod commands;

use self::commands::{FavoritesArgs, ListArgs, ShowArgs, TuiArgs};

#[derive(Parser, Debug)]
#[command(
    name = "poetry",
    version,
    about = "Read a Notion-hosted poetry collection from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over POETRY_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over POETRY_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive reader (default)
    Tui(TuiArgs),
    /// Print the collection, optionally searched and sorted
    List(ListArgs),
    /// Print one poem with its neighbours
    Show(ShowArgs),
    /// List favorites or toggle one
    Favorites(FavoritesArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var(DATA_ENV, path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Tui(TuiArgs::default()));
    // the alternate screen owns stdout and stderr while the reader runs
    let log_file = matches!(command, Commands::Tui(_)).then(|| paths.log_dir.join("poetry.log"));
    init_tracing(&cli.log_level, log_file.as_deref())
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = Arc::new(loader.load_or_init()?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let storage = Arc::new(storage::init(&config.storage)?);
    let mut favorites = Favorites::new(storage);
    let store = PoemStore::new(config.default_sort);
    let service = PoetryService::new(EnvConnector::new(config.notion.clone()), store, &config);
    tracing::debug!(database_id = %config.notion.database_id, "configuration loaded");

    match command {
        Commands::Tui(args) => {
            let route = args.route.unwrap_or(Route::Collection);
            let mut app = App::new(
                config.clone(),
                runtime.handle().clone(),
                service,
                favorites,
                route,
            );
            commands::run_tui(&mut app)
        }
        Commands::List(args) => {
            favorites.load();
            commands::list_poems(&runtime, &service, &favorites, args)
        }
        Commands::Show(args) => commands::show_poem(&runtime, &service, args),
        Commands::Favorites(args) => {
            favorites.load();
            commands::handle_favorites_command(&runtime, &service, &mut favorites, args)
        }
    }
}

fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            None => {
                fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
        Ok::<(), anyhow::Error>(())
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::SortMode;

    #[test]
    fn bare_invocation_defaults_to_the_reader() {
        let cli = Cli::try_parse_from(["poetry"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn list_flags_parse() {
        let cli = Cli::try_parse_from([
            "poetry",
            "list",
            "--search",
            "sea",
            "--sort",
            "oldest-first",
            "--favorites",
        ])
        .expect("parse");
        match cli.command {
            Some(Commands::List(args)) => {
                assert_eq!(args.search.as_deref(), Some("sea"));
                assert_eq!(args.sort, Some(SortMode::OldestFirst));
                assert!(args.favorites);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn tui_route_flag_parses_poem_paths() {
        let cli = Cli::try_parse_from(["poetry", "tui", "--route", "/poem/abc"]).expect("parse");
        match cli.command {
            Some(Commands::Tui(args)) => assert_eq!(args.route, Some(Route::poem("abc"))),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["poetry", "tui", "--route", "/nowhere"]).is_err());
    }
}
