//! Shelf CLI
//!
//! Command-line interface for Shelf - a personal book library.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shelf_core::{BookStore, Config};

mod commands;
mod editor;
mod output;
mod tui;

use commands::book::BookFieldArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - Local-first personal book library")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// List genres with book counts
    Genres,
    /// Show storage location and library status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a new book
    #[command(alias = "create")]
    Add {
        #[command(flatten)]
        fields: BookFieldArgs,
    },
    /// List all books
    #[command(alias = "ls")]
    List,
    /// Show book details
    Show {
        /// Book ID (full ID or prefix)
        id: String,
    },
    /// Edit a book (prompts for each field when no flags are given)
    Edit {
        /// Book ID (full ID or prefix)
        id: String,
        #[command(flatten)]
        fields: BookFieldArgs,
    },
    /// Delete a book
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full ID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Search books by title, author or genre
    Search {
        /// Search query
        query: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, storage_key, seed_examples, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    match cli.command {
        None | Some(Commands::Tui) => {
            let config = Config::load_with_cli_override(config_path)?;
            tui::run(&config)
        }
        Some(Commands::Config { command }) => {
            init_logging();
            handle_config_command(command, config_path, &output)
        }
        Some(Commands::Book { command }) => {
            init_logging();
            let config = Config::load_with_cli_override(config_path)?;
            let mut store = open_store(&config, &output);
            handle_book_command(command, &mut store, &output)
        }
        Some(Commands::Genres) => {
            init_logging();
            let config = Config::load_with_cli_override(config_path)?;
            let store = open_store(&config, &output);
            commands::genres::list(&store, &output)
        }
        Some(Commands::Status) => {
            init_logging();
            let config = Config::load_with_cli_override(config_path)?;
            let store = BookStore::open_with_config(&config);
            commands::status::show(&store, &config, &output)
        }
    }
}

/// Open the store, reporting a load failure without aborting
fn open_store(config: &Config, output: &Output) -> BookStore {
    let store = BookStore::open_with_config(config);
    if let Some(message) = store.error() {
        output.warning(message);
    }
    store
}

fn handle_book_command(command: BookCommands, store: &mut BookStore, output: &Output) -> Result<()> {
    match command {
        BookCommands::Add { fields } => commands::book::add(store, fields, output),
        BookCommands::List => commands::book::list(store, output),
        BookCommands::Show { id } => commands::book::show(store, &id, output),
        BookCommands::Edit { id, fields } => commands::book::edit(store, &id, fields, output),
        BookCommands::Delete { id, yes } => commands::book::delete(store, &id, yes, output),
        BookCommands::Search { query } => commands::book::search(store, &query, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(&key, &value, config_path, output)
        }
    }
}

/// Initialize stderr logging for CLI commands
///
/// Silent unless SHELF_LOG is set (e.g. `SHELF_LOG=debug`).
fn init_logging() {
    let env_filter = EnvFilter::try_from_env("SHELF_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
