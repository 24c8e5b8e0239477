//! catalog CLI - Product display-order management from the command line.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(author, version, about = "Catalog product ordering CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: output::OutputFormat,

    /// Catalog path (defaults to current directory)
    #[arg(long, short = 'C', global = true)]
    path: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new catalog
    Init,

    /// Add a product to a category (starts without a position)
    Add {
        /// Category id (e.g., chairs)
        category: String,

        /// Product name; its slug becomes the product id
        name: String,
    },

    /// List a category's products in display order
    #[command(alias = "ls")]
    List {
        /// Category id
        category: String,
    },

    /// Give unpositioned products positions after the current last one
    Organize {
        /// Category id
        category: String,
    },

    /// Resequence a category to 1..N, fixing duplicates and gaps
    Dedupe {
        /// Category id
        category: String,
    },

    /// Move a product to a position, or clear its position
    #[command(alias = "mv")]
    Reorder {
        /// Category id
        category: String,

        /// Product id
        product: String,

        /// 1-based position, or "clear"
        position: String,
    },

    /// Show order change history for a category
    History {
        /// Category id
        category: String,

        /// Show events from the last N days
        #[arg(long)]
        since: Option<u32>,
    },

    /// Start the HTTP API server
    Serve {
        /// Port to listen on (defaults to the catalog config)
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// Host to bind to (defaults to the catalog config)
        #[arg(long)]
        host: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Determine catalog path
    let catalog_path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Init => commands::init(&catalog_path, cli.format),
        Commands::Add { category, name } => {
            commands::add(&catalog_path, &category, &name, cli.format)
        }
        Commands::List { category } => commands::list(&catalog_path, &category, cli.format),
        Commands::Organize { category } => {
            commands::organize(&catalog_path, &category, cli.format)
        }
        Commands::Dedupe { category } => commands::dedupe(&catalog_path, &category, cli.format),
        Commands::Reorder {
            category,
            product,
            position,
        } => commands::reorder(&catalog_path, &category, &product, &position, cli.format),
        Commands::History { category, since } => {
            commands::history(&catalog_path, &category, since, cli.format)
        }
        Commands::Serve { port, host } => commands::serve(&catalog_path, host, port),
    }
}
