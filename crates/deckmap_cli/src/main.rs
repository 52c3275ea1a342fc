//! DeckMap CLI
//!
//! Command-line tools for DeckMap workspaces and table databases.
//!
//! # Commands
//!
//! - `init` - Prepare a workspace and report what start-up did
//! - `tables` - List the tables of a database directory
//! - `create` - Create an empty table
//! - `insert` - Append a record to a table
//! - `show` - Print the records of a table, optionally filtered
//! - `index` - Scan, verify or list a file index
//! - `points` - Print the positions of a device on a deck

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use deckmap_codec::CodecKind;
use deckmap_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// DeckMap command-line tools.
#[derive(Parser)]
#[command(name = "deckmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace root directory
    #[arg(global = true, short, long, default_value = ".")]
    root: PathBuf,

    /// Table codec for database directory commands (text, binary)
    #[arg(global = true, short, long, default_value = "text")]
    codec: CodecKind,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare the workspace folders, indices and e-mail tables
    Init,

    /// List the tables in a database directory
    Tables {
        /// Database directory
        dir: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Create an empty table
    Create {
        /// Database directory
        dir: PathBuf,

        /// Table name
        table: String,

        /// Field schema, e.g. "Name:string,EmailAddress:string"
        #[arg(short, long)]
        schema: String,
    },

    /// Append a record given as field=value pairs
    Insert {
        /// Database directory
        dir: PathBuf,

        /// Table name
        table: String,

        /// Values as field=value
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print the records of a table
    Show {
        /// Database directory
        dir: PathBuf,

        /// Table name
        table: String,

        /// Only records whose field equals the value, as field=value
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Work with the data or image index
    Index {
        /// What to do (scan, verify, show)
        #[arg(value_enum)]
        action: IndexAction,

        /// Which index
        #[arg(short, long, value_enum, default_value = "data")]
        kind: IndexKindArg,
    },

    /// Print the positions of a device on a deck
    Points {
        /// Device MAC address
        #[arg(short, long)]
        mac: String,

        /// Deck number
        #[arg(short, long)]
        deck: u32,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

#[derive(ValueEnum, Clone, Copy)]
enum IndexAction {
    /// Add files not yet indexed
    Scan,
    /// Drop missing files and refresh changed ones
    Verify,
    /// List the indexed files
    Show,
}

#[derive(ValueEnum, Clone, Copy)]
enum IndexKindArg {
    /// Raw location data files
    Data,
    /// Deck images
    Image,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::new(&cli.root);

    match cli.command {
        Commands::Init => commands::init::run(config)?,
        Commands::Tables { dir, format } => commands::tables::run(&dir, cli.codec, &format)?,
        Commands::Create { dir, table, schema } => {
            commands::create::run(&dir, cli.codec, &table, &schema)?;
        }
        Commands::Insert { dir, table, values } => {
            commands::insert::run(&dir, cli.codec, &table, &values)?;
        }
        Commands::Show {
            dir,
            table,
            filter,
            format,
        } => commands::show::run(&dir, cli.codec, &table, filter.as_deref(), &format)?,
        Commands::Index { action, kind } => {
            let action = match action {
                IndexAction::Scan => commands::index::Action::Scan,
                IndexAction::Verify => commands::index::Action::Verify,
                IndexAction::Show => commands::index::Action::Show,
            };
            match kind {
                IndexKindArg::Data => commands::index::run_data(&config, action)?,
                IndexKindArg::Image => commands::index::run_image(&config, action)?,
            }
        }
        Commands::Points { mac, deck, format } => commands::points::run(config, &mac, deck, &format)?,
        Commands::Version => {
            println!("DeckMap CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("DeckMap Core v{}", deckmap_core::VERSION);
        }
    }

    Ok(())
}
